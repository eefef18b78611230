//! Core error types for availability-core.
//!
//! Errors are split by concern using thiserror. Gestures that do not apply
//! to an event are not errors; they come back as `None` or
//! [`Transition::Unchanged`](crate::cycle::Transition::Unchanged).

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::event::SourceId;

/// Core error type for availability-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Calendar could not be initialized from the supplied data
    #[error("Initialization error: {0}")]
    Init(#[from] InitError),

    /// A submission rule was violated
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal errors raised while turning external data into calendar events.
///
/// The calendar refuses to start rather than guess at missing data.
#[derive(Error, Debug)]
pub enum InitError {
    /// A slot proposal lacks a required field or has an unreadable one
    #[error("Malformed slot proposal at index {index}: {message}")]
    MalformedProposal { index: usize, message: String },

    /// The page data is not valid JSON, or a field other than a proposal or
    /// span (dates, answers, windows, options) cannot be read
    #[error("Malformed calendar data: {0}")]
    MalformedInit(#[source] serde_json::Error),

    /// A previously submitted span could not be read
    #[error("Malformed span at index {index}: {message}")]
    MalformedSpan { index: usize, message: String },

    /// An interval does not end after it starts
    #[error("Invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidTimeRange {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    /// Two proposals carry the same source id
    #[error("Duplicate slot proposal for source id {0}")]
    DuplicateSource(SourceId),

    /// The default timezone is not among the selectable ones
    #[error("Default timezone '{default}' is not one of {available:?}")]
    UnknownTimezone {
        default: String,
        available: Vec<String>,
    },
}

/// Submission rule violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Start must come before end
    #[error("Start ({start}) must come before end ({end})")]
    StartNotBeforeEnd {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    /// Two spans cover the same time
    #[error("Some time spans overlap: {first_end} is after {second_start}")]
    OverlappingSpans {
        first_end: DateTime<FixedOffset>,
        second_start: DateTime<FixedOffset>,
    },

    /// A slot was left without an answer
    #[error("Slot {source_id} starting {start} has no availability response")]
    UnansweredSlot {
        source_id: SourceId,
        start: DateTime<FixedOffset>,
    },

    /// A span lies outside every requested window
    #[error("Span {start} - {end} does not fall within the requested times")]
    OutsideRequested {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    /// A span is shorter than the configured minimum
    #[error("Span starting {start} is shorter than the required {min_minutes} minutes")]
    TooShort {
        start: DateTime<FixedOffset>,
        min_minutes: f64,
    },

    /// Only spans may be moved or resized
    #[error("Event is not editable")]
    NotEditable,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration directory could not be determined or created
    #[error("Cannot access configuration directory: {0}")]
    NoDataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not name a configuration value
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
