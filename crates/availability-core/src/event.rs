//! Calendar event model.
//!
//! Two kinds of event live on the calendar:
//!
//! - **Slot**: a fixed interval proposed by the requester. Its source id and
//!   bounds never change; only its [`Availability`] cycles.
//! - **Span**: an interval the respondent drew. The host widget may move or
//!   resize it; the core only owns its `maybe` flag and its existence.
//!
//! An event's kind is fixed at construction.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{InitError, ValidationError};

/// Handle the host widget assigns to each event it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque identifier of the proposal a slot answers.
///
/// Requesters hand out either numeric row ids or string keys; both are kept
/// exactly as received so the submitted record echoes them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Number(n) => write!(f, "{n}"),
            SourceId::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        SourceId::Text(s.to_string())
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        SourceId::Text(s)
    }
}

impl From<i64> for SourceId {
    fn from(n: i64) -> Self {
        SourceId::Number(n)
    }
}

/// Respondent's answer for a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    Unknown,
    Available,
    Unavailable,
}

impl Availability {
    /// Next state in the click cycle: Unknown -> Available -> Unavailable -> Unknown.
    pub fn next(self) -> Self {
        match self {
            Availability::Unknown => Availability::Available,
            Availability::Available => Availability::Unavailable,
            Availability::Unavailable => Availability::Unknown,
        }
    }

    pub fn is_answered(self) -> bool {
        self != Availability::Unknown
    }
}

/// Kind-specific state of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Slot {
        source_id: SourceId,
        #[serde(default)]
        availability: Availability,
    },
    Span {
        #[serde(default)]
        maybe: bool,
    },
}

impl EventKind {
    pub fn is_slot(&self) -> bool {
        matches!(self, EventKind::Slot { .. })
    }

    pub fn is_span(&self) -> bool {
        matches!(self, EventKind::Span { .. })
    }
}

/// A time interval on the calendar together with its kind.
///
/// Only constructible through [`CalendarEvent::slot`] and
/// [`CalendarEvent::span`], which reject empty or inverted ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    #[serde(flatten)]
    kind: EventKind,
}

impl CalendarEvent {
    /// Create a slot for a proposal. Availability starts out `Unknown`.
    ///
    /// # Errors
    /// Returns [`InitError::InvalidTimeRange`] if `end <= start`.
    pub fn slot(
        source_id: impl Into<SourceId>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, InitError> {
        Self::try_new(
            start,
            end,
            EventKind::Slot {
                source_id: source_id.into(),
                availability: Availability::Unknown,
            },
        )
    }

    /// Create a firm (not maybe) span.
    ///
    /// # Errors
    /// Returns [`InitError::InvalidTimeRange`] if `end <= start`.
    pub fn span(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Result<Self, InitError> {
        Self::try_new(start, end, EventKind::Span { maybe: false })
    }

    fn try_new(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        kind: EventKind,
    ) -> Result<Self, InitError> {
        if end <= start {
            return Err(InitError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end, kind })
    }

    /// Builder-style override of a slot's availability, for restoring a
    /// previous answer. Has no effect on spans.
    pub fn with_availability(mut self, value: Availability) -> Self {
        if let EventKind::Slot { availability, .. } = &mut self.kind {
            *availability = value;
        }
        self
    }

    /// Builder-style override of a span's `maybe` flag. Has no effect on slots.
    pub fn with_maybe(mut self, value: bool) -> Self {
        if let EventKind::Span { maybe } = &mut self.kind {
            *maybe = value;
        }
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Whether the respondent may move, resize or delete the event.
    pub fn editable(&self) -> bool {
        self.kind.is_span()
    }

    pub fn source_id(&self) -> Option<&SourceId> {
        match &self.kind {
            EventKind::Slot { source_id, .. } => Some(source_id),
            EventKind::Span { .. } => None,
        }
    }

    pub fn availability(&self) -> Option<Availability> {
        match self.kind {
            EventKind::Slot { availability, .. } => Some(availability),
            EventKind::Span { .. } => None,
        }
    }

    pub fn maybe(&self) -> Option<bool> {
        match self.kind {
            EventKind::Slot { .. } => None,
            EventKind::Span { maybe } => Some(maybe),
        }
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Move or resize a span. Used by host widgets when the respondent drags.
    ///
    /// # Errors
    /// Returns [`ValidationError::NotEditable`] for slots and
    /// [`ValidationError::StartNotBeforeEnd`] for an empty or inverted range.
    pub fn reschedule(
        &mut self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<(), ValidationError> {
        if !self.editable() {
            return Err(ValidationError::NotEditable);
        }
        if end <= start {
            return Err(ValidationError::StartNotBeforeEnd { start, end });
        }
        self.start = start;
        self.end = end;
        Ok(())
    }

    /// Replace kind-specific state. The kind itself must not change.
    pub(crate) fn replace_state(&mut self, next: EventKind) -> bool {
        match (&self.kind, &next) {
            (EventKind::Slot { source_id: a, .. }, EventKind::Slot { source_id: b, .. }) if a == b => {
                self.kind = next;
                true
            }
            (EventKind::Span { .. }, EventKind::Span { .. }) => {
                self.kind = next;
                true
            }
            _ => false,
        }
    }
}
