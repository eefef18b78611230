//! # Availability Core Library
//!
//! This library holds the logic behind an availability poll: a respondent
//! marks proposed time slots as available or not, draws extra availability
//! windows on a calendar, and submits the result as one payload.
//!
//! Rendering and geometry belong to a host calendar widget. The core only
//! manages logical event state through the [`HostCalendar`] seam.
//!
//! ## Architecture
//!
//! - **Event Model**: slots and spans as a tagged [`EventKind`]
//! - **Cycle Engine**: pure click/select transitions over event state
//! - **Style Resolver**: color and label derived from state
//! - **Interaction Controller**: host callbacks wired to the above
//! - **Serializer**: submission payloads out, initial calendar data in
//! - **Validation**: normalization and rule checks on received payloads
//!
//! ## Key Components
//!
//! - [`InteractionController`]: one calendar page from load to submit
//! - [`SubmissionPayload`]: the outbound record
//! - [`Config`]: deployment configuration

pub mod changes;
pub mod config;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod event;
pub mod host;
pub mod payload;
pub mod style;
pub mod validation;
pub mod view;

pub use changes::Change;
pub use config::Config;
pub use controller::InteractionController;
pub use cycle::{Capabilities, Modifiers, Transition};
pub use error::{ConfigError, CoreError, InitError, ValidationError};
pub use event::{Availability, CalendarEvent, EventId, EventKind, SourceId};
pub use host::{HostCalendar, MemoryCalendar, Navigation};
pub use payload::{CalendarInit, SlotProposal, SlotRecord, SpanRecord, SubmissionPayload};
pub use style::{Color, Style};
pub use validation::{NormalizedSubmission, ResponseSummary, SubmissionRules};
pub use view::{RequestTimespan, TimeWindow, ViewOptions};
