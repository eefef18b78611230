//! Change records produced by the interaction controller.
//!
//! Controller gestures yield a [`Change`] stamped with the time they
//! happened, for hosts that keep an activity log.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{Availability, EventId, SourceId};
use crate::host::Navigation;
use crate::payload::SubmissionPayload;

/// Every state change the controller makes produces a Change.
/// Hosts can log them or mirror them into their own UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Change {
    SlotCycled {
        id: EventId,
        source_id: SourceId,
        from: Availability,
        to: Availability,
        at: DateTime<Utc>,
    },
    MaybeToggled {
        id: EventId,
        maybe: bool,
        at: DateTime<Utc>,
    },
    SpanCreated {
        id: EventId,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        at: DateTime<Utc>,
    },
    SpanRemoved {
        id: EventId,
        at: DateTime<Utc>,
    },
    Navigated {
        navigation: Navigation,
        at: DateTime<Utc>,
    },
    /// The payload was written to the outbound field; submission is now
    /// disabled for the rest of the page's life.
    Submitted {
        payload: SubmissionPayload,
        at: DateTime<Utc>,
    },
}
