//! State cycle engine.
//!
//! Pure transition functions from (event state, gesture) to the next state.
//! Nothing here touches the host widget; the
//! [`InteractionController`](crate::controller::InteractionController)
//! applies the returned [`Transition`].
//!
//! ## Click rules
//!
//! ```text
//! Slot, no modifier      Unknown -> Available -> Unavailable -> Unknown
//! Slot, shift            no-op (shift is reserved for span removal)
//! Span, shift            remove
//! Span, no modifier      toggle maybe (only when allow_maybe)
//! ```
//!
//! Slots and spans have disjoint rule sets: a slot transition never yields a
//! span state and vice versa.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::event::{CalendarEvent, EventKind};

/// Keyboard modifiers held during a click or tap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// The "remove" modifier.
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true };
}

/// Deployment capabilities handed to the controller at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Respondents may draw free-form spans.
    pub allow_spans: bool,
    /// Respondents may flag spans as "maybe".
    pub allow_maybe: bool,
    /// Submission is refused while any slot is still `Unknown`.
    pub require_all_slots_answered: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            allow_spans: true,
            allow_maybe: false,
            require_all_slots_answered: false,
        }
    }
}

/// Outcome of a click on an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The gesture does not apply; leave the event alone.
    Unchanged,
    /// Replace the event's state with this one (same kind).
    Update(EventKind),
    /// Delete the event.
    Remove,
}

/// Compute the effect of a primary click on an event of the given kind.
pub fn click(kind: &EventKind, modifiers: Modifiers, caps: &Capabilities) -> Transition {
    match kind {
        EventKind::Slot {
            source_id,
            availability,
        } => {
            if modifiers.shift {
                return Transition::Unchanged;
            }
            Transition::Update(EventKind::Slot {
                source_id: source_id.clone(),
                availability: availability.next(),
            })
        }
        EventKind::Span { maybe } => {
            if modifiers.shift {
                Transition::Remove
            } else if caps.allow_maybe {
                Transition::Update(EventKind::Span { maybe: !maybe })
            } else {
                Transition::Unchanged
            }
        }
    }
}

/// Compute the span created by a drag-select over empty calendar space.
///
/// Returns `None` when spans are disabled or the selection is empty.
pub fn select(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    caps: &Capabilities,
) -> Option<CalendarEvent> {
    if !caps.allow_spans {
        return None;
    }
    CalendarEvent::span(start, end).ok()
}
