//! Interaction controller.
//!
//! Binds host widget callbacks to the cycle engine, the style resolver and
//! the serializer. The controller owns the host widget; callers reach the
//! calendar through it instead of through any page-global handle.
//!
//! ## Usage
//!
//! ```ignore
//! let mut ctl = InteractionController::initialize(MemoryCalendar::default(), &init, &caps)?;
//! ctl.on_select(start, end);            // respondent drags over empty space
//! ctl.on_click(id, Modifiers::NONE);    // respondent clicks an event
//! ctl.submit()?;                        // writes the outbound payload once
//! ```

use chrono::{DateTime, FixedOffset, Utc};

use crate::changes::Change;
use crate::cycle::{self, Capabilities, Modifiers, Transition};
use crate::error::{CoreError, InitError, ValidationError};
use crate::event::{EventId, EventKind};
use crate::host::{HostCalendar, Navigation};
use crate::payload::{self, CalendarInit, SubmissionPayload};
use crate::style::style;
use crate::validation::first_unanswered;

/// Drives one calendar page from initialization to submission.
#[derive(Debug)]
pub struct InteractionController<H: HostCalendar> {
    host: H,
    caps: Capabilities,
    submit_enabled: bool,
    /// Serialized payload, written once on submit.
    outbound: Option<String>,
}

impl<H: HostCalendar> InteractionController<H> {
    /// Wrap a host widget whose events are already styled.
    pub fn new(host: H, caps: Capabilities) -> Self {
        Self {
            host,
            caps,
            submit_enabled: true,
            outbound: None,
        }
    }

    /// Populate `host` from page data and style every event.
    ///
    /// # Errors
    /// Any [`InitError`]: the calendar is not handed out half-built.
    pub fn initialize(
        mut host: H,
        init: &CalendarInit,
        deployment: &Capabilities,
    ) -> Result<Self, InitError> {
        let timezone = init.initial_timezone()?;
        let events = payload::events_from_init(init)?;
        let caps = init.capabilities(deployment);

        host.navigate(&Navigation::Timezone(timezone));
        for event in events {
            let resolved = style(&event);
            let id = host.add_event(event);
            host.apply_style(id, resolved);
        }

        tracing::info!(
            slots = init.slots.len(),
            spans = init.spans.len(),
            allow_spans = caps.allow_spans,
            allow_maybe = caps.allow_maybe,
            "calendar initialized"
        );
        Ok(Self::new(host, caps))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct host access for gestures the widget handles itself, such as
    /// dragging or resizing a span.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Whether the widget should offer drag-select at all.
    pub fn selectable(&self) -> bool {
        self.caps.allow_spans
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// The outbound payload field, filled after a successful submit.
    pub fn outbound(&self) -> Option<&str> {
        self.outbound.as_deref()
    }

    /// Current calendar contents as a payload, without submitting.
    pub fn snapshot(&self) -> SubmissionPayload {
        payload::serialize(&self.host)
    }

    // ── Callbacks ────────────────────────────────────────────────────

    /// Click or tap on an event.
    pub fn on_click(&mut self, id: EventId, modifiers: Modifiers) -> Option<Change> {
        let Some(event) = self.host.event(id) else {
            tracing::warn!(%id, "click on unknown event ignored");
            return None;
        };
        let before = event.kind().clone();

        match cycle::click(&before, modifiers, &self.caps) {
            Transition::Unchanged => {
                tracing::debug!(%id, shift = modifiers.shift, "click has no effect");
                let resolved = style(event);
                self.host.apply_style(id, resolved);
                None
            }
            Transition::Remove => {
                self.host.remove_event(id)?;
                tracing::info!(%id, "span removed");
                Some(Change::SpanRemoved { id, at: Utc::now() })
            }
            Transition::Update(next) => {
                let event = self.host.event_mut(id)?;
                if !event.replace_state(next.clone()) {
                    return None;
                }
                let resolved = style(event);
                self.host.apply_style(id, resolved);
                tracing::debug!(%id, label = resolved.label, "event restyled");

                match (before, next) {
                    (
                        EventKind::Slot {
                            source_id,
                            availability: from,
                        },
                        EventKind::Slot {
                            availability: to, ..
                        },
                    ) => Some(Change::SlotCycled {
                        id,
                        source_id,
                        from,
                        to,
                        at: Utc::now(),
                    }),
                    (_, EventKind::Span { maybe }) => Some(Change::MaybeToggled {
                        id,
                        maybe,
                        at: Utc::now(),
                    }),
                    (EventKind::Span { .. }, EventKind::Slot { .. }) => None,
                }
            }
        }
    }

    /// Drag-select over empty calendar space.
    pub fn on_select(
        &mut self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Option<Change> {
        let Some(span) = cycle::select(start, end, &self.caps) else {
            tracing::debug!(%start, %end, allow_spans = self.caps.allow_spans, "selection ignored");
            return None;
        };
        let resolved = style(&span);
        let id = self.host.add_event(span);
        self.host.apply_style(id, resolved);
        tracing::info!(%id, %start, %end, "span created");
        Some(Change::SpanCreated {
            id,
            start,
            end,
            at: Utc::now(),
        })
    }

    /// Previous/next page or timezone change. Events are untouched.
    pub fn navigate(&mut self, navigation: Navigation) -> Change {
        self.host.navigate(&navigation);
        Change::Navigated {
            navigation,
            at: Utc::now(),
        }
    }

    /// Serialize the calendar into the outbound field and disable submission.
    ///
    /// Returns `Ok(None)` once submission has been disabled; the serializer
    /// is not run again.
    ///
    /// # Errors
    /// [`ValidationError::UnansweredSlot`] when every slot must be answered
    /// and one is still `Unknown`; submission stays enabled so the
    /// respondent can finish. JSON errors are passed through.
    pub fn submit(&mut self) -> Result<Option<Change>, CoreError> {
        if !self.submit_enabled {
            tracing::debug!("submit ignored: already submitted");
            return Ok(None);
        }

        let payload = payload::serialize(&self.host);
        if self.caps.require_all_slots_answered {
            if let Some(slot) = first_unanswered(&payload.slots) {
                tracing::warn!(source_id = %slot.source_id, "submission refused: unanswered slot");
                return Err(ValidationError::UnansweredSlot {
                    source_id: slot.source_id.clone(),
                    start: slot.start,
                }
                .into());
            }
        }

        self.outbound = Some(payload.to_json()?);
        self.submit_enabled = false;
        tracing::info!(
            slots = payload.slots.len(),
            spans = payload.spans.len(),
            "availability submitted"
        );
        Ok(Some(Change::Submitted {
            payload,
            at: Utc::now(),
        }))
    }
}
