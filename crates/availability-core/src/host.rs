//! Host calendar widget seam.
//!
//! The host widget owns the live event collection, geometry and rendering.
//! The core never keeps its own copy of the events: every read goes through
//! [`HostCalendar`], so the widget's collection is the single source of truth.
//!
//! [`MemoryCalendar`] is a plain in-memory host used by the CLI and tests.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::event::{CalendarEvent, EventId};
use crate::style::Style;

/// Navigation gestures. These only change what the widget shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", content = "value", rename_all = "snake_case")]
pub enum Navigation {
    Previous,
    Next,
    Today,
    Timezone(String),
}

/// Operations the core needs from a calendar widget.
pub trait HostCalendar {
    /// Ids of every event the widget holds, in the widget's own order.
    fn event_ids(&self) -> Vec<EventId>;

    fn event(&self, id: EventId) -> Option<&CalendarEvent>;

    fn event_mut(&mut self, id: EventId) -> Option<&mut CalendarEvent>;

    /// Insert an event and return the handle the widget assigned to it.
    fn add_event(&mut self, event: CalendarEvent) -> EventId;

    fn remove_event(&mut self, id: EventId) -> Option<CalendarEvent>;

    /// Push display attributes for an event to the renderer.
    fn apply_style(&mut self, id: EventId, style: Style);

    fn navigate(&mut self, navigation: &Navigation);

    /// All events in widget order.
    fn events(&self) -> Vec<(EventId, &CalendarEvent)> {
        self.event_ids()
            .into_iter()
            .filter_map(|id| self.event(id).map(|event| (id, event)))
            .collect()
    }
}

/// What an in-memory host currently displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Pages moved away from the initial date; negative is earlier.
    pub page_offset: i64,
    pub timezone: String,
}

#[derive(Debug, Clone)]
struct Entry {
    id: EventId,
    event: CalendarEvent,
    style: Option<Style>,
}

/// Host widget kept entirely in memory, in insertion order.
#[derive(Debug, Clone)]
pub struct MemoryCalendar {
    entries: Vec<Entry>,
    next_id: u64,
    view: ViewState,
}

impl MemoryCalendar {
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            view: ViewState {
                page_offset: 0,
                timezone: timezone.into(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Last style pushed for an event, if any.
    pub fn style_of(&self, id: EventId) -> Option<Style> {
        self.entry(id).and_then(|e| e.style)
    }

    /// Drag or resize an event, as the widget does on pointer moves.
    ///
    /// Unknown ids are ignored, like clicks on them.
    ///
    /// # Errors
    /// Returns [`ValidationError::NotEditable`] for slots.
    pub fn move_event(
        &mut self,
        id: EventId,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<(), ValidationError> {
        match self.event_mut(id) {
            Some(event) => event.reschedule(start, end),
            None => {
                tracing::warn!(%id, "move of unknown event ignored");
                Ok(())
            }
        }
    }

    fn entry(&self, id: EventId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

impl Default for MemoryCalendar {
    fn default() -> Self {
        Self::new("local")
    }
}

impl HostCalendar for MemoryCalendar {
    fn event_ids(&self) -> Vec<EventId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    fn event(&self, id: EventId) -> Option<&CalendarEvent> {
        self.entry(id).map(|e| &e.event)
    }

    fn event_mut(&mut self, id: EventId) -> Option<&mut CalendarEvent> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.event)
    }

    fn add_event(&mut self, event: CalendarEvent) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            event,
            style: None,
        });
        id
    }

    fn remove_event(&mut self, id: EventId) -> Option<CalendarEvent> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos).event)
    }

    fn apply_style(&mut self, id: EventId, style: Style) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.style = Some(style);
        }
    }

    fn navigate(&mut self, navigation: &Navigation) {
        match navigation {
            Navigation::Previous => self.view.page_offset -= 1,
            Navigation::Next => self.view.page_offset += 1,
            Navigation::Today => self.view.page_offset = 0,
            Navigation::Timezone(tz) => self.view.timezone = tz.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn span(h: u32) -> CalendarEvent {
        CalendarEvent::span(
            at(&format!("2024-03-04T{h:02}:00:00Z")),
            at(&format!("2024-03-04T{:02}:00:00Z", h + 1)),
        )
        .unwrap()
    }

    #[test]
    fn ids_are_unique_and_keep_insertion_order() {
        let mut cal = MemoryCalendar::default();
        let a = cal.add_event(span(9));
        let b = cal.add_event(span(11));
        let c = cal.add_event(span(10));
        assert_eq!(cal.event_ids(), vec![a, b, c]);

        cal.remove_event(b);
        let d = cal.add_event(span(12));
        assert_ne!(d, b, "handles are never reused");
        assert_eq!(cal.event_ids(), vec![a, c, d]);
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut cal = MemoryCalendar::default();
        assert!(cal.remove_event(EventId(42)).is_none());
    }

    #[test]
    fn navigation_changes_view_only() {
        let mut cal = MemoryCalendar::new("UTC");
        let id = cal.add_event(span(9));
        let before = cal.event(id).cloned();

        cal.navigate(&Navigation::Next);
        cal.navigate(&Navigation::Next);
        cal.navigate(&Navigation::Previous);
        assert_eq!(cal.view().page_offset, 1);
        cal.navigate(&Navigation::Timezone("Europe/Berlin".into()));
        assert_eq!(cal.view().timezone, "Europe/Berlin");
        cal.navigate(&Navigation::Today);
        assert_eq!(cal.view().page_offset, 0);

        assert_eq!(cal.event(id).cloned(), before);
    }

    #[test]
    fn move_event_rejects_slots() {
        let mut cal = MemoryCalendar::default();
        let slot = cal.add_event(
            CalendarEvent::slot("A", at("2024-03-04T09:00:00Z"), at("2024-03-04T10:00:00Z")).unwrap(),
        );
        assert!(cal
            .move_event(slot, at("2024-03-04T11:00:00Z"), at("2024-03-04T12:00:00Z"))
            .is_err());

        let s = cal.add_event(span(9));
        cal.move_event(s, at("2024-03-04T13:00:00Z"), at("2024-03-04T15:00:00Z"))
            .unwrap();
        assert_eq!(cal.event(s).unwrap().start(), at("2024-03-04T13:00:00Z"));
    }

    #[test]
    fn move_unknown_is_ignored() {
        let mut cal = MemoryCalendar::default();
        let s = cal.add_event(span(9));
        cal.move_event(EventId(99), at("2024-03-04T13:00:00Z"), at("2024-03-04T15:00:00Z"))
            .unwrap();
        assert_eq!(cal.len(), 1);
        assert_eq!(cal.event(s).unwrap().start(), at("2024-03-04T09:00:00Z"));
    }
}
