//! Display attributes derived from event state.

use serde::Serialize;

use crate::event::{Availability, CalendarEvent, EventKind};

/// Event colors understood by host widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Bright green for answered slots.
    Lime,
    Green,
    Red,
    Orange,
}

/// Color and label shown for an event.
///
/// `color: None` means the host widget's default event color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Style {
    pub color: Option<Color>,
    pub label: &'static str,
}

/// Resolve the style for an event.
pub fn style(event: &CalendarEvent) -> Style {
    style_for_kind(event.kind())
}

/// Resolve the style for a kind and its state alone.
pub fn style_for_kind(kind: &EventKind) -> Style {
    match kind {
        EventKind::Slot { availability, .. } => match availability {
            Availability::Available => Style {
                color: Some(Color::Lime),
                label: "Available",
            },
            Availability::Unavailable => Style {
                color: Some(Color::Red),
                label: "Unavailable",
            },
            Availability::Unknown => Style {
                color: None,
                label: "No Answer",
            },
        },
        EventKind::Span { maybe: true } => Style {
            color: Some(Color::Orange),
            label: "If I must",
        },
        EventKind::Span { maybe: false } => Style {
            color: Some(Color::Green),
            label: "Available",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_styles() {
        let kind = |availability| EventKind::Slot {
            source_id: 1i64.into(),
            availability,
        };
        assert_eq!(style_for_kind(&kind(Availability::Available)).color, Some(Color::Lime));
        assert_eq!(style_for_kind(&kind(Availability::Unavailable)).label, "Unavailable");
        let unknown = style_for_kind(&kind(Availability::Unknown));
        assert_eq!(unknown.color, None);
        assert_eq!(unknown.label, "No Answer");
    }

    #[test]
    fn span_styles() {
        let maybe = style_for_kind(&EventKind::Span { maybe: true });
        assert_eq!(maybe.color, Some(Color::Orange));
        assert_eq!(maybe.label, "If I must");

        let firm = style_for_kind(&EventKind::Span { maybe: false });
        assert_eq!(firm.color, Some(Color::Green));
        assert_eq!(firm.label, "Available");
    }

    #[test]
    fn style_serializes_css_names() {
        let json = serde_json::to_value(style_for_kind(&EventKind::Span { maybe: true })).unwrap();
        assert_eq!(json["color"], "orange");
        assert_eq!(json["label"], "If I must");
    }
}
