//! Calendar setup from a requester's timespans.
//!
//! A request is a list of timespans. Fixed timespans become slots the
//! respondent answers; partial ones become background windows inside which
//! the respondent draws spans.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::event::SourceId;
use crate::payload::{timestamp, CalendarInit, SlotProposal, SubmissionPayload};

const MS_PER_DAY: i64 = 24 * 3600 * 1000;

/// An interval without event semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "timestamp")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "timestamp")]
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// Whether `[start, end]` lies entirely inside this window.
    pub fn contains(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        self.start <= start && end <= self.end
    }
}

/// A timespan in an availability request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTimespan {
    pub id: SourceId,
    #[serde(with = "timestamp")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "timestamp")]
    pub end: DateTime<FixedOffset>,
    /// Respondents draw their own spans inside this timespan instead of
    /// answering it as a whole.
    #[serde(default)]
    pub allow_partial: bool,
}

/// Page options that do not come from the request timespans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub allow_maybe: bool,
    pub timezones: Vec<String>,
    pub default_timezone: Option<String>,
}

/// Whole days needed to show everything from `first` to `last`, at least one.
pub fn days_covering(first: DateTime<FixedOffset>, last: DateTime<FixedOffset>) -> u32 {
    let ms = (last - first).num_milliseconds().max(0);
    let days = (ms + MS_PER_DAY - 1) / MS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX).max(1)
}

/// Lay out the calendar for a request, optionally restoring an earlier
/// response.
pub fn build_init(
    timespans: &[RequestTimespan],
    previous: Option<&SubmissionPayload>,
    options: &ViewOptions,
) -> CalendarInit {
    let first = timespans.iter().map(|t| t.start).min();
    let last = timespans.iter().map(|t| t.end).max();

    let mut slots = Vec::new();
    let mut windows = Vec::new();
    for timespan in timespans {
        if timespan.allow_partial {
            windows.push(TimeWindow {
                start: timespan.start,
                end: timespan.end,
            });
        } else {
            slots.push(SlotProposal {
                source_id: timespan.id.clone(),
                start: timespan.start,
                end: timespan.end,
            });
        }
    }
    let allow_spans = !windows.is_empty();

    let (answers, spans) = match previous {
        Some(p) if allow_spans => (p.slots.clone(), p.spans.clone()),
        Some(p) => (p.slots.clone(), Vec::new()),
        None => (Vec::new(), Vec::new()),
    };

    let number_of_days = match (first, last) {
        (Some(first), Some(last)) => days_covering(first, last),
        _ => 1,
    };

    tracing::debug!(
        slots = slots.len(),
        windows = windows.len(),
        number_of_days,
        "built calendar layout"
    );

    CalendarInit {
        initial_date: first,
        number_of_days,
        slots,
        spans,
        answers,
        windows,
        allow_spans,
        allow_maybe: options.allow_maybe,
        timezones: options.timezones.clone(),
        default_timezone: options.default_timezone.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Availability;
    use crate::payload::{SlotRecord, SpanRecord};

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn timespan(id: i64, start: &str, end: &str, allow_partial: bool) -> RequestTimespan {
        RequestTimespan {
            id: id.into(),
            start: at(start),
            end: at(end),
            allow_partial,
        }
    }

    #[test]
    fn empty_request_shows_one_day() {
        let init = build_init(&[], None, &ViewOptions::default());
        assert_eq!(init.number_of_days, 1);
        assert!(init.initial_date.is_none());
        assert!(!init.allow_spans);
    }

    #[test]
    fn days_round_up() {
        assert_eq!(days_covering(at("2024-03-04T09:00:00Z"), at("2024-03-04T10:00:00Z")), 1);
        assert_eq!(days_covering(at("2024-03-04T09:00:00Z"), at("2024-03-05T09:00:00Z")), 1);
        assert_eq!(days_covering(at("2024-03-04T09:00:00Z"), at("2024-03-05T09:00:01Z")), 2);
        assert_eq!(days_covering(at("2024-03-04T00:00:00Z"), at("2024-03-08T12:00:00Z")), 5);
    }

    #[test]
    fn fixed_timespans_become_slots_and_partial_ones_windows() {
        let request = vec![
            timespan(2, "2024-03-05T09:00:00Z", "2024-03-05T10:00:00Z", false),
            timespan(1, "2024-03-04T09:00:00Z", "2024-03-04T17:00:00Z", true),
        ];
        let init = build_init(&request, None, &ViewOptions::default());
        assert_eq!(init.initial_date, Some(at("2024-03-04T09:00:00Z")));
        assert_eq!(init.number_of_days, 2);
        assert_eq!(init.slots.len(), 1);
        assert_eq!(init.slots[0].source_id, SourceId::Number(2));
        assert_eq!(init.windows.len(), 1);
        assert!(init.allow_spans);
    }

    #[test]
    fn previous_spans_restored_only_when_spans_allowed() {
        let previous = SubmissionPayload {
            slots: vec![SlotRecord {
                source_id: 2i64.into(),
                start: at("2024-03-05T09:00:00Z"),
                end: at("2024-03-05T10:00:00Z"),
                availability: Availability::Available,
            }],
            spans: vec![SpanRecord {
                start: at("2024-03-04T10:00:00Z"),
                end: at("2024-03-04T11:00:00Z"),
                maybe: false,
            }],
        };

        let slots_only = vec![timespan(2, "2024-03-05T09:00:00Z", "2024-03-05T10:00:00Z", false)];
        let init = build_init(&slots_only, Some(&previous), &ViewOptions::default());
        assert_eq!(init.answers.len(), 1);
        assert!(init.spans.is_empty());

        let mut with_window = slots_only.clone();
        with_window.push(timespan(1, "2024-03-04T09:00:00Z", "2024-03-04T17:00:00Z", true));
        let init = build_init(&with_window, Some(&previous), &ViewOptions::default());
        assert_eq!(init.spans.len(), 1);
    }

    #[test]
    fn window_containment_is_inclusive() {
        let w = TimeWindow {
            start: at("2024-03-04T09:00:00Z"),
            end: at("2024-03-04T17:00:00Z"),
        };
        assert!(w.contains(at("2024-03-04T09:00:00Z"), at("2024-03-04T17:00:00Z")));
        assert!(!w.contains(at("2024-03-04T08:59:00Z"), at("2024-03-04T10:00:00Z")));
        assert!(!w.contains(at("2024-03-04T16:00:00Z"), at("2024-03-04T17:01:00Z")));
    }
}
