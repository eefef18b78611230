//! Submission payload serialization and initial calendar loading.
//!
//! Outbound shape:
//!
//! ```text
//! {
//!   "slots": [{"sourceId": .., "start": .., "end": .., "availability": ..}],
//!   "spans": [{"start": .., "end": .., "maybe": ..}]
//! }
//! ```
//!
//! Timestamps are written as RFC 3339 with their UTC offset, so a consumer
//! recovers absolute instants whatever timezone the respondent viewed.
//! On input, RFC 3339 strings and Unix timestamps (seconds) are accepted.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::cycle::Capabilities;
use crate::error::InitError;
use crate::event::{Availability, CalendarEvent, EventKind, SourceId};
use crate::host::HostCalendar;
use crate::view::TimeWindow;

/// A slot proposed by the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotProposal {
    pub source_id: SourceId,
    #[serde(with = "timestamp")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "timestamp")]
    pub end: DateTime<FixedOffset>,
}

/// A slot together with the respondent's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    pub source_id: SourceId,
    #[serde(with = "timestamp")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "timestamp")]
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub availability: Availability,
}

/// A span drawn by the respondent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    #[serde(with = "timestamp")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "timestamp")]
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub maybe: bool,
}

/// The record written to the outbound field on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(default)]
    pub slots: Vec<SlotRecord>,
    #[serde(default)]
    pub spans: Vec<SpanRecord>,
}

impl SubmissionPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.slots.len() + self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.spans.is_empty()
    }
}

fn default_number_of_days() -> u32 {
    7
}

fn default_true() -> bool {
    true
}

/// Everything a page supplies to set up the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarInit {
    #[serde(default, with = "timestamp::option")]
    pub initial_date: Option<DateTime<FixedOffset>>,
    #[serde(default = "default_number_of_days")]
    pub number_of_days: u32,
    #[serde(default)]
    pub slots: Vec<SlotProposal>,
    /// Previously submitted spans (edit/resume flow).
    #[serde(default)]
    pub spans: Vec<SpanRecord>,
    /// Previously submitted slot answers, matched to proposals by source id.
    #[serde(default)]
    pub answers: Vec<SlotRecord>,
    /// Windows inside which spans may be drawn, shown as background.
    #[serde(default)]
    pub windows: Vec<TimeWindow>,
    #[serde(default = "default_true")]
    pub allow_spans: bool,
    #[serde(default)]
    pub allow_maybe: bool,
    #[serde(default)]
    pub timezones: Vec<String>,
    #[serde(default)]
    pub default_timezone: Option<String>,
}

impl Default for CalendarInit {
    fn default() -> Self {
        Self {
            initial_date: None,
            number_of_days: default_number_of_days(),
            slots: Vec::new(),
            spans: Vec::new(),
            answers: Vec::new(),
            windows: Vec::new(),
            allow_spans: true,
            allow_maybe: false,
            timezones: Vec::new(),
            default_timezone: None,
        }
    }
}

/// Shape of [`CalendarInit`] before its proposals are checked one by one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInit {
    #[serde(default, with = "timestamp::option")]
    initial_date: Option<DateTime<FixedOffset>>,
    #[serde(default = "default_number_of_days")]
    number_of_days: u32,
    #[serde(default)]
    slots: Vec<serde_json::Value>,
    #[serde(default)]
    spans: Vec<serde_json::Value>,
    #[serde(default)]
    answers: Vec<SlotRecord>,
    #[serde(default)]
    windows: Vec<TimeWindow>,
    #[serde(default = "default_true")]
    allow_spans: bool,
    #[serde(default)]
    allow_maybe: bool,
    #[serde(default)]
    timezones: Vec<String>,
    #[serde(default)]
    default_timezone: Option<String>,
}

impl CalendarInit {
    /// Parse page-supplied JSON, reporting the first malformed proposal by index.
    ///
    /// # Errors
    /// Returns [`InitError::MalformedProposal`] or [`InitError::MalformedSpan`]
    /// naming the offending entry, and [`InitError::MalformedInit`] for
    /// anything else that cannot be read.
    pub fn from_json(json: &str) -> Result<Self, InitError> {
        let raw: RawInit = serde_json::from_str(json).map_err(InitError::MalformedInit)?;

        let slots = raw
            .slots
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<SlotProposal>(value).map_err(|e| {
                    InitError::MalformedProposal {
                        index,
                        message: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let spans = raw
            .spans
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<SpanRecord>(value).map_err(|e| InitError::MalformedSpan {
                    index,
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            initial_date: raw.initial_date,
            number_of_days: raw.number_of_days,
            slots,
            spans,
            answers: raw.answers,
            windows: raw.windows,
            allow_spans: raw.allow_spans,
            allow_maybe: raw.allow_maybe,
            timezones: raw.timezones,
            default_timezone: raw.default_timezone,
        })
    }

    /// Capabilities for this page: a request can only narrow what the
    /// deployment allows.
    pub fn capabilities(&self, deployment: &Capabilities) -> Capabilities {
        Capabilities {
            allow_spans: deployment.allow_spans && self.allow_spans,
            allow_maybe: deployment.allow_maybe && self.allow_maybe,
            require_all_slots_answered: deployment.require_all_slots_answered,
        }
    }

    /// Timezone the calendar opens in.
    ///
    /// # Errors
    /// Returns [`InitError::UnknownTimezone`] if a default is given that is
    /// not among the selectable timezones.
    pub fn initial_timezone(&self) -> Result<String, InitError> {
        match (&self.default_timezone, self.timezones.is_empty()) {
            (Some(tz), true) => Ok(tz.clone()),
            (Some(tz), false) if self.timezones.contains(tz) => Ok(tz.clone()),
            (Some(tz), false) => Err(InitError::UnknownTimezone {
                default: tz.clone(),
                available: self.timezones.clone(),
            }),
            (None, _) => Ok(self
                .timezones
                .first()
                .cloned()
                .unwrap_or_else(|| "local".to_string())),
        }
    }
}

/// Build the initial events: one `Unknown` slot per proposal (unless a
/// previous answer exists for its source id), followed by the given spans.
///
/// # Errors
/// Fails on an empty or inverted interval, or on two proposals sharing a
/// source id.
pub fn events_from_init(init: &CalendarInit) -> Result<Vec<CalendarEvent>, InitError> {
    let mut events = Vec::with_capacity(init.slots.len() + init.spans.len());
    let mut seen = std::collections::HashSet::new();

    for proposal in &init.slots {
        if !seen.insert(&proposal.source_id) {
            return Err(InitError::DuplicateSource(proposal.source_id.clone()));
        }
        let previous = init
            .answers
            .iter()
            .find(|a| a.source_id == proposal.source_id)
            .map(|a| a.availability)
            .unwrap_or_default();
        let slot = CalendarEvent::slot(proposal.source_id.clone(), proposal.start, proposal.end)?
            .with_availability(previous);
        events.push(slot);
    }

    for span in &init.spans {
        events.push(CalendarEvent::span(span.start, span.end)?.with_maybe(span.maybe));
    }

    Ok(events)
}

/// Project every event the host holds into a submission payload, keeping the
/// host's order within each list.
pub fn serialize<H: HostCalendar + ?Sized>(host: &H) -> SubmissionPayload {
    let mut payload = SubmissionPayload::default();
    for (_, event) in host.events() {
        match event.kind() {
            EventKind::Slot {
                source_id,
                availability,
            } => payload.slots.push(SlotRecord {
                source_id: source_id.clone(),
                start: event.start(),
                end: event.end(),
                availability: *availability,
            }),
            EventKind::Span { maybe } => payload.spans.push(SpanRecord {
                start: event.start(),
                end: event.end(),
                maybe: *maybe,
            }),
        }
    }
    payload
}

/// Serde helpers for timestamps.
pub mod timestamp {
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(i64),
        Fractional(f64),
        Text(String),
    }

    fn from_raw<E: de::Error>(raw: Raw) -> Result<DateTime<FixedOffset>, E> {
        let utc = FixedOffset::east_opt(0).ok_or_else(|| E::custom("invalid UTC offset"))?;
        match raw {
            Raw::Text(s) => DateTime::parse_from_rfc3339(&s).map_err(|e| {
                E::custom(format!(
                    "timestamp '{s}' must be RFC 3339 with a UTC offset: {e}"
                ))
            }),
            Raw::Seconds(secs) => Utc
                .timestamp_opt(secs, 0)
                .single()
                .map(|t| t.with_timezone(&utc))
                .ok_or_else(|| E::custom(format!("timestamp {secs} out of range"))),
            Raw::Fractional(secs) => {
                let millis = (secs * 1000.0).round() as i64;
                Utc.timestamp_millis_opt(millis)
                    .single()
                    .map(|t| t.with_timezone(&utc))
                    .ok_or_else(|| E::custom(format!("timestamp {secs} out of range")))
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &DateTime<FixedOffset>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<FixedOffset>, D::Error> {
        from_raw(Raw::deserialize(d)?)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<FixedOffset>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => s.serialize_some(&v.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
            Option::<Raw>::deserialize(d)?.map(from_raw).transpose()
        }
    }
}
