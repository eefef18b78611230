//! Normalization and rule checks for a submitted payload.
//!
//! Run on the receiving side before a response is stored:
//!
//! 1. spans are sorted by start
//! 2. touching spans with the same `maybe` flag are merged
//! 3. every interval must end after it starts
//! 4. spans must not overlap
//! 5. slots must be answered (optional)
//! 6. spans must lie inside a requested window (when windows are given)
//! 7. spans must meet the minimum length (optional)

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::event::Availability;
use crate::payload::{SlotRecord, SpanRecord, SubmissionPayload};
use crate::view::TimeWindow;

fn default_true() -> bool {
    true
}

/// Which checks apply to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRules {
    #[serde(default)]
    pub min_span_minutes: Option<f64>,
    #[serde(default = "default_true")]
    pub merge_adjacent_spans: bool,
    #[serde(default = "default_true")]
    pub reject_overlapping_spans: bool,
    /// Filled from the capabilities section, not stored with the rules.
    #[serde(skip)]
    pub require_all_slots_answered: bool,
}

impl Default for SubmissionRules {
    fn default() -> Self {
        Self {
            min_span_minutes: None,
            merge_adjacent_spans: true,
            reject_overlapping_spans: true,
            require_all_slots_answered: false,
        }
    }
}

/// Totals reported alongside an accepted response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSummary {
    /// Total time covered by spans, in seconds.
    pub span_duration: f64,
    /// Slots answered `Available`.
    pub available_slot_count: usize,
}

impl ResponseSummary {
    pub fn of(payload: &SubmissionPayload) -> Self {
        let total = payload
            .spans
            .iter()
            .fold(Duration::zero(), |acc, s| acc + (s.end - s.start));
        Self {
            span_duration: total.num_milliseconds() as f64 / 1000.0,
            available_slot_count: payload
                .slots
                .iter()
                .filter(|s| s.availability == Availability::Available)
                .count(),
        }
    }
}

/// An accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSubmission {
    pub payload: SubmissionPayload,
    pub summary: ResponseSummary,
}

/// First slot still `Unknown`, in payload order.
pub fn first_unanswered(slots: &[SlotRecord]) -> Option<&SlotRecord> {
    slots.iter().find(|s| !s.availability.is_answered())
}

/// Merge spans where one ends exactly where the next begins and both carry
/// the same `maybe` flag. Input must be sorted by start.
pub fn merge_adjacent_spans(spans: Vec<SpanRecord>) -> Vec<SpanRecord> {
    let mut merged: Vec<SpanRecord> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if last.end == span.start && last.maybe == span.maybe => {
                last.end = span.end;
            }
            _ => merged.push(span),
        }
    }
    merged
}

fn check_start_before_end(
    ranges: impl IntoIterator<Item = (DateTime<FixedOffset>, DateTime<FixedOffset>)>,
) -> Result<(), ValidationError> {
    for (start, end) in ranges {
        if start >= end {
            return Err(ValidationError::StartNotBeforeEnd { start, end });
        }
    }
    Ok(())
}

fn check_nonoverlapping(spans: &[SpanRecord]) -> Result<(), ValidationError> {
    for pair in spans.windows(2) {
        if pair[0].end > pair[1].start {
            return Err(ValidationError::OverlappingSpans {
                first_end: pair[0].end,
                second_start: pair[1].start,
            });
        }
    }
    Ok(())
}

fn check_within_windows(windows: &[TimeWindow], spans: &[SpanRecord]) -> Result<(), ValidationError> {
    if windows.is_empty() {
        return Ok(());
    }
    match spans
        .iter()
        .find(|s| !windows.iter().any(|w| w.contains(s.start, s.end)))
    {
        Some(s) => Err(ValidationError::OutsideRequested {
            start: s.start,
            end: s.end,
        }),
        None => Ok(()),
    }
}

fn check_min_length(min_minutes: f64, spans: &[SpanRecord]) -> Result<(), ValidationError> {
    for s in spans {
        let minutes = (s.end - s.start).num_seconds() as f64 / 60.0;
        if minutes < min_minutes {
            return Err(ValidationError::TooShort {
                start: s.start,
                min_minutes,
            });
        }
    }
    Ok(())
}

/// Normalize a payload and check it against the rules.
///
/// # Errors
/// Returns the first rule violation found, in the order listed in the module
/// documentation.
pub fn normalize(
    payload: SubmissionPayload,
    windows: &[TimeWindow],
    rules: &SubmissionRules,
) -> Result<NormalizedSubmission, ValidationError> {
    let SubmissionPayload { slots, mut spans } = payload;

    spans.sort_by_key(|s| s.start);
    if rules.merge_adjacent_spans {
        spans = merge_adjacent_spans(spans);
    }

    check_start_before_end(spans.iter().map(|s| (s.start, s.end)))?;
    check_start_before_end(slots.iter().map(|s| (s.start, s.end)))?;
    if rules.reject_overlapping_spans {
        check_nonoverlapping(&spans)?;
    }
    if rules.require_all_slots_answered {
        if let Some(slot) = first_unanswered(&slots) {
            return Err(ValidationError::UnansweredSlot {
                source_id: slot.source_id.clone(),
                start: slot.start,
            });
        }
    }
    check_within_windows(windows, &spans)?;
    if let Some(min) = rules.min_span_minutes {
        check_min_length(min, &spans)?;
    }

    let payload = SubmissionPayload { slots, spans };
    let summary = ResponseSummary::of(&payload);
    tracing::debug!(
        slots = payload.slots.len(),
        spans = payload.spans.len(),
        span_duration = summary.span_duration,
        "normalized submission"
    );
    Ok(NormalizedSubmission { payload, summary })
}
