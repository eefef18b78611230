use std::path::{Path, PathBuf};

use availability_core::payload::timestamp;
use availability_core::{
    CalendarInit, Change, CoreError, EventId, InteractionController, MemoryCalendar, Modifiers,
    Navigation, SubmissionPayload,
};
use chrono::{DateTime, FixedOffset};
use clap::Args;
use serde::{Deserialize, Serialize};

use super::{load_config, read_json};

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON file with the calendar initialization data
    #[arg(long)]
    pub init: PathBuf,
    /// JSON file with the list of gestures to apply
    #[arg(long)]
    pub gestures: PathBuf,
}

/// One respondent gesture. Events are addressed by the id the calendar
/// assigned them, starting at 1 in load order.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Gesture {
    Click {
        event: u64,
    },
    ShiftClick {
        event: u64,
    },
    Select {
        #[serde(with = "timestamp")]
        start: DateTime<FixedOffset>,
        #[serde(with = "timestamp")]
        end: DateTime<FixedOffset>,
    },
    Move {
        event: u64,
        #[serde(with = "timestamp")]
        start: DateTime<FixedOffset>,
        #[serde(with = "timestamp")]
        end: DateTime<FixedOffset>,
    },
    Navigate {
        navigation: Navigation,
    },
    Submit,
}

#[derive(Serialize)]
struct ReplayOutput {
    changes: Vec<Change>,
    /// Messages shown to the respondent when a submit was refused.
    refused: Vec<String>,
    submitted: bool,
    outbound: Option<serde_json::Value>,
    snapshot: SubmissionPayload,
}

pub fn run(args: ReplayArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let content = std::fs::read_to_string(&args.init)
        .map_err(|e| format!("cannot read {}: {e}", args.init.display()))?;
    let init = CalendarInit::from_json(&content)?;
    let gestures: Vec<Gesture> = read_json(&args.gestures)?;

    let mut ctl = InteractionController::initialize(MemoryCalendar::default(), &init, &config.capabilities())?;
    let mut changes = Vec::new();
    let mut refused = Vec::new();

    for gesture in gestures {
        tracing::debug!(?gesture, "replaying gesture");
        let change = match gesture {
            Gesture::Click { event } => ctl.on_click(EventId(event), Modifiers::NONE),
            Gesture::ShiftClick { event } => ctl.on_click(EventId(event), Modifiers::SHIFT),
            Gesture::Select { start, end } => ctl.on_select(start, end),
            Gesture::Move { event, start, end } => {
                ctl.host_mut()
                    .move_event(EventId(event), start, end)
                    .map_err(|e| format!("cannot move event {event}: {e}"))?;
                None
            }
            Gesture::Navigate { navigation } => Some(ctl.navigate(navigation)),
            Gesture::Submit => match ctl.submit() {
                Ok(change) => change,
                Err(CoreError::Validation(e)) => {
                    refused.push(e.to_string());
                    None
                }
                Err(e) => return Err(e.into()),
            },
        };
        changes.extend(change);
    }

    let outbound: Option<serde_json::Value> = ctl.outbound().map(serde_json::from_str).transpose()?;
    let output = ReplayOutput {
        changes,
        refused,
        submitted: !ctl.submit_enabled(),
        outbound,
        snapshot: ctl.snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
