use std::path::{Path, PathBuf};

use availability_core::style::style;
use availability_core::{
    view, CalendarEvent, CalendarInit, EventId, HostCalendar, InteractionController, MemoryCalendar,
    RequestTimespan, Style, SubmissionPayload, ViewOptions,
};
use clap::Args;
use serde::Serialize;

use super::{load_config, read_json};

#[derive(Args)]
pub struct InitArgs {
    /// JSON file with the request timespans
    #[arg(long)]
    pub request: PathBuf,
    /// JSON file with a previously submitted payload to restore
    #[arg(long)]
    pub previous: Option<PathBuf>,
}

#[derive(Serialize)]
struct StyledEvent<'a> {
    id: EventId,
    #[serde(flatten)]
    event: &'a CalendarEvent,
    style: Style,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitOutput<'a> {
    init: &'a CalendarInit,
    selectable: bool,
    events: Vec<StyledEvent<'a>>,
}

pub fn run(args: InitArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let timespans: Vec<RequestTimespan> = read_json(&args.request)?;
    let previous: Option<SubmissionPayload> = args.previous.as_deref().map(read_json).transpose()?;

    let timezones = config.timezones();
    let default_timezone = Some(config.timezones.default.clone()).filter(|tz| timezones.contains(tz));
    let options = ViewOptions {
        allow_maybe: config.capabilities.allow_maybe,
        timezones,
        default_timezone,
    };
    let init = view::build_init(&timespans, previous.as_ref(), &options);
    let ctl = InteractionController::initialize(MemoryCalendar::default(), &init, &config.capabilities())?;

    let host = ctl.host();
    let events = host
        .events()
        .into_iter()
        .map(|(id, event)| StyledEvent {
            id,
            event,
            style: host.style_of(id).unwrap_or_else(|| style(event)),
        })
        .collect();

    let output = InitOutput {
        init: &init,
        selectable: ctl.selectable(),
        events,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
