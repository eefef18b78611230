use std::path::{Path, PathBuf};

use availability_core::validation;
use availability_core::{RequestTimespan, SubmissionPayload, TimeWindow};
use clap::Args;

use super::{load_config, read_json};

#[derive(Args)]
pub struct CheckArgs {
    /// JSON file with the submitted payload
    #[arg(long)]
    pub payload: PathBuf,
    /// JSON file with the request timespans; spans must fall in its partial ones
    #[arg(long)]
    pub request: Option<PathBuf>,
}

pub fn run(args: CheckArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let payload: SubmissionPayload = read_json(&args.payload)?;

    let windows: Vec<TimeWindow> = match args.request.as_deref() {
        Some(path) => read_json::<Vec<RequestTimespan>>(path)?
            .into_iter()
            .filter(|t| t.allow_partial)
            .map(|t| TimeWindow {
                start: t.start,
                end: t.end,
            })
            .collect(),
        None => Vec::new(),
    };

    let accepted = validation::normalize(payload, &windows, &config.submission_rules())?;
    println!("{}", serde_json::to_string_pretty(&accepted)?);
    Ok(())
}
