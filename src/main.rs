use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

mod app;
mod cli;
mod dataset;
mod error;
mod extract;
mod settings;
mod timeanddate;
mod units;
mod weather;

use crate::app::{Job, Scrape};
use crate::cli::Args;
use crate::error::Error;
use crate::settings::Settings;
use crate::timeanddate::{HistoryRequest, HttpSource};

fn run(args: Args) -> Result<(), Error> {
    let settings = match &args.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    let mut request = HistoryRequest::new(&args.country, &args.city, args.month, args.year);
    request.day = args.day;

    let output = args
        .output
        .unwrap_or_else(|| dataset::default_path(&args.output_dir, &args.country, &args.city));
    let job = Job {
        request,
        all_days: args.all_days,
        output,
    };

    let source = HttpSource::new(&settings)?;
    match Scrape::new(&source, &settings).run(&job)? {
        Some(rows) => info!("saved {rows} rows to {}", job.output.display()),
        None => info!("no data saved"),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Args::parse()) {
        error!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
