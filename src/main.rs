use std::io;

use clap::Parser;
use cli::{prompt_trip, Cli};
use color_eyre::eyre::Result;
use dotenv::dotenv;
use env_logger::{Builder, Env};

mod api;
mod cli;
mod credential;
mod pipeline;
mod report;
mod route;
#[cfg(test)]
mod test_support;

fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}

fn main() -> Result<()> {
    dotenv().ok();
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();
    let config = cli.config();

    let client = pipeline::start(&config)?;

    let trip = if cli.interactive {
        prompt_trip(&mut io::stdin().lock(), &mut io::stdout())?
    } else {
        let trip = cli.trip();
        log::info!(
            "Using configured trip: {} -> {} ({})",
            trip.origin,
            trip.destination,
            trip.mode
        );
        trip
    };

    if let Some(path) = config.log_file() {
        log::info!("Appending result to {}", path.display());
    }

    let outcome = pipeline::fetch(&client, &config, &trip)?;
    config.reporter.report(&trip, &outcome)?;

    Ok(())
}
