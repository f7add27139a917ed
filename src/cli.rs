use std::{
    io::{BufRead, Write},
    path::PathBuf,
    time::Duration,
};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use eyre::bail;

use crate::{
    api::{DEFAULT_GEOCODE_URL, DEFAULT_ROUTES_URL},
    credential::CredentialSource,
    pipeline::{Config, GeocodeFailurePolicy, Trip},
    report::Reporter,
    route::{Address, TravelMode},
};

/// Look up how long a trip takes right now, and print or log it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File whose first line is the API key
    #[arg(long, env = "COMMUTE_KEY_FILE", default_value = "api_key.txt", conflicts_with = "key_env")]
    pub key_file: PathBuf,

    /// Read the API key from this environment variable instead of a file
    #[arg(long, env = "COMMUTE_KEY_ENV")]
    pub key_env: Option<String>,

    /// Starting address or postal code
    #[arg(long, env = "COMMUTE_ORIGIN", default_value = "D06EV22")]
    pub origin: Address,

    /// Destination address or postal code
    #[arg(long, env = "COMMUTE_DESTINATION", default_value = "D11VNW2")]
    pub destination: Address,

    /// Travel mode: DRIVE, WALK or BICYCLE
    #[arg(long, env = "COMMUTE_MODE", default_value = "DRIVE")]
    pub mode: TravelMode,

    /// Prompt for origin, destination and mode on stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Append a timestamped row to this CSV file instead of printing
    #[arg(long, env = "COMMUTE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// What to do when an address cannot be geocoded
    #[arg(long, env = "COMMUTE_ON_GEOCODE_FAILURE", value_enum, default_value_t = GeocodeFailurePolicy::Exit)]
    pub on_geocode_failure: GeocodeFailurePolicy,

    /// Send addresses to the routing service as-is instead of geocoding them first
    #[arg(long)]
    pub send_addresses: bool,

    /// Ask for traffic-aware routing (driving only)
    #[arg(long, env = "COMMUTE_TRAFFIC_AWARE")]
    pub traffic_aware: bool,

    /// How far in the future the traffic-aware departure time is set
    #[arg(long, default_value_t = 60)]
    pub departure_offset_secs: u64,

    #[arg(long, env = "COMMUTE_GEOCODE_URL", default_value = DEFAULT_GEOCODE_URL, hide = true)]
    pub geocode_url: String,

    #[arg(long, env = "COMMUTE_ROUTES_URL", default_value = DEFAULT_ROUTES_URL, hide = true)]
    pub routes_url: String,

    /// HTTP request timeout
    #[arg(long, env = "COMMUTE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Cli {
    pub fn config(&self) -> Config {
        let credential = match &self.key_env {
            Some(name) => CredentialSource::Env(name.clone()),
            None => CredentialSource::File(self.key_file.clone()),
        };
        let reporter = match &self.log_file {
            Some(path) => Reporter::Csv(path.clone()),
            None => Reporter::Stdout,
        };

        Config {
            credential,
            geocode_url: self.geocode_url.clone(),
            routes_url: self.routes_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            on_geocode_failure: self.on_geocode_failure,
            send_addresses: self.send_addresses,
            traffic_offset: self
                .traffic_aware
                .then(|| Duration::from_secs(self.departure_offset_secs)),
            reporter,
        }
    }

    /// The trip given on the command line.
    pub fn trip(&self) -> Trip {
        Trip {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            mode: self.mode,
        }
    }
}

/// Asks for origin, destination and travel mode. A blank mode means DRIVE;
/// an unrecognised one is asked for again.
pub fn prompt_trip<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Trip> {
    let origin = ask(input, output, "Enter starting location (address or Eircode): ")?;
    let destination = ask(input, output, "Enter destination (address or Eircode): ")?;

    let mode = loop {
        let answer = ask(
            input,
            output,
            "Enter travel mode (DRIVE, WALK, BICYCLE) [DRIVE]: ",
        )?;
        if answer.is_empty() {
            break TravelMode::default();
        }
        match answer.parse() {
            Ok(mode) => break mode,
            Err(err) => writeln!(output, "{}", err)?,
        }
    };

    Ok(Trip {
        origin,
        destination,
        mode,
    })
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .wrap_err("Failed to read from stdin")?;
    if read == 0 {
        bail!("stdin closed before \"{}\" was answered", question.trim());
    }

    Ok(line.trim().to_string())
}
