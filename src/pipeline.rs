use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    api::{ApiError, MapsClient},
    credential::{load_credential, CredentialError, CredentialSource},
    report::Reporter,
    route::{Address, RouteQuery, RouteResult, TravelMode, Waypoint},
};

/// What to do when an address cannot be geocoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GeocodeFailurePolicy {
    /// Abort the process with a non-zero exit code.
    #[default]
    Exit,
    /// Report the failure and end the run without routing or logging.
    Skip,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub credential: CredentialSource,
    pub geocode_url: String,
    pub routes_url: String,
    pub timeout: Duration,
    pub on_geocode_failure: GeocodeFailurePolicy,
    /// Send raw addresses to the routing service instead of geocoding them.
    pub send_addresses: bool,
    /// Departure offset for traffic-aware driving routes, if enabled.
    pub traffic_offset: Option<Duration>,
    pub reporter: Reporter,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trip {
    pub origin: Address,
    pub destination: Address,
    pub mode: TravelMode,
}

#[derive(Debug)]
pub enum Outcome {
    Travel(RouteResult),
    RouteFailed(ApiError),
    GeocodeSkipped { address: Address, source: ApiError },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] ApiError),

    #[error("Could not geocode {address}: {source}")]
    Geocode {
        address: Address,
        #[source]
        source: ApiError,
    },

    #[error("Invalid departure offset: {0:?}")]
    DepartureOffset(Duration),
}

/// Loads the API key and builds the client. Nothing touches the network
/// before the key has been read.
pub fn start(config: &Config) -> Result<MapsClient, PipelineError> {
    let key = load_credential(&config.credential)?;
    log::info!("API key loaded from {}: {}", config.credential, key);

    MapsClient::new(key, &config.geocode_url, &config.routes_url, config.timeout)
        .map_err(PipelineError::Client)
}

pub fn fetch(client: &MapsClient, config: &Config, trip: &Trip) -> Result<Outcome, PipelineError> {
    let departure = match config.traffic_offset {
        Some(offset) => Some(departure_after(offset)?),
        None => None,
    };

    let waypoints = if config.send_addresses {
        (
            Waypoint::Address(trip.origin.clone()),
            Waypoint::Address(trip.destination.clone()),
        )
    } else {
        let origin = match resolve(client, config, &trip.origin)? {
            Ok(waypoint) => waypoint,
            Err(skip) => return Ok(skip),
        };
        let destination = match resolve(client, config, &trip.destination)? {
            Ok(waypoint) => waypoint,
            Err(skip) => return Ok(skip),
        };
        (origin, destination)
    };

    let mut query = RouteQuery::new(waypoints.0, waypoints.1, trip.mode);
    if let Some(departure) = departure {
        query = query.with_traffic(departure);
    }

    match client.get_route(&query) {
        Ok(result) => {
            log::info!("Route takes {}s", result.seconds);
            Ok(Outcome::Travel(result))
        }
        Err(err) => {
            log::warn!("Route request failed: {}", err);
            Ok(Outcome::RouteFailed(err))
        }
    }
}

fn departure_after(offset: Duration) -> Result<DateTime<Utc>, PipelineError> {
    chrono::Duration::from_std(offset)
        .ok()
        .and_then(|offset| Utc::now().checked_add_signed(offset))
        .ok_or(PipelineError::DepartureOffset(offset))
}

/// Geocodes `address`, applying the configured failure policy. The inner
/// `Err` carries the outcome to return when the run should be skipped.
fn resolve(
    client: &MapsClient,
    config: &Config,
    address: &Address,
) -> Result<Result<Waypoint, Outcome>, PipelineError> {
    match client.get_coords(address) {
        Ok(coords) => Ok(Ok(Waypoint::Coords(coords))),
        Err(source) => match config.on_geocode_failure {
            GeocodeFailurePolicy::Exit => Err(PipelineError::Geocode {
                address: address.clone(),
                source,
            }),
            GeocodeFailurePolicy::Skip => Ok(Err(Outcome::GeocodeSkipped {
                address: address.clone(),
                source,
            })),
        },
    }
}

impl Config {
    /// Log file path, when results are appended to a CSV log.
    pub fn log_file(&self) -> Option<&PathBuf> {
        match &self.reporter {
            Reporter::Csv(path) => Some(path),
            Reporter::Stdout => None,
        }
    }
}
