use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::api::coords::Coords;

pub type Address = String;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    #[default]
    Drive,
    Walk,
    Bicycle,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Drive => "DRIVE",
            TravelMode::Walk => "WALK",
            TravelMode::Bicycle => "BICYCLE",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown travel mode {0:?} (expected DRIVE, WALK or BICYCLE)")]
pub struct ParseTravelModeError(String);

impl FromStr for TravelMode {
    type Err = ParseTravelModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drive" | "driving" => Ok(TravelMode::Drive),
            "walk" | "walking" => Ok(TravelMode::Walk),
            "bicycle" | "bicycling" | "cycling" => Ok(TravelMode::Bicycle),
            _ => Err(ParseTravelModeError(s.to_string())),
        }
    }
}

/// One end of a route: either already geocoded or left for the routing
/// service to resolve.
#[derive(Clone, Debug, PartialEq)]
pub enum Waypoint {
    Coords(Coords),
    Address(Address),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteQuery {
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub mode: TravelMode,
    pub traffic_aware: bool,
    pub departure_time: Option<DateTime<Utc>>,
}

impl RouteQuery {
    pub fn new(origin: Waypoint, destination: Waypoint, mode: TravelMode) -> Self {
        Self {
            origin,
            destination,
            mode,
            traffic_aware: false,
            departure_time: None,
        }
    }

    /// Ask for traffic-aware routing departing at `departure_time`. The
    /// routing service only accepts this for `DRIVE`, so other modes are
    /// left untouched.
    pub fn with_traffic(mut self, departure_time: DateTime<Utc>) -> Self {
        if self.mode == TravelMode::Drive {
            self.traffic_aware = true;
            self.departure_time = Some(departure_time);
        }
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteResult {
    pub seconds: u64,
}

impl RouteResult {
    /// Whole minutes, rounded to nearest with ties going to the even minute.
    pub fn minutes(&self) -> u64 {
        let whole = self.seconds / 60;
        let rest = self.seconds % 60;
        if rest > 30 || (rest == 30 && whole % 2 == 1) {
            whole + 1
        } else {
            whole
        }
    }
}

/// Parses a duration such as `"1601s"` into whole seconds.
pub fn parse_duration(raw: &str) -> Option<u64> {
    let digits = raw.strip_suffix('s')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
