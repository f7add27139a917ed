use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{coords::Coords, success_body, ApiError, MapsClient};
use crate::route::{parse_duration, RouteQuery, RouteResult, TravelMode, Waypoint};

const FIELD_MASK: &str = "routes.duration";

#[derive(Serialize, Debug)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Location {
    lat_lng: LatLng,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum WireWaypoint<'a> {
    Location { location: Location },
    Address { address: &'a str },
}

impl<'a> From<&'a Waypoint> for WireWaypoint<'a> {
    fn from(waypoint: &'a Waypoint) -> Self {
        match waypoint {
            Waypoint::Coords(Coords { lat, lng }) => WireWaypoint::Location {
                location: Location {
                    lat_lng: LatLng {
                        latitude: *lat,
                        longitude: *lng,
                    },
                },
            },
            Waypoint::Address(address) => WireWaypoint::Address {
                address: address.as_str(),
            },
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ComputeRoutesRequest<'a> {
    origin: WireWaypoint<'a>,
    destination: WireWaypoint<'a>,
    travel_mode: TravelMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    routing_preference: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    departure_time: Option<String>,
}

impl<'a> From<&'a RouteQuery> for ComputeRoutesRequest<'a> {
    fn from(query: &'a RouteQuery) -> Self {
        Self {
            origin: (&query.origin).into(),
            destination: (&query.destination).into(),
            travel_mode: query.mode,
            routing_preference: query.traffic_aware.then_some("TRAFFIC_AWARE"),
            departure_time: query.departure_time.as_ref().map(rfc3339),
        }
    }
}

fn rfc3339(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Deserialize, Debug)]
struct Route {
    duration: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Response {
    #[serde(default)]
    routes: Vec<Route>,
}

impl MapsClient {
    pub fn get_route(&self, query: &RouteQuery) -> Result<RouteResult, ApiError> {
        log::info!("Getting {} route", query.mode);

        let request = ComputeRoutesRequest::from(query);
        log::debug!("computeRoutes request: {:?}", request);

        let response = self
            .http
            .post(format!("{}/directions/v2:computeRoutes", self.routes_url))
            .header("X-Goog-Api-Key", self.key.expose())
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&request)
            .send()?;
        let body = success_body(response)?;

        first_route(&body)
    }
}

fn first_route(body: &str) -> Result<RouteResult, ApiError> {
    let json: Response = serde_json::from_str(body)?;
    let route = json.routes.first().ok_or(ApiError::NoRoute)?;
    let raw = route.duration.as_deref().unwrap_or_default();
    let seconds = parse_duration(raw).ok_or_else(|| ApiError::MalformedDuration(raw.to_string()))?;

    Ok(RouteResult { seconds })
}
