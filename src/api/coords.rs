use serde::{Deserialize, Serialize};

use super::{success_body, ApiError, MapsClient};
use crate::route::Address;

#[derive(Clone, Copy, Deserialize, Debug, Serialize, PartialEq)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Deserialize, Debug)]
struct Geometry {
    location: Coords,
}

#[derive(Clone, Deserialize, Debug)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Clone, Deserialize, Debug)]
struct Response {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

impl MapsClient {
    /// Resolves an address or postal code to the coordinates of the first
    /// geocoding result.
    pub fn get_coords(&self, addr: &Address) -> Result<Coords, ApiError> {
        log::info!("Getting coordinates for {}", addr);

        let url = format!(
            "{}/maps/api/geocode/json?address={}&key={}",
            self.geocode_url,
            urlencoding::encode(addr),
            urlencoding::encode(self.key.expose())
        );
        let response = self.http.get(url).send()?;
        let body = success_body(response)?;

        let coords = first_location(&body, addr)?;
        log::debug!("{} resolved to ({}, {})", addr, coords.lat, coords.lng);

        Ok(coords)
    }
}

fn first_location(body: &str, addr: &Address) -> Result<Coords, ApiError> {
    let json: Response = serde_json::from_str(body)?;
    let first_result = json.results.first().ok_or_else(|| ApiError::NoResults {
        address: addr.clone(),
        status: json.status.clone(),
        error_message: json.error_message.clone(),
    })?;

    Ok(first_result.geometry.location)
}
