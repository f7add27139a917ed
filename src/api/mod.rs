use std::time::Duration;

use reqwest::{blocking::Response, StatusCode};
use thiserror::Error;

use crate::credential::Credential;

pub mod coords;
pub mod directions;

pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com";
pub const DEFAULT_ROUTES_URL: &str = "https://routes.googleapis.com";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API Error: {}, {}", .status.as_u16(), .body)]
    Status { status: StatusCode, body: String },

    #[error("No geocoding results for {address} (status {status}{})", message_suffix(.error_message))]
    NoResults {
        address: String,
        status: String,
        error_message: Option<String>,
    },

    #[error("No route found.")]
    NoRoute,

    #[error("Unexpected route duration {0:?}")]
    MalformedDuration(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

/// Blocking client for the geocoding and routing endpoints, sharing one
/// connection pool and one API key.
pub struct MapsClient {
    http: reqwest::blocking::Client,
    key: Credential,
    geocode_url: String,
    routes_url: String,
}

impl MapsClient {
    pub fn new(
        key: Credential,
        geocode_url: &str,
        routes_url: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            key,
            geocode_url: geocode_url.trim_end_matches('/').to_string(),
            routes_url: routes_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Reads the body of a successful response, or turns any other status into
/// [`ApiError::Status`] carrying the body text.
fn success_body(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        return Err(ApiError::Status { status, body });
    }

    Ok(body)
}
