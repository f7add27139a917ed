//! In-process HTTP stand-in for the mapping service.
//!
//! [`StubServer`] listens on a loopback port and answers each request with
//! the first unused canned response whose path prefix matches. Every request
//! is recorded so tests can assert on what was (or was not) sent.

use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    sync::{Arc, Mutex},
    thread,
};

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

#[derive(Clone, Debug)]
struct CannedResponse {
    path_prefix: String,
    status: u16,
    body: String,
}

#[derive(Default)]
struct State {
    responses: Vec<Option<CannedResponse>>,
    requests: Vec<RecordedRequest>,
}

pub struct StubServer {
    url: String,
    state: Arc<Mutex<State>>,
}

impl StubServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let state = Arc::new(Mutex::new(State::default()));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle(stream, &shared);
            }
        });

        Self { url, state }
    }

    /// Queue a response for the next request whose path starts with
    /// `path_prefix`.
    pub fn respond(&self, path_prefix: &str, status: u16, body: impl Into<String>) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push(Some(CannedResponse {
                path_prefix: path_prefix.to_string(),
                status,
                body: body.into(),
            }));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn handle(stream: TcpStream, state: &Mutex<State>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let canned = {
        let mut state = state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method,
            target: target.clone(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
        state
            .responses
            .iter_mut()
            .find(|slot| matches!(slot, Some(r) if target.starts_with(&r.path_prefix)))
            .and_then(Option::take)
    };

    let (status, body) = match canned {
        Some(response) => (response.status, response.body),
        None => (500, r#"{"error":"no canned response"}"#.to_string()),
    };

    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

pub fn geocode_body(lat: f64, lng: f64) -> String {
    serde_json::json!({
        "results": [
            {
                "formatted_address": "Dublin, Ireland",
                "geometry": { "location": { "lat": lat, "lng": lng } }
            }
        ],
        "status": "OK"
    })
    .to_string()
}

pub fn route_body(duration: &str) -> String {
    serde_json::json!({ "routes": [ { "duration": duration } ] }).to_string()
}
