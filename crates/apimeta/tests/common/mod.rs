#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use apimeta::cache::{ManualClock, MemoryCache, ResponseHeaders, http_date};
use apimeta::{Registry, RegistryConfig, Response, Transport, TransportError};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use url::Url;

pub const META_URL: &str = "https://esi.evetech.net/swagger.json";

/// One recorded exchange.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Call {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type Scripted = Result<Response, String>;

/// Transport replaying queued responses and recording every call.
#[derive(Default)]
pub struct ScriptedTransport {
    heads: Mutex<VecDeque<Scripted>>,
    gets: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_head(&self, response: Scripted) {
        self.heads.lock().unwrap().push_back(response);
    }

    pub fn push_get(&self, response: Scripted) {
        self.gets.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, method: &'static str, url: &Url, headers: &[(&str, &str)]) {
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }

    fn next(queue: &Mutex<VecDeque<Scripted>>, method: &str, url: &Url) -> Result<Response, TransportError> {
        match queue.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Connection(message)),
            None => panic!("unexpected {method} {url}"),
        }
    }
}

impl Transport for ScriptedTransport {
    fn head(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Response, TransportError> {
        self.record("HEAD", url, headers);
        Self::next(&self.heads, "HEAD", url)
    }

    fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Response, TransportError> {
        self.record("GET", url, headers);
        Self::next(&self.gets, "GET", url)
    }
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
}

pub fn headers(pairs: &[(&str, String)]) -> ResponseHeaders {
    pairs.iter().cloned().collect()
}

pub fn ok(body: &Value, headers: ResponseHeaders) -> Response {
    Response {
        status: 200,
        headers,
        body: serde_json::to_vec(body).unwrap(),
    }
}

pub fn status(status: u16, headers: ResponseHeaders) -> Response {
    Response {
        status,
        headers,
        body: Vec::new(),
    }
}

pub fn not_modified(headers: ResponseHeaders) -> Response {
    status(304, headers)
}

pub fn expires_in(clock: &ManualClock, secs: i64) -> String {
    use apimeta::cache::Clock;
    http_date(clock.now() + chrono::TimeDelta::seconds(secs))
}

/// Root description: one plain operation and two references.
pub fn meta_spec() -> Value {
    json!({
        "swagger": "2.0",
        "info": { "title": "ESI meta", "version": "1" },
        "host": "esi.evetech.net",
        "paths": {
            "/ping": { "get": { "operationId": "get_ping" } },
            "//esi.evetech.net/latest/swagger.json": { "get": { "operationId": "get_latest_swagger" } },
            "//esi.evetech.net/v1/swagger.json": { "get": { "operationId": "get_v1_swagger" } }
        }
    })
}

pub fn latest_spec() -> Value {
    json!({
        "swagger": "2.0",
        "host": "esi.evetech.net",
        "basePath": "/latest",
        "paths": {
            "/status/": { "get": { "operationId": "get_status" } },
            "/characters/{character_id}/": {
                "get": {
                    "operationId": "get_characters_character_id",
                    "parameters": [ { "name": "character_id", "in": "path", "required": true } ]
                }
            }
        }
    })
}

pub struct Harness {
    pub registry: Registry,
    pub transport: Arc<ScriptedTransport>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(cache_time: Option<i64>) -> Harness {
    let clock = Arc::new(ManualClock::new(start()));
    let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
    let transport = ScriptedTransport::new();
    let config = RegistryConfig {
        meta_url: META_URL.to_string(),
        cache_time,
        ..Default::default()
    };
    let registry = Registry::builder(config)
        .cache(cache.clone())
        .transport(transport.clone())
        .clock(clock.clone())
        .build()
        .unwrap();
    Harness {
        registry,
        transport,
        cache,
        clock,
    }
}
