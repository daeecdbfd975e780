//! Fake Acuparse appliance for integration tests

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake appliance answers on `/data`.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Raw(String),
    Status(u16),
}

#[derive(Clone)]
struct ApplianceState {
    hits: Arc<AtomicUsize>,
    reply: Arc<Mutex<Reply>>,
    delay: Duration,
}

/// Handle to a running fake appliance.
pub struct FakeAppliance {
    pub hostname: String,
    hits: Arc<AtomicUsize>,
    reply: Arc<Mutex<Reply>>,
    server: tokio::task::JoinHandle<()>,
}

impl FakeAppliance {
    /// Start an appliance answering immediately with `reply`.
    pub async fn start(reply: Reply) -> Self {
        Self::start_with_delay(reply, Duration::ZERO).await
    }

    /// Start an appliance that waits `delay` before answering each request.
    pub async fn start_with_delay(reply: Reply, delay: Duration) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let reply = Arc::new(Mutex::new(reply));
        let state = ApplianceState {
            hits: hits.clone(),
            reply: reply.clone(),
            delay,
        };

        let router = Router::new().route("/data", get(data)).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake appliance");
        let addr = listener.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            hostname: addr.to_string(),
            hits,
            reply,
            server,
        }
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }
}

impl Drop for FakeAppliance {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn data(State(state): State<ApplianceState>) -> axum::response::Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let reply = state.reply.lock().unwrap().clone();
    match reply {
        // The real appliance labels its JSON as text/html.
        Reply::Json(value) => (
            [(header::CONTENT_TYPE, "text/html; charset=UTF-8")],
            value.to_string(),
        )
            .into_response(),
        Reply::Raw(body) => ([(header::CONTENT_TYPE, "text/html")], body).into_response(),
        Reply::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
    }
}

/// A representative appliance document.
pub fn station_document() -> Value {
    json!({
        "current": {
            "tempF": 68.4,
            "tempC": 20.2,
            "tempF_trend": "rising",
            "feelsF": 67.9,
            "feelsC": 19.9,
            "dewptF": 50.1,
            "relH": 52,
            "pressure_inHg": 30.02,
            "pressure_kPa": 101.66,
            "windSmph": 4,
            "windDIR": "NW",
            "windDEG": 315,
            "rainTotalIN_today": 0.12,
            "high_temp_recorded": "14:32",
            "low_temp_recorded": "5:07",
            "timestamp": "2024-06-01 15:00:00"
        },
        "yesterday": {
            "tempF_high": 75.2,
            "tempF_low": 51.0,
            "tempF_high_recorded": "3:15 PM",
            "timestamp": "2024-05-31"
        },
        "this_week": {"tempF_high": 79.0, "timestamp": "2024-06-01"},
        "this_month": {"tempF_high": 79.0, "timestamp": "2024-06-01"},
        "last_month": {"tempF_high": 84.3, "timestamp": "2024-05-31"},
        "this_year": {"tempF_high": 91.7, "timestamp": "2024-06-01"},
        "all_time": {
            "tempF_high": 101.2,
            "rainfall_IN_total_since": "2016-03-01",
            "timestamp": "2024-06-01"
        },
        "moon": {
            "age": 24.3,
            "stage": "Waning Crescent",
            "illumination": 31,
            "icon_url": "http://acuparse.local/local/moon/24.gif",
            "timestamp": "2024-06-01 15:00:00"
        }
    })
}
