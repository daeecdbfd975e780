//! Shared, throttled fetch cache for one Acuparse appliance.
//!
//! Many sensors hold the same [`RefreshCache`] and call [`RefreshCache::refresh`]
//! on their own schedule. At most one network fetch happens per refresh
//! interval: callers arriving while a fetch is in flight wait for it and then
//! see its result, and callers arriving inside the interval return at once.

use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::FetchError;
use crate::normalize::normalize;

/// Status endpoint path on the appliance.
const RESOURCE_PATH: &str = "/data?json";

/// Network timeout for a single fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Refresh interval used when the configuration does not set one.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// The most recent successfully fetched and normalized document.
pub type FetchedDocument = Arc<Value>;

/// Throttled, single-flight cache of the latest document from one appliance.
pub struct RefreshCache {
    client: reqwest::Client,
    hostname: String,
    url: String,
    interval: Duration,
    /// Per-request deadline, applied whatever timeout the client carries.
    request_timeout: Duration,
    /// Held for the whole duration of a fetch; doubles as the single-flight guard.
    last_attempt: tokio::sync::Mutex<Option<Instant>>,
    document: RwLock<Option<FetchedDocument>>,
    interests: Mutex<BTreeSet<String>>,
}

impl RefreshCache {
    pub fn new(hostname: &str, interval: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self::with_client(client, hostname, interval))
    }

    /// Build a cache around an existing HTTP client (shared connection pool).
    pub fn with_client(client: reqwest::Client, hostname: &str, interval: Duration) -> Self {
        let url = format!("http://{}{}", hostname, RESOURCE_PATH);
        log::info!("Acuparse refresh rate for {}: {:?}", hostname, interval);
        Self {
            client,
            hostname: hostname.to_string(),
            url,
            interval,
            request_timeout: FETCH_TIMEOUT,
            last_attempt: tokio::sync::Mutex::new(None),
            document: RwLock::new(None),
            interests: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn refresh_interval(&self) -> Duration {
        self.interval
    }

    /// Record that a consumer wants `field` present.
    ///
    /// The whole document is always fetched, so this is bookkeeping only.
    pub fn register_interest(&self, field: &str) {
        self.interests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(field.to_string());
    }

    pub fn interests(&self) -> Vec<String> {
        self.interests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Latest document, or `None` if no fetch has succeeded yet.
    pub fn document(&self) -> Option<FetchedDocument> {
        self.document
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Fetch a fresh document unless one was attempted within the refresh interval.
    ///
    /// Never fails: errors are logged and the previous document is kept. The
    /// throttle window advances after every attempt, successful or not.
    pub async fn refresh(&self) {
        let mut last_attempt = self.last_attempt.lock().await;

        if let Some(at) = *last_attempt {
            if at.elapsed() < self.interval {
                log::debug!("Acuparse refresh for {} throttled", self.hostname);
                return;
            }
        }

        match self.fetch().await {
            Ok(document) => {
                *self.document.write().unwrap_or_else(|e| e.into_inner()) =
                    Some(Arc::new(document));
                log::debug!("Fetched Acuparse data from {}", self.url);
            }
            Err(FetchError::Http(e)) if e.is_timeout() => {
                log::error!("Timeout fetching Acuparse data from {}: {}", self.url, e);
            }
            Err(e @ (FetchError::Json(_) | FetchError::NotAnObject)) => {
                log::error!("Check Acuparse API at {}: {}", self.url, e);
            }
            Err(e) => {
                log::error!("Error fetching Acuparse data from {}: {}", self.url, e);
            }
        }

        // Stamped on completion, so a stalled fetch pushes the next window back.
        *last_attempt = Some(Instant::now());
    }

    async fn fetch(&self) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // The appliance labels its JSON as text/html, so parse the raw body.
        let body = response.bytes().await?;
        let mut document: Value = serde_json::from_slice(&body)?;
        if !document.is_object() {
            return Err(FetchError::NotAnObject);
        }

        normalize(&mut document);
        Ok(document)
    }
}

impl std::fmt::Debug for RefreshCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCache")
            .field("url", &self.url)
            .field("interval", &self.interval)
            .field("has_document", &self.document().is_some())
            .finish()
    }
}
