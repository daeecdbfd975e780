//! Platform setup: one shared cache per appliance, one sensor per condition.

use std::collections::HashSet;
use std::sync::Arc;

use crate::client::RefreshCache;
use crate::config::AcuparseConfig;
use crate::error::SetupError;
use crate::sensor::{Sensor, SensorState};

/// Sensors for one configured appliance, all backed by the same cache.
#[derive(Debug)]
pub struct AcuparsePlatform {
    pub cache: Arc<RefreshCache>,
    pub sensors: Vec<Sensor>,
}

impl AcuparsePlatform {
    /// Update every sensor concurrently; the cache coalesces them into one fetch.
    pub async fn update_all(&mut self) {
        futures::future::join_all(self.sensors.iter_mut().map(|sensor| sensor.update())).await;
    }

    pub fn snapshots(&self) -> Vec<SensorState> {
        self.sensors.iter().map(Sensor::snapshot).collect()
    }
}

/// Build the sensors for `config` and perform the initial fetch.
///
/// Returns [`SetupError::NotReady`] when the appliance produced no document,
/// so the host can retry later.
pub async fn setup_platform(config: &AcuparseConfig) -> Result<AcuparsePlatform, SetupError> {
    config.validate()?;

    let cache = Arc::new(RefreshCache::new(
        &config.hostname,
        config.refresh_interval(),
    )?);

    let mut seen = HashSet::new();
    let mut sensors = Vec::new();
    for condition in &config.monitored_conditions {
        if !seen.insert(condition.as_str()) {
            log::warn!("Ignoring duplicate monitored condition: {}", condition);
            continue;
        }
        sensors.push(Sensor::new(cache.clone(), condition)?);
    }

    cache.refresh().await;
    if cache.document().is_none() {
        return Err(SetupError::NotReady(config.hostname.clone()));
    }

    log::info!(
        "Acuparse platform ready for {} with {} sensors",
        config.hostname,
        sensors.len()
    );
    Ok(AcuparsePlatform { cache, sensors })
}
