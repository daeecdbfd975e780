//! Host-facing measurement objects.
//!
//! A [`Sensor`] binds one catalog descriptor to the shared [`RefreshCache`]
//! and recomputes its rendered state from the latest document on every
//! [`Sensor::update`]. Extractor failures degrade only the field they
//! belong to.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{self, MeasurementDescriptor, Source};
use crate::client::RefreshCache;
use crate::error::ConfigError;

pub const ATTR_ATTRIBUTION: &str = "attribution";
pub const ATTRIBUTION: &str = "Data provided by Acuparse";

/// Icon used when a descriptor yields none.
pub const DEFAULT_ICON: &str = "mdi:gauge";

/// Serializable view of a sensor's rendered state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub entity_id: String,
    pub unique_id: String,
    pub name: String,
    pub state: Option<Value>,
    pub unit_of_measurement: String,
    pub icon: Option<String>,
    pub entity_picture: Option<String>,
    pub attributes: BTreeMap<String, Value>,
}

#[derive(Debug)]
pub struct Sensor {
    cache: Arc<RefreshCache>,
    descriptor: &'static MeasurementDescriptor,
    unique_id: String,
    entity_id: String,
    state: Option<Value>,
    attributes: BTreeMap<String, Value>,
    icon: Option<String>,
    entity_picture: Option<String>,
}

impl Sensor {
    /// Create the sensor for `condition` and register its feature with the cache.
    pub fn new(cache: Arc<RefreshCache>, condition: &str) -> Result<Self, ConfigError> {
        let descriptor = catalog::lookup(condition)
            .ok_or_else(|| ConfigError::UnknownCondition(condition.to_string()))?;

        cache.register_interest(descriptor.feature);

        let mut attributes = BTreeMap::new();
        attributes.insert(ATTR_ATTRIBUTION.to_string(), Value::from(ATTRIBUTION));

        Ok(Self {
            unique_id: format!("apwx.{}.{}", cache.hostname(), condition),
            entity_id: format!("sensor.apwx_{}", condition),
            cache,
            descriptor,
            state: None,
            attributes,
            icon: None,
            entity_picture: None,
        })
    }

    pub fn condition(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &'static MeasurementDescriptor {
        self.descriptor
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Suggested entity id; the host registry may rename it.
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.display_name
    }

    pub fn state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    pub fn unit_of_measurement(&self) -> &str {
        self.descriptor.unit
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn entity_picture(&self) -> Option<&str> {
        self.entity_picture.as_deref()
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Refresh the shared cache and recompute this sensor from its document.
    ///
    /// With no document available the previously rendered state is kept.
    pub async fn update(&mut self) {
        self.cache.refresh().await;

        let Some(document) = self.cache.document() else {
            return;
        };

        self.apply(&document);
    }

    /// Recompute value, attributes, icon and picture from `document`.
    pub fn apply(&mut self, document: &Value) {
        let descriptor = self.descriptor;

        self.state = self.expand("value", &descriptor.value, document);
        self.update_attributes(document);

        self.icon = Some(
            self.expand("icon", &descriptor.icon, document)
                .and_then(|icon| icon.as_str().map(str::to_owned))
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
        );

        if let Some(Value::String(url)) = self.expand("entity_picture", &descriptor.picture, document)
        {
            self.entity_picture = Some(upgrade_to_https(&url));
        }
    }

    pub fn snapshot(&self) -> SensorState {
        SensorState {
            entity_id: self.entity_id.clone(),
            unique_id: self.unique_id.clone(),
            name: self.name().to_string(),
            state: self.state.clone(),
            unit_of_measurement: self.unit_of_measurement().to_string(),
            icon: self.icon.clone(),
            entity_picture: self.entity_picture.clone(),
            attributes: self.attributes.clone(),
        }
    }

    fn update_attributes(&mut self, document: &Value) {
        let descriptor = self.descriptor;
        for (name, source) in &descriptor.attributes {
            match self.expand(name, source, document) {
                Some(value) => {
                    self.attributes.insert(name.to_string(), value);
                }
                None => {
                    self.attributes.remove(*name);
                }
            }
        }
    }

    /// Evaluate one descriptor field; failures are logged and yield `None`.
    fn expand(&self, attr: &str, source: &Source, document: &Value) -> Option<Value> {
        match source.evaluate(document) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!(
                    "Failed to expand Acuparse data. Condition: {} Attr: {} Error: {}",
                    self.descriptor.id,
                    attr,
                    e
                );
                None
            }
        }
    }
}

/// Rewrite a leading `http://` (any case) to `https://`.
pub fn upgrade_to_https(url: &str) -> String {
    const SCHEME: &str = "http://";
    match url.get(..SCHEME.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SCHEME) => {
            format!("https://{}", &url[SCHEME.len()..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_REFRESH_INTERVAL;
    use serde_json::json;

    fn cache() -> Arc<RefreshCache> {
        Arc::new(RefreshCache::new("weather.local", DEFAULT_REFRESH_INTERVAL).unwrap())
    }

    fn document() -> Value {
        json!({
            "current": {
                "tempF": 71.3,
                "relH": 48,
                "timestamp": "2024-06-01 14:05:00"
            },
            "yesterday": {
                "tempF_high": 80.1
            },
            "moon": {
                "stage": "Waxing Gibbous",
                "icon_url": "http://weather.local/local/moon/11.gif",
                "timestamp": "2024-06-01 14:05:00"
            }
        })
    }

    #[test]
    fn test_unknown_condition_rejected() {
        let err = Sensor::new(cache(), "sky_color").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCondition(c) if c == "sky_color"));
    }

    #[test]
    fn test_identity_and_metadata() {
        let cache = cache();
        let sensor = Sensor::new(cache.clone(), "y_temp_max").unwrap();
        assert_eq!(sensor.unique_id(), "apwx.weather.local.y_temp_max");
        assert_eq!(sensor.entity_id(), "sensor.apwx_y_temp_max");
        assert_eq!(sensor.name(), "Temp High Yesterday");
        assert_eq!(sensor.unit_of_measurement(), "°F");
        assert_eq!(sensor.state(), None);
        assert_eq!(sensor.attributes()[ATTR_ATTRIBUTION], json!(ATTRIBUTION));
        assert_eq!(cache.interests(), vec!["conditions"]);
    }

    #[test]
    fn test_apply_current_measurement() {
        let mut sensor = Sensor::new(cache(), "temp").unwrap();
        sensor.apply(&document());

        assert_eq!(sensor.state(), Some(&json!(71.3)));
        assert_eq!(sensor.icon(), Some("mdi:thermometer"));
        assert_eq!(sensor.entity_picture(), None);
        assert_eq!(sensor.attributes()["date"], json!("2024-06-01 14:05:00"));
    }

    #[test]
    fn test_missing_attribute_dropped_alone() {
        // yesterday has no timestamp: value still computes, date is absent
        let mut sensor = Sensor::new(cache(), "y_temp_max").unwrap();
        sensor.apply(&document());

        assert_eq!(sensor.state(), Some(&json!(80.1)));
        assert!(!sensor.attributes().contains_key("date"));
        assert_eq!(sensor.attributes()[ATTR_ATTRIBUTION], json!(ATTRIBUTION));
    }

    #[test]
    fn test_missing_section_degrades_value() {
        let mut sensor = Sensor::new(cache(), "tw_temp_max").unwrap();
        sensor.apply(&document());

        assert_eq!(sensor.state(), None);
        assert_eq!(sensor.icon(), Some("mdi:thermometer"));
    }

    #[test]
    fn test_picture_upgraded_and_default_icon() {
        let mut sensor = Sensor::new(cache(), "moon_phase").unwrap();
        sensor.apply(&document());

        assert_eq!(sensor.state(), Some(&json!("Waxing Gibbous")));
        assert_eq!(sensor.icon(), Some(DEFAULT_ICON));
        assert_eq!(
            sensor.entity_picture(),
            Some("https://weather.local/local/moon/11.gif")
        );
    }

    #[test]
    fn test_non_string_picture_ignored() {
        let mut sensor = Sensor::new(cache(), "moon_phase").unwrap();
        sensor.apply(&json!({"moon": {"stage": "New Moon", "icon_url": 11}}));

        assert_eq!(sensor.state(), Some(&json!("New Moon")));
        assert_eq!(sensor.entity_picture(), None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut sensor = Sensor::new(cache(), "relh").unwrap();
        sensor.apply(&document());

        let snapshot = serde_json::to_value(sensor.snapshot()).unwrap();
        assert_eq!(snapshot["entity_id"], json!("sensor.apwx_relh"));
        assert_eq!(snapshot["state"], json!(48));
        assert_eq!(snapshot["unit_of_measurement"], json!("%"));
        assert_eq!(snapshot["attributes"]["attribution"], json!(ATTRIBUTION));
    }

    #[test]
    fn test_upgrade_to_https() {
        assert_eq!(upgrade_to_https("http://x/icon.png"), "https://x/icon.png");
        assert_eq!(upgrade_to_https("HTTP://x/icon.png"), "https://x/icon.png");
        assert_eq!(upgrade_to_https("https://x/icon.png"), "https://x/icon.png");
        assert_eq!(upgrade_to_https("/local/moon/3.gif"), "/local/moon/3.gif");
        assert_eq!(upgrade_to_https("ftp://x/http://"), "ftp://x/http://");
    }
}
