//! Acuparse weather station integration.
//!
//! Polls an Acuparse appliance's JSON status endpoint (`http://{hostname}/data?json`)
//! and exposes each configured field as a named, typed measurement to a host
//! automation platform.
//!
//! # Architecture
//!
//! ```text
//! host scheduler ──► Sensor::update ──► RefreshCache::refresh ──► GET /data?json
//!                        │                     │ (one fetch per interval,
//!                        │                     │  shared by all sensors)
//!                        └── catalog descriptor ◄── FetchedDocument
//! ```
//!
//! # Modules
//!
//! - [`catalog`] — static table of measurement descriptors.
//! - [`client`] — shared, throttled fetch cache for one appliance.
//! - [`normalize`] — fix-ups applied to every fetched document.
//! - [`sensor`] — per-measurement evaluator and host-facing state.
//! - [`platform`] — builds the sensors for a configuration.
//! - [`config`] — YAML configuration and validation.
//! - [`error`] — error types.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod platform;
pub mod sensor;

pub use catalog::{MeasurementDescriptor, Section, Source};
pub use client::{FetchedDocument, RefreshCache};
pub use config::AcuparseConfig;
pub use error::{ConfigError, FetchError, LookupError, SetupError, TimeFormatError};
pub use platform::{setup_platform, AcuparsePlatform};
pub use sensor::{Sensor, SensorState};
