//! Static catalog of every measurement the appliance exposes.
//!
//! Each identifier maps to a [`MeasurementDescriptor`] describing where its
//! value lives in the fetched document and how it is presented. The catalog
//! is built once on first access and never mutated afterwards.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::error::LookupError;

// ── Units and icons ─────────────────────────────────────────────────

pub const TEMP_FAHRENHEIT: &str = "°F";
pub const LENGTH_INCHES: &str = "in";

const THERMOMETER: Option<&str> = Some("mdi:thermometer");
const WATER: Option<&str> = Some("mdi:water");
const GAUGE: Option<&str> = Some("mdi:gauge");
const WINDY: Option<&str> = Some("mdi:weather-windy");
const UMBRELLA: Option<&str> = Some("mdi:umbrella");
const NIGHT: Option<&str> = Some("mdi:weather-night");

/// Feature tag registered with the refresh cache by every catalog measurement.
pub const CONDITIONS_FEATURE: &str = "conditions";

// ── Sections ────────────────────────────────────────────────────────

/// Top-level key of the appliance document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Current,
    Yesterday,
    ThisWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    AllTime,
    Moon,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Current,
        Section::Yesterday,
        Section::ThisWeek,
        Section::ThisMonth,
        Section::LastMonth,
        Section::ThisYear,
        Section::AllTime,
        Section::Moon,
    ];

    /// JSON key of this section.
    pub fn key(self) -> &'static str {
        match self {
            Section::Current => "current",
            Section::Yesterday => "yesterday",
            Section::ThisWeek => "this_week",
            Section::ThisMonth => "this_month",
            Section::LastMonth => "last_month",
            Section::ThisYear => "this_year",
            Section::AllTime => "all_time",
            Section::Moon => "moon",
        }
    }

    /// Suffix appended to display names, if any.
    pub fn name_suffix(self) -> Option<&'static str> {
        match self {
            Section::Current | Section::Moon => None,
            Section::Yesterday => Some("Yesterday"),
            Section::ThisWeek => Some("This Week"),
            Section::ThisMonth => Some("This Month"),
            Section::LastMonth => Some("Last Month"),
            Section::ThisYear => Some("This Year"),
            Section::AllTime => Some("All Time"),
        }
    }

    /// Full display name for a measurement named `name` in this section.
    pub fn display_name(self, name: &str) -> String {
        match self.name_suffix() {
            Some(suffix) => format!("{} {}", name, suffix),
            None => name.to_string(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── Sources ─────────────────────────────────────────────────────────

/// Pure function from the latest fetched document to a scalar.
pub type Extractor = Arc<dyn Fn(&Value) -> Result<Value, LookupError> + Send + Sync>;

/// A descriptor field: either a constant or an extractor over the document.
#[derive(Clone)]
pub enum Source {
    Const(Value),
    Extract(Extractor),
}

impl Source {
    /// Extractor returning `doc[section][field]` verbatim.
    pub fn lookup(section: Section, field: &'static str) -> Self {
        Source::Extract(Arc::new(move |doc: &Value| lookup_field(doc, section, field)))
    }

    pub fn evaluate(&self, doc: &Value) -> Result<Value, LookupError> {
        match self {
            Source::Const(value) => Ok(value.clone()),
            Source::Extract(extract) => extract(doc),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Const(value) => f.debug_tuple("Const").field(value).finish(),
            Source::Extract(_) => f.write_str("Extract(..)"),
        }
    }
}

/// Resolve `doc[section][field]`.
pub fn lookup_field(doc: &Value, section: Section, field: &str) -> Result<Value, LookupError> {
    let fields = doc
        .get(section.key())
        .ok_or(LookupError::MissingSection(section))?
        .as_object()
        .ok_or(LookupError::NotAnObject(section))?;

    fields
        .get(field)
        .cloned()
        .ok_or_else(|| LookupError::MissingField {
            section,
            field: field.to_string(),
        })
}

// ── Descriptors ─────────────────────────────────────────────────────

/// Static metadata and extractors for one measurement identifier.
#[derive(Debug, Clone)]
pub struct MeasurementDescriptor {
    pub id: String,
    pub section: Section,
    /// Raw feature tag registered with the refresh cache.
    pub feature: &'static str,
    pub json_field: &'static str,
    pub display_name: String,
    pub unit: &'static str,
    pub value: Source,
    pub icon: Source,
    pub picture: Source,
    pub attributes: Vec<(&'static str, Source)>,
}

/// Build a conditions-style descriptor reading `doc[section][field]`.
///
/// When `icon` is `None` the measurement has no fixed icon and instead takes
/// its picture from `doc[section]["icon_url"]`. Every descriptor carries a
/// `date` attribute read from `doc[section]["timestamp"]`.
pub fn conditions(
    id: impl Into<String>,
    section: Section,
    name: &str,
    field: &'static str,
    icon: Option<&'static str>,
    unit: &'static str,
) -> MeasurementDescriptor {
    let (icon, picture) = match icon {
        Some(icon) => (Source::Const(Value::from(icon)), Source::Const(Value::Null)),
        None => (
            Source::Const(Value::Null),
            Source::lookup(section, "icon_url"),
        ),
    };

    MeasurementDescriptor {
        id: id.into(),
        section,
        feature: CONDITIONS_FEATURE,
        json_field: field,
        display_name: section.display_name(name),
        unit,
        value: Source::lookup(section, field),
        icon,
        picture,
        attributes: vec![("date", Source::lookup(section, "timestamp"))],
    }
}

// ── Field tables ────────────────────────────────────────────────────

/// `(id, name, json field, icon, unit)`
type Row = (
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    &'static str,
);

const CURRENT: &[Row] = &[
    ("temp", "Temp", "tempF", THERMOMETER, TEMP_FAHRENHEIT),
    ("temp_trend", "Temp", "tempF_trend", THERMOMETER, "trend"),
    ("feels", "Temp Feels Like", "feelsF", THERMOMETER, TEMP_FAHRENHEIT),
    ("dewpt", "Dewpoint", "dewptF", WATER, TEMP_FAHRENHEIT),
    ("temp_high", "Temp High", "tempF_high", THERMOMETER, TEMP_FAHRENHEIT),
    ("temp_high_time", "Temp High Time", "high_temp_recorded", THERMOMETER, "time"),
    ("temp_low", "Temp Low", "tempF_low", THERMOMETER, TEMP_FAHRENHEIT),
    ("temp_low_time", "Temp Low Time", "low_temp_recorded", THERMOMETER, "time"),
    ("temp_avg", "Temp Average", "tempF_avg", THERMOMETER, TEMP_FAHRENHEIT),
    ("relh", "Relative Humidity", "relH", WATER, "%"),
    ("relh_trend", "Relative Humidity", "relH_trend", WATER, "trend"),
    ("pressure_inhg", "Pressure", "pressure_inHg", GAUGE, "inHg"),
    ("pressure_kpa", "Pressure", "pressure_kPa", GAUGE, "kPa"),
    ("pressure_trend", "Pressure", "inHg_trend", GAUGE, "trend"),
    ("wind_mph", "Wind", "windSmph", WINDY, "mph"),
    ("wind_kmh", "Wind", "windSkmh", WINDY, "kph"),
    ("wind_dir", "Wind", "windDIR", WINDY, "direction"),
    ("wind_deg", "Wind", "windDEG", WINDY, "degrees"),
    ("wind_deg_avg2", "Wind Avg 2", "windDEG_avg2", WINDY, "degrees"),
    ("wind_dir_avg2", "Wind Avg 2", "windDIR_avg2", WINDY, "direction"),
    ("wind_mph_avg2", "Wind Avg 2", "windSmph_avg2", WINDY, "mph"),
    ("wind_kmh_avg2", "Wind Avg 2", "windSkmh_avg2", WINDY, "kph"),
    ("wind_deg_avg10", "Wind Avg 10", "windDEG_avg10", WINDY, "degrees"),
    ("wind_mph_avg10", "Wind Avg 10", "windSmph_avg10", WINDY, "mph"),
    ("wind_kmh_avg10", "Wind Avg 10", "windSkmh_avg10", WINDY, "kph"),
    ("wind_deg_peak", "Wind Max", "windDEG_peak", WINDY, "degrees"),
    ("wind_dir_peak", "Wind Max", "windDIR_peak", WINDY, "direction"),
    ("wind_peak_time", "Wind Max", "wind_recorded_peak", WINDY, "time"),
    ("wind_mph_peak", "Wind Max", "windSmph_peak", WINDY, "mph"),
    ("wind_kmh_peak", "Wind Max", "windSkmh_peak", WINDY, "kph"),
    ("wind_mph_max5", "Wind Max 5", "windSmph_max5", WINDY, "mph"),
    ("wind_kmh_max5", "Wind Max 5", "windSkmh_max5", WINDY, "kph"),
    ("rain_rate_in", "Rain Rate", "rainIN", UMBRELLA, "in/hr"),
    ("rain_rate_mm", "Rain Rate", "rainMM", UMBRELLA, "mm/hr"),
    ("rain_total_in_today", "Rain Total", "rainTotalIN_today", UMBRELLA, LENGTH_INCHES),
    ("rain_total_mm_today", "Rain Total", "rainTotalMM_today", UMBRELLA, "mm"),
];

/// Historical rollups: identifier prefix and section.
const ROLLUPS: &[(&str, Section)] = &[
    ("y", Section::Yesterday),
    ("tw", Section::ThisWeek),
    ("tm", Section::ThisMonth),
    ("lm", Section::LastMonth),
    ("ty", Section::ThisYear),
    ("at", Section::AllTime),
];

/// Fields shared by every rollup. Ids are suffixes of the rollup prefix.
const ROLLUP_FIELDS: &[Row] = &[
    ("temp_max", "Temp High", "tempF_high", THERMOMETER, TEMP_FAHRENHEIT),
    ("temp_min", "Temp Low", "tempF_low", THERMOMETER, TEMP_FAHRENHEIT),
    ("temp_max_when", "Temp High", "tempF_high_recorded", THERMOMETER, "time"),
    ("temp_min_when", "Temp Low", "tempF_low_recorded", THERMOMETER, "time"),
    ("wind_max_mph", "Wind Max", "windS_mph_high", WINDY, "mph"),
    ("wind_max_kmh", "Wind Max", "windS_kmh_high", WINDY, "kph"),
    ("wind_max_dir", "Wind Max", "windDIR", WINDY, "direction"),
    ("wind_max_when", "Wind Max", "windS_mph_high_recorded", WINDY, "time"),
    ("pressure_max_inhg", "Pressure High", "pressure_inHg_high", GAUGE, "inHg"),
    ("pressure_min_inhg", "Pressure Low", "pressure_inHg_low", GAUGE, "inHg"),
    ("pressure_max_kpa", "Pressure High", "pressure_kPa_high", GAUGE, "kPa"),
    ("pressure_min_kpa", "Pressure Low", "pressure_kPa_low", GAUGE, "kPa"),
    ("pressure_max_when", "Pressure High", "pressure_inHg_high_recorded", GAUGE, "time"),
    ("pressure_min_when", "Pressure Low", "pressure_inHg_low_recorded", GAUGE, "time"),
    ("relh_max", "Humidity High", "relH_high", WATER, "%"),
    ("relh_min", "Humidity Low", "relH_low", WATER, "%"),
    ("relh_max_when", "Humidity High", "relH_high_recorded", WATER, "time"),
    ("relh_min_when", "Humidity Low", "relH_low_recorded", WATER, "time"),
    ("rain_in_total", "Rain Total", "rainfall_IN_total", UMBRELLA, LENGTH_INCHES),
    ("rain_mm_total", "Rain Total", "rainfall_MM_total", UMBRELLA, "mm"),
];

/// Rain-rate maxima, reported for every rollup except yesterday.
const RAIN_RATE_FIELDS: &[Row] = &[
    ("rain_rate_in_max", "Rain Rate Max", "rainfall_IN_most", UMBRELLA, "in/hr"),
    ("rain_rate_mm_max", "Rain Rate Max", "rainfall_MM_most", UMBRELLA, "mm/hr"),
    ("rain_rate_max_when", "Rain Rate Max", "rainfall_IN_most_recorded", UMBRELLA, "time"),
];

const ALL_TIME_EXTRA: &[Row] = &[(
    "at_rain_total_since",
    "Rain Total",
    "rainfall_IN_total_since",
    UMBRELLA,
    "date",
)];

const MOON: &[Row] = &[
    ("moon_age", "Moon Age", "age", NIGHT, "time"),
    ("moon_phase", "Moon Phase", "stage", None, ""),
    ("moon_next_new", "Next New Moon", "next_new", NIGHT, "date"),
    ("moon_next_full", "Next Full Moon", "next_full", NIGHT, "date"),
    ("moon_last_new", "Last New Moon", "last_new", NIGHT, "date"),
    ("moon_last_full", "Last Full Moon", "last_full", NIGHT, "date"),
    ("moon_distance", "Moon Distance", "distance", NIGHT, "miles"),
    ("moon_illumination", "Moon Illumination", "illumination", NIGHT, "%"),
];

static CATALOG: LazyLock<BTreeMap<String, MeasurementDescriptor>> = LazyLock::new(build_catalog);

fn build_catalog() -> BTreeMap<String, MeasurementDescriptor> {
    let mut catalog = BTreeMap::new();
    let mut insert = |descriptor: MeasurementDescriptor| {
        catalog.insert(descriptor.id.clone(), descriptor);
    };

    for &(id, name, field, icon, unit) in CURRENT {
        insert(conditions(id, Section::Current, name, field, icon, unit));
    }

    for &(prefix, section) in ROLLUPS {
        let rain_rate: &[Row] = if section == Section::Yesterday {
            &[]
        } else {
            RAIN_RATE_FIELDS
        };
        for &(suffix, name, field, icon, unit) in ROLLUP_FIELDS.iter().chain(rain_rate) {
            insert(conditions(
                format!("{}_{}", prefix, suffix),
                section,
                name,
                field,
                icon,
                unit,
            ));
        }
    }

    for &(id, name, field, icon, unit) in ALL_TIME_EXTRA {
        insert(conditions(id, Section::AllTime, name, field, icon, unit));
    }

    for &(id, name, field, icon, unit) in MOON {
        insert(conditions(id, Section::Moon, name, field, icon, unit));
    }

    catalog
}

/// Descriptor for a measurement identifier.
pub fn lookup(id: &str) -> Option<&'static MeasurementDescriptor> {
    CATALOG.get(id)
}

pub fn contains(id: &str) -> bool {
    CATALOG.contains_key(id)
}

/// All supported identifiers, sorted.
pub fn identifiers() -> impl Iterator<Item = &'static str> {
    CATALOG.keys().map(String::as_str)
}

pub fn descriptors() -> impl Iterator<Item = &'static MeasurementDescriptor> {
    CATALOG.values()
}
