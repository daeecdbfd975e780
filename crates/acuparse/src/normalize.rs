//! Fix-ups applied to every document fetched from the appliance.

use serde_json::Value;

use crate::error::TimeFormatError;

/// Current-conditions fields recorded as 24-hour `H:MM` text.
const RECORDED_TIME_FIELDS: [&str; 2] = ["high_temp_recorded", "low_temp_recorded"];

/// Air temperature fields copied over an uncomputed feels-like reading.
const FEELS_LIKE_SOURCES: [(&str, &str); 2] = [("tempF", "feelsF"), ("tempC", "feelsC")];

/// Convert a 24-hour `H:MM` time into 12-hour `H:MM AM/PM` text.
///
/// Minutes are passed through verbatim.
pub fn to_12_hour(time: &str) -> Result<String, TimeFormatError> {
    let invalid = || TimeFormatError(time.to_string());

    let (hour, rest) = time.split_once(':').ok_or_else(invalid)?;
    let minutes = rest.split(':').next().unwrap_or(rest);
    let hour: u32 = hour.trim().parse().map_err(|_| invalid())?;

    let (hour, meridiem) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        13..=23 => (hour - 12, "PM"),
        _ => return Err(invalid()),
    };

    Ok(format!("{}:{} {}", hour, minutes, meridiem))
}

/// Apply the appliance fix-ups in place.
///
/// 1. `current.feelsF == 0` means "not computed yet": substitute the air
///    temperature for both feels-like fields.
/// 2. Reformat the recorded high/low times into 12-hour text.
///
/// Missing or malformed fields are logged and left untouched.
pub fn normalize(document: &mut Value) {
    let Some(current) = document.get_mut("current").and_then(Value::as_object_mut) else {
        log::warn!("Acuparse document has no 'current' section, skipping normalization");
        return;
    };

    if current.get("feelsF").and_then(Value::as_f64) == Some(0.0) {
        log::info!("Feels like = 0: setting to current temp");
        for (source, target) in FEELS_LIKE_SOURCES {
            match current.get(source).cloned() {
                Some(temp) => {
                    current.insert(target.to_string(), temp);
                }
                None => log::warn!("current.{} missing, cannot substitute feels-like", source),
            }
        }
    }

    for field in RECORDED_TIME_FIELDS {
        let reformatted = match current.get(field) {
            Some(Value::String(time)) => to_12_hour(time),
            Some(other) => {
                log::warn!("current.{} is not text: {}", field, other);
                continue;
            }
            None => {
                log::debug!("current.{} not present", field);
                continue;
            }
        };

        match reformatted {
            Ok(time) => {
                current.insert(field.to_string(), Value::String(time));
            }
            Err(e) => log::warn!("Cannot reformat current.{}: {}", field, e),
        }
    }
}
