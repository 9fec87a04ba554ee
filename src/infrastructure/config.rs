use crate::domain::models::{DEFAULT_DAY_END, DEFAULT_DAY_START, ScheduleSettings};
use crate::infrastructure::error::InfraError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const SCHEDULE_JSON: &str = "schedule.json";
const SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigBundle {
    pub app: serde_json::Value,
    pub schedule: serde_json::Value,
}

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([
        (
            APP_JSON,
            serde_json::json!({
                "schema": SCHEMA_VERSION,
                "appName": "DayBlock",
                "timezone": "UTC"
            }),
        ),
        (
            SCHEDULE_JSON,
            serde_json::json!({
                "schema": SCHEMA_VERSION,
                "dayStart": DEFAULT_DAY_START,
                "dayEnd": DEFAULT_DAY_END,
                "autoBreaksEnabled": true
            }),
        ),
    ])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            write_config(&path, &value)?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != SCHEMA_VERSION {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

fn write_config(path: &Path, value: &serde_json::Value) -> Result<(), InfraError> {
    let formatted = serde_json::to_string_pretty(value)?;
    fs::write(path, format!("{formatted}\n"))?;
    Ok(())
}

pub fn load_configs(config_dir: &Path) -> Result<ConfigBundle, InfraError> {
    Ok(ConfigBundle {
        app: read_config(&config_dir.join(APP_JSON))?,
        schedule: read_config(&config_dir.join(SCHEDULE_JSON))?,
    })
}

pub fn read_timezone(config_dir: &Path) -> Result<Option<String>, InfraError> {
    let app = read_config(&config_dir.join(APP_JSON))?;
    Ok(app
        .get("timezone")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned))
}

/// Missing keys fall back to defaults. Time strings are returned as written so
/// that a malformed value surfaces when the day is started.
pub fn read_schedule_settings(config_dir: &Path) -> Result<ScheduleSettings, InfraError> {
    let schedule = read_config(&config_dir.join(SCHEDULE_JSON))?;
    let defaults = ScheduleSettings::default();
    let read_time = |key: &str, fallback: String| {
        schedule
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| {
                log::warn!("{SCHEDULE_JSON} has no {key}; using {fallback}");
                fallback
            })
    };

    Ok(ScheduleSettings {
        day_start: read_time("dayStart", defaults.day_start),
        day_end: read_time("dayEnd", defaults.day_end),
        auto_breaks_enabled: schedule
            .get("autoBreaksEnabled")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(defaults.auto_breaks_enabled),
    })
}

pub fn save_schedule_settings(
    config_dir: &Path,
    settings: &ScheduleSettings,
) -> Result<(), InfraError> {
    settings.validate()?;

    let path = config_dir.join(SCHEDULE_JSON);
    let mut schedule = read_config(&path)?;
    let object = schedule.as_object_mut().ok_or_else(|| {
        InfraError::InvalidConfig(format!("invalid object structure in {}", path.display()))
    })?;
    object.insert(
        "dayStart".to_string(),
        serde_json::Value::String(settings.day_start.trim().to_string()),
    );
    object.insert(
        "dayEnd".to_string(),
        serde_json::Value::String(settings.day_end.trim().to_string()),
    );
    object.insert(
        "autoBreaksEnabled".to_string(),
        serde_json::Value::Bool(settings.auto_breaks_enabled),
    );

    write_config(&path, &schedule)
}
