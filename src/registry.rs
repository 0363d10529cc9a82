// Sensor registry
// Maps a sensor's object path to the thresholds watched on it

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;
use zbus::zvariant::ObjectPath;

use crate::error::ConfigError;
use crate::threshold::ThresholdSet;

/// Built-in sensor table
///
/// - low and high events on Temp1
/// - only high events on Temp2
pub const BUILTIN_SENSORS: &[(&str, ThresholdSet)] = &[
    (
        "/xyz/openbmc_project/sensors/temperature/Temp1",
        ThresholdSet::ALL,
    ),
    (
        "/xyz/openbmc_project/sensors/temperature/Temp2",
        ThresholdSet::HIGH,
    ),
];

/// Thresholds monitored on one sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    path: String,
    #[serde(rename = "thresholds", default)]
    watched: ThresholdSet,
}

impl SensorConfig {
    pub fn new(path: impl Into<String>, watched: ThresholdSet) -> Self {
        Self {
            path: path.into(),
            watched,
        }
    }

    /// Object path of the sensor
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn watched(&self) -> ThresholdSet {
        self.watched
    }

    /// The built-in table as configs
    pub fn builtin() -> Vec<SensorConfig> {
        BUILTIN_SENSORS
            .iter()
            .map(|&(path, watched)| SensorConfig::new(path, watched))
            .collect()
    }
}

/// Read-only lookup of sensor configs by exact object path
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    /// Sensors in configuration order
    sensors: Vec<SensorConfig>,
    /// Path → index into `sensors`
    by_path: HashMap<String, usize>,
}

impl SensorRegistry {
    /// Build a registry, rejecting invalid and duplicate paths
    pub fn new<I>(configs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = SensorConfig>,
    {
        let mut registry = Self::default();
        for config in configs {
            let invalid = ObjectPath::try_from(config.path())
                .err()
                .map(|e| e.to_string());
            if let Some(reason) = invalid {
                return Err(ConfigError::InvalidPath {
                    path: config.path,
                    reason,
                });
            }
            if registry.by_path.contains_key(config.path()) {
                return Err(ConfigError::DuplicateSensor(config.path));
            }
            if config.watched.is_empty() {
                warn!("Sensor {} watches no thresholds", config.path);
            }
            registry
                .by_path
                .insert(config.path.clone(), registry.sensors.len());
            registry.sensors.push(config);
        }
        Ok(registry)
    }

    /// Registry over [`BUILTIN_SENSORS`], checked like any configured table
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(SensorConfig::builtin())
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, path: &str) -> Option<&SensorConfig> {
        self.by_path.get(path).map(|&i| &self.sensors[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorConfig> {
        self.sensors.iter()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
