//! Monitor configuration
//!
//! Defaults to the built-in sensor table. A TOML file may replace it at
//! startup; it is read once and never reloaded.
//!
//! ```toml
//! mode = "per-sensor"
//!
//! [[sensors]]
//! path = "/xyz/openbmc_project/sensors/temperature/Temp1"
//! thresholds = ["Low", "High"]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::registry::{SensorConfig, SensorRegistry};
use crate::threshold::ThresholdSet;

/// How the watched thresholds for a sender are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierMode {
    /// Per-sensor table lookup; senders without an entry are ignored
    #[default]
    PerSensor,
    /// `global_thresholds` applies to every sender
    Global,
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClassifierMode::PerSensor => "per-sensor",
            ClassifierMode::Global => "global",
        })
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Builtin,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Builtin => f.write_str("built-in defaults"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    #[serde(default)]
    pub mode: ClassifierMode,
    /// Watched set for [`ClassifierMode::Global`]
    #[serde(default = "default_global_thresholds")]
    pub global_thresholds: ThresholdSet,
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

fn default_global_thresholds() -> ThresholdSet {
    ThresholdSet::ALL
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::default(),
            global_thresholds: default_global_thresholds(),
            sensors: SensorConfig::builtin(),
        }
    }
}

impl MonitorConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("threshold-monitor")
            .join("sensors.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load an explicitly requested file (which must exist), or the default
    /// file if present, or fall back to the built-in table.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, ConfigSource::File(path.to_path_buf())));
        }
        let path = Self::default_path();
        if path.exists() {
            Ok((Self::load(&path)?, ConfigSource::File(path)))
        } else {
            Ok((Self::default(), ConfigSource::Builtin))
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the sensor table and build the lookup registry
    pub fn registry(&self) -> Result<SensorRegistry, ConfigError> {
        SensorRegistry::new(self.sensors.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{TEMP1, TEMP2};

    #[test]
    fn test_default_is_builtin_table() {
        let config = MonitorConfig::default();
        assert_eq!(config.mode, ClassifierMode::PerSensor);
        let registry = config.registry().unwrap();
        assert_eq!(registry.lookup(TEMP1).unwrap().watched(), ThresholdSet::ALL);
        assert_eq!(registry.lookup(TEMP2).unwrap().watched(), ThresholdSet::HIGH);
    }

    #[test]
    fn test_parse_sensor_table() {
        let config = MonitorConfig::from_toml_str(
            r#"
[[sensors]]
path = "/xyz/openbmc_project/sensors/voltage/P12V"
thresholds = ["Low"]

[[sensors]]
path = "/xyz/openbmc_project/sensors/fan_tach/Fan0"
"#,
        )
        .unwrap();
        assert_eq!(config.mode, ClassifierMode::PerSensor);
        assert_eq!(config.sensors.len(), 2);
        assert_eq!(config.sensors[0].watched(), ThresholdSet::LOW);
        assert!(config.sensors[1].watched().is_empty());
    }

    #[test]
    fn test_parse_global_mode() {
        let config = MonitorConfig::from_toml_str(
            r#"
mode = "global"
global_thresholds = ["High"]
"#,
        )
        .unwrap();
        assert_eq!(config.mode, ClassifierMode::Global);
        assert_eq!(config.global_thresholds, ThresholdSet::HIGH);
        assert!(config.sensors.is_empty());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(MonitorConfig::from_toml_str("mode = \"per-sensor\"\nextra = 1").is_err());
        assert!(MonitorConfig::from_toml_str(
            "[[sensors]]\npath = \"/a\"\nthresholds = []\nlevel = 3"
        )
        .is_err());
        assert!(MonitorConfig::from_toml_str("mode = \"sometimes\"").is_err());
    }

    #[test]
    fn test_duplicate_sensor_detected_on_registry_build() {
        let config = MonitorConfig::from_toml_str(
            r#"
[[sensors]]
path = "/xyz/openbmc_project/sensors/temperature/Temp1"
thresholds = ["High"]

[[sensors]]
path = "/xyz/openbmc_project/sensors/temperature/Temp1"
thresholds = ["Low"]
"#,
        )
        .unwrap();
        assert!(matches!(
            config.registry(),
            Err(ConfigError::DuplicateSensor(_))
        ));
    }

    #[test]
    fn test_roundtrip_default() {
        let config = MonitorConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("mode = \"per-sensor\""));
        let parsed = MonitorConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.sensors, config.sensors);
        assert_eq!(parsed.global_thresholds, config.global_thresholds);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/threshold-monitor/sensors.toml");
        assert!(matches!(
            MonitorConfig::load_or_default(Some(missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("threshold-monitor-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sensors.toml");
        std::fs::write(
            &path,
            "[[sensors]]\npath = \"/xyz/openbmc_project/sensors/power/PSU0\"\nthresholds = [\"High\"]\n",
        )
        .unwrap();

        let (config, source) = MonitorConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(source, ConfigSource::File(path.clone()));
        assert_eq!(config.sensors[0].path(), "/xyz/openbmc_project/sensors/power/PSU0");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
