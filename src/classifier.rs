//! Property classification.
//!
//! Two stages: the wire name is mapped to a [`ThresholdKind`] through the
//! static name table, then the kind is tested against a watched set. The
//! name table never depends on sensor configuration, so the cost per
//! property is bounded by the table size.

use crate::registry::SensorConfig;
use crate::threshold::{ThresholdKind, ThresholdSet};

/// Decides whether a changed property is one we must decode
pub trait PropertyClassifier {
    /// Thresholds this classifier watches
    fn watched(&self) -> ThresholdSet;

    /// The watched kind `property` represents, if any
    fn classify(&self, property: &str) -> Option<ThresholdKind> {
        ThresholdKind::from_property(property).filter(|&kind| self.watched().contains(kind))
    }

    fn matches(&self, property: &str) -> bool {
        self.classify(property).is_some()
    }
}

/// Per-sensor classification
impl PropertyClassifier for SensorConfig {
    fn watched(&self) -> ThresholdSet {
        SensorConfig::watched(self)
    }
}

/// Global classification: the same set applies to every sender
impl PropertyClassifier for ThresholdSet {
    fn watched(&self) -> ThresholdSet {
        *self
    }
}

/// Whether `config` cares about `property`
pub fn matches(config: &SensorConfig, property: &str) -> bool {
    config.matches(property)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(watched: ThresholdSet) -> SensorConfig {
        SensorConfig::new("/xyz/openbmc_project/sensors/temperature/Temp1", watched)
    }

    #[test]
    fn test_unknown_names_never_match() {
        let names = [
            "",
            "Value",
            "CriticalHigh",
            "CriticalLow",
            "WarningAlarmHigh",
            "criticalalarmhigh",
            "CriticalAlarmHigh ",
        ];
        for watched in [ThresholdSet::EMPTY, ThresholdSet::HIGH, ThresholdSet::LOW, ThresholdSet::ALL] {
            let config = sensor(watched);
            for name in names {
                assert!(!matches(&config, name), "{name:?} matched {watched}");
            }
        }
    }

    #[test]
    fn test_high_only_sensor_ignores_low() {
        let config = sensor(ThresholdSet::HIGH);
        assert!(matches(&config, "CriticalAlarmHigh"));
        assert!(!matches(&config, "CriticalAlarmLow"));
    }

    #[test]
    fn test_both_kinds() {
        let config = sensor(ThresholdSet::ALL);
        assert_eq!(config.classify("CriticalAlarmHigh"), Some(ThresholdKind::High));
        assert_eq!(config.classify("CriticalAlarmLow"), Some(ThresholdKind::Low));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let config = sensor(ThresholdSet::EMPTY);
        assert!(!matches(&config, "CriticalAlarmHigh"));
        assert!(!matches(&config, "CriticalAlarmLow"));
    }

    #[test]
    fn test_global_set_classifier() {
        assert!(ThresholdSet::LOW.matches("CriticalAlarmLow"));
        assert!(!ThresholdSet::LOW.matches("CriticalAlarmHigh"));
    }
}
