//! Per-message pipeline: filter → registry → decoder.
//!
//! [`Pipeline::handle`] is a pure function of the message and the static
//! configuration; the event loop performs the dispatch.

use sensor_bus::IncomingSignal;
use tracing::trace;

use crate::classifier::PropertyClassifier;
use crate::config::{ClassifierMode, MonitorConfig};
use crate::decoder::{self, Assertion};
use crate::error::{ConfigError, DecodeError};
use crate::filter::SignalFilter;
use crate::registry::SensorRegistry;
use crate::threshold::ThresholdSet;

/// How watched thresholds are chosen for a sender
#[derive(Debug, Clone)]
pub enum Classification {
    /// Look the sender up in the registry; unknown senders are ignored
    PerSensor(SensorRegistry),
    /// One set for every sender, ignoring per-sensor configuration
    Global(ThresholdSet),
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    filter: SignalFilter,
    classification: Classification,
}

impl Pipeline {
    pub fn new(filter: SignalFilter, classification: Classification) -> Self {
        Self {
            filter,
            classification,
        }
    }

    /// Threshold-critical filter with per-sensor classification
    pub fn per_sensor(registry: SensorRegistry) -> Self {
        Self::new(SignalFilter::critical(), Classification::PerSensor(registry))
    }

    /// Threshold-critical filter with one watched set for all senders
    pub fn global(watched: ThresholdSet) -> Self {
        Self::new(SignalFilter::critical(), Classification::Global(watched))
    }

    pub fn from_config(config: &MonitorConfig) -> Result<Self, ConfigError> {
        Ok(match config.mode {
            ClassifierMode::PerSensor => Self::per_sensor(config.registry()?),
            ClassifierMode::Global => Self::global(config.global_thresholds),
        })
    }

    pub fn filter(&self) -> &SignalFilter {
        &self.filter
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Run one message through the pipeline.
    ///
    /// # Returns
    /// - `Ok(None)` for messages out of scope or without an asserted threshold
    /// - `Ok(Some(_))` for the first asserted watched property
    /// - `Err(_)` for in-scope messages that cannot be decoded
    pub fn handle(&self, signal: &IncomingSignal) -> Result<Option<Assertion>, DecodeError> {
        if !self.filter.accept(signal)? {
            return Ok(None);
        }

        let Some(path) = signal.path.as_deref() else {
            return Ok(None);
        };

        let classifier: &dyn PropertyClassifier = match &self.classification {
            Classification::PerSensor(registry) => match registry.lookup(path) {
                Some(sensor) => sensor,
                None => {
                    trace!("No sensor config for {path}");
                    return Ok(None);
                }
            },
            Classification::Global(watched) => watched,
        };

        decoder::check_signature(&signal.signature())?;
        decoder::decode_changed_properties(&signal.body(), path, classifier)
    }
}
