// Sensor critical-threshold monitor - Shared Library
// Signal filtering, changed-property decoding, and the monitor loop

pub mod classifier;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod event_loop;
pub mod filter;
pub mod pipeline;
pub mod registry;
pub mod threshold;

pub use classifier::PropertyClassifier;
pub use config::{ClassifierMode, ConfigSource, MonitorConfig};
pub use decoder::Assertion;
pub use dispatch::{ActionDescriptor, ActionDispatcher, DispatchOutcome, CHASSIS_POWER_OFF};
pub use error::{ConfigError, DecodeError};
pub use event_loop::{EventLoop, LoopState, LoopStats};
pub use filter::{SignalFilter, THRESHOLD_CRITICAL_INTERFACE};
pub use pipeline::{Classification, Pipeline};
pub use registry::{SensorConfig, SensorRegistry, BUILTIN_SENSORS};
pub use threshold::{ThresholdKind, ThresholdSet};
