//! Monitor event loop
//!
//! Two states:
//! - `Draining`: take one pending message and run it through the pipeline;
//!   with nothing pending, switch to `Waiting`
//! - `Waiting`: block until the transport reports activity, then drain again
//!
//! Only transport errors leave the loop. Malformed messages and failed
//! remote calls are logged and the loop carries on.

use std::convert::Infallible;
use std::fmt;

use sensor_bus::{BusError, BusTransport, IncomingSignal};
use tracing::{debug, info, trace, warn};

use crate::dispatch::{ActionDispatcher, DispatchOutcome};
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Draining,
    Waiting,
}

/// Per-loop message counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopStats {
    /// Messages taken off the transport
    pub received: u64,
    pub asserted: u64,
    /// In-scope messages that failed to decode
    pub malformed: u64,
    pub trigger_failures: u64,
}

impl fmt::Display for LoopStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} asserted={} malformed={} trigger_failures={}",
            self.received, self.asserted, self.malformed, self.trigger_failures
        )
    }
}

pub struct EventLoop<T: BusTransport> {
    bus: T,
    pipeline: Pipeline,
    dispatcher: ActionDispatcher,
    state: LoopState,
    stats: LoopStats,
}

impl<T: BusTransport> EventLoop<T> {
    pub fn new(bus: T, pipeline: Pipeline, dispatcher: ActionDispatcher) -> Self {
        Self {
            bus,
            pipeline,
            dispatcher,
            state: LoopState::Draining,
            stats: LoopStats::default(),
        }
    }

    /// Register the pipeline's match rule with the bus
    pub async fn subscribe(&mut self) -> Result<(), BusError> {
        let rule = self.pipeline.filter().match_rule()?;
        info!("Subscribing: {rule}");
        self.bus.add_match(rule).await?;
        Ok(())
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn bus(&self) -> &T {
        &self.bus
    }

    pub fn into_bus(self) -> T {
        self.bus
    }

    /// Perform one state transition.
    ///
    /// # Returns
    /// The state the loop is in afterwards
    pub async fn step(&mut self) -> Result<LoopState, BusError> {
        self.state = match self.state {
            LoopState::Draining => match self.bus.process()? {
                Some(signal) => {
                    self.handle(&signal).await;
                    LoopState::Draining
                }
                None => {
                    debug!("Idle: {}", self.stats);
                    LoopState::Waiting
                }
            },
            LoopState::Waiting => {
                self.bus.wait().await?;
                LoopState::Draining
            }
        };
        Ok(self.state)
    }

    /// Run until the transport fails
    pub async fn run(&mut self) -> Result<Infallible, BusError> {
        loop {
            self.step().await?;
        }
    }

    async fn handle(&mut self, signal: &IncomingSignal) {
        self.stats.received += 1;
        let sender = signal.path.as_deref().unwrap_or("<no path>");

        match self.pipeline.handle(signal) {
            Ok(Some(assertion)) => {
                self.stats.asserted += 1;
                let outcome = self.dispatcher.trigger(&self.bus, &assertion).await;
                if outcome == DispatchOutcome::Failed {
                    self.stats.trigger_failures += 1;
                }
            }
            Ok(None) => trace!("No assertion from {sender}"),
            Err(e) => {
                self.stats.malformed += 1;
                warn!("Dropping malformed signal from {sender}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::THRESHOLD_CRITICAL_INTERFACE;
    use crate::registry::SensorRegistry;
    use crate::test_util::{properties_changed, TEMP1, TEMP2};
    use sensor_bus::MemoryTransport;
    use sensor_bus::PropertyList;

    async fn monitor(bus: MemoryTransport) -> EventLoop<MemoryTransport> {
        let mut monitor = EventLoop::new(
            bus,
            Pipeline::per_sensor(SensorRegistry::builtin().unwrap()),
            ActionDispatcher::default(),
        );
        monitor.subscribe().await.unwrap();
        monitor
    }

    #[tokio::test]
    async fn test_subscribe_registers_critical_rule() {
        let monitor = monitor(MemoryTransport::new()).await;
        let rules = monitor.bus().rules();
        assert_eq!(rules.len(), 1);
        let expr = rules[0].to_string();
        assert!(
            expr.contains(&format!("arg0='{THRESHOLD_CRITICAL_INTERFACE}'")),
            "{expr}"
        );
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let mut bus = MemoryTransport::new();
        bus.push_batch(vec![properties_changed(
            TEMP2,
            THRESHOLD_CRITICAL_INTERFACE,
            PropertyList::new().with("CriticalAlarmHigh", false),
        )]);
        let mut monitor = monitor(bus).await;

        assert_eq!(monitor.state(), LoopState::Draining);
        assert_eq!(monitor.step().await.unwrap(), LoopState::Waiting);
        assert_eq!(monitor.step().await.unwrap(), LoopState::Draining);
        assert_eq!(monitor.step().await.unwrap(), LoopState::Draining);
        assert_eq!(monitor.stats().received, 1);
        assert_eq!(monitor.step().await.unwrap(), LoopState::Waiting);
        assert!(matches!(monitor.step().await, Err(BusError::Disconnected)));
    }

    #[tokio::test]
    async fn test_malformed_message_does_not_stop_loop() {
        let mut bus = MemoryTransport::new();
        bus.push(properties_changed(
            TEMP1,
            THRESHOLD_CRITICAL_INTERFACE,
            PropertyList::new().with("CriticalAlarmHigh", "yes"),
        ));
        bus.push(properties_changed(
            TEMP1,
            THRESHOLD_CRITICAL_INTERFACE,
            PropertyList::new().with("CriticalAlarmHigh", true),
        ));
        let mut monitor = monitor(bus).await;

        assert!(matches!(monitor.run().await, Err(BusError::Disconnected)));
        let stats = monitor.stats();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.asserted, 1);
        assert_eq!(monitor.bus().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_trigger_failure_does_not_stop_loop() {
        let mut bus = MemoryTransport::new();
        bus.fail_calls(true);
        for _ in 0..2 {
            bus.push(properties_changed(
                TEMP1,
                THRESHOLD_CRITICAL_INTERFACE,
                PropertyList::new().with("CriticalAlarmLow", true),
            ));
        }
        let mut monitor = monitor(bus).await;

        assert!(matches!(monitor.run().await, Err(BusError::Disconnected)));
        assert_eq!(monitor.stats().trigger_failures, 2);
        assert_eq!(monitor.bus().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_run_without_subscription_fails() {
        let mut monitor = EventLoop::new(
            MemoryTransport::new(),
            Pipeline::per_sensor(SensorRegistry::builtin().unwrap()),
            ActionDispatcher::default(),
        );
        assert!(matches!(monitor.run().await, Err(BusError::NotSubscribed)));
    }
}
