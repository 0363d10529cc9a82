//! Remote action issued when a watched threshold asserts.
//!
//! Service: `xyz.openbmc_project.State.Chassis`
//! Object path: `/xyz/openbmc_project/state/chassis0`

use sensor_bus::{BusTransport, SetPropertyRequest};
use tracing::{debug, error, warn};

use crate::decoder::Assertion;

/// One fixed `Properties.Set` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub service: &'static str,
    pub path: &'static str,
    pub interface: &'static str,
    pub property: &'static str,
    /// String carried in the variant argument
    pub value: &'static str,
}

/// Request a chassis power-off
pub const CHASSIS_POWER_OFF: ActionDescriptor = ActionDescriptor {
    service: "xyz.openbmc_project.State.Chassis",
    path: "/xyz/openbmc_project/state/chassis0",
    interface: "xyz.openbmc_project.State.Chassis",
    property: "RequestedPowerTransition",
    value: "xyz.openbmc_project.State.Chassis.Transition.Off",
};

impl ActionDescriptor {
    pub fn request(&self) -> SetPropertyRequest {
        SetPropertyRequest {
            destination: self.service.to_string(),
            path: self.path.to_string(),
            interface: self.interface.to_string(),
            property: self.property.to_string(),
            value: self.value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Failed,
}

/// Issues the configured action once per assertion. No retry.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    action: ActionDescriptor,
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new(CHASSIS_POWER_OFF)
    }
}

impl ActionDispatcher {
    pub fn new(action: ActionDescriptor) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &ActionDescriptor {
        &self.action
    }

    pub async fn trigger<T>(&self, bus: &T, assertion: &Assertion) -> DispatchOutcome
    where
        T: BusTransport + ?Sized,
    {
        warn!(
            "Sensor {} asserted {}!",
            assertion.sensor_path, assertion.property
        );

        match bus.set_property(&self.action.request()).await {
            Ok(()) => {
                debug!(
                    "{}.{} set to {}",
                    self.action.interface, self.action.property, self.action.value
                );
                DispatchOutcome::Sent
            }
            Err(e) => {
                error!("failed to trigger host transition: {e}");
                DispatchOutcome::Failed
            }
        }
    }
}
