//! Signal filter for `PropertiesChanged` notifications on the
//! threshold-critical interface.

use sensor_bus::{names, IncomingSignal, MatchRule};
use zbus::message::Type;

use crate::error::DecodeError;

/// Interface whose property changes carry critical alarm state
pub const THRESHOLD_CRITICAL_INTERFACE: &str = "xyz.openbmc_project.Sensor.Threshold.Critical";

/// Accepts property-change signals for one target interface
#[derive(Debug, Clone)]
pub struct SignalFilter {
    interface: String,
}

impl Default for SignalFilter {
    fn default() -> Self {
        Self::critical()
    }
}

impl SignalFilter {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }

    /// Filter for the threshold-critical interface
    pub fn critical() -> Self {
        Self::new(THRESHOLD_CRITICAL_INTERFACE)
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Subscription expression asking the bus for exactly these signals
    pub fn match_rule(&self) -> zbus::Result<MatchRule<'static>> {
        Ok(MatchRule::builder()
            .msg_type(Type::Signal)
            .interface(names::PROPERTIES_INTERFACE)?
            .member(names::PROPERTIES_CHANGED)?
            .arg(0, self.interface.clone())?
            .build())
    }

    /// Whether `signal` is in scope.
    ///
    /// Header checks short-circuit before the body is touched. A body that
    /// cannot supply a string first argument is an error, not a rejection.
    pub fn accept(&self, signal: &IncomingSignal) -> Result<bool, DecodeError> {
        if !signal.is_signal(names::PROPERTIES_INTERFACE, names::PROPERTIES_CHANGED) {
            return Ok(false);
        }

        let signature = signal.signature();
        if !signature.starts_with('s') {
            return Err(DecodeError::Signature {
                expected: "s",
                found: signature,
            });
        }

        let body = signal.body();
        let (interface, _): (&str, usize) = body.data().deserialize_for_signature("s")?;
        Ok(interface == self.interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{properties_changed, TEMP1};
    use sensor_bus::{MessageKind, PropertyList};
    use zbus::zvariant::LE;

    fn critical_high() -> PropertyList<'static> {
        PropertyList::new().with("CriticalAlarmHigh", true)
    }

    #[test]
    fn test_accepts_threshold_signal() {
        let signal = properties_changed(TEMP1, THRESHOLD_CRITICAL_INTERFACE, critical_high());
        assert!(SignalFilter::critical().accept(&signal).unwrap());
    }

    #[test]
    fn test_rejects_other_interface_argument() {
        let signal = properties_changed(
            TEMP1,
            "xyz.openbmc_project.Sensor.Threshold.Warning",
            PropertyList::new().with("WarningAlarmHigh", true),
        );
        assert!(!SignalFilter::critical().accept(&signal).unwrap());
    }

    #[test]
    fn test_interface_argument_is_case_sensitive() {
        let signal = properties_changed(
            TEMP1,
            "xyz.openbmc_project.sensor.threshold.critical",
            PropertyList::new(),
        );
        assert!(!SignalFilter::critical().accept(&signal).unwrap());
    }

    #[test]
    fn test_rejects_wrong_member_and_kind_before_body() {
        // Body is not `s...`, so only a header-level rejection can return Ok
        let wrong_member = IncomingSignal::signal(
            TEMP1,
            names::PROPERTIES_INTERFACE,
            "InterfacesAdded",
            LE,
            &(7u32,),
        )
        .unwrap();
        assert!(!SignalFilter::critical().accept(&wrong_member).unwrap());

        let mut call = IncomingSignal::signal(
            TEMP1,
            names::PROPERTIES_INTERFACE,
            names::PROPERTIES_CHANGED,
            LE,
            &(7u32,),
        )
        .unwrap();
        call.kind = MessageKind::MethodCall;
        assert!(!SignalFilter::critical().accept(&call).unwrap());
    }

    #[test]
    fn test_non_string_first_argument_is_an_error() {
        let not_a_string = IncomingSignal::signal(
            TEMP1,
            names::PROPERTIES_INTERFACE,
            names::PROPERTIES_CHANGED,
            LE,
            &(7u32, "xyz.openbmc_project.Sensor.Threshold.Critical"),
        )
        .unwrap();
        assert!(matches!(
            SignalFilter::critical().accept(&not_a_string),
            Err(DecodeError::Signature { .. })
        ));
    }

    #[test]
    fn test_match_rule_expression() {
        let rule = SignalFilter::critical().match_rule().unwrap();
        assert_eq!(rule.msg_type(), Some(Type::Signal));

        let expr = rule.to_string();
        assert!(expr.contains("type='signal'"), "{expr}");
        assert!(expr.contains("interface='org.freedesktop.DBus.Properties'"), "{expr}");
        assert!(expr.contains("member='PropertiesChanged'"), "{expr}");
        assert!(
            expr.contains("arg0='xyz.openbmc_project.Sensor.Threshold.Critical'"),
            "{expr}"
        );
    }
}
