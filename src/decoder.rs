//! Changed-properties decoder.
//!
//! Deserializes the `a{sv}` argument of a `PropertiesChanged` signal in wire
//! order with zvariant. Values of names outside the threshold name table
//! are skipped as [`IgnoredAny`], whatever type they hold; threshold entries
//! are kept as [`Value`]s for classification. Watched entries must be
//! booleans, and the first `true` wins.

use serde::de::{Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use std::fmt;
use zbus::message::Body;
use zbus::zvariant::Value;

use crate::classifier::PropertyClassifier;
use crate::error::DecodeError;
use crate::threshold::ThresholdKind;

/// Leading body signature of a `PropertiesChanged` signal
pub const CHANGED_PROPERTIES_SIGNATURE: &str = "sa{sv}";

/// A watched threshold property that became true
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub sensor_path: String,
    pub property: String,
    pub kind: ThresholdKind,
}

/// Threshold entries of a changed-properties map, in wire order
struct ThresholdEntries<'a>(Vec<(ThresholdKind, &'a str, Value<'a>)>);

impl<'de> Deserialize<'de> for ThresholdEntries<'de> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ThresholdEntries<'de>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of property names to variants")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(name) = map.next_key::<&'de str>()? {
                    match ThresholdKind::from_property(name) {
                        Some(kind) => entries.push((kind, name, map.next_value::<Value<'de>>()?)),
                        None => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(ThresholdEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Check the body carries the interface name and changed-properties map.
pub fn check_signature(signature: &str) -> Result<(), DecodeError> {
    if signature.starts_with(CHANGED_PROPERTIES_SIGNATURE) {
        Ok(())
    } else {
        Err(DecodeError::Signature {
            expected: CHANGED_PROPERTIES_SIGNATURE,
            found: signature.to_string(),
        })
    }
}

/// Decode the changed properties of a `PropertiesChanged` body and return
/// the first watched property that is `true`.
///
/// Entries after an assertion are never classified.
pub fn decode_changed_properties<C>(
    body: &Body,
    sensor_path: &str,
    classifier: &C,
) -> Result<Option<Assertion>, DecodeError>
where
    C: PropertyClassifier + ?Sized,
{
    // The trailing invalidated list is left unread
    let ((_, entries), _): ((&str, ThresholdEntries<'_>), usize) = body
        .data()
        .deserialize_for_signature(CHANGED_PROPERTIES_SIGNATURE)?;

    for (kind, name, value) in entries.0 {
        if !classifier.watched().contains(kind) {
            continue;
        }

        match value {
            Value::Bool(true) => {
                return Ok(Some(Assertion {
                    sensor_path: sensor_path.to_string(),
                    property: name.to_string(),
                    kind,
                }))
            }
            Value::Bool(false) => {}
            other => {
                return Err(DecodeError::NotBoolean {
                    property: name.to_string(),
                    found: other.value_signature().to_string(),
                })
            }
        }
    }

    Ok(None)
}
