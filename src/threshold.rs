//! Threshold kinds and their wire property names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// A critical threshold a sensor can cross
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThresholdKind {
    #[serde(alias = "high")]
    High,
    #[serde(alias = "low")]
    Low,
}

/// Kind ↔ property name as it appears in `PropertiesChanged` payloads.
///
/// Adding a kind only needs a row here; decoding is table-driven.
pub const PROPERTY_NAMES: &[(ThresholdKind, &str)] = &[
    (ThresholdKind::High, "CriticalAlarmHigh"),
    (ThresholdKind::Low, "CriticalAlarmLow"),
];

impl ThresholdKind {
    pub const ALL: &'static [ThresholdKind] = &[ThresholdKind::High, ThresholdKind::Low];

    /// Bit used for this kind in a [`ThresholdSet`]
    pub const fn bit(self) -> u8 {
        match self {
            ThresholdKind::High => 0x1,
            ThresholdKind::Low => 0x2,
        }
    }

    /// Look up the kind a wire property name represents
    pub fn from_property(name: &str) -> Option<Self> {
        PROPERTY_NAMES
            .iter()
            .find(|(_, prop)| *prop == name)
            .map(|&(kind, _)| kind)
    }

    /// Wire property name for this kind
    pub fn property_name(self) -> &'static str {
        PROPERTY_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|&(_, prop)| prop)
            .unwrap_or_default()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ThresholdKind::High => "High",
            ThresholdKind::Low => "Low",
        }
    }
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Set of threshold kinds, one bit per kind.
///
/// May be empty, in which case nothing is watched. Serialized as a list of
/// kind names (`["Low", "High"]`).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<ThresholdKind>", into = "Vec<ThresholdKind>")]
pub struct ThresholdSet(u8);

impl ThresholdSet {
    pub const EMPTY: Self = Self(0);
    pub const HIGH: Self = Self(ThresholdKind::High.bit());
    pub const LOW: Self = Self(ThresholdKind::Low.bit());
    pub const ALL: Self = Self::HIGH.union(Self::LOW);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn with(self, kind: ThresholdKind) -> Self {
        Self(self.0 | kind.bit())
    }

    pub fn contains(self, kind: ThresholdKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Kinds in the set, in [`ThresholdKind::ALL`] order
    pub fn iter(self) -> impl Iterator<Item = ThresholdKind> {
        ThresholdKind::ALL
            .iter()
            .copied()
            .filter(move |&kind| self.contains(kind))
    }
}

impl BitOr for ThresholdSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl From<ThresholdKind> for ThresholdSet {
    fn from(kind: ThresholdKind) -> Self {
        Self(kind.bit())
    }
}

impl FromIterator<ThresholdKind> for ThresholdSet {
    fn from_iter<I: IntoIterator<Item = ThresholdKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl From<Vec<ThresholdKind>> for ThresholdSet {
    fn from(kinds: Vec<ThresholdKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<ThresholdSet> for Vec<ThresholdKind> {
    fn from(set: ThresholdSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for ThresholdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ThresholdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(ThresholdKind::display_name).collect();
        f.write_str(&names.join("|"))
    }
}
