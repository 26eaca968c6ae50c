//! # Unit Labels
//!
//! The analysis itself is unit-agnostic: lengths, forces and stiffness values
//! only need to be consistent (N and mm with E in MPa, or kip and in with E
//! in ksi). These types carry the unit names through to diagram titles and
//! report tables.
//!
//! Moment units are the force unit followed by the length unit, e.g. `kNmm`.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::units::{ForceUnit, LengthUnit, UnitSystem};
//!
//! let units = UnitSystem::new(ForceUnit::KiloNewton, LengthUnit::Millimeter);
//! assert_eq!(units.moment_label(), "kNmm");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForceUnit {
    #[default]
    #[serde(rename = "N")]
    Newton,
    #[serde(rename = "kN")]
    KiloNewton,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "kip")]
    Kip,
}

impl ForceUnit {
    pub const ALL: [ForceUnit; 4] = [
        ForceUnit::Newton,
        ForceUnit::KiloNewton,
        ForceUnit::Pound,
        ForceUnit::Kip,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ForceUnit::Newton => "N",
            ForceUnit::KiloNewton => "kN",
            ForceUnit::Pound => "lb",
            ForceUnit::Kip => "kip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "in")]
    Inch,
    #[serde(rename = "ft")]
    Foot,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 4] = [
        LengthUnit::Millimeter,
        LengthUnit::Meter,
        LengthUnit::Inch,
        LengthUnit::Foot,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Meter => "m",
            LengthUnit::Inch => "in",
            LengthUnit::Foot => "ft",
        }
    }
}

impl fmt::Display for ForceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ForceUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ForceUnit::ALL
            .iter()
            .copied()
            .find(|u| u.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CalcError::invalid_input("force_unit", s, "expected one of N, kN, lb, kip"))
    }
}

impl FromStr for LengthUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LengthUnit::ALL
            .iter()
            .copied()
            .find(|u| u.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CalcError::invalid_input("length_unit", s, "expected one of mm, m, in, ft"))
    }
}

/// Force and length units used for labelling results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitSystem {
    pub force: ForceUnit,
    pub length: LengthUnit,
}

impl UnitSystem {
    pub fn new(force: ForceUnit, length: LengthUnit) -> Self {
        UnitSystem { force, length }
    }

    pub fn force_label(&self) -> &'static str {
        self.force.label()
    }

    pub fn length_label(&self) -> &'static str {
        self.length.label()
    }

    pub fn moment_label(&self) -> String {
        format!("{}{}", self.force.label(), self.length.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let units = UnitSystem::default();
        assert_eq!(units.force_label(), "N");
        assert_eq!(units.length_label(), "mm");
        assert_eq!(units.moment_label(), "Nmm");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("kn".parse::<ForceUnit>().unwrap(), ForceUnit::KiloNewton);
        assert_eq!(" ft".parse::<LengthUnit>().unwrap(), LengthUnit::Foot);
        assert!("stone".parse::<ForceUnit>().is_err());
    }

    #[test]
    fn test_serialized_as_labels() {
        let json = serde_json::to_string(&UnitSystem::new(ForceUnit::Kip, LengthUnit::Inch)).unwrap();
        assert_eq!(json, r#"{"force":"kip","length":"in"}"#);
    }
}
