//! CSA S6-2019 load factors (alpha factors)
//!
//! The ULS combinations scale dead, earth pressure, prestress and live loads
//! by factors that depend on the material, the earth pressure type, whether
//! the maximum or minimum factor governs, the live load span type and the
//! collision case. The lookups here are static tables indexed by enum.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::loads::{AlphaSelection, Bound, MaterialType};
//!
//! let selection = AlphaSelection {
//!     material: MaterialType::M3,
//!     dead_bound: Bound::Min,
//!     ..AlphaSelection::default()
//! };
//! let alphas = selection.alpha_factors();
//! assert_eq!(alphas.d, 0.65);
//! assert_eq!(alphas.l1, 1.7);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

// ============================================================================
// Static tables
// ============================================================================

/// αD (max, min) per material, indexed by [`MaterialType`]
const DEAD_LOAD_FACTORS: [(f64, f64); 6] = [
    (1.1, 0.95),
    (1.2, 0.9),
    (1.5, 0.65),
    (1.25, 0.8),
    (1.1, 0.9),
    (1.25, 0.8),
];

/// αE (max, min) per earth pressure type, indexed by [`EarthPressureType`]
const EARTH_PRESSURE_FACTORS: [(f64, f64); 5] = [
    (1.25, 0.5),
    (1.25, 0.8),
    (1.25, 0.8),
    (1.25, 0.8),
    (1.1, 0.9),
];

/// (αL1, αL2, αL3) per span type, indexed by [`LiveLoadSpan`]
const LIVE_LOAD_FACTORS: [(f64, f64, f64); 5] = [
    (1.7, 1.6, 1.4),
    (1.7, 1.6, 1.4),
    (1.5, 1.4, 1.25),
    (1.5, 1.4, 1.25),
    (1.35, 1.25, 1.1),
];

/// αP (max, min)
const PRESTRESS_FACTORS: (f64, f64) = (1.05, 0.95);

// ============================================================================
// Selectors
// ============================================================================

/// Whether the maximum or minimum load factor applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    #[default]
    Max,
    Min,
}

impl Bound {
    fn pick(&self, (max, min): (f64, f64)) -> f64 {
        match self {
            Bound::Max => max,
            Bound::Min => min,
        }
    }
}

/// Dead load material category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialType {
    M1,
    #[default]
    M2,
    M3,
    M4,
    M5,
    M6,
}

impl MaterialType {
    pub const ALL: [MaterialType; 6] = [
        MaterialType::M1,
        MaterialType::M2,
        MaterialType::M3,
        MaterialType::M4,
        MaterialType::M5,
        MaterialType::M6,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            MaterialType::M1 => "M1",
            MaterialType::M2 => "M2",
            MaterialType::M3 => "M3",
            MaterialType::M4 => "M4",
            MaterialType::M5 => "M5",
            MaterialType::M6 => "M6",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MaterialType::M1 => "Factory-produced components, excluding wood",
            MaterialType::M2 => "Cast-in-place concrete, wood, and all non-structural components",
            MaterialType::M3 => "Wearing surfaces, based on nominal or specified thickness",
            MaterialType::M4 => "Earth fill, negative skin friction on piles",
            MaterialType::M5 => "Water",
            MaterialType::M6 => "Dead load in combination with earthquakes (ULS5)",
        }
    }
}

/// Earth pressure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EarthPressureType {
    #[default]
    E1,
    E2,
    E3,
    E4,
    E5,
}

impl EarthPressureType {
    pub const ALL: [EarthPressureType; 5] = [
        EarthPressureType::E1,
        EarthPressureType::E2,
        EarthPressureType::E3,
        EarthPressureType::E4,
        EarthPressureType::E5,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            EarthPressureType::E1 => "E1",
            EarthPressureType::E2 => "E2",
            EarthPressureType::E3 => "E3",
            EarthPressureType::E4 => "E4",
            EarthPressureType::E5 => "E5",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EarthPressureType::E1 => "Passive earth pressure, considered as a load",
            EarthPressureType::E2 => "At-rest earth pressure",
            EarthPressureType::E3 => "Active earth pressure",
            EarthPressureType::E4 => "Backfill pressure",
            EarthPressureType::E5 => "Hydrostatic pressure",
        }
    }
}

/// Live load span type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LiveLoadSpan {
    #[default]
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Special_mixed_short")]
    SpecialMixedShort,
    #[serde(rename = "Special_mixed_other")]
    SpecialMixedOther,
    #[serde(rename = "Special_alone_short")]
    SpecialAloneShort,
    #[serde(rename = "Special_alone_other")]
    SpecialAloneOther,
}

impl LiveLoadSpan {
    pub const ALL: [LiveLoadSpan; 5] = [
        LiveLoadSpan::Normal,
        LiveLoadSpan::SpecialMixedShort,
        LiveLoadSpan::SpecialMixedOther,
        LiveLoadSpan::SpecialAloneShort,
        LiveLoadSpan::SpecialAloneOther,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LiveLoadSpan::Normal => "Normal",
            LiveLoadSpan::SpecialMixedShort => "Special_mixed_short",
            LiveLoadSpan::SpecialMixedOther => "Special_mixed_other",
            LiveLoadSpan::SpecialAloneShort => "Special_alone_short",
            LiveLoadSpan::SpecialAloneOther => "Special_alone_other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LiveLoadSpan::Normal => "Normal load",
            LiveLoadSpan::SpecialMixedShort => "Special loads mixed with normal traffic for short spans",
            LiveLoadSpan::SpecialMixedOther => "Special loads mixed with normal traffic for other spans",
            LiveLoadSpan::SpecialAloneShort => "Special loads for short spans",
            LiveLoadSpan::SpecialAloneOther => "Special loads for other spans",
        }
    }
}

/// Collision source for ULS8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionKind {
    #[default]
    Vehicle,
    Vessel,
}

impl CollisionKind {
    pub fn code(&self) -> &'static str {
        match self {
            CollisionKind::Vehicle => "vehicle",
            CollisionKind::Vessel => "vessel",
        }
    }
}

macro_rules! impl_code_parsing {
    ($ty:ty, $field:literal, $($variant:expr),+) => {
        impl FromStr for $ty {
            type Err = CalcError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($variant),+]
                    .into_iter()
                    .find(|v: &$ty| v.code().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| CalcError::invalid_input($field, s, "unrecognised code"))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    };
}

impl_code_parsing!(MaterialType, "material", MaterialType::M1, MaterialType::M2, MaterialType::M3, MaterialType::M4, MaterialType::M5, MaterialType::M6);
impl_code_parsing!(EarthPressureType, "earth_pressure", EarthPressureType::E1, EarthPressureType::E2, EarthPressureType::E3, EarthPressureType::E4, EarthPressureType::E5);
impl_code_parsing!(LiveLoadSpan, "live_load_span", LiveLoadSpan::Normal, LiveLoadSpan::SpecialMixedShort, LiveLoadSpan::SpecialMixedOther, LiveLoadSpan::SpecialAloneShort, LiveLoadSpan::SpecialAloneOther);
impl_code_parsing!(CollisionKind, "collision", CollisionKind::Vehicle, CollisionKind::Vessel);

// ============================================================================
// Factor sets
// ============================================================================

/// The alpha factors substituted into the ULS combinations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaFactors {
    pub d: f64,
    pub e: f64,
    pub p: f64,
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
    pub l8: f64,
}

impl Default for AlphaFactors {
    fn default() -> Self {
        AlphaFactors {
            d: 1.2,
            e: 1.25,
            p: 1.05,
            l1: 1.7,
            l2: 1.6,
            l3: 1.4,
            l8: 0.0,
        }
    }
}

/// Category choices that determine a set of [`AlphaFactors`].
///
/// The default selection (M2 max, E1 max, prestress max, normal live load,
/// vehicle collision) yields [`AlphaFactors::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaSelection {
    pub material: MaterialType,
    pub dead_bound: Bound,
    pub earth_pressure: EarthPressureType,
    pub earth_bound: Bound,
    pub prestress_bound: Bound,
    pub live_load_span: LiveLoadSpan,
    pub collision: CollisionKind,
}

impl AlphaSelection {
    pub fn alpha_factors(&self) -> AlphaFactors {
        let (l1, l2, l3) = LIVE_LOAD_FACTORS[self.live_load_span as usize];
        AlphaFactors {
            d: self.dead_bound.pick(DEAD_LOAD_FACTORS[self.material as usize]),
            e: self.earth_bound.pick(EARTH_PRESSURE_FACTORS[self.earth_pressure as usize]),
            p: self.prestress_bound.pick(PRESTRESS_FACTORS),
            l1,
            l2,
            l3,
            l8: match self.collision {
                CollisionKind::Vehicle => 0.0,
                CollisionKind::Vessel => 0.5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_matches_default_alphas() {
        assert_eq!(AlphaSelection::default().alpha_factors(), AlphaFactors::default());
    }

    #[test]
    fn test_dead_load_table() {
        let min = |material| {
            AlphaSelection {
                material,
                dead_bound: Bound::Min,
                ..AlphaSelection::default()
            }
            .alpha_factors()
            .d
        };
        assert_eq!(min(MaterialType::M1), 0.95);
        assert_eq!(min(MaterialType::M3), 0.65);
        assert_eq!(min(MaterialType::M6), 0.8);

        let max = AlphaSelection {
            material: MaterialType::M4,
            ..AlphaSelection::default()
        };
        assert_eq!(max.alpha_factors().d, 1.25);
    }

    #[test]
    fn test_earth_prestress_and_collision() {
        let selection = AlphaSelection {
            earth_pressure: EarthPressureType::E5,
            earth_bound: Bound::Min,
            prestress_bound: Bound::Min,
            collision: CollisionKind::Vessel,
            ..AlphaSelection::default()
        };
        let alphas = selection.alpha_factors();
        assert_eq!(alphas.e, 0.9);
        assert_eq!(alphas.p, 0.95);
        assert_eq!(alphas.l8, 0.5);
    }

    #[test]
    fn test_live_load_spans() {
        let alphas = AlphaSelection {
            live_load_span: LiveLoadSpan::SpecialAloneOther,
            ..AlphaSelection::default()
        }
        .alpha_factors();
        assert_eq!((alphas.l1, alphas.l2, alphas.l3), (1.35, 1.25, 1.1));
    }

    #[test]
    fn test_code_parsing() {
        assert_eq!("m5".parse::<MaterialType>().unwrap(), MaterialType::M5);
        assert_eq!("E3".parse::<EarthPressureType>().unwrap(), EarthPressureType::E3);
        assert_eq!(
            "Special_mixed_other".parse::<LiveLoadSpan>().unwrap(),
            LiveLoadSpan::SpecialMixedOther
        );
        assert!("M7".parse::<MaterialType>().is_err());
    }

    #[test]
    fn test_selection_serialization_uses_codes() {
        let json = serde_json::to_string(&AlphaSelection::default()).unwrap();
        assert!(json.contains(r#""material":"M2""#));
        assert!(json.contains(r#""live_load_span":"Normal""#));
        let parsed: AlphaSelection = serde_json::from_str(r#"{"material":"M3"}"#).unwrap();
        assert_eq!(parsed.material, MaterialType::M3);
        assert_eq!(parsed.dead_bound, Bound::Max);
    }
}
