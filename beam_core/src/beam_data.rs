//! # Structured Beam Data
//!
//! The input record for a single straight beam: section and material
//! attributes, supports and loads by case. Serialized field names match the
//! beam JSON format (`"L"`, `"Iz"`, `"Start Magnitude"`, `"Type": "Dist"`).
//!
//! ## Example
//!
//! ```rust
//! use beam_core::beam_data::{BeamAttributes, BeamLoad, RestraintKind, StructuredBeamData};
//! use beam_fe::LoadDirection;
//!
//! let attributes = BeamAttributes::from_values(&[4800.0, 24500.0, 1.2e9]).unwrap();
//! let beam = StructuredBeamData::new("Balcony transfer", attributes)
//!     .with_support(1000.0, RestraintKind::Pin)
//!     .with_support(3800.0, RestraintKind::Roller)
//!     .with_load(BeamLoad::point(LoadDirection::Fy, -10000.0, 4800.0, "Live"));
//!
//! assert!(beam.validate().is_ok());
//! assert_eq!(beam.attributes.nu, 1.0);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use beam_fe::LoadDirection;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Restraints and supports
// ============================================================================

/// Fixity pattern at a support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestraintKind {
    #[serde(rename = "P")]
    Pin,
    #[serde(rename = "R")]
    Roller,
    #[serde(rename = "F")]
    Fixed,
    #[serde(rename = "Free")]
    Free,
}

impl RestraintKind {
    pub const ALL: [RestraintKind; 4] = [
        RestraintKind::Pin,
        RestraintKind::Roller,
        RestraintKind::Fixed,
        RestraintKind::Free,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RestraintKind::Pin => "P",
            RestraintKind::Roller => "R",
            RestraintKind::Fixed => "F",
            RestraintKind::Free => "Free",
        }
    }

    /// Restrained DOFs in `[dx, dy, dz, rx, ry, rz]` order
    pub fn fixity(&self) -> [bool; 6] {
        match self {
            RestraintKind::Pin => [true, true, true, true, false, false],
            RestraintKind::Roller => [false, true, true, false, false, false],
            RestraintKind::Fixed => [true; 6],
            RestraintKind::Free => [false; 6],
        }
    }
}

impl fmt::Display for RestraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for RestraintKind {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RestraintKind::ALL
            .iter()
            .copied()
            .find(|k| k.code() == s.trim())
            .ok_or_else(|| CalcError::invalid_input("support", s, "expected one of P, R, F, Free"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Support {
    pub position: f64,
    pub kind: RestraintKind,
}

/// Supports as a JSON object of `"position": "kind"`.
mod support_map {
    use super::*;
    use serde::ser::SerializeMap;

    pub fn serialize<S: Serializer>(supports: &[Support], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(supports.len()))?;
        for support in supports {
            map.serialize_entry(&support.position.to_string(), &support.kind)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Support>, D::Error> {
        let raw = BTreeMap::<String, RestraintKind>::deserialize(deserializer)?;
        let mut supports = raw
            .into_iter()
            .map(|(key, kind)| {
                key.trim()
                    .parse::<f64>()
                    .map(|position| Support { position, kind })
                    .map_err(|_| serde::de::Error::custom(format!("support position '{}' is not a number", key)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        supports.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(supports)
    }
}

// ============================================================================
// Loads
// ============================================================================

/// A load on the beam, belonging to one load case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum BeamLoad {
    #[serde(rename = "Point", alias = "POINT")]
    Point {
        #[serde(rename = "Direction")]
        direction: LoadDirection,
        #[serde(rename = "Magnitude")]
        magnitude: f64,
        #[serde(rename = "Location")]
        location: f64,
        #[serde(rename = "Case")]
        case: String,
    },

    #[serde(rename = "Dist", alias = "DIST", alias = "Distributed")]
    Distributed {
        #[serde(rename = "Direction")]
        direction: LoadDirection,
        #[serde(rename = "Start Magnitude")]
        start_magnitude: f64,
        #[serde(rename = "End Magnitude")]
        end_magnitude: f64,
        #[serde(rename = "Start Location")]
        start_location: f64,
        #[serde(rename = "End Location")]
        end_location: f64,
        #[serde(rename = "Case")]
        case: String,
    },
}

impl BeamLoad {
    pub fn point(direction: LoadDirection, magnitude: f64, location: f64, case: impl Into<String>) -> Self {
        BeamLoad::Point {
            direction,
            magnitude,
            location,
            case: case.into(),
        }
    }

    pub fn distributed(
        direction: LoadDirection,
        magnitudes: (f64, f64),
        locations: (f64, f64),
        case: impl Into<String>,
    ) -> Self {
        BeamLoad::Distributed {
            direction,
            start_magnitude: magnitudes.0,
            end_magnitude: magnitudes.1,
            start_location: locations.0,
            end_location: locations.1,
            case: case.into(),
        }
    }

    pub fn case(&self) -> &str {
        match self {
            BeamLoad::Point { case, .. } | BeamLoad::Distributed { case, .. } => case,
        }
    }

    pub fn direction(&self) -> LoadDirection {
        match self {
            BeamLoad::Point { direction, .. } | BeamLoad::Distributed { direction, .. } => *direction,
        }
    }

    /// Largest absolute magnitude
    pub fn peak_magnitude(&self) -> f64 {
        match self {
            BeamLoad::Point { magnitude, .. } => magnitude.abs(),
            BeamLoad::Distributed {
                start_magnitude,
                end_magnitude,
                ..
            } => start_magnitude.abs().max(end_magnitude.abs()),
        }
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// Geometric and material properties of the beam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamAttributes {
    #[serde(rename = "L")]
    pub length: f64,
    #[serde(rename = "E")]
    pub e: f64,
    #[serde(rename = "Iz")]
    pub iz: f64,
    #[serde(rename = "Iy", default = "one")]
    pub iy: f64,
    #[serde(rename = "A", default = "one")]
    pub a: f64,
    #[serde(rename = "J", default = "one")]
    pub j: f64,
    #[serde(default = "one")]
    pub nu: f64,
    #[serde(default = "one")]
    pub rho: f64,
}

fn one() -> f64 {
    1.0
}

impl BeamAttributes {
    /// Build from the positional list `[L, E, Iz, Iy, A, J, nu, rho]`.
    ///
    /// L, E and Iz are required; missing trailing values default to 1.0.
    /// Extra values are ignored.
    pub fn from_values(values: &[f64]) -> CalcResult<Self> {
        if values.len() < 3 {
            return Err(CalcError::configuration(
                "attributes",
                format!("{:?}", values),
                "L, E and Iz are required",
            ));
        }
        let at = |i: usize| values.get(i).copied().unwrap_or(1.0);
        Ok(BeamAttributes {
            length: values[0],
            e: values[1],
            iz: values[2],
            iy: at(3),
            a: at(4),
            j: at(5),
            nu: at(6),
            rho: at(7),
        })
    }
}

// ============================================================================
// Beam record
// ============================================================================

/// Everything needed to build a beam model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredBeamData {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(flatten)]
    pub attributes: BeamAttributes,

    #[serde(rename = "Supports", with = "support_map")]
    pub supports: Vec<Support>,

    #[serde(rename = "Loads", default)]
    pub loads: Vec<BeamLoad>,
}

impl StructuredBeamData {
    pub fn new(name: impl Into<String>, attributes: BeamAttributes) -> Self {
        StructuredBeamData {
            name: name.into(),
            attributes,
            supports: Vec::new(),
            loads: Vec::new(),
        }
    }

    /// Add a support (builder pattern)
    pub fn with_support(mut self, position: f64, kind: RestraintKind) -> Self {
        self.supports.push(Support { position, kind });
        self
    }

    /// Add a load (builder pattern)
    pub fn with_load(mut self, load: BeamLoad) -> Self {
        self.loads.push(load);
        self
    }

    /// Restraint at `position`, `Free` when no support is there
    pub fn restraint_at(&self, position: f64) -> RestraintKind {
        self.supports
            .iter()
            .find(|s| s.position == position)
            .map(|s| s.kind)
            .unwrap_or(RestraintKind::Free)
    }

    /// Support positions sorted ascending
    pub fn support_positions(&self) -> Vec<f64> {
        let mut positions: Vec<f64> = self.supports.iter().map(|s| s.position).collect();
        positions.sort_by(f64::total_cmp);
        positions
    }

    /// Distinct case labels in first-use order
    pub fn load_cases(&self) -> Vec<&str> {
        let mut cases: Vec<&str> = Vec::new();
        for load in &self.loads {
            if !cases.contains(&load.case()) {
                cases.push(load.case());
            }
        }
        cases
    }

    /// Check the data can form a valid model.
    pub fn validate(&self) -> CalcResult<()> {
        let attrs = &self.attributes;
        let length = attrs.length;

        if !length.is_finite() || length <= 0.0 {
            return Err(CalcError::configuration("L", length.to_string(), "Beam length must be positive"));
        }
        for (field, value) in [("E", attrs.e), ("Iz", attrs.iz), ("Iy", attrs.iy), ("A", attrs.a), ("J", attrs.j)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::configuration(field, value.to_string(), "must be positive"));
            }
        }

        let within = |x: f64| (0.0..=length).contains(&x);
        for (i, support) in self.supports.iter().enumerate() {
            if !within(support.position) {
                return Err(CalcError::configuration(
                    "Supports",
                    support.position.to_string(),
                    format!("support lies outside the beam [0, {}]", length),
                ));
            }
            if self.supports[..i].iter().any(|s| s.position == support.position) {
                return Err(CalcError::configuration(
                    "Supports",
                    support.position.to_string(),
                    "duplicate support position",
                ));
            }
        }

        for load in &self.loads {
            match load {
                BeamLoad::Point { location, .. } => {
                    if !within(*location) {
                        return Err(CalcError::configuration(
                            "Location",
                            location.to_string(),
                            format!("point load lies outside the beam [0, {}]", length),
                        ));
                    }
                }
                BeamLoad::Distributed {
                    direction,
                    start_location,
                    end_location,
                    ..
                } => {
                    if !direction.is_force() {
                        return Err(CalcError::configuration(
                            "Direction",
                            direction.to_string(),
                            "distributed loads must act along Fx, Fy or Fz",
                        ));
                    }
                    if !within(*start_location) || !within(*end_location) {
                        return Err(CalcError::configuration(
                            "Location",
                            format!("{}..{}", start_location, end_location),
                            format!("distributed load lies outside the beam [0, {}]", length),
                        ));
                    }
                    if start_location > end_location {
                        return Err(CalcError::configuration(
                            "Start Location",
                            start_location.to_string(),
                            "start location is past the end location",
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BALCONY_JSON: &str = r#"{
        "Name": "Balcony transfer",
        "L": 4800.0, "E": 24500.0, "Iz": 1200000000.0,
        "Iy": 1.0, "A": 1.0, "J": 1.0, "nu": 1.0, "rho": 1.0,
        "Supports": {"1000.0": "P", "3800.0": "R"},
        "Loads": [
            {"Type": "Point", "Direction": "Fy", "Magnitude": -10000.0, "Location": 4800.0, "Case": "Live"},
            {"Type": "Dist", "Direction": "Fy", "Start Magnitude": 30.0, "End Magnitude": 30.0,
             "Start Location": 0.0, "End Location": 4800.0, "Case": "Dead"}
        ]
    }"#;

    #[test]
    fn test_parse_beam_json() {
        let beam: StructuredBeamData = serde_json::from_str(BALCONY_JSON).unwrap();
        assert_eq!(beam.name, "Balcony transfer");
        assert_eq!(beam.attributes.iz, 1.2e9);
        assert_eq!(
            beam.supports,
            vec![
                Support { position: 1000.0, kind: RestraintKind::Pin },
                Support { position: 3800.0, kind: RestraintKind::Roller },
            ]
        );
        assert_eq!(beam.loads[0], BeamLoad::point(LoadDirection::Fy, -10000.0, 4800.0, "Live"));
        assert_eq!(
            beam.loads[1],
            BeamLoad::distributed(LoadDirection::Fy, (30.0, 30.0), (0.0, 4800.0), "Dead")
        );
        assert_eq!(beam.load_cases(), vec!["Live", "Dead"]);
        assert!(beam.validate().is_ok());
    }

    #[test]
    fn test_missing_optional_attributes_default_to_one() {
        let beam: StructuredBeamData = serde_json::from_str(
            r#"{"Name": "B", "L": 10.0, "E": 1.0, "Iz": 2.0, "Supports": {"0": "F"}}"#,
        )
        .unwrap();
        assert_eq!(beam.attributes.rho, 1.0);
        assert_eq!(beam.attributes.iy, 1.0);
        assert!(beam.loads.is_empty());
    }

    #[test]
    fn test_serialized_field_names() {
        let beam: StructuredBeamData = serde_json::from_str(BALCONY_JSON).unwrap();
        let json = serde_json::to_string(&beam).unwrap();
        assert!(json.contains(r#""Supports":{"1000":"P","3800":"R"}"#));
        assert!(json.contains(r#""Type":"Dist""#));
        assert!(json.contains(r#""Start Magnitude":30.0"#));
    }

    #[test]
    fn test_attributes_from_values() {
        let full = BeamAttributes::from_values(&[20e3, 200e3, 6480e6, 390e6, 43900.0, 11900e3, 0.3]).unwrap();
        assert_eq!(full.j, 11900e3);
        assert_eq!(full.nu, 0.3);
        assert_eq!(full.rho, 1.0);

        let short = BeamAttributes::from_values(&[4800.0, 24500.0, 1200000000.0, 10.0]).unwrap();
        assert_eq!(short.iy, 10.0);
        assert_eq!((short.a, short.j, short.nu, short.rho), (1.0, 1.0, 1.0, 1.0));

        let err = BeamAttributes::from_values(&[4800.0, 24500.0]).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_restraint_fixity() {
        assert_eq!(RestraintKind::Pin.fixity(), [true, true, true, true, false, false]);
        assert_eq!(RestraintKind::Roller.fixity(), [false, true, true, false, false, false]);
        assert_eq!("Free".parse::<RestraintKind>().unwrap(), RestraintKind::Free);
        assert!("X".parse::<RestraintKind>().is_err());
    }

    #[test]
    fn test_validation_errors() {
        let attrs = BeamAttributes::from_values(&[100.0, 1.0, 1.0]).unwrap();
        let base = StructuredBeamData::new("B", attrs).with_support(0.0, RestraintKind::Pin);

        let bad_length = StructuredBeamData::new("B", BeamAttributes { length: 0.0, ..attrs });
        assert_eq!(bad_length.validate().unwrap_err().error_code(), "CONFIGURATION_ERROR");

        let outside = base.clone().with_support(120.0, RestraintKind::Roller);
        assert!(outside.validate().is_err());

        let duplicate = base.clone().with_support(0.0, RestraintKind::Roller);
        assert!(duplicate.validate().is_err());

        let reversed = base
            .clone()
            .with_load(BeamLoad::distributed(LoadDirection::Fy, (1.0, 1.0), (60.0, 20.0), "D"));
        assert!(reversed.validate().is_err());

        let moment_line = base
            .clone()
            .with_load(BeamLoad::distributed(LoadDirection::Mz, (1.0, 1.0), (0.0, 20.0), "D"));
        assert!(moment_line.validate().is_err());

        let past_end = base.with_load(BeamLoad::point(LoadDirection::Fy, 1.0, 100.5, "L"));
        assert!(past_end.validate().is_err());
    }
}
