//! # Diagrams
//!
//! Plot-ready data for result diagrams and the beam schematic. Nothing here
//! draws: the report module turns these into Typst graphics, and other
//! front ends can plot them however they like.

use serde::{Deserialize, Serialize};

use crate::beam_data::{BeamLoad, RestraintKind, StructuredBeamData};
use crate::errors::{CalcError, CalcResult};
use crate::extraction::{Direction, ResultType};
use crate::loads::ResultArray;
use crate::units::UnitSystem;

/// Vertical extent of the schematic relative to the largest load
const SCHEMATIC_HEADROOM: f64 = 1.4;

/// A value and where along the beam it occurs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extreme {
    pub value: f64,
    pub position: f64,
}

/// A result diagram: one quantity along the beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Unit label of the plotted values
    pub units: String,
    pub positions: Vec<f64>,
    pub values: Vec<f64>,
    pub max: Extreme,
    pub min: Extreme,
}

impl Diagram {
    /// # Example
    /// ```
    /// use beam_core::diagram::Diagram;
    /// use beam_core::extraction::{Direction, ResultType};
    /// use beam_core::loads::ResultArray;
    /// use beam_core::units::UnitSystem;
    ///
    /// let array = ResultArray::new(vec![0.0, 500.0, 1000.0], vec![0.0, 125.0, 0.0]).unwrap();
    /// let diagram = Diagram::new(&array, ResultType::Moment, Direction::Mz, UnitSystem::default()).unwrap();
    /// assert_eq!(diagram.title, "Moment (Mz) in beam [Nmm]");
    /// assert_eq!(diagram.max.position, 500.0);
    /// ```
    pub fn new(array: &ResultArray, result_type: ResultType, direction: Direction, units: UnitSystem) -> CalcResult<Self> {
        let (max, min) = match (array.max(), array.min()) {
            (Some((max_v, max_x)), Some((min_v, min_x))) => (
                Extreme { value: max_v, position: max_x },
                Extreme { value: min_v, position: min_x },
            ),
            _ => return Err(CalcError::invalid_input("array", "empty", "nothing to plot")),
        };

        let unit = result_units(result_type, units);
        let name = result_type.display_name();

        Ok(Diagram {
            title: format!("{} ({}) in beam [{}]", name, direction, unit),
            x_label: format!("Beam length [{}]", units.length_label()),
            y_label: format!("{} [{}]", name, unit),
            units: unit,
            positions: array.positions.clone(),
            values: array.values.clone(),
            max,
            min,
        })
    }

    /// Horizontal extent `(first, last)` of the stations
    pub fn span(&self) -> (f64, f64) {
        (
            self.positions.first().copied().unwrap_or(0.0),
            self.positions.last().copied().unwrap_or(0.0),
        )
    }
}

/// Unit label for values of `result_type`.
pub fn result_units(result_type: ResultType, units: UnitSystem) -> String {
    match result_type {
        ResultType::Shear | ResultType::Axial => units.force_label().to_string(),
        ResultType::Moment | ResultType::Torque => units.moment_label(),
        ResultType::Deflection => units.length_label().to_string(),
    }
}

// ============================================================================
// Beam schematic
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchematicSupport {
    pub position: f64,
    pub kind: RestraintKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchematicLoad {
    Point {
        position: f64,
        magnitude: f64,
        case: String,
    },
    Distributed {
        start: f64,
        end: f64,
        start_magnitude: f64,
        end_magnitude: f64,
        case: String,
    },
}

/// The beam line with its supports and loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSchematic {
    pub name: String,
    pub length: f64,
    pub supports: Vec<SchematicSupport>,
    pub loads: Vec<SchematicLoad>,
    /// Plot window spans `[-y_extent, y_extent]` vertically
    pub y_extent: f64,
}

impl BeamSchematic {
    /// Loads in moment directions are not drawn.
    pub fn from_beam(data: &StructuredBeamData) -> Self {
        let loads: Vec<SchematicLoad> = data
            .loads
            .iter()
            .filter(|load| load.direction().is_force())
            .map(|load| match load {
                BeamLoad::Point {
                    magnitude,
                    location,
                    case,
                    ..
                } => SchematicLoad::Point {
                    position: *location,
                    magnitude: *magnitude,
                    case: case.clone(),
                },
                BeamLoad::Distributed {
                    start_magnitude,
                    end_magnitude,
                    start_location,
                    end_location,
                    case,
                    ..
                } => SchematicLoad::Distributed {
                    start: *start_location,
                    end: *end_location,
                    start_magnitude: *start_magnitude,
                    end_magnitude: *end_magnitude,
                    case: case.clone(),
                },
            })
            .collect();

        let peak = data
            .loads
            .iter()
            .filter(|load| load.direction().is_force())
            .map(BeamLoad::peak_magnitude)
            .fold(0.0, f64::max);

        let mut supports: Vec<SchematicSupport> = data
            .supports
            .iter()
            .map(|s| SchematicSupport {
                position: s.position,
                kind: s.kind,
            })
            .collect();
        supports.sort_by(|a, b| a.position.total_cmp(&b.position));

        BeamSchematic {
            name: data.name.clone(),
            length: data.attributes.length,
            supports,
            loads,
            // an unloaded beam still needs a window to draw in
            y_extent: if peak > 0.0 { SCHEMATIC_HEADROOM * peak } else { 1.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam_data::BeamAttributes;
    use crate::units::{ForceUnit, LengthUnit};
    use beam_fe::LoadDirection;

    #[test]
    fn test_diagram_labels() {
        let array = ResultArray::new(vec![0.0, 1.0, 2.0], vec![3.0, -4.0, 3.0]).unwrap();
        let units = UnitSystem::new(ForceUnit::KiloNewton, LengthUnit::Meter);

        let shear = Diagram::new(&array, ResultType::Shear, Direction::Fy, units).unwrap();
        assert_eq!(shear.title, "Shear (Fy) in beam [kN]");
        assert_eq!(shear.x_label, "Beam length [m]");
        assert_eq!(shear.y_label, "Shear [kN]");
        // first occurrence
        assert_eq!(shear.max, Extreme { value: 3.0, position: 0.0 });
        assert_eq!(shear.min, Extreme { value: -4.0, position: 1.0 });

        let deflection = Diagram::new(&array, ResultType::Deflection, Direction::Dy, units).unwrap();
        assert_eq!(deflection.units, "m");
        assert_eq!(deflection.span(), (0.0, 2.0));
    }

    #[test]
    fn test_empty_diagram_rejected() {
        let array = ResultArray::new(vec![], vec![]).unwrap();
        assert!(Diagram::new(&array, ResultType::Moment, Direction::Mz, UnitSystem::default()).is_err());
    }

    #[test]
    fn test_schematic_extent() {
        let attrs = BeamAttributes::from_values(&[4800.0, 1.0, 1.0]).unwrap();
        let data = StructuredBeamData::new("Balcony", attrs)
            .with_support(3800.0, RestraintKind::Roller)
            .with_support(1000.0, RestraintKind::Pin)
            .with_load(BeamLoad::point(LoadDirection::Fy, -10000.0, 4800.0, "Live"))
            .with_load(BeamLoad::distributed(LoadDirection::Fy, (30.0, 30.0), (0.0, 4800.0), "Dead"))
            .with_load(BeamLoad::point(LoadDirection::Mz, 99999.0, 0.0, "Live"));

        let schematic = BeamSchematic::from_beam(&data);
        assert!((schematic.y_extent - 14000.0).abs() < 1e-9);
        assert_eq!(schematic.loads.len(), 2);
        assert_eq!(schematic.supports[0].position, 1000.0);

        let bare = BeamSchematic::from_beam(&StructuredBeamData::new("Bare", attrs));
        assert_eq!(bare.y_extent, 1.0);
    }
}
