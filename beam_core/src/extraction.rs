//! # Result Extraction
//!
//! Samples a solved single-member beam model into one [`ResultArray`] per
//! load combination, ready for the envelope engine.
//!
//! ## Valid directions
//!
//! | Result type              | Directions       |
//! |--------------------------|------------------|
//! | shear, axial, torque     | `Fx`, `Fy`, `Fz` |
//! | moment                   | `Mx`, `My`, `Mz` |
//! | deflection               | `dx`, `dy`, `dz` |
//!
//! Shear in `Fx` is the axial force and moment about `Mx` is the torque.
//! Axial force and torque have a single value at each station, so the force
//! axis given with them is not used.

use std::fmt;
use std::str::FromStr;

use beam_fe::{Axis, FeModel, LoadDirection, MemberQuantity};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::loads::{ComboArrays, ResultArray};

/// Stations sampled along the beam unless a caller asks otherwise
pub const DEFAULT_POINTS: usize = 500;

// ============================================================================
// Selectors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Shear,
    Moment,
    Axial,
    Torque,
    Deflection,
}

impl ResultType {
    pub const ALL: [ResultType; 5] = [
        ResultType::Shear,
        ResultType::Moment,
        ResultType::Axial,
        ResultType::Torque,
        ResultType::Deflection,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ResultType::Shear => "shear",
            ResultType::Moment => "moment",
            ResultType::Axial => "axial",
            ResultType::Torque => "torque",
            ResultType::Deflection => "deflection",
        }
    }

    /// Capitalised name for titles
    pub fn display_name(&self) -> &'static str {
        match self {
            ResultType::Shear => "Shear",
            ResultType::Moment => "Moment",
            ResultType::Axial => "Axial",
            ResultType::Torque => "Torque",
            ResultType::Deflection => "Deflection",
        }
    }

    pub fn valid_directions(&self) -> &'static [Direction] {
        match self {
            ResultType::Shear | ResultType::Axial | ResultType::Torque => &[Direction::Fx, Direction::Fy, Direction::Fz],
            ResultType::Moment => &[Direction::Mx, Direction::My, Direction::Mz],
            ResultType::Deflection => &[Direction::Dx, Direction::Dy, Direction::Dz],
        }
    }

    /// Resolve a direction into the member quantity to sample.
    pub fn quantity(&self, direction: Direction) -> CalcResult<MemberQuantity> {
        if !self.valid_directions().contains(&direction) {
            return Err(CalcError::InvalidDirection {
                result_type: self.code().to_string(),
                direction: direction.code().to_string(),
                valid: self
                    .valid_directions()
                    .iter()
                    .map(|d| d.code())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let quantity = match (self, direction) {
            (ResultType::Shear, Direction::Fx) => MemberQuantity::Axial,
            (ResultType::Shear, d) => MemberQuantity::Shear(d.axis()),
            (ResultType::Moment, Direction::Mx) => MemberQuantity::Torque,
            (ResultType::Moment, d) => MemberQuantity::Moment(d.axis()),
            (ResultType::Axial, _) => MemberQuantity::Axial,
            (ResultType::Torque, _) => MemberQuantity::Torque,
            (ResultType::Deflection, d) => MemberQuantity::Deflection(d.axis()),
        };
        Ok(quantity)
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ResultType {
    type Err = CalcError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ResultType::ALL
            .iter()
            .copied()
            .find(|r| r.code() == wanted)
            .ok_or_else(|| {
                CalcError::invalid_input("result_type", s, "expected shear, moment, axial, torque or deflection")
            })
    }
}

/// Force, moment or displacement direction for result queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Fx,
    Fy,
    Fz,
    Mx,
    My,
    Mz,
    #[serde(rename = "dx")]
    Dx,
    #[serde(rename = "dy")]
    Dy,
    #[serde(rename = "dz")]
    Dz,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::Fx,
        Direction::Fy,
        Direction::Fz,
        Direction::Mx,
        Direction::My,
        Direction::Mz,
        Direction::Dx,
        Direction::Dy,
        Direction::Dz,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Direction::Fx => "Fx",
            Direction::Fy => "Fy",
            Direction::Fz => "Fz",
            Direction::Mx => "Mx",
            Direction::My => "My",
            Direction::Mz => "Mz",
            Direction::Dx => "dx",
            Direction::Dy => "dy",
            Direction::Dz => "dz",
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Direction::Fx | Direction::Mx | Direction::Dx => Axis::X,
            Direction::Fy | Direction::My | Direction::Dy => Axis::Y,
            Direction::Fz | Direction::Mz | Direction::Dz => Axis::Z,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Direction {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .iter()
            .copied()
            .find(|d| d.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CalcError::invalid_input("direction", s, "expected one of Fx..Fz, Mx..Mz, dx..dz"))
    }
}

// ============================================================================
// Member arrays
// ============================================================================

/// Sample `result_type` in `direction` for every combination, in
/// registration order.
///
/// The model must be solved and hold exactly one member.
pub fn extract_all_combos(
    model: &FeModel,
    result_type: ResultType,
    direction: Direction,
    n_points: usize,
) -> CalcResult<ComboArrays> {
    let quantity = result_type.quantity(direction)?;

    let member = match model.members() {
        [member] => member,
        members => {
            return Err(CalcError::UnsupportedTopology {
                member_count: members.len(),
                reason: "result extraction needs a single-member beam".to_string(),
            })
        }
    };

    if n_points < 2 {
        return Err(CalcError::invalid_input(
            "n_points",
            n_points.to_string(),
            "at least two stations are required",
        ));
    }

    let results = model.member_results(&member.name)?;
    let mut arrays = ComboArrays::new();
    for combo in model.combo_names() {
        let samples = results.samples(quantity, n_points, combo)?;
        arrays.push(combo, ResultArray::new(samples.x, samples.values)?);
    }

    debug!(
        "Extracted {} {} arrays of {} stations from '{}'",
        arrays.len(),
        result_type,
        n_points,
        member.name
    );
    Ok(arrays)
}

// ============================================================================
// Reactions
// ============================================================================

/// Reactions at one node for every combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReactions {
    pub node: String,
    pub position: f64,
    pub direction: LoadDirection,
    /// Whether the node is restrained in `direction`
    pub restrained: bool,
    /// `(combination, reaction)` in registration order
    pub values: Vec<(String, f64)>,
}

impl NodeReactions {
    pub fn get(&self, combo: &str) -> Option<f64> {
        self.values.iter().find(|(c, _)| c == combo).map(|(_, v)| *v)
    }

    /// Largest reaction and the first combination producing it
    pub fn max(&self) -> Option<(&str, f64)> {
        self.extreme(|candidate, best| candidate > best)
    }

    /// Smallest reaction and the first combination producing it
    pub fn min(&self) -> Option<(&str, f64)> {
        self.extreme(|candidate, best| candidate < best)
    }

    fn extreme(&self, better: impl Fn(f64, f64) -> bool) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (combo, value) in &self.values {
            if best.map_or(true, |(_, b)| better(*value, b)) {
                best = Some((combo.as_str(), *value));
            }
        }
        best
    }
}

/// Reaction in `direction` at every node of a solved model, in node order.
pub fn extract_reactions(model: &FeModel, direction: LoadDirection) -> CalcResult<Vec<NodeReactions>> {
    let combos = model.combo_names();
    model
        .nodes()
        .iter()
        .map(|node| -> CalcResult<NodeReactions> {
            let values = combos
                .iter()
                .map(|combo| {
                    model
                        .node_reaction(&node.name, combo)
                        .map(|r| (combo.to_string(), r[direction.dof_index()]))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(NodeReactions {
                node: node.name.clone(),
                position: node.x,
                direction,
                restrained: node.restraints[direction.dof_index()],
                values,
            })
        })
        .collect()
}
