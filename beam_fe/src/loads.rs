//! Member loads and load combinations.
//!
//! Loads are tagged with a load case name. A [`LoadCombo`] scales cases by
//! signed factors; a case that a combination does not mention contributes
//! nothing to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeError;

/// Case assigned to loads that do not name one
pub const DEFAULT_CASE: &str = "Case 1";

/// Combination registered by `analyze` when the model defines none
pub const DEFAULT_COMBO: &str = "Combo 1";

/// Global direction of a member load.
///
/// Forces act along, and moments about, the global axes. A positive value
/// acts in the positive axis sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadDirection {
    Fx,
    Fy,
    Fz,
    Mx,
    My,
    Mz,
}

impl LoadDirection {
    pub const ALL: [LoadDirection; 6] = [
        LoadDirection::Fx,
        LoadDirection::Fy,
        LoadDirection::Fz,
        LoadDirection::Mx,
        LoadDirection::My,
        LoadDirection::Mz,
    ];

    /// Index of the matching nodal degree of freedom (dx, dy, dz, rx, ry, rz)
    pub fn dof_index(&self) -> usize {
        match self {
            LoadDirection::Fx => 0,
            LoadDirection::Fy => 1,
            LoadDirection::Fz => 2,
            LoadDirection::Mx => 3,
            LoadDirection::My => 4,
            LoadDirection::Mz => 5,
        }
    }

    pub fn is_force(&self) -> bool {
        self.dof_index() < 3
    }

    pub fn code(&self) -> &'static str {
        match self {
            LoadDirection::Fx => "Fx",
            LoadDirection::Fy => "Fy",
            LoadDirection::Fz => "Fz",
            LoadDirection::Mx => "Mx",
            LoadDirection::My => "My",
            LoadDirection::Mz => "Mz",
        }
    }
}

impl fmt::Display for LoadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LoadDirection {
    type Err = FeError;

    /// Accepts `Fy`, `FY` or `fy`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LoadDirection::ALL
            .iter()
            .copied()
            .find(|d| d.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FeError::invalid_argument("direction", format!("unknown load direction '{}'", trimmed)))
    }
}

/// Concentrated force or moment on a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    pub direction: LoadDirection,
    pub magnitude: f64,
    /// Distance from the member's i-node
    pub x: f64,
    pub case: String,
}

impl PointLoad {
    pub fn new(direction: LoadDirection, magnitude: f64, x: f64) -> Self {
        PointLoad {
            direction,
            magnitude,
            x,
            case: DEFAULT_CASE.to_string(),
        }
    }

    /// Assign the load case (builder pattern)
    pub fn case(mut self, case: impl Into<String>) -> Self {
        self.case = case.into();
        self
    }
}

/// Linearly varying line load on a member.
///
/// `x1`/`x2` are distances from the i-node. `None` means the member end, so
/// `DistLoad::new(dir, w, w)` covers the full length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistLoad {
    pub direction: LoadDirection,
    pub w1: f64,
    pub w2: f64,
    pub x1: Option<f64>,
    pub x2: Option<f64>,
    pub case: String,
}

impl DistLoad {
    pub fn new(direction: LoadDirection, w1: f64, w2: f64) -> Self {
        DistLoad {
            direction,
            w1,
            w2,
            x1: None,
            x2: None,
            case: DEFAULT_CASE.to_string(),
        }
    }

    /// Restrict the load to `[x1, x2]` (builder pattern)
    pub fn between(mut self, x1: f64, x2: f64) -> Self {
        self.x1 = Some(x1);
        self.x2 = Some(x2);
        self
    }

    /// Assign the load case (builder pattern)
    pub fn case(mut self, case: impl Into<String>) -> Self {
        self.case = case.into();
        self
    }

    /// Resolved extent on a member of the given length
    pub fn extent(&self, length: f64) -> (f64, f64) {
        (self.x1.unwrap_or(0.0), self.x2.unwrap_or(length))
    }
}

/// Named, ordered set of case factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombo {
    pub name: String,
    pub factors: Vec<(String, f64)>,
}

impl LoadCombo {
    pub fn new(name: impl Into<String>) -> Self {
        LoadCombo {
            name: name.into(),
            factors: Vec::new(),
        }
    }

    /// Set the factor for a case, replacing any earlier value (builder pattern)
    pub fn with_factor(mut self, case: impl Into<String>, factor: f64) -> Self {
        let case = case.into();
        match self.factors.iter_mut().find(|(c, _)| *c == case) {
            Some(entry) => entry.1 = factor,
            None => self.factors.push((case, factor)),
        }
        self
    }

    /// Factor applied to `case` (0.0 when the combination does not mention it)
    pub fn factor(&self, case: &str) -> f64 {
        self.factors
            .iter()
            .find(|(c, _)| c == case)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("Fy".parse::<LoadDirection>().unwrap(), LoadDirection::Fy);
        assert_eq!(" MZ ".parse::<LoadDirection>().unwrap(), LoadDirection::Mz);
        assert!("Fq".parse::<LoadDirection>().is_err());
        assert!(LoadDirection::Fz.is_force());
        assert!(!LoadDirection::Mx.is_force());
    }

    #[test]
    fn test_combo_factor_defaults_to_zero() {
        let combo = LoadCombo::new("ULS").with_factor("D", 1.25).with_factor("L", 1.5);
        assert_eq!(combo.factor("D"), 1.25);
        assert_eq!(combo.factor("W"), 0.0);
    }

    #[test]
    fn test_combo_factor_replaced() {
        let combo = LoadCombo::new("C").with_factor("D", 1.0).with_factor("D", 0.9);
        assert_eq!(combo.factors.len(), 1);
        assert_eq!(combo.factor("D"), 0.9);
    }

    #[test]
    fn test_dist_load_extent_defaults_to_member() {
        let full = DistLoad::new(LoadDirection::Fy, -2.0, -2.0);
        assert_eq!(full.extent(12.0), (0.0, 12.0));
        let part = full.between(3.0, 4.5);
        assert_eq!(part.extent(12.0), (3.0, 4.5));
        assert_eq!(part.case, DEFAULT_CASE);
    }
}
