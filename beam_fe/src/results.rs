//! Member internal forces and deflections.
//!
//! ## Sign conventions
//!
//! Internal forces are taken on the part of the member left of the cut:
//!
//! - Shear `Fy`/`Fz`: resultant of the forces left of the cut along that axis
//! - Moment `Mz`: sagging positive (positive for a simply supported beam
//!   under a load in -Y)
//! - Moment `My`: positive when it compresses the +Z face's opposite side,
//!   i.e. `d²w/dx² = -My/EIy`
//! - Axial: tension positive
//! - Torque: moment about X at the cut, from the right-hand segment
//! - Deflections: along the global axes
//!
//! At a mesh point carrying a concentrated load the value just to the right
//! is reported, except at the member end where the value is taken from the
//! left.

use serde::{Deserialize, Serialize};

use crate::error::{FeError, FeResult};
use crate::math::ElementProps;
use crate::model::{FeModel, POSITION_TOLERANCE};

/// Sub-divisions per mesh segment when searching for extremes
const EXTREME_SAMPLES: usize = 24;

/// Global axis selector for shear, moment and deflection queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A result quantity along a member.
///
/// `Shear(Axis::X)` is the axial force and `Moment(Axis::X)` the torque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberQuantity {
    Shear(Axis),
    Moment(Axis),
    Axial,
    Torque,
    Deflection(Axis),
}

/// Values of a quantity at stations along a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSamples {
    /// Distance from the i-node
    pub x: Vec<f64>,
    pub values: Vec<f64>,
}

/// `n_points` equally spaced stations over `[0, length]`. The first is
/// exactly 0 and the last exactly `length`.
pub fn stations(length: f64, n_points: usize) -> FeResult<Vec<f64>> {
    if n_points < 2 {
        return Err(FeError::invalid_argument(
            "n_points",
            format!("at least 2 stations are required, got {}", n_points),
        ));
    }
    let last = n_points - 1;
    Ok((0..n_points)
        .map(|i| if i == last { length } else { length * i as f64 / last as f64 })
        .collect())
}

/// One mesh element of a solved member.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    /// Start position on the member
    pub(crate) x0: f64,
    pub(crate) length: f64,
    /// Force the i-node exerts on the element
    pub(crate) f_i: [f64; 6],
    /// Displacement of the i-node
    pub(crate) d_i: [f64; 6],
    /// Distributed intensity along X, Y, Z at the start and end
    pub(crate) w1: [f64; 3],
    pub(crate) w2: [f64; 3],
}

impl Segment {
    fn slope(&self, axis: usize) -> f64 {
        if self.length > 0.0 {
            (self.w2[axis] - self.w1[axis]) / self.length
        } else {
            0.0
        }
    }

    /// Resultant of forces along `axis` acting on `[0, xi]`
    fn left_force(&self, axis: usize, xi: f64) -> f64 {
        self.f_i[axis] + self.w1[axis] * xi + self.slope(axis) * xi * xi / 2.0
    }

    fn moment_z(&self, xi: f64) -> f64 {
        -self.f_i[5] + xi * self.f_i[1] + self.w1[1] * xi * xi / 2.0 + self.slope(1) * xi.powi(3) / 6.0
    }

    fn moment_y(&self, xi: f64) -> f64 {
        -self.f_i[4] - xi * self.f_i[2] - self.w1[2] * xi * xi / 2.0 - self.slope(2) * xi.powi(3) / 6.0
    }

    fn deflection(&self, axis: Axis, xi: f64, p: &ElementProps) -> f64 {
        let (x2, x3, x4, x5) = (xi * xi, xi.powi(3), xi.powi(4), xi.powi(5));
        match axis {
            Axis::X => {
                let stretch = self.f_i[0] * xi + self.w1[0] * x2 / 2.0 + self.slope(0) * x3 / 6.0;
                self.d_i[0] - stretch / (p.e * p.a)
            }
            Axis::Y => {
                let bending = -self.f_i[5] * x2 / 2.0
                    + self.f_i[1] * x3 / 6.0
                    + self.w1[1] * x4 / 24.0
                    + self.slope(1) * x5 / 120.0;
                self.d_i[1] + self.d_i[5] * xi + bending / (p.e * p.iz)
            }
            Axis::Z => {
                let bending = self.f_i[4] * x2 / 2.0
                    + self.f_i[2] * x3 / 6.0
                    + self.w1[2] * x4 / 24.0
                    + self.slope(2) * x5 / 120.0;
                self.d_i[2] - self.d_i[4] * xi + bending / (p.e * p.iy)
            }
        }
    }

    fn evaluate(&self, quantity: MemberQuantity, xi: f64, p: &ElementProps) -> f64 {
        match quantity {
            MemberQuantity::Axial | MemberQuantity::Shear(Axis::X) => -self.left_force(0, xi),
            MemberQuantity::Shear(Axis::Y) => self.left_force(1, xi),
            MemberQuantity::Shear(Axis::Z) => self.left_force(2, xi),
            MemberQuantity::Torque | MemberQuantity::Moment(Axis::X) => -self.f_i[3],
            MemberQuantity::Moment(Axis::Y) => self.moment_y(xi),
            MemberQuantity::Moment(Axis::Z) => self.moment_z(xi),
            MemberQuantity::Deflection(axis) => self.deflection(axis, xi, p),
        }
    }
}

/// Result queries for one solved member, obtained from
/// [`FeModel::member_results`].
pub struct MemberResults<'a> {
    model: &'a FeModel,
    index: usize,
    length: f64,
    props: ElementProps,
}

impl<'a> MemberResults<'a> {
    pub(crate) fn new(model: &'a FeModel, index: usize, length: f64, props: ElementProps) -> Self {
        MemberResults {
            model,
            index,
            length,
            props,
        }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    fn segments(&self, combo: &str) -> FeResult<&'a [Segment]> {
        let solved = self.model.combo_solution(combo)?;
        Ok(&solved.segments[self.index])
    }

    /// Value of `quantity` at distance `x` from the i-node.
    pub fn value(&self, quantity: MemberQuantity, x: f64, combo: &str) -> FeResult<f64> {
        let tol = self.length * POSITION_TOLERANCE;
        if !(x >= -tol && x <= self.length + tol) {
            return Err(FeError::invalid_argument(
                "x",
                format!("{} lies outside the member (length {})", x, self.length),
            ));
        }
        let segments = self.segments(combo)?;
        let segment = segments
            .iter()
            .find(|s| x < s.x0 + s.length - tol)
            .or_else(|| segments.last())
            .ok_or(FeError::NotAnalyzed)?;
        let xi = (x - segment.x0).clamp(0.0, segment.length);
        Ok(segment.evaluate(quantity, xi, &self.props))
    }

    /// Values of `quantity` at `n_points` equally spaced stations.
    pub fn samples(&self, quantity: MemberQuantity, n_points: usize, combo: &str) -> FeResult<ResultSamples> {
        let x = stations(self.length, n_points)?;
        let values = x
            .iter()
            .map(|&xi| self.value(quantity, xi, combo))
            .collect::<FeResult<Vec<f64>>>()?;
        Ok(ResultSamples { x, values })
    }

    /// Largest and smallest value of `quantity`, searched on a fine grid over
    /// every mesh segment including both segment ends.
    pub fn extremes(&self, quantity: MemberQuantity, combo: &str) -> FeResult<(f64, f64)> {
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        for segment in self.segments(combo)? {
            for k in 0..=EXTREME_SAMPLES {
                let xi = segment.length * k as f64 / EXTREME_SAMPLES as f64;
                let v = segment.evaluate(quantity, xi, &self.props);
                max = max.max(v);
                min = min.min(v);
            }
        }
        Ok((max, min))
    }

    pub fn shear(&self, axis: Axis, x: f64, combo: &str) -> FeResult<f64> {
        self.value(MemberQuantity::Shear(axis), x, combo)
    }

    pub fn moment(&self, axis: Axis, x: f64, combo: &str) -> FeResult<f64> {
        self.value(MemberQuantity::Moment(axis), x, combo)
    }

    pub fn axial(&self, x: f64, combo: &str) -> FeResult<f64> {
        self.value(MemberQuantity::Axial, x, combo)
    }

    pub fn torque(&self, x: f64, combo: &str) -> FeResult<f64> {
        self.value(MemberQuantity::Torque, x, combo)
    }

    pub fn deflection(&self, axis: Axis, x: f64, combo: &str) -> FeResult<f64> {
        self.value(MemberQuantity::Deflection(axis), x, combo)
    }

    pub fn shear_array(&self, axis: Axis, n_points: usize, combo: &str) -> FeResult<ResultSamples> {
        self.samples(MemberQuantity::Shear(axis), n_points, combo)
    }

    pub fn moment_array(&self, axis: Axis, n_points: usize, combo: &str) -> FeResult<ResultSamples> {
        self.samples(MemberQuantity::Moment(axis), n_points, combo)
    }

    pub fn axial_array(&self, n_points: usize, combo: &str) -> FeResult<ResultSamples> {
        self.samples(MemberQuantity::Axial, n_points, combo)
    }

    pub fn torque_array(&self, n_points: usize, combo: &str) -> FeResult<ResultSamples> {
        self.samples(MemberQuantity::Torque, n_points, combo)
    }

    pub fn deflection_array(&self, axis: Axis, n_points: usize, combo: &str) -> FeResult<ResultSamples> {
        self.samples(MemberQuantity::Deflection(axis), n_points, combo)
    }

    pub fn max_moment(&self, axis: Axis, combo: &str) -> FeResult<f64> {
        Ok(self.extremes(MemberQuantity::Moment(axis), combo)?.0)
    }

    pub fn min_moment(&self, axis: Axis, combo: &str) -> FeResult<f64> {
        Ok(self.extremes(MemberQuantity::Moment(axis), combo)?.1)
    }

    pub fn max_shear(&self, axis: Axis, combo: &str) -> FeResult<f64> {
        Ok(self.extremes(MemberQuantity::Shear(axis), combo)?.0)
    }

    pub fn min_shear(&self, axis: Axis, combo: &str) -> FeResult<f64> {
        Ok(self.extremes(MemberQuantity::Shear(axis), combo)?.1)
    }

    pub fn max_deflection(&self, axis: Axis, combo: &str) -> FeResult<f64> {
        Ok(self.extremes(MemberQuantity::Deflection(axis), combo)?.0)
    }

    pub fn min_deflection(&self, axis: Axis, combo: &str) -> FeResult<f64> {
        Ok(self.extremes(MemberQuantity::Deflection(axis), combo)?.1)
    }
}
