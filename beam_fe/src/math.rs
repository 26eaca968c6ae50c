//! Element matrices and fixed-end forces.
//!
//! Members lie on the global X axis, so local and global coordinates
//! coincide and no transformation matrix is needed. DOF order per node is
//! `[dx, dy, dz, rx, ry, rz]`; an element carries 12 DOFs (i-node then j-node).

use nalgebra::{DMatrix, DVector, SMatrix, SVector};

pub type Mat = DMatrix<f64>;
pub type Vector = DVector<f64>;

/// 12x12 element stiffness matrix
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element end force / displacement vector
pub type Vec12 = SVector<f64, 12>;

/// Section and material stiffness of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementProps {
    pub e: f64,
    pub g: f64,
    pub a: f64,
    pub iy: f64,
    pub iz: f64,
    pub j: f64,
}

/// Euler-Bernoulli 3D frame element stiffness.
pub fn element_stiffness(p: &ElementProps, length: f64) -> Mat12 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = p.e * p.a / l;
    let gj_l = p.g * p.j / l;

    let eiy_l3 = p.e * p.iy / l3;
    let eiy_l2 = p.e * p.iy / l2;
    let eiy_l = p.e * p.iy / l;

    let eiz_l3 = p.e * p.iz / l3;
    let eiz_l2 = p.e * p.iz / l2;
    let eiz_l = p.e * p.iz / l;

    #[rustfmt::skip]
    let data = [
        ea_l,  0.0,           0.0,           0.0,   0.0,          0.0,          -ea_l, 0.0,           0.0,           0.0,   0.0,          0.0,
        0.0,   12.0*eiz_l3,   0.0,           0.0,   0.0,          6.0*eiz_l2,   0.0,   -12.0*eiz_l3,  0.0,           0.0,   0.0,          6.0*eiz_l2,
        0.0,   0.0,           12.0*eiy_l3,   0.0,   -6.0*eiy_l2,  0.0,          0.0,   0.0,           -12.0*eiy_l3,  0.0,   -6.0*eiy_l2,  0.0,
        0.0,   0.0,           0.0,           gj_l,  0.0,          0.0,          0.0,   0.0,           0.0,           -gj_l, 0.0,          0.0,
        0.0,   0.0,           -6.0*eiy_l2,   0.0,   4.0*eiy_l,    0.0,          0.0,   0.0,           6.0*eiy_l2,    0.0,   2.0*eiy_l,    0.0,
        0.0,   6.0*eiz_l2,    0.0,           0.0,   0.0,          4.0*eiz_l,    0.0,   -6.0*eiz_l2,   0.0,           0.0,   0.0,          2.0*eiz_l,
        -ea_l, 0.0,           0.0,           0.0,   0.0,          0.0,          ea_l,  0.0,           0.0,           0.0,   0.0,          0.0,
        0.0,   -12.0*eiz_l3,  0.0,           0.0,   0.0,          -6.0*eiz_l2,  0.0,   12.0*eiz_l3,   0.0,           0.0,   0.0,          -6.0*eiz_l2,
        0.0,   0.0,           -12.0*eiy_l3,  0.0,   6.0*eiy_l2,   0.0,          0.0,   0.0,           12.0*eiy_l3,   0.0,   6.0*eiy_l2,   0.0,
        0.0,   0.0,           0.0,           -gj_l, 0.0,          0.0,          0.0,   0.0,           0.0,           gj_l,  0.0,          0.0,
        0.0,   0.0,           -6.0*eiy_l2,   0.0,   2.0*eiy_l,    0.0,          0.0,   0.0,           6.0*eiy_l2,    0.0,   4.0*eiy_l,    0.0,
        0.0,   6.0*eiz_l2,    0.0,           0.0,   0.0,          2.0*eiz_l,    0.0,   -6.0*eiz_l2,   0.0,           0.0,   0.0,          4.0*eiz_l,
    ];

    Mat12::from_row_slice(&data)
}

/// Fixed-end reactions for a load varying linearly from `w1` at the i-node
/// to `w2` at the j-node, acting along global axis `axis` (0 = X, 1 = Y, 2 = Z).
///
/// The values are the forces the supports exert on a fully fixed element,
/// i.e. opposite in sense to the load.
pub fn fer_linear_load(w1: f64, w2: f64, length: f64, axis: usize) -> Vec12 {
    let l = length;
    let l2 = l * l;

    let mut fer = Vec12::zeros();

    match axis {
        0 => {
            fer[0] = -l * (2.0 * w1 + w2) / 6.0;
            fer[6] = -l * (w1 + 2.0 * w2) / 6.0;
        }
        1 => {
            fer[1] = -l * (7.0 * w1 + 3.0 * w2) / 20.0;
            fer[5] = -l2 * (3.0 * w1 + 2.0 * w2) / 60.0;
            fer[7] = -l * (3.0 * w1 + 7.0 * w2) / 20.0;
            fer[11] = l2 * (2.0 * w1 + 3.0 * w2) / 60.0;
        }
        2 => {
            fer[2] = -l * (7.0 * w1 + 3.0 * w2) / 20.0;
            fer[4] = l2 * (3.0 * w1 + 2.0 * w2) / 60.0;
            fer[8] = -l * (3.0 * w1 + 7.0 * w2) / 20.0;
            fer[10] = -l2 * (2.0 * w1 + 3.0 * w2) / 60.0;
        }
        _ => {}
    }

    fer
}

/// Linear interpolation of a load running from `(x1, w1)` to `(x2, w2)`.
pub fn interpolate(x: f64, x1: f64, w1: f64, x2: f64, w2: f64) -> f64 {
    if (x2 - x1).abs() <= f64::EPSILON {
        return w1;
    }
    w1 + (w2 - w1) * (x - x1) / (x2 - x1)
}
