//! FE model container and linear static solver.
//!
//! A model holds named nodes, supports, materials, members, member loads
//! tagged by load case, and an ordered list of load combinations. `analyze`
//! assembles one global stiffness matrix, factors the free-DOF partition once
//! and solves one right-hand side per combination.
//!
//! ## Meshing
//!
//! Every member is split at each model node lying on it and at each point
//! load and distributed-load end. Point loads then become nodal loads and
//! every distributed load covers whole elements, so the element fixed-end
//! forces are exact and the member results are exact between mesh points.

use log::{debug, info, warn};

use crate::error::{FeError, FeResult};
use crate::loads::{DistLoad, LoadCombo, PointLoad, DEFAULT_CASE, DEFAULT_COMBO};
use crate::math::{element_stiffness, fer_linear_load, interpolate, ElementProps, Mat, Mat12, Vec12, Vector};
use crate::results::{MemberResults, Segment};

/// Relative tolerance used to merge positions along a member
pub(crate) const POSITION_TOLERANCE: f64 = 1e-9;

/// Smallest ratio of a Cholesky pivot to its original diagonal entry
const PIVOT_TOLERANCE: f64 = 1e-14;

/// Restraint pattern with every DOF fixed
pub const FIXED: [bool; 6] = [true; 6];

/// Restraint pattern with every DOF free
pub const FREE: [bool; 6] = [false; 6];

// ============================================================================
// Model entities
// ============================================================================

/// A node with its support restraints (`[dx, dy, dz, rx, ry, rz]`).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub restraints: [bool; 6],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub e: f64,
    pub g: f64,
    pub nu: f64,
    pub rho: f64,
}

/// Cross-section properties of a member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionProps {
    pub iy: f64,
    pub iz: f64,
    pub j: f64,
    pub a: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub i_node: String,
    pub j_node: String,
    pub material: String,
    pub section: SectionProps,
    pub point_loads: Vec<PointLoad>,
    pub dist_loads: Vec<DistLoad>,
}

// ============================================================================
// Solution storage
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct ComboSolution {
    pub(crate) name: String,
    /// Per model node
    pub(crate) displacements: Vec<[f64; 6]>,
    /// Per model node, force exerted by the support on the structure
    pub(crate) reactions: Vec<[f64; 6]>,
    /// Per member, mesh segments in ascending position
    pub(crate) segments: Vec<Vec<Segment>>,
}

struct MemberMesh {
    stations: Vec<f64>,
    /// First global DOF of each station
    bases: Vec<usize>,
}

struct Element {
    member: usize,
    x0: f64,
    length: f64,
    dofs: [usize; 12],
    stiffness: Mat12,
}

/// Straight-member 3D frame model solved by the direct stiffness method.
///
/// Members must run along the global +X axis, which keeps local and global
/// axes aligned.
///
/// # Example
///
/// ```rust
/// use beam_fe::{DistLoad, FeModel, LoadDirection, SectionProps};
///
/// let mut model = FeModel::new();
/// model.add_node("N0", 0.0, 0.0, 0.0).unwrap();
/// model.add_node("N1", 6000.0, 0.0, 0.0).unwrap();
/// model.def_support("N0", [true, true, true, true, false, false]).unwrap();
/// model.def_support("N1", [false, true, true, false, false, false]).unwrap();
/// model.add_material("Steel", 200_000.0, 77_000.0, 0.3, 7.85e-9).unwrap();
/// let section = SectionProps { iy: 1.0e7, iz: 5.0e7, j: 2.0e5, a: 6000.0 };
/// model.add_member("B1", "N0", "N1", "Steel", section).unwrap();
/// model.add_member_dist_load("B1", DistLoad::new(LoadDirection::Fy, -10.0, -10.0)).unwrap();
/// model.analyze(false).unwrap();
///
/// let reaction = model.node_reaction("N0", "Combo 1").unwrap();
/// assert!((reaction[1] - 30_000.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeModel {
    nodes: Vec<Node>,
    materials: Vec<Material>,
    members: Vec<Member>,
    combos: Vec<LoadCombo>,
    solution: Option<Vec<ComboSolution>>,
}

impl FeModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model building
    // ========================

    pub fn add_node(&mut self, name: &str, x: f64, y: f64, z: f64) -> FeResult<()> {
        if self.node_index(name).is_some() {
            return Err(FeError::DuplicateName(name.to_string()));
        }
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(FeError::invalid_argument(name, "node coordinates must be finite"));
        }
        self.nodes.push(Node {
            name: name.to_string(),
            x,
            y,
            z,
            restraints: FREE,
        });
        self.solution = None;
        Ok(())
    }

    /// Set the restraints of a node, `true` meaning restrained.
    pub fn def_support(&mut self, node: &str, restraints: [bool; 6]) -> FeResult<()> {
        let idx = self
            .node_index(node)
            .ok_or_else(|| FeError::NodeNotFound(node.to_string()))?;
        self.nodes[idx].restraints = restraints;
        self.solution = None;
        Ok(())
    }

    pub fn add_material(&mut self, name: &str, e: f64, g: f64, nu: f64, rho: f64) -> FeResult<()> {
        if self.materials.iter().any(|m| m.name == name) {
            return Err(FeError::DuplicateName(name.to_string()));
        }
        if !(e > 0.0 && e.is_finite()) || !(g > 0.0 && g.is_finite()) {
            return Err(FeError::invalid_argument(name, "E and G must be positive and finite"));
        }
        self.materials.push(Material {
            name: name.to_string(),
            e,
            g,
            nu,
            rho,
        });
        Ok(())
    }

    pub fn add_member(
        &mut self,
        name: &str,
        i_node: &str,
        j_node: &str,
        material: &str,
        section: SectionProps,
    ) -> FeResult<()> {
        if self.member_index(name).is_some() {
            return Err(FeError::DuplicateName(name.to_string()));
        }
        let i = self
            .node_index(i_node)
            .ok_or_else(|| FeError::NodeNotFound(i_node.to_string()))?;
        let j = self
            .node_index(j_node)
            .ok_or_else(|| FeError::NodeNotFound(j_node.to_string()))?;
        if !self.materials.iter().any(|m| m.name == material) {
            return Err(FeError::MaterialNotFound(material.to_string()));
        }

        let (ni, nj) = (&self.nodes[i], &self.nodes[j]);
        let length = nj.x - ni.x;
        if !(length > 0.0) {
            return Err(FeError::invalid_geometry(name, "j-node must lie at a greater X than the i-node"));
        }
        let tol = length * POSITION_TOLERANCE;
        if (nj.y - ni.y).abs() > tol || (nj.z - ni.z).abs() > tol {
            return Err(FeError::invalid_geometry(name, "member must be parallel to the global X axis"));
        }
        let props = [section.iy, section.iz, section.j, section.a];
        if props.iter().any(|p| !(*p > 0.0 && p.is_finite())) {
            return Err(FeError::invalid_geometry(name, "section properties must be positive and finite"));
        }

        self.members.push(Member {
            name: name.to_string(),
            i_node: i_node.to_string(),
            j_node: j_node.to_string(),
            material: material.to_string(),
            section,
            point_loads: Vec::new(),
            dist_loads: Vec::new(),
        });
        self.solution = None;
        Ok(())
    }

    pub fn add_member_pt_load(&mut self, member: &str, load: PointLoad) -> FeResult<()> {
        let idx = self
            .member_index(member)
            .ok_or_else(|| FeError::MemberNotFound(member.to_string()))?;
        let length = self.member_length_at(idx);
        let tol = length * POSITION_TOLERANCE;

        if !load.magnitude.is_finite() {
            return Err(FeError::invalid_load(member, "magnitude must be finite"));
        }
        if !(load.x >= -tol && load.x <= length + tol) {
            return Err(FeError::invalid_load(
                member,
                format!("point load at {} lies outside the member (length {})", load.x, length),
            ));
        }

        let load = PointLoad {
            x: load.x.clamp(0.0, length),
            ..load
        };
        self.members[idx].point_loads.push(load);
        self.solution = None;
        Ok(())
    }

    pub fn add_member_dist_load(&mut self, member: &str, load: DistLoad) -> FeResult<()> {
        let idx = self
            .member_index(member)
            .ok_or_else(|| FeError::MemberNotFound(member.to_string()))?;
        let length = self.member_length_at(idx);
        let tol = length * POSITION_TOLERANCE;

        if !load.direction.is_force() {
            return Err(FeError::invalid_load(
                member,
                format!("distributed loads act along force axes, got {}", load.direction),
            ));
        }
        if !(load.w1.is_finite() && load.w2.is_finite()) {
            return Err(FeError::invalid_load(member, "magnitudes must be finite"));
        }
        let (x1, x2) = load.extent(length);
        if !(x1 >= -tol && x2 <= length + tol && x1 <= x2) {
            return Err(FeError::invalid_load(
                member,
                format!("distributed load extent [{}, {}] is invalid for member length {}", x1, x2, length),
            ));
        }

        let load = DistLoad {
            x1: Some(x1.clamp(0.0, length)),
            x2: Some(x2.clamp(0.0, length)),
            ..load
        };
        self.members[idx].dist_loads.push(load);
        self.solution = None;
        Ok(())
    }

    /// Register a combination. Registration order is preserved everywhere.
    pub fn add_load_combo(&mut self, combo: LoadCombo) -> FeResult<()> {
        if self.combos.iter().any(|c| c.name == combo.name) {
            return Err(FeError::DuplicateName(combo.name));
        }
        self.combos.push(combo);
        self.solution = None;
        Ok(())
    }

    // ========================
    // Queries
    // ========================

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Registered combinations in registration order
    pub fn load_combos(&self) -> &[LoadCombo] {
        &self.combos
    }

    pub fn combo_names(&self) -> Vec<&str> {
        self.combos.iter().map(|c| c.name.as_str()).collect()
    }

    /// Distinct load case names in order of first use
    pub fn load_cases(&self) -> Vec<&str> {
        let mut cases: Vec<&str> = Vec::new();
        for member in &self.members {
            let used = member
                .point_loads
                .iter()
                .map(|l| l.case.as_str())
                .chain(member.dist_loads.iter().map(|l| l.case.as_str()));
            for case in used {
                if !cases.contains(&case) {
                    cases.push(case);
                }
            }
        }
        cases
    }

    pub fn member_length(&self, name: &str) -> FeResult<f64> {
        let idx = self
            .member_index(name)
            .ok_or_else(|| FeError::MemberNotFound(name.to_string()))?;
        Ok(self.member_length_at(idx))
    }

    pub fn is_analyzed(&self) -> bool {
        self.solution.is_some()
    }

    /// Support reaction `[Fx, Fy, Fz, Mx, My, Mz]` at a node. Zero on free DOFs.
    pub fn node_reaction(&self, node: &str, combo: &str) -> FeResult<[f64; 6]> {
        let idx = self
            .node_index(node)
            .ok_or_else(|| FeError::NodeNotFound(node.to_string()))?;
        Ok(self.combo_solution(combo)?.reactions[idx])
    }

    /// Displacement `[dx, dy, dz, rx, ry, rz]` of a node.
    pub fn node_displacement(&self, node: &str, combo: &str) -> FeResult<[f64; 6]> {
        let idx = self
            .node_index(node)
            .ok_or_else(|| FeError::NodeNotFound(node.to_string()))?;
        Ok(self.combo_solution(combo)?.displacements[idx])
    }

    /// Internal force and deflection queries for one member.
    pub fn member_results(&self, name: &str) -> FeResult<MemberResults<'_>> {
        let idx = self
            .member_index(name)
            .ok_or_else(|| FeError::MemberNotFound(name.to_string()))?;
        if self.solution.is_none() {
            return Err(FeError::NotAnalyzed);
        }
        Ok(MemberResults::new(self, idx, self.member_length_at(idx), self.element_props(idx)?))
    }

    pub(crate) fn combo_solution(&self, combo: &str) -> FeResult<&ComboSolution> {
        let solution = self.solution.as_ref().ok_or(FeError::NotAnalyzed)?;
        solution
            .iter()
            .find(|c| c.name == combo)
            .ok_or_else(|| FeError::ComboNotFound(combo.to_string()))
    }

    fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    fn member_ends(&self, idx: usize) -> (usize, usize) {
        let member = &self.members[idx];
        // Both ends were checked when the member was added and nodes are never removed
        let i = self.node_index(&member.i_node).unwrap_or(0);
        let j = self.node_index(&member.j_node).unwrap_or(0);
        (i, j)
    }

    fn member_length_at(&self, idx: usize) -> f64 {
        let (i, j) = self.member_ends(idx);
        self.nodes[j].x - self.nodes[i].x
    }

    fn element_props(&self, idx: usize) -> FeResult<ElementProps> {
        let member = &self.members[idx];
        let material = self
            .materials
            .iter()
            .find(|m| m.name == member.material)
            .ok_or_else(|| FeError::MaterialNotFound(member.material.clone()))?;
        Ok(ElementProps {
            e: material.e,
            g: material.g,
            a: member.section.a,
            iy: member.section.iy,
            iz: member.section.iz,
            j: member.section.j,
        })
    }

    // ========================
    // Analysis
    // ========================

    /// Run a linear static analysis for every registered combination.
    ///
    /// Registers `"Combo 1"` = `{"Case 1": 1.0}` when no combination exists.
    /// With `check_statics` the load/reaction balance of every combination is
    /// logged.
    pub fn analyze(&mut self, check_statics: bool) -> FeResult<()> {
        self.solution = None;

        if self.members.is_empty() {
            return Err(FeError::Unstable("model has no members".to_string()));
        }
        if self.combos.is_empty() {
            debug!("No load combinations defined, using '{}'", DEFAULT_COMBO);
            self.combos
                .push(LoadCombo::new(DEFAULT_COMBO).with_factor(DEFAULT_CASE, 1.0));
        }

        let meshes = self.build_meshes();
        let n_dofs = meshes
            .iter()
            .flat_map(|m| m.bases.iter())
            .map(|b| b + 6)
            .max()
            .unwrap_or(0)
            .max(6 * self.nodes.len());
        let elements = self.build_elements(&meshes)?;
        let k = assemble_stiffness(&elements, n_dofs);

        let n_node_dofs = 6 * self.nodes.len();
        let restrained = |dof: usize| dof < n_node_dofs && self.nodes[dof / 6].restraints[dof % 6];
        let free: Vec<usize> = (0..n_dofs).filter(|&d| !restrained(d)).collect();

        info!(
            "Analyzing {} member(s), {} element(s), {} DOFs ({} free), {} combination(s)",
            self.members.len(),
            elements.len(),
            n_dofs,
            free.len(),
            self.combos.len()
        );

        let k_ff = Mat::from_fn(free.len(), free.len(), |r, c| k[(free[r], free[c])]);
        let diagonal: Vec<f64> = (0..free.len()).map(|r| k_ff[(r, r)]).collect();
        let factored = if free.is_empty() {
            None
        } else {
            let chol = k_ff.cholesky().ok_or_else(|| {
                FeError::Unstable("stiffness matrix is not positive definite; check supports".to_string())
            })?;
            // a pivot that lost nearly all of its diagonal stiffness is a mechanism
            let l = chol.l_dirty();
            if let Some(r) = (0..free.len()).find(|&r| l[(r, r)] * l[(r, r)] <= PIVOT_TOLERANCE * diagonal[r]) {
                return Err(FeError::Unstable(format!(
                    "mechanism detected at DOF {} of node slot {}; check supports",
                    free[r] % 6,
                    free[r] / 6
                )));
            }
            Some(chol)
        };

        let mut solution = Vec::with_capacity(self.combos.len());
        for combo in &self.combos {
            let (p, fers, intensities) = self.combo_load_vector(combo, &meshes, &elements, n_dofs);

            let p_f = Vector::from_fn(free.len(), |r, _| p[free[r]]);
            let d_f = match &factored {
                Some(chol) => chol.solve(&p_f),
                None => Vector::zeros(0),
            };
            if d_f.iter().any(|v| !v.is_finite()) {
                return Err(FeError::Unstable(format!(
                    "non-finite displacements for combination '{}'",
                    combo.name
                )));
            }

            let mut d = Vector::zeros(n_dofs);
            for (r, &dof) in free.iter().enumerate() {
                d[dof] = d_f[r];
            }
            let kd = &k * &d;

            let mut displacements = Vec::with_capacity(self.nodes.len());
            let mut reactions = Vec::with_capacity(self.nodes.len());
            for (n, node) in self.nodes.iter().enumerate() {
                let mut disp = [0.0; 6];
                let mut rxn = [0.0; 6];
                for i in 0..6 {
                    let dof = 6 * n + i;
                    disp[i] = d[dof];
                    if node.restraints[i] {
                        rxn[i] = kd[dof] - p[dof];
                    }
                }
                displacements.push(disp);
                reactions.push(rxn);
            }

            let mut segments: Vec<Vec<Segment>> = vec![Vec::new(); self.members.len()];
            for (e, el) in elements.iter().enumerate() {
                let d_e = Vec12::from_fn(|r, _| d[el.dofs[r]]);
                let f = el.stiffness * d_e + fers[e];
                let (w1, w2) = intensities[e];
                segments[el.member].push(Segment {
                    x0: el.x0,
                    length: el.length,
                    f_i: [f[0], f[1], f[2], f[3], f[4], f[5]],
                    d_i: [d_e[0], d_e[1], d_e[2], d_e[3], d_e[4], d_e[5]],
                    w1,
                    w2,
                });
            }

            solution.push(ComboSolution {
                name: combo.name.clone(),
                displacements,
                reactions,
                segments,
            });
        }

        self.solution = Some(solution);

        if check_statics {
            self.log_statics_check()?;
        }
        Ok(())
    }

    /// Sum of applied loads and reactions `[ΣFx, ΣFy, ΣFz, ΣMx, ΣMy, ΣMz]`,
    /// moments taken about the global origin. Zero for a balanced solution.
    pub fn statics_residual(&self, combo: &str) -> FeResult<[f64; 6]> {
        let solved = self.combo_solution(combo)?;
        let factors = self
            .combos
            .iter()
            .find(|c| c.name == combo)
            .ok_or_else(|| FeError::ComboNotFound(combo.to_string()))?;

        fn add_force(sum: &mut [f64; 6], axis: usize, value: f64, x: f64) {
            sum[axis] += value;
            match axis {
                1 => sum[5] += x * value,
                2 => sum[4] -= x * value,
                _ => {}
            }
        }

        let mut sum = [0.0; 6];

        for (n, node) in self.nodes.iter().enumerate() {
            let r = solved.reactions[n];
            for axis in 0..3 {
                add_force(&mut sum, axis, r[axis], node.x);
                sum[axis + 3] += r[axis + 3];
            }
        }

        for (idx, member) in self.members.iter().enumerate() {
            let (i, _) = self.member_ends(idx);
            let xi = self.nodes[i].x;
            let length = self.member_length_at(idx);

            for load in &member.point_loads {
                let value = factors.factor(&load.case) * load.magnitude;
                let dof = load.direction.dof_index();
                if dof < 3 {
                    add_force(&mut sum, dof, value, xi + load.x);
                } else {
                    sum[dof] += value;
                }
            }

            for load in &member.dist_loads {
                let f = factors.factor(&load.case);
                let (x1, x2) = load.extent(length);
                let len = x2 - x1;
                let (w1, w2) = (f * load.w1, f * load.w2);
                let resultant = 0.5 * (w1 + w2) * len;
                let slope = if len > 0.0 { (w2 - w1) / len } else { 0.0 };
                // first moment of the load about the global origin
                let first_moment =
                    (xi + x1) * resultant + w1 * len * len / 2.0 + slope * len * len * len / 3.0;
                let axis = load.direction.dof_index();
                sum[axis] += resultant;
                match axis {
                    1 => sum[5] += first_moment,
                    2 => sum[4] -= first_moment,
                    _ => {}
                }
            }
        }

        Ok(sum)
    }

    fn log_statics_check(&self) -> FeResult<()> {
        for combo in &self.combos {
            let residual = self.statics_residual(&combo.name)?;
            let scale = self
                .nodes
                .iter()
                .map(|n| {
                    self.node_reaction(&n.name, &combo.name)
                        .map(|r| r.iter().map(|v| v.abs()).sum::<f64>())
                        .unwrap_or(0.0)
                })
                .sum::<f64>()
                .max(1.0);
            let worst = residual.iter().map(|v| v.abs()).fold(0.0, f64::max);

            info!(
                "Statics check '{}': ΣF = ({:.4e}, {:.4e}, {:.4e}), ΣM = ({:.4e}, {:.4e}, {:.4e})",
                combo.name, residual[0], residual[1], residual[2], residual[3], residual[4], residual[5]
            );
            if worst > 1e-6 * scale {
                warn!(
                    "Statics check '{}' out of balance by {:.4e} (reaction scale {:.4e})",
                    combo.name, worst, scale
                );
            }
        }
        Ok(())
    }

    fn build_meshes(&self) -> Vec<MemberMesh> {
        let mut next_base = 6 * self.nodes.len();
        let mut meshes = Vec::with_capacity(self.members.len());

        for (idx, member) in self.members.iter().enumerate() {
            let (i, j) = self.member_ends(idx);
            let (ni, nj) = (&self.nodes[i], &self.nodes[j]);
            let length = nj.x - ni.x;
            let tol = length * POSITION_TOLERANCE;

            let mut points: Vec<(f64, Option<usize>)> = vec![(0.0, Some(i)), (length, Some(j))];
            for (n, node) in self.nodes.iter().enumerate() {
                let on_axis = (node.y - ni.y).abs() <= tol && (node.z - ni.z).abs() <= tol;
                if n != i && n != j && on_axis && node.x - ni.x > tol && nj.x - node.x > tol {
                    points.push((node.x - ni.x, Some(n)));
                }
            }
            points.extend(member.point_loads.iter().map(|l| (l.x, None)));
            for load in &member.dist_loads {
                let (x1, x2) = load.extent(length);
                points.push((x1, None));
                points.push((x2, None));
            }
            points.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut merged: Vec<(f64, Option<usize>)> = Vec::with_capacity(points.len());
            for point in points {
                if let Some(last) = merged.last_mut() {
                    if (point.0 - last.0).abs() <= tol {
                        if last.1.is_none() {
                            *last = point;
                        }
                        continue;
                    }
                }
                merged.push(point);
            }

            let mut stations = Vec::with_capacity(merged.len());
            let mut bases = Vec::with_capacity(merged.len());
            for (x, node) in merged {
                stations.push(x);
                match node {
                    Some(n) => bases.push(6 * n),
                    None => {
                        bases.push(next_base);
                        next_base += 6;
                    }
                }
            }

            debug!("Member '{}' meshed into {} element(s)", member.name, stations.len() - 1);
            meshes.push(MemberMesh { stations, bases });
        }

        meshes
    }

    fn build_elements(&self, meshes: &[MemberMesh]) -> FeResult<Vec<Element>> {
        let mut elements = Vec::new();
        for (idx, mesh) in meshes.iter().enumerate() {
            let props = self.element_props(idx)?;
            for s in 0..mesh.stations.len() - 1 {
                let x0 = mesh.stations[s];
                let length = mesh.stations[s + 1] - x0;
                let (bi, bj) = (mesh.bases[s], mesh.bases[s + 1]);
                let mut dofs = [0usize; 12];
                for r in 0..6 {
                    dofs[r] = bi + r;
                    dofs[r + 6] = bj + r;
                }
                elements.push(Element {
                    member: idx,
                    x0,
                    length,
                    dofs,
                    stiffness: element_stiffness(&props, length),
                });
            }
        }
        Ok(elements)
    }

    /// Global load vector for one combination, with the fixed-end forces and
    /// distributed intensities of every element.
    #[allow(clippy::type_complexity)]
    fn combo_load_vector(
        &self,
        combo: &LoadCombo,
        meshes: &[MemberMesh],
        elements: &[Element],
        n_dofs: usize,
    ) -> (Vector, Vec<Vec12>, Vec<([f64; 3], [f64; 3])>) {
        let mut p = Vector::zeros(n_dofs);

        for (idx, member) in self.members.iter().enumerate() {
            let mesh = &meshes[idx];
            let tol = self.member_length_at(idx) * POSITION_TOLERANCE;
            for load in &member.point_loads {
                let factor = combo.factor(&load.case);
                if factor == 0.0 {
                    continue;
                }
                let station = mesh
                    .stations
                    .iter()
                    .position(|s| (s - load.x).abs() <= tol)
                    .unwrap_or(0);
                p[mesh.bases[station] + load.direction.dof_index()] += factor * load.magnitude;
            }
        }

        let mut fers = Vec::with_capacity(elements.len());
        let mut intensities = Vec::with_capacity(elements.len());
        for el in elements {
            let member = &self.members[el.member];
            let length = self.member_length_at(el.member);
            let tol = length * POSITION_TOLERANCE;
            let (s0, s1) = (el.x0, el.x0 + el.length);

            let mut w1 = [0.0; 3];
            let mut w2 = [0.0; 3];
            for load in &member.dist_loads {
                let factor = combo.factor(&load.case);
                let (x1, x2) = load.extent(length);
                if factor == 0.0 || s0 < x1 - tol || s1 > x2 + tol {
                    continue;
                }
                let axis = load.direction.dof_index();
                w1[axis] += factor * interpolate(s0, x1, load.w1, x2, load.w2);
                w2[axis] += factor * interpolate(s1, x1, load.w1, x2, load.w2);
            }

            let mut fer = Vec12::zeros();
            for axis in 0..3 {
                if w1[axis] != 0.0 || w2[axis] != 0.0 {
                    fer += fer_linear_load(w1[axis], w2[axis], el.length, axis);
                }
            }
            for (r, &dof) in el.dofs.iter().enumerate() {
                p[dof] -= fer[r];
            }

            fers.push(fer);
            intensities.push((w1, w2));
        }

        (p, fers, intensities)
    }
}

/// Global stiffness from element contributions.
fn assemble_stiffness(elements: &[Element], n_dofs: usize) -> Mat {
    let mut k = Mat::zeros(n_dofs, n_dofs);
    for el in elements {
        for (r, &dr) in el.dofs.iter().enumerate() {
            for (c, &dc) in el.dofs.iter().enumerate() {
                k[(dr, dc)] += el.stiffness[(r, c)];
            }
        }
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::LoadDirection;
    use crate::results::Axis;
    use approx::assert_relative_eq;

    const PIN: [bool; 6] = [true, true, true, true, false, false];
    const ROLLER: [bool; 6] = [false, true, true, false, false, false];

    fn section() -> SectionProps {
        SectionProps {
            iy: 2.0e7,
            iz: 8.0e7,
            j: 1.0e6,
            a: 8000.0,
        }
    }

    fn beam(nodes: &[(&str, f64)], last: &str) -> FeModel {
        let mut model = FeModel::new();
        for (name, x) in nodes {
            model.add_node(name, *x, 0.0, 0.0).unwrap();
        }
        model.add_material("Steel", 200_000.0, 77_000.0, 0.3, 7.85e-9).unwrap();
        model.add_member("B", "N0", last, "Steel", section()).unwrap();
        model
    }

    #[test]
    fn test_simple_span_udl_reactions() {
        let mut model = beam(&[("N0", 0.0), ("N1", 6000.0)], "N1");
        model.def_support("N0", PIN).unwrap();
        model.def_support("N1", ROLLER).unwrap();
        model
            .add_member_dist_load("B", DistLoad::new(LoadDirection::Fy, -12.0, -12.0))
            .unwrap();
        model.analyze(true).unwrap();

        let r0 = model.node_reaction("N0", DEFAULT_COMBO).unwrap();
        let r1 = model.node_reaction("N1", DEFAULT_COMBO).unwrap();
        assert_relative_eq!(r0[1], 36_000.0, max_relative = 1e-9);
        assert_relative_eq!(r1[1], 36_000.0, max_relative = 1e-9);
        assert_eq!(model.combo_names(), vec![DEFAULT_COMBO]);
    }

    #[test]
    fn test_propped_cantilever_reaction() {
        // Fixed at 0, roller at L: roller takes 3wL/8
        let (w, l) = (5.0, 4000.0);
        let mut model = beam(&[("N0", 0.0), ("N1", l)], "N1");
        model.def_support("N0", FIXED).unwrap();
        model.def_support("N1", ROLLER).unwrap();
        model
            .add_member_dist_load("B", DistLoad::new(LoadDirection::Fy, -w, -w))
            .unwrap();
        model.analyze(false).unwrap();

        let r1 = model.node_reaction("N1", DEFAULT_COMBO).unwrap();
        assert_relative_eq!(r1[1], 3.0 * w * l / 8.0, max_relative = 1e-8);
        let r0 = model.node_reaction("N0", DEFAULT_COMBO).unwrap();
        assert_relative_eq!(r0[5], w * l * l / 8.0, max_relative = 1e-8);
    }

    #[test]
    fn test_two_span_continuous_middle_reaction() {
        let (w, l) = (2.0, 5000.0);
        let mut model = beam(&[("N0", 0.0), ("N1", l), ("N2", 2.0 * l)], "N2");
        model.def_support("N0", PIN).unwrap();
        model.def_support("N1", ROLLER).unwrap();
        model.def_support("N2", ROLLER).unwrap();
        model
            .add_member_dist_load("B", DistLoad::new(LoadDirection::Fy, -w, -w))
            .unwrap();
        model.analyze(false).unwrap();

        let mid = model.node_reaction("N1", DEFAULT_COMBO).unwrap();
        assert_relative_eq!(mid[1], 1.25 * w * l, max_relative = 1e-8);
        let end = model.node_reaction("N2", DEFAULT_COMBO).unwrap();
        assert_relative_eq!(end[1], 0.375 * w * l, max_relative = 1e-8);
    }

    #[test]
    fn test_cantilever_tip_deflection() {
        let (p, l) = (-1000.0, 2500.0);
        let mut model = beam(&[("N0", 0.0), ("N1", l)], "N1");
        model.def_support("N0", FIXED).unwrap();
        model
            .add_member_pt_load("B", PointLoad::new(LoadDirection::Fy, p, l))
            .unwrap();
        model.analyze(false).unwrap();

        let ei = 200_000.0 * section().iz;
        let tip = model.node_displacement("N1", DEFAULT_COMBO).unwrap();
        assert_relative_eq!(tip[1], p * l.powi(3) / (3.0 * ei), max_relative = 1e-8);
        let results = model.member_results("B").unwrap();
        assert_relative_eq!(
            results.deflection(Axis::Y, l, DEFAULT_COMBO).unwrap(),
            tip[1],
            max_relative = 1e-8
        );
    }

    #[test]
    fn test_combinations_scale_cases() {
        let mut model = beam(&[("N0", 0.0), ("N1", 3000.0)], "N1");
        model.def_support("N0", PIN).unwrap();
        model.def_support("N1", ROLLER).unwrap();
        model
            .add_member_pt_load("B", PointLoad::new(LoadDirection::Fy, -100.0, 1500.0).case("D"))
            .unwrap();
        model
            .add_member_pt_load("B", PointLoad::new(LoadDirection::Fy, -40.0, 1500.0).case("L"))
            .unwrap();
        model
            .add_load_combo(LoadCombo::new("ULS").with_factor("D", 1.25).with_factor("L", 1.5))
            .unwrap();
        model.add_load_combo(LoadCombo::new("Dead").with_factor("D", 1.0)).unwrap();
        model.analyze(true).unwrap();

        let uls = model.node_reaction("N0", "ULS").unwrap();
        assert_relative_eq!(uls[1], (125.0 + 60.0) / 2.0, max_relative = 1e-9);
        let dead = model.node_reaction("N1", "Dead").unwrap();
        assert_relative_eq!(dead[1], 50.0, max_relative = 1e-9);
        assert_eq!(model.load_cases(), vec!["D", "L"]);

        let residual = model.statics_residual("ULS").unwrap();
        for r in residual {
            assert!(r.abs() < 1e-6, "residual {:?}", residual);
        }
    }

    #[test]
    fn test_global_stiffness_is_symmetric() {
        // interior support, overhang and a point load all add mesh nodes
        let mut model = beam(&[("N0", 0.0), ("N1", 3000.0), ("N2", 4500.0)], "N2");
        model.def_support("N0", PIN).unwrap();
        model.def_support("N1", ROLLER).unwrap();
        model
            .add_member_pt_load("B", PointLoad::new(LoadDirection::Fy, -10.0, 1200.0))
            .unwrap();
        let meshes = model.build_meshes();
        let elements = model.build_elements(&meshes).unwrap();
        assert_eq!(elements.len(), 3);

        let n_dofs = 6 * (model.nodes().len() + 1);
        let k = assemble_stiffness(&elements, n_dofs);
        assert_eq!(k.nrows(), n_dofs);
        for r in 0..n_dofs {
            for c in 0..n_dofs {
                assert_relative_eq!(k[(r, c)], k[(c, r)], epsilon = 1e-9, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_overhang_tip_load_reactions() {
        // simple span with overhang: a backspan uplift and a larger interior reaction
        let (span, overhang, p) = (3000.0, 1500.0, -10.0);
        let mut model = beam(&[("N0", 0.0), ("N1", span), ("N2", span + overhang)], "N2");
        model.def_support("N0", PIN).unwrap();
        model.def_support("N1", ROLLER).unwrap();
        model
            .add_member_pt_load("B", PointLoad::new(LoadDirection::Fy, p, span + overhang))
            .unwrap();
        model.analyze(true).unwrap();

        let back = model.node_reaction("N0", DEFAULT_COMBO).unwrap();
        let interior = model.node_reaction("N1", DEFAULT_COMBO).unwrap();
        assert_relative_eq!(back[1], p * overhang / span, max_relative = 1e-8);
        assert_relative_eq!(interior[1], -p * (span + overhang) / span, max_relative = 1e-8);
    }

    #[test]
    fn test_unstable_model_is_rejected() {
        let mut model = beam(&[("N0", 0.0), ("N1", 3000.0)], "N1");
        model.def_support("N1", ROLLER).unwrap();
        model
            .add_member_dist_load("B", DistLoad::new(LoadDirection::Fy, -1.0, -1.0))
            .unwrap();
        assert!(matches!(model.analyze(false), Err(FeError::Unstable(_))));
        assert!(!model.is_analyzed());
    }

    #[test]
    fn test_building_errors() {
        let mut model = beam(&[("N0", 0.0), ("N1", 3000.0)], "N1");
        assert_eq!(
            model.add_node("N0", 1.0, 0.0, 0.0),
            Err(FeError::DuplicateName("N0".to_string()))
        );
        assert!(matches!(
            model.add_member_pt_load("B", PointLoad::new(LoadDirection::Fy, 1.0, 3500.0)),
            Err(FeError::InvalidLoad { .. })
        ));
        assert!(matches!(
            model.add_member_dist_load("B", DistLoad::new(LoadDirection::Mz, 1.0, 1.0)),
            Err(FeError::InvalidLoad { .. })
        ));
        model.add_node("N2", 1000.0, 50.0, 0.0).unwrap();
        assert!(matches!(
            model.add_member("C", "N0", "N2", "Steel", section()),
            Err(FeError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            model.node_reaction("N0", "Combo 1"),
            Err(FeError::NotAnalyzed)
        ));
    }

    #[test]
    fn test_unknown_combo_after_analysis() {
        let mut model = beam(&[("N0", 0.0), ("N1", 3000.0)], "N1");
        model.def_support("N0", FIXED).unwrap();
        model.analyze(false).unwrap();
        assert_eq!(
            model.node_reaction("N0", "ULS1"),
            Err(FeError::ComboNotFound("ULS1".to_string()))
        );
    }
}
