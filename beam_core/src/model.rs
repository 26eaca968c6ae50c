//! # Beam Model Builder
//!
//! Turns [`StructuredBeamData`] into a configured [`FeModel`]: one node per
//! support plus the beam ends, a single member spanning them, every load
//! tagged with its case, and the load combinations.
//!
//! ## Nodes
//!
//! ```text
//!   N0        N1              N2          N3
//!   ●─────────△───────────────△───────────●
//!   0        1000            3800        4800
//! ```
//!
//! Nodes are named `N0..Nk` in ascending position. Positions without a
//! support are free.
//!
//! ## Combinations
//!
//! With `include_standard_combos` the CSA S6-2019 table is registered.
//! Otherwise each case label becomes a combination of the same name with a
//! factor of 1.0, in the order the cases first appear in the loads. A beam
//! with no loads gets the solver's default `"Combo 1"` registered up front,
//! so the unsolved and solved models list the same combinations.

use std::path::Path;

use beam_fe::{DistLoad, FeModel, LoadCombo, PointLoad, SectionProps, DEFAULT_CASE, DEFAULT_COMBO};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::beam_data::{BeamLoad, StructuredBeamData};
use crate::equations::calc_shear_modulus;
use crate::errors::{CalcError, CalcResult};
use crate::file_io::read_beam_file;
use crate::loads::{csa_s6_2019_combinations, unit_combinations, AlphaFactors};

/// Material name used for the beam member
pub const MATERIAL_NAME: &str = "default";

/// A node position on the beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLocation {
    pub name: String,
    pub position: f64,
}

/// Node positions for the given supports on a beam of `length`.
///
/// Adds the beam ends, sorts ascending and removes duplicates.
///
/// # Example
/// ```
/// use beam_core::model::node_locations;
///
/// let nodes = node_locations(&[5.0, 100.0], 100.0);
/// let positions: Vec<f64> = nodes.iter().map(|n| n.position).collect();
/// assert_eq!(positions, vec![0.0, 5.0, 100.0]);
/// assert_eq!(nodes[2].name, "N2");
/// ```
pub fn node_locations(support_positions: &[f64], length: f64) -> Vec<NodeLocation> {
    let mut positions: Vec<f64> = support_positions.to_vec();
    positions.push(0.0);
    positions.push(length);
    positions.sort_by(f64::total_cmp);
    positions.dedup();

    positions
        .into_iter()
        .enumerate()
        .map(|(i, position)| NodeLocation {
            name: format!("N{}", i),
            position,
        })
        .collect()
}

/// Build an unsolved FE model for the beam.
pub fn build_beam(
    data: &StructuredBeamData,
    include_standard_combos: bool,
    alphas: &AlphaFactors,
) -> CalcResult<FeModel> {
    data.validate()?;
    let attrs = &data.attributes;

    let nodes = node_locations(&data.support_positions(), attrs.length);
    let last = match nodes.last() {
        Some(node) if nodes.len() >= 2 => node.name.clone(),
        _ => {
            return Err(CalcError::configuration(
                "Supports",
                format!("{} node(s)", nodes.len()),
                "a beam needs at least two distinct nodes",
            ))
        }
    };

    let g = calc_shear_modulus(attrs.nu, attrs.e)?;

    let mut model = FeModel::new();
    model.add_material(MATERIAL_NAME, attrs.e, g, attrs.nu, attrs.rho)?;

    for node in &nodes {
        model.add_node(&node.name, node.position, 0.0, 0.0)?;
        model.def_support(&node.name, data.restraint_at(node.position).fixity())?;
    }

    let section = SectionProps {
        iy: attrs.iy,
        iz: attrs.iz,
        j: attrs.j,
        a: attrs.a,
    };
    model.add_member(&data.name, "N0", &last, MATERIAL_NAME, section)?;

    for load in &data.loads {
        match load {
            BeamLoad::Point {
                direction,
                magnitude,
                location,
                case,
            } => {
                model.add_member_pt_load(&data.name, PointLoad::new(*direction, *magnitude, *location).case(case))?;
            }
            BeamLoad::Distributed {
                direction,
                start_magnitude,
                end_magnitude,
                start_location,
                end_location,
                case,
            } => {
                let load = DistLoad::new(*direction, *start_magnitude, *end_magnitude)
                    .between(*start_location, *end_location)
                    .case(case);
                model.add_member_dist_load(&data.name, load)?;
            }
        }
    }

    let combos = if include_standard_combos {
        csa_s6_2019_combinations(alphas)
    } else {
        unit_combinations(data.load_cases())
    };
    for combo in &combos {
        model.add_load_combo(LoadCombo::from(combo))?;
    }
    if combos.is_empty() {
        model.add_load_combo(LoadCombo::new(DEFAULT_COMBO).with_factor(DEFAULT_CASE, 1.0))?;
    }

    debug!(
        "Built beam '{}': {} nodes, {} loads, combinations [{}]",
        data.name,
        nodes.len(),
        data.loads.len(),
        model.combo_names().join(", ")
    );

    Ok(model)
}

/// Build and solve the beam.
pub fn analyze_beam(
    data: &StructuredBeamData,
    include_standard_combos: bool,
    alphas: &AlphaFactors,
    check_statics: bool,
) -> CalcResult<FeModel> {
    let mut model = build_beam(data, include_standard_combos, alphas)?;
    model.analyze(check_statics)?;
    Ok(model)
}

/// Read a beam text file and build its (unsolved) model.
pub fn load_beam_model(
    path: impl AsRef<Path>,
    include_standard_combos: bool,
    alphas: &AlphaFactors,
) -> CalcResult<FeModel> {
    let data = read_beam_file(path)?;
    build_beam(&data, include_standard_combos, alphas)
}

/// Simply supported beam with a cantilever overhang under a full-length
/// uniform load `w` in Fy.
///
/// ```text
///   w w w w w w w w w w w w w w
///   N0 ───────────── N1 ─────── N2
///   △                △
///   ←────── b ──────→←─── a ──→
/// ```
///
/// The load is in the default case, so `analyze` solves it as `"Combo 1"`.
/// The backspan support restrains `[dx, dy, dz, rx, ry]`, the cantilever
/// support only `dy`.
#[allow(clippy::too_many_arguments)]
pub fn fe_model_ss_cant(
    w: f64,
    b: f64,
    a: f64,
    e: f64,
    i: f64,
    area: f64,
    j: f64,
    nu: f64,
    rho: f64,
) -> CalcResult<FeModel> {
    let g = calc_shear_modulus(nu, e)?;

    let mut model = FeModel::new();
    model.add_material(MATERIAL_NAME, e, g, nu, rho)?;

    model.add_node("N0", 0.0, 0.0, 0.0)?;
    model.add_node("N1", b, 0.0, 0.0)?;
    model.add_node("N2", b + a, 0.0, 0.0)?;

    model.def_support("N0", [true, true, true, true, true, false])?;
    model.def_support("N1", [false, true, false, false, false, false])?;

    let section = SectionProps { iy: 1.0, iz: i, j, a: area };
    model.add_member("M0", "N0", "N2", MATERIAL_NAME, section)?;
    model.add_member_dist_load("M0", DistLoad::new(beam_fe::LoadDirection::Fy, w, w))?;

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam_data::{BeamAttributes, RestraintKind};
    use crate::equations::ss_cant_reactions;
    use approx::assert_abs_diff_eq;
    use beam_fe::{LoadDirection, DEFAULT_COMBO};

    fn positions(nodes: &[NodeLocation]) -> Vec<(String, f64)> {
        nodes.iter().map(|n| (n.name.clone(), n.position)).collect()
    }

    fn round2(v: f64) -> f64 {
        (v * 100.0).round() / 100.0
    }

    fn balcony() -> StructuredBeamData {
        let attrs = BeamAttributes::from_values(&[4800.0, 24500.0, 1200000000.0, 1.0, 1.0]).unwrap();
        StructuredBeamData::new("Balcony transfer", attrs)
            .with_support(1000.0, RestraintKind::Pin)
            .with_support(3800.0, RestraintKind::Roller)
            .with_load(BeamLoad::point(LoadDirection::Fy, -10000.0, 4800.0, "Live"))
            .with_load(BeamLoad::distributed(LoadDirection::Fy, (30.0, 30.0), (0.0, 4800.0), "Dead"))
    }

    #[test]
    fn test_node_locations() {
        assert_eq!(
            positions(&node_locations(&[1000.0, 4000.0, 8000.0], 10000.0)),
            vec![
                ("N0".to_string(), 0.0),
                ("N1".to_string(), 1000.0),
                ("N2".to_string(), 4000.0),
                ("N3".to_string(), 8000.0),
                ("N4".to_string(), 10000.0),
            ]
        );
        assert_eq!(
            positions(&node_locations(&[0.0, 100.0], 100.0)),
            vec![("N0".to_string(), 0.0), ("N1".to_string(), 100.0)]
        );
        assert_eq!(
            positions(&node_locations(&[0.0, 50.0], 100.0)),
            vec![("N0".to_string(), 0.0), ("N1".to_string(), 50.0), ("N2".to_string(), 100.0)]
        );
        assert_eq!(
            positions(&node_locations(&[5.0, 100.0], 100.0)),
            vec![("N0".to_string(), 0.0), ("N1".to_string(), 5.0), ("N2".to_string(), 100.0)]
        );
    }

    #[test]
    fn test_node_locations_unsorted_input() {
        let nodes = node_locations(&[8000.0, 1000.0], 10000.0);
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[1].position, 1000.0);
    }

    #[test]
    fn test_build_beam_case_combos() {
        let model = build_beam(&balcony(), false, &AlphaFactors::default()).unwrap();
        assert_eq!(model.nodes().len(), 4);
        assert_eq!(model.combo_names(), vec!["Live", "Dead"]);
        assert_eq!(model.node("N1").unwrap().restraints, RestraintKind::Pin.fixity());
        assert_eq!(model.node("N0").unwrap().restraints, RestraintKind::Free.fixity());
        assert_eq!(model.members()[0].name, "Balcony transfer");
        assert!(!model.is_analyzed());
    }

    #[test]
    fn test_build_beam_standard_combos() {
        let model = build_beam(&balcony(), true, &AlphaFactors::default()).unwrap();
        let names = model.combo_names();
        assert_eq!(names.len(), 13);
        assert_eq!(names[0], "unfactored");
        assert_eq!(names[12], "ULS9");
    }

    #[test]
    fn test_analyze_balcony_dead_reactions() {
        let model = analyze_beam(&balcony(), false, &AlphaFactors::default(), true).unwrap();
        // supports symmetric about the load centroid at 2400
        let r1 = model.node_reaction("N1", "Dead").unwrap()[1];
        let r2 = model.node_reaction("N2", "Dead").unwrap()[1];
        assert_abs_diff_eq!(r1, -72000.0, epsilon = 1e-4);
        assert_abs_diff_eq!(r2, -72000.0, epsilon = 1e-4);
    }

    #[test]
    fn test_unloaded_beam_registers_default_combo() {
        let attrs = BeamAttributes::from_values(&[3000.0, 200_000.0, 1.0e7]).unwrap();
        let data = StructuredBeamData::new("Bare", attrs)
            .with_support(0.0, RestraintKind::Pin)
            .with_support(3000.0, RestraintKind::Roller);

        let model = build_beam(&data, false, &AlphaFactors::default()).unwrap();
        assert_eq!(model.combo_names(), vec![DEFAULT_COMBO]);

        let model = analyze_beam(&data, false, &AlphaFactors::default(), false).unwrap();
        assert_eq!(model.combo_names(), vec![DEFAULT_COMBO]);
        assert_eq!(model.node_reaction("N0", DEFAULT_COMBO).unwrap(), [0.0; 6]);
    }

    #[test]
    fn test_load_beam_model_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("balcony.txt");
        std::fs::write(
            &path,
            "Balcony transfer\n\
             4800, 24500, 1200000000, 1, 1\n\
             1000:P, 3800:R\n\
             \n\
             POINT:Fy, -10000, 4800, case:Live\n\
             DIST:Fy, -30, -30, 0, 4800, case:Dead\n",
        )
        .unwrap();

        let mut model = load_beam_model(&path, false, &AlphaFactors::default()).unwrap();
        assert!(!model.is_analyzed());
        assert_eq!(model.combo_names(), vec!["Live", "Dead"]);
        assert_eq!(model.nodes().len(), 4);

        model.analyze(true).unwrap();
        let r1 = model.node_reaction("N1", "Dead").unwrap()[1];
        assert_abs_diff_eq!(r1, 72000.0, epsilon = 1e-4);

        let missing = load_beam_model(dir.path().join("nope.txt"), false, &AlphaFactors::default());
        assert_eq!(missing.unwrap_err().error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_build_beam_rejects_bad_data() {
        let mut data = balcony();
        data.attributes.nu = -1.0;
        assert_eq!(
            build_beam(&data, false, &AlphaFactors::default()).unwrap_err().error_code(),
            "CONFIGURATION_ERROR"
        );

        let mut data = balcony();
        data.attributes.length = -5.0;
        assert!(build_beam(&data, false, &AlphaFactors::default()).is_err());
    }

    #[test]
    fn test_unsupported_beam_fails_analysis() {
        let attrs = BeamAttributes::from_values(&[100.0, 1.0, 1.0]).unwrap();
        let data = StructuredBeamData::new("floating", attrs)
            .with_load(BeamLoad::point(LoadDirection::Fy, 1.0, 50.0, "D"));
        let err = analyze_beam(&data, false, &AlphaFactors::default(), false).unwrap_err();
        assert_eq!(err.error_code(), "ANALYSIS_FAILED");
    }

    #[test]
    fn test_fe_model_ss_cant_matches_closed_form() {
        for (w, b, a) in [(50.0, 4500.0, 2350.0), (19.0, 96.0, 96.0)] {
            let mut model = fe_model_ss_cant(w, b, a, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0).unwrap();
            model.analyze(false).unwrap();

            let fe_r2 = model.node_reaction("N0", DEFAULT_COMBO).unwrap()[1];
            let fe_r1 = model.node_reaction("N1", DEFAULT_COMBO).unwrap()[1];
            let (r1, r2) = ss_cant_reactions(w, a, b);

            assert_abs_diff_eq!(round2(fe_r1), round2(r1), epsilon = 1e-9);
            assert_abs_diff_eq!(round2(fe_r2), round2(r2), epsilon = 1e-9);
        }
    }
}
