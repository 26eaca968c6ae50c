//! End-to-end beam scenarios: text file in, solved results out.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use beam_core::beam_data::{BeamAttributes, BeamLoad, RestraintKind, StructuredBeamData};
use beam_core::extraction::{extract_all_combos, extract_reactions, Direction, ResultType};
use beam_core::file_io::{load_project, read_beam_file, save_project};
use beam_core::loads::{
    combine_cases, csa_s6_2019_combinations, envelope_max, envelope_min, get_max_combo, get_min_combo, select_combo,
    AlphaFactors,
};
use beam_core::model::analyze_beam;
use beam_core::project::BeamProject;
use beam_fe::{Axis, LoadDirection, MemberQuantity};

const E: f64 = 200_000.0;
const IZ: f64 = 5.0e7;

fn beam(name: &str, length: f64) -> StructuredBeamData {
    StructuredBeamData::new(name, BeamAttributes::from_values(&[length, E, IZ]).unwrap())
}

fn udl(w: f64, length: f64, case: &str) -> BeamLoad {
    BeamLoad::distributed(LoadDirection::Fy, (w, w), (0.0, length), case)
}

#[test]
fn test_identity_combination_matches_raw_case() {
    let data = beam("B1", 5000.0)
        .with_support(0.0, RestraintKind::Pin)
        .with_support(5000.0, RestraintKind::Roller)
        .with_load(BeamLoad::point(LoadDirection::Fy, -8000.0, 1500.0, "X"));
    let model = analyze_beam(&data, false, &AlphaFactors::default(), false).unwrap();

    assert_eq!(model.combo_names(), vec!["X"]);

    let arrays = extract_all_combos(&model, ResultType::Shear, Direction::Fy, 201).unwrap();
    let raw = model
        .member_results("B1")
        .unwrap()
        .samples(MemberQuantity::Shear(Axis::Y), 201, "X")
        .unwrap();

    let combo = select_combo(&arrays, "X").unwrap();
    assert_eq!(combo.positions, raw.x);
    assert_eq!(combo.values, raw.values);
}

#[test]
fn test_standard_combo_is_linear_in_cases() {
    let data = beam("B2", 8000.0)
        .with_support(0.0, RestraintKind::Pin)
        .with_support(6000.0, RestraintKind::Roller)
        .with_load(udl(-12.0, 8000.0, "D"))
        .with_load(BeamLoad::point(LoadDirection::Fy, -25_000.0, 8000.0, "L"))
        .with_load(BeamLoad::point(LoadDirection::Fy, -10_000.0, 3000.0, "L"));
    let alphas = AlphaFactors::default();

    let factored = analyze_beam(&data, true, &alphas, false).unwrap();
    let per_case = analyze_beam(&data, false, &alphas, false).unwrap();

    let factored_arrays = extract_all_combos(&factored, ResultType::Moment, Direction::Mz, 161).unwrap();
    let case_arrays = extract_all_combos(&per_case, ResultType::Moment, Direction::Mz, 161).unwrap();
    let combined = combine_cases(&case_arrays, &csa_s6_2019_combinations(&alphas)).unwrap();

    for name in ["ULS1", "ULS2", "SLS1", "ULS9"] {
        let solved = select_combo(&factored_arrays, name).unwrap();
        let summed = select_combo(&combined, name).unwrap();
        assert_eq!(solved.positions, summed.positions);
        for (a, b) in solved.values.iter().zip(&summed.values) {
            assert_relative_eq!(*a, *b, epsilon = 1e-3, max_relative = 1e-7);
        }
    }

    // 1.2D + 1.7L at the cantilever support
    let d = select_combo(&case_arrays, "D").unwrap();
    let l = select_combo(&case_arrays, "L").unwrap();
    let uls1 = select_combo(&factored_arrays, "ULS1").unwrap();
    let i = 120;
    assert_abs_diff_eq!(uls1.positions[i], 6000.0, epsilon = 1e-9);
    assert_relative_eq!(
        uls1.values[i],
        1.2 * d.values[i] + 1.7 * l.values[i],
        epsilon = 1e-3,
        max_relative = 1e-7
    );
}

#[test]
fn test_repeated_extraction_is_stable() {
    let data = beam("B3", 7300.0)
        .with_support(0.0, RestraintKind::Fixed)
        .with_support(7300.0, RestraintKind::Roller)
        .with_load(udl(-4.0, 7300.0, "D"));
    let model = analyze_beam(&data, false, &AlphaFactors::default(), false).unwrap();

    let first = extract_all_combos(&model, ResultType::Deflection, Direction::Dy, 97).unwrap();
    let second = extract_all_combos(&model, ResultType::Deflection, Direction::Dy, 97).unwrap();
    assert_eq!(first, second);

    let array = select_combo(&first, "D").unwrap();
    assert_eq!(array.positions[0], 0.0);
    assert_eq!(array.positions[96], 7300.0);
}

#[test]
fn test_simple_span_udl_textbook_values() {
    let (w, l) = (10.0, 6000.0);
    let data = beam("SS", l)
        .with_support(0.0, RestraintKind::Pin)
        .with_support(l, RestraintKind::Roller)
        .with_load(udl(-w, l, "D"));
    let model = analyze_beam(&data, false, &AlphaFactors::default(), false).unwrap();

    let moment = extract_all_combos(&model, ResultType::Moment, Direction::Mz, 501).unwrap();
    let (peak, at) = select_combo(&moment, "D").unwrap().max().unwrap();
    assert_relative_eq!(peak, w * l * l / 8.0, max_relative = 1e-6);
    assert_abs_diff_eq!(at, l / 2.0, epsilon = 1e-9);

    let deflection = extract_all_combos(&model, ResultType::Deflection, Direction::Dy, 501).unwrap();
    let (sag, _) = select_combo(&deflection, "D").unwrap().min().unwrap();
    assert_relative_eq!(sag, -5.0 * w * l.powi(4) / (384.0 * E * IZ), max_relative = 1e-6);

    let reactions = extract_reactions(&model, LoadDirection::Fy).unwrap();
    assert_relative_eq!(reactions[0].get("D").unwrap(), w * l / 2.0, max_relative = 1e-6);
    assert_relative_eq!(reactions[1].get("D").unwrap(), w * l / 2.0, max_relative = 1e-6);
}

#[test]
fn test_cantilever_tip_deflection() {
    let (p, l) = (1000.0, 2000.0);
    let data = beam("Cantilever", l)
        .with_support(0.0, RestraintKind::Fixed)
        .with_load(BeamLoad::point(LoadDirection::Fy, -p, l, "P"));
    let model = analyze_beam(&data, false, &AlphaFactors::default(), false).unwrap();

    let tip = model.node_displacement("N1", "P").unwrap()[1];
    assert_relative_eq!(tip, -p * l.powi(3) / (3.0 * E * IZ), max_relative = 1e-6);

    let mz = extract_reactions(&model, LoadDirection::Mz).unwrap();
    assert_relative_eq!(mz[0].get("P").unwrap().abs(), p * l, max_relative = 1e-6);
}

#[test]
fn test_propped_cantilever_and_two_span_reactions() {
    let (w, l) = (10.0, 6000.0);
    let propped = beam("Propped", l)
        .with_support(0.0, RestraintKind::Fixed)
        .with_support(l, RestraintKind::Roller)
        .with_load(udl(-w, l, "D"));
    let model = analyze_beam(&propped, false, &AlphaFactors::default(), false).unwrap();
    let fy = extract_reactions(&model, LoadDirection::Fy).unwrap();
    assert_relative_eq!(fy[1].get("D").unwrap(), 3.0 * w * l / 8.0, max_relative = 1e-6);

    let span = 5000.0;
    let two_span = beam("Two span", 2.0 * span)
        .with_support(0.0, RestraintKind::Pin)
        .with_support(span, RestraintKind::Roller)
        .with_support(2.0 * span, RestraintKind::Roller)
        .with_load(udl(-w, 2.0 * span, "D"));
    let model = analyze_beam(&two_span, false, &AlphaFactors::default(), false).unwrap();
    let fy = extract_reactions(&model, LoadDirection::Fy).unwrap();
    assert_relative_eq!(fy[1].get("D").unwrap(), 1.25 * w * span, max_relative = 1e-6);
    assert_relative_eq!(fy[0].get("D").unwrap(), 0.375 * w * span, max_relative = 1e-6);
}

#[test]
fn test_balcony_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let beam_path = dir.path().join("balcony.txt");
    std::fs::write(
        &beam_path,
        "Balcony transfer\n\
         4800, 24500, 1200000000, 1, 1\n\
         1000:P, 3800:R\n\
         \n\
         POINT:Fy, -20000, 4800, case:Live\n\
         DIST:Fy, -30, -30, 0, 4800, case:Dead\n",
    )
    .unwrap();

    let data = read_beam_file(&beam_path).unwrap();
    let model = analyze_beam(&data, false, &AlphaFactors::default(), true).unwrap();
    assert_eq!(model.combo_names(), vec!["Live", "Dead"]);

    let moment = extract_all_combos(&model, ResultType::Moment, Direction::Mz, 481).unwrap();
    let max = envelope_max(&moment).unwrap();
    let min = envelope_min(&moment).unwrap();
    for (_, array) in moment.iter() {
        for i in 0..array.len() {
            assert!(max.values[i] >= array.values[i]);
            assert!(min.values[i] <= array.values[i]);
        }
    }

    // the tip point load hogs the cantilever harder than the dead load
    // (20000 * 1000 against 30 * 1000^2 / 2)
    let (governing, _) = get_min_combo(&moment).unwrap();
    assert_eq!(governing, "Live");
    let (sagging, _) = get_max_combo(&moment).unwrap();
    assert_eq!(sagging, "Dead");

    let project = BeamProject::new("Engineer", "25-007", data);
    let project_path = dir.path().join("balcony.json");
    save_project(&project, &project_path).unwrap();
    let loaded = load_project(&project_path).unwrap();
    assert_eq!(loaded.beam, project.beam);
    assert_eq!(loaded.settings, project.settings);
}
