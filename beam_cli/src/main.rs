//! # Beamline CLI
//!
//! Command-line front end for `beam_core`: read a beam (text file or project
//! JSON), solve it, then print one combination curve, the envelope, or the
//! governing combinations together with the vertical reactions. The PDF
//! report can be written alongside.
//!
//! Exit codes: 0 success, 1 calculation error, 2 usage error.
//! Set `RUST_LOG=info` (or `debug`) for solver logging.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use beam_core::diagram::{result_units, Extreme};
use beam_core::extraction::{extract_all_combos, extract_reactions, Direction, NodeReactions, ResultType};
use beam_core::file_io::{load_project, load_settings, read_beam_file};
use beam_core::loads::{
    csa_s6_2019_combinations, envelope_max, envelope_min, get_max_combo, get_min_combo, select_combo, AlphaFactors,
    AlphaSelection, Bound, CollisionKind, Envelope, LoadCombination, ResultArray,
};
use beam_core::model::analyze_beam;
use beam_core::project::{AnalysisSettings, BeamProject};
use beam_core::report::render_beam_report;
use beam_core::{CalcError, CalcResult};
use beam_fe::LoadDirection;
use log::info;
use serde::Serialize;

const USAGE: &str = "usage:
  beam_cli analyze <beam.txt|project.json> [--standard-combos]
          [--result shear|moment|axial|torque|deflection] [--direction Fy]
          [--combo NAME | --envelope | --max-combo] [--points N]
          [--config settings.json] [--report out.pdf] [--json]
  beam_cli combos [--material M1..M6] [--earth E1..E5]
          [--span Normal|Special_mixed_short|Special_mixed_other|Special_alone_short|Special_alone_other]
          [--dead-min] [--earth-min] [--prestress-min] [--vessel] [--json]";

// ============================================================================
// Arguments
// ============================================================================

/// What `analyze` prints.
#[derive(Debug, Clone, PartialEq)]
enum Selection {
    Combo(String),
    Envelope,
    MaxCombo,
}

#[derive(Debug, Clone, PartialEq)]
struct AnalyzeArgs {
    input: PathBuf,
    standard_combos: bool,
    result: ResultType,
    direction: Option<Direction>,
    selection: Selection,
    points: Option<usize>,
    config: Option<PathBuf>,
    report: Option<PathBuf>,
    json: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct CombosArgs {
    selection: AlphaSelection,
    json: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Analyze(AnalyzeArgs),
    Combos(CombosArgs),
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    match args.split_first() {
        Some((command, rest)) if command == "analyze" => parse_analyze(rest).map(Command::Analyze),
        Some((command, rest)) if command == "combos" => parse_combos(rest).map(Command::Combos),
        Some((command, _)) => Err(format!("unknown command '{}'", command)),
        None => Err("missing command".to_string()),
    }
}

fn parse_analyze(args: &[String]) -> Result<AnalyzeArgs, String> {
    let mut input = None;
    let mut parsed = AnalyzeArgs {
        input: PathBuf::new(),
        standard_combos: false,
        result: ResultType::Moment,
        direction: None,
        selection: Selection::Envelope,
        points: None,
        config: None,
        report: None,
        json: false,
    };
    let mut selections = 0;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--standard-combos" => parsed.standard_combos = true,
            "--result" => parsed.result = parse_value("--result", next_value("--result", &mut iter)?)?,
            "--direction" => parsed.direction = Some(parse_value("--direction", next_value("--direction", &mut iter)?)?),
            "--combo" => {
                parsed.selection = Selection::Combo(next_value("--combo", &mut iter)?.to_string());
                selections += 1;
            }
            "--envelope" => {
                parsed.selection = Selection::Envelope;
                selections += 1;
            }
            "--max-combo" => {
                parsed.selection = Selection::MaxCombo;
                selections += 1;
            }
            "--points" => {
                let raw = next_value("--points", &mut iter)?;
                let points = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--points: '{}' is not a whole number", raw))?;
                parsed.points = Some(points);
            }
            "--config" => parsed.config = Some(PathBuf::from(next_value("--config", &mut iter)?)),
            "--report" => parsed.report = Some(PathBuf::from(next_value("--report", &mut iter)?)),
            "--json" => parsed.json = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument '{}'", extra)),
        }
    }

    if selections > 1 {
        return Err("--combo, --envelope and --max-combo are mutually exclusive".to_string());
    }
    parsed.input = input.ok_or("analyze needs a beam file")?;
    Ok(parsed)
}

fn parse_combos(args: &[String]) -> Result<CombosArgs, String> {
    let mut parsed = CombosArgs {
        selection: AlphaSelection::default(),
        json: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let selection = &mut parsed.selection;
        match arg.as_str() {
            "--material" => selection.material = parse_value("--material", next_value("--material", &mut iter)?)?,
            "--earth" => selection.earth_pressure = parse_value("--earth", next_value("--earth", &mut iter)?)?,
            "--span" => selection.live_load_span = parse_value("--span", next_value("--span", &mut iter)?)?,
            "--dead-min" => selection.dead_bound = Bound::Min,
            "--earth-min" => selection.earth_bound = Bound::Min,
            "--prestress-min" => selection.prestress_bound = Bound::Min,
            "--vessel" => selection.collision = CollisionKind::Vessel,
            "--json" => parsed.json = true,
            other => return Err(format!("unknown option '{}'", other)),
        }
    }
    Ok(parsed)
}

fn next_value<'a>(flag: &str, iter: &mut impl Iterator<Item = &'a String>) -> Result<&'a str, String> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_value<T: FromStr<Err = CalcError>>(flag: &str, raw: &str) -> Result<T, String> {
    raw.parse().map_err(|e: CalcError| format!("{}: {}", flag, e))
}

// ============================================================================
// analyze
// ============================================================================

#[derive(Debug, Serialize)]
struct AnalysisOutput {
    beam: String,
    result_type: ResultType,
    direction: Direction,
    units: String,
    combinations: Vec<String>,
    selection: SelectionOutput,
    /// FY reactions at supported nodes
    reactions: Vec<NodeReactions>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SelectionOutput {
    Combo {
        name: String,
        array: ResultArray,
    },
    Envelope {
        max: Envelope,
        min: Envelope,
    },
    Governing {
        max_combo: String,
        max: Option<Extreme>,
        min_combo: String,
        min: Option<Extreme>,
    },
}

fn is_project_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Project from the input file with the CLI overrides applied.
fn load_input(args: &AnalyzeArgs) -> CalcResult<BeamProject> {
    let mut project = if is_project_file(&args.input) {
        load_project(&args.input)?
    } else {
        BeamProject::new("", "", read_beam_file(&args.input)?)
    };

    if let Some(config) = &args.config {
        project.settings = load_settings(config)?;
    }

    let settings = &mut project.settings;
    if args.standard_combos {
        settings.include_standard_combos = true;
    }
    if let Some(points) = args.points {
        settings.n_points = points;
    }
    if let Selection::Combo(name) = &args.selection {
        settings.target_combo = Some(name.clone());
    }
    Ok(project)
}

fn default_direction(result_type: ResultType, settings: &AnalysisSettings) -> Direction {
    match result_type {
        ResultType::Shear => settings.shear_direction,
        ResultType::Moment => settings.moment_direction,
        ResultType::Axial | ResultType::Torque => Direction::Fx,
        ResultType::Deflection => Direction::Dy,
    }
}

fn run_analyze(args: &AnalyzeArgs) -> CalcResult<()> {
    let project = load_input(args)?;
    let settings = &project.settings;

    let model = analyze_beam(
        &project.beam,
        settings.include_standard_combos,
        &settings.alpha_factors(),
        settings.check_statics,
    )?;

    let direction = args.direction.unwrap_or_else(|| default_direction(args.result, settings));
    let arrays = extract_all_combos(&model, args.result, direction, settings.n_points)?;

    let selection = match &args.selection {
        Selection::Combo(name) => SelectionOutput::Combo {
            name: name.clone(),
            array: select_combo(&arrays, name)?.clone(),
        },
        Selection::Envelope => SelectionOutput::Envelope {
            max: envelope_max(&arrays)?,
            min: envelope_min(&arrays)?,
        },
        Selection::MaxCombo => {
            let (max_combo, max_array) = get_max_combo(&arrays)?;
            let (min_combo, min_array) = get_min_combo(&arrays)?;
            SelectionOutput::Governing {
                max_combo: max_combo.to_string(),
                max: max_array.max().map(|(value, position)| Extreme { value, position }),
                min_combo: min_combo.to_string(),
                min: min_array.min().map(|(value, position)| Extreme { value, position }),
            }
        }
    };

    let reactions = extract_reactions(&model, LoadDirection::Fy)?
        .into_iter()
        .filter(|r| r.restrained)
        .collect();

    let output = AnalysisOutput {
        beam: project.beam.name.clone(),
        result_type: args.result,
        direction,
        units: result_units(args.result, settings.units()),
        combinations: model.combo_names().into_iter().map(str::to_string).collect(),
        selection,
        reactions,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&output).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })?;
        println!("{}", json);
    } else {
        print_analysis(&output, settings.units().force_label());
    }

    if let Some(path) = &args.report {
        let pdf = render_beam_report(&project, &model)?;
        fs::write(path, &pdf)
            .map_err(|e| CalcError::file_error("write report", path.display().to_string(), e.to_string()))?;
        info!("Wrote report to {}", path.display());
        if !args.json {
            println!();
            println!("Report written to {}", path.display());
        }
    }

    Ok(())
}

fn print_analysis(output: &AnalysisOutput, force_unit: &str) {
    println!(
        "Beam: {}  |  {} ({}) [{}]",
        output.beam, output.result_type, output.direction, output.units
    );
    println!("Combinations: {}", output.combinations.join(", "));
    println!();

    match &output.selection {
        SelectionOutput::Combo { name, array } => {
            println!("Combination {}", name);
            println!("{:>14} {:>16}", "x", "value");
            for (x, v) in array.positions.iter().zip(&array.values) {
                println!("{:>14.3} {:>16.4}", x, v);
            }
        }
        SelectionOutput::Envelope { max, min } => {
            println!("{:>14} {:>16} {:<12} {:>16} {:<12}", "x", "max", "governs", "min", "governs");
            for i in 0..max.positions.len() {
                println!(
                    "{:>14.3} {:>16.4} {:<12} {:>16.4} {:<12}",
                    max.positions[i], max.values[i], max.governing[i], min.values[i], min.governing[i]
                );
            }
        }
        SelectionOutput::Governing {
            max_combo,
            max,
            min_combo,
            min,
        } => {
            if let Some(max) = max {
                println!("Max: {:.4} at x = {:.3} ({})", max.value, max.position, max_combo);
            }
            if let Some(min) = min {
                println!("Min: {:.4} at x = {:.3} ({})", min.value, min.position, min_combo);
            }
        }
    }

    println!();
    println!("Reactions FY [{}]", force_unit);
    for node in &output.reactions {
        let values = node
            .values
            .iter()
            .map(|(combo, v)| format!("{}={:.3}", combo, v))
            .collect::<Vec<_>>()
            .join(", ");
        print!("  {} @ {:.3}: {}", node.node, node.position, values);
        match node.max() {
            Some((combo, v)) => println!("  (max {:.3}, {})", v, combo),
            None => println!(),
        }
    }
}

// ============================================================================
// combos
// ============================================================================

#[derive(Debug, Serialize)]
struct CombosOutput {
    selection: AlphaSelection,
    alphas: AlphaFactors,
    combinations: Vec<LoadCombination>,
}

fn run_combos(args: &CombosArgs) -> CalcResult<()> {
    let alphas = args.selection.alpha_factors();
    let output = CombosOutput {
        selection: args.selection,
        alphas,
        combinations: csa_s6_2019_combinations(&alphas),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&output).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })?;
        println!("{}", json);
        return Ok(());
    }

    let s = &output.selection;
    println!(
        "Material {} ({}), earth pressure {} ({}), live load {}, collision {}",
        s.material,
        s.material.description(),
        s.earth_pressure,
        s.earth_pressure.description(),
        s.live_load_span,
        s.collision
    );
    println!(
        "aD = {}  aE = {}  aP = {}  aL = {} / {} / {}  aL8 = {}",
        alphas.d, alphas.e, alphas.p, alphas.l1, alphas.l2, alphas.l3, alphas.l8
    );
    println!();
    for combo in &output.combinations {
        println!("  {:<12} {}", combo.name, combo.equation());
    }
    Ok(())
}

// ============================================================================
// Entry point
// ============================================================================

fn report_error(e: &CalcError) {
    eprintln!("Error: {}", e);
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    let result = match &command {
        Command::Analyze(args) => run_analyze(args),
        Command::Combos(args) => run_combos(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beam_core::loads::{LiveLoadSpan, MaterialType};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_analyze_defaults() {
        let Command::Analyze(parsed) = parse_args(&args(&["analyze", "beam.txt"])).unwrap() else {
            panic!("expected analyze");
        };
        assert_eq!(parsed.input, PathBuf::from("beam.txt"));
        assert_eq!(parsed.result, ResultType::Moment);
        assert_eq!(parsed.selection, Selection::Envelope);
        assert_eq!(parsed.direction, None);
        assert!(!parsed.json);
    }

    #[test]
    fn test_parse_analyze_options() {
        let Command::Analyze(parsed) = parse_args(&args(&[
            "analyze",
            "project.json",
            "--result",
            "Shear",
            "--direction",
            "fy",
            "--combo",
            "ULS1",
            "--points",
            "101",
            "--standard-combos",
            "--report",
            "out.pdf",
        ]))
        .unwrap() else {
            panic!("expected analyze");
        };
        assert_eq!(parsed.result, ResultType::Shear);
        assert_eq!(parsed.direction, Some(Direction::Fy));
        assert_eq!(parsed.selection, Selection::Combo("ULS1".to_string()));
        assert_eq!(parsed.points, Some(101));
        assert!(parsed.standard_combos);
        assert_eq!(parsed.report, Some(PathBuf::from("out.pdf")));
        assert!(is_project_file(&parsed.input));
    }

    #[test]
    fn test_usage_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["solve", "beam.txt"])).is_err());
        assert!(parse_args(&args(&["analyze"])).is_err());
        assert!(parse_args(&args(&["analyze", "beam.txt", "--points"])).is_err());
        assert!(parse_args(&args(&["analyze", "beam.txt", "--points", "many"])).is_err());
        assert!(parse_args(&args(&["analyze", "beam.txt", "--result", "stress"])).is_err());
        assert!(parse_args(&args(&["analyze", "beam.txt", "--envelope", "--max-combo"])).is_err());
        assert!(parse_args(&args(&["combos", "--material", "M9"])).is_err());
    }

    #[test]
    fn test_parse_combos() {
        let Command::Combos(parsed) = parse_args(&args(&[
            "combos",
            "--material",
            "m3",
            "--span",
            "Special_alone_other",
            "--dead-min",
            "--vessel",
        ]))
        .unwrap() else {
            panic!("expected combos");
        };
        assert_eq!(parsed.selection.material, MaterialType::M3);
        assert_eq!(parsed.selection.live_load_span, LiveLoadSpan::SpecialAloneOther);
        assert_eq!(parsed.selection.dead_bound, Bound::Min);
        assert_eq!(parsed.selection.alpha_factors().d, 0.65);
        assert_eq!(parsed.selection.alpha_factors().l8, 0.5);
    }

    #[test]
    fn test_load_input_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let beam = dir.path().join("beam.txt");
        fs::write(&beam, "B1\n6000, 200000, 50000000\n0:P, 6000:R\nDIST:Fy, -10, -10, 0, 6000, case:D\n").unwrap();
        let settings = dir.path().join("settings.json");
        fs::write(&settings, r#"{"n_points": 51, "check_statics": true}"#).unwrap();

        let Command::Analyze(parsed) = parse_args(&args(&[
            "analyze",
            beam.to_str().unwrap(),
            "--config",
            settings.to_str().unwrap(),
            "--combo",
            "D",
        ]))
        .unwrap() else {
            panic!("expected analyze");
        };

        let project = load_input(&parsed).unwrap();
        assert_eq!(project.settings.n_points, 51);
        assert!(project.settings.check_statics);
        assert_eq!(project.settings.target_combo.as_deref(), Some("D"));
        assert_eq!(project.beam.name, "B1");

        run_analyze(&parsed).unwrap();
    }

    #[test]
    fn test_unknown_combo_is_calculation_error() {
        let dir = tempfile::tempdir().unwrap();
        let beam = dir.path().join("beam.txt");
        fs::write(&beam, "B1\n6000, 200000, 50000000\n0:P, 6000:R\nPOINT:Fy, -10, 3000, case:D\n").unwrap();

        let Command::Analyze(parsed) =
            parse_args(&args(&["analyze", beam.to_str().unwrap(), "--combo", "ULS1"])).unwrap()
        else {
            panic!("expected analyze");
        };
        let err = run_analyze(&parsed).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_COMBO");
    }
}
