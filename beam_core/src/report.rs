//! # Beam Report
//!
//! Renders the shear/moment summary of one beam to PDF using Typst.
//!
//! ## Architecture
//!
//! - A Typst template is embedded as a string constant
//! - Tables and diagrams are generated as Typst markup and injected into
//!   the template before compilation
//! - Diagrams are drawn with Typst primitives (`polygon`, `line`, `place`)
//!   from [`Diagram`] and [`BeamSchematic`] data
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Contents
//!
//! 1. Title block and introduction
//! 2. Reporting combination, or a note that only maxima are shown
//! 3. Beam data and load combinations
//! 4. Reaction table (FY and MZ per supported node)
//! 5. Beam schematic
//! 6. Shear and moment diagrams at the reporting combination
//! 7. Shear and moment diagrams of the max envelope
//!
//! ## Example
//!
//! ```rust,no_run
//! use beam_core::file_io::read_beam_file;
//! use beam_core::project::BeamProject;
//! use beam_core::report::render_project_report;
//!
//! let beam = read_beam_file("balcony.txt").unwrap();
//! let mut project = BeamProject::new("Jane Engineer", "25-042", beam);
//! project.settings.target_combo = Some("Live".to_string());
//!
//! let pdf = render_project_report(&project).unwrap();
//! std::fs::write("balcony.pdf", pdf).unwrap();
//! ```

use beam_fe::{FeModel, LoadDirection};
use chrono::Utc;
use log::info;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::beam_data::RestraintKind;
use crate::diagram::{BeamSchematic, Diagram, SchematicLoad};
use crate::errors::{CalcError, CalcResult};
use crate::extraction::{extract_all_combos, extract_reactions, Direction, NodeReactions, ResultType};
use crate::loads::{envelope_max, select_combo, ComboArrays, LoadCombination};
use crate::model::analyze_beam;
use crate::project::BeamProject;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct ReportWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl ReportWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        ReportWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    /// Fonts bundled with typst-assets (Libertinus Serif, New Computer Modern, DejaVu Sans Mono)
    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for ReportWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// Report Template
// ============================================================================

const INTRODUCTION: &str =
    "The purpose of this report is to provide a brief summary of the shear and moment demands on a 2D beam.";

const REPORT_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2.2cm, bottom: 2.2cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[Beamline Beam Analysis]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[Job: {{JOB_ID}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 10.5pt)
#set heading(numbering: "1.")

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[{{TITLE}}]
    #v(4pt)
    #text(size: 12pt)[Beam: {{BEAM_NAME}}]
  ]
]

#v(8pt)

#table(
  columns: (auto, 1fr),
  stroke: none,
  row-gutter: 4pt,
  [Engineer:], [{{ENGINEER}}],
  [Job ID:], [{{JOB_ID}}],
  [Date:], [{{DATE}}],
)

= Introduction

{{INTRODUCTION}}

{{REPORTING_COMBO}}

= Beam Data

#table(
  columns: (1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right),
  table.header([*Property*], [*Value*]),
{{BEAM_ROWS}}
)

#table(
  columns: (auto, 1fr),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, left),
  table.header([*Combination*], [*Equation*]),
{{COMBO_ROWS}}
)

{{SCHEMATIC}}

= Reaction Tables

{{REACTION_TABLE}}

{{TARGET_DIAGRAMS}}

= Shear and moment diagrams, max envelope of all combinations

{{ENVELOPE_DIAGRAMS}}

#v(16pt)
#line(length: 100%, stroke: 0.5pt)
#text(size: 9pt, fill: gray)[
  Generated by Beamline \
  Calculations should be verified by a licensed professional engineer.
]
"##;

// Drawing area of every figure, in points
const PLOT_WIDTH: f64 = 420.0;
const PLOT_HEIGHT: f64 = 150.0;
/// Stations drawn per diagram; longer arrays are thinned
const MAX_PLOT_POINTS: usize = 250;

const SHEAR_FILL: &str = "rgb(\"#2e86c1\").lighten(55%)";
const MOMENT_FILL: &str = "rgb(\"#c0392b\").lighten(55%)";

// ============================================================================
// Report Rendering
// ============================================================================

/// Build the Typst markup of the report without compiling it.
///
/// `model` must be solved. Reactions are tabulated in FY and MZ; the
/// diagrams use the shear and moment directions from the project settings.
pub fn build_report_source(project: &BeamProject, model: &FeModel) -> CalcResult<String> {
    let settings = &project.settings;
    let units = settings.units();
    let target = settings.target_combo.as_deref();

    if let Some(name) = target {
        if !model.combo_names().contains(&name) {
            return Err(CalcError::unknown_combo(name));
        }
    }

    let shear = extract_all_combos(model, ResultType::Shear, settings.shear_direction, settings.n_points)?;
    let moment = extract_all_combos(model, ResultType::Moment, settings.moment_direction, settings.n_points)?;

    let reporting_combo = match target {
        Some(name) => format!("Reporting Combo: {}.", escape_typst(name)),
        None => "No target reporting combo chosen, only max diagrams/tables displayed.".to_string(),
    };

    let target_diagrams = match target {
        Some(name) => format!(
            "= Shear and moment diagrams \\@ {}\n\n{}\n\n{}",
            escape_typst(name),
            diagram_figure(&combo_diagram(&shear, name, ResultType::Shear, project)?, SHEAR_FILL),
            diagram_figure(&combo_diagram(&moment, name, ResultType::Moment, project)?, MOMENT_FILL),
        ),
        None => String::new(),
    };

    let envelope_diagrams = format!(
        "{}\n\n{}",
        diagram_figure(&envelope_diagram(&shear, ResultType::Shear, project)?, SHEAR_FILL),
        diagram_figure(&envelope_diagram(&moment, ResultType::Moment, project)?, MOMENT_FILL),
    );

    let fy = extract_reactions(model, LoadDirection::Fy)?;
    let mz = extract_reactions(model, LoadDirection::Mz)?;
    let reaction_table = reaction_table(&fy, &mz, target, units.force_label(), &units.moment_label());

    let source = REPORT_TEMPLATE
        .replace("{{TITLE}}", &escape_typst(&project.meta.title))
        .replace("{{BEAM_NAME}}", &escape_typst(&project.beam.name))
        .replace("{{ENGINEER}}", &escape_typst(&project.meta.engineer))
        .replace("{{JOB_ID}}", &escape_typst(&project.meta.job_id))
        .replace("{{DATE}}", &Utc::now().format("%Y-%m-%d").to_string())
        .replace("{{INTRODUCTION}}", INTRODUCTION)
        .replace("{{REPORTING_COMBO}}", &reporting_combo)
        .replace("{{BEAM_ROWS}}", &beam_rows(project))
        .replace("{{COMBO_ROWS}}", &combo_rows(model))
        .replace("{{SCHEMATIC}}", &schematic_figure(&BeamSchematic::from_beam(&project.beam)))
        .replace("{{REACTION_TABLE}}", &reaction_table)
        .replace("{{TARGET_DIAGRAMS}}", &target_diagrams)
        .replace("{{ENVELOPE_DIAGRAMS}}", &envelope_diagrams);

    Ok(source)
}

/// Render the report of a solved model to PDF bytes.
pub fn render_beam_report(project: &BeamProject, model: &FeModel) -> CalcResult<Vec<u8>> {
    let source = build_report_source(project, model)?;
    let pdf = compile_pdf(source)?;
    info!("Rendered report for '{}' ({} bytes)", project.beam.name, pdf.len());
    Ok(pdf)
}

/// Build, solve and report a project using its own settings.
pub fn render_project_report(project: &BeamProject) -> CalcResult<Vec<u8>> {
    let settings = &project.settings;
    let model = analyze_beam(
        &project.beam,
        settings.include_standard_combos,
        &settings.alpha_factors(),
        settings.check_statics,
    )?;
    render_beam_report(project, &model)
}

fn compile_pdf(source: String) -> CalcResult<Vec<u8>> {
    let world = ReportWorld::new(source);

    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })
}

// ============================================================================
// Tables
// ============================================================================

fn beam_rows(project: &BeamProject) -> String {
    let units = project.settings.units();
    let len = units.length_label();
    let attrs = &project.beam.attributes;

    let supports = project
        .beam
        .supports
        .iter()
        .map(|s| format!("{} \\@ {}", s.kind.code(), format_value(s.position)))
        .collect::<Vec<_>>()
        .join(", ");

    let rows = [
        (format!("Length L ({})", len), format_value(attrs.length)),
        ("Elastic modulus E".to_string(), format!("{}", attrs.e)),
        ("Moment of inertia Iz".to_string(), format!("{}", attrs.iz)),
        ("Moment of inertia Iy".to_string(), format!("{}", attrs.iy)),
        ("Area A".to_string(), format!("{}", attrs.a)),
        ("Torsion constant J".to_string(), format!("{}", attrs.j)),
        ("Poisson's ratio".to_string(), format!("{}", attrs.nu)),
        (format!("Supports ({})", len), supports),
    ];

    rows.iter()
        .map(|(label, value)| format!("  [{}], [{}],", escape_typst(label), value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn combo_rows(model: &FeModel) -> String {
    model
        .load_combos()
        .iter()
        .map(|combo| {
            let combination = LoadCombination::from(combo);
            format!(
                "  [{}], [{}],",
                escape_typst(&combination.name),
                escape_typst(&combination.equation())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reactions at nodes supported in FY or MZ.
///
/// With a target combination the table carries its values next to the
/// maxima; otherwise only the maxima and their governing combinations.
fn reaction_table(
    fy: &[NodeReactions],
    mz: &[NodeReactions],
    target: Option<&str>,
    force_unit: &str,
    moment_unit: &str,
) -> String {
    let mut header = vec!["Node".to_string()];
    let mut add_headers = |label: &str, unit: &str| {
        if let Some(name) = target {
            header.push(format!("{} \\@ {} ({})", label, escape_typst(name), unit));
        }
        header.push(format!("{} \\@ Max Combo ({})", label, unit));
        header.push(format!("{} Max Combo", label));
    };
    add_headers("FY", force_unit);
    add_headers("MZ", moment_unit);

    let mut cells: Vec<String> = Vec::new();
    for (f, m) in fy.iter().zip(mz) {
        if !f.restrained && !m.restrained {
            continue;
        }
        cells.push(format!("{} (x = {})", f.node, format_value(f.position)));
        for reactions in [f, m] {
            if let Some(name) = target {
                cells.push(format_value(reactions.get(name).unwrap_or(0.0)));
            }
            match reactions.max() {
                Some((combo, value)) => {
                    cells.push(format_value(value));
                    cells.push(escape_typst(combo));
                }
                None => {
                    cells.push("-".to_string());
                    cells.push("-".to_string());
                }
            }
        }
    }

    let columns = header.len();
    let header_cells = header
        .iter()
        .map(|h| format!("[*{}*]", h))
        .collect::<Vec<_>>()
        .join(", ");
    let body = cells
        .iter()
        .map(|c| format!("[{}]", c))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "#table(\n  columns: {},\n  inset: 5pt,\n  stroke: 0.5pt,\n  align: center,\n  table.header({}),\n  {}\n)",
        columns, header_cells, body
    )
}

// ============================================================================
// Figures
// ============================================================================

fn combo_diagram(arrays: &ComboArrays, name: &str, result_type: ResultType, project: &BeamProject) -> CalcResult<Diagram> {
    let direction = direction_for(result_type, project);
    let mut diagram = Diagram::new(select_combo(arrays, name)?, result_type, direction, project.settings.units())?;
    diagram.title = format!("{} \\@ {}", escape_typst(&diagram.title), escape_typst(name));
    Ok(diagram)
}

fn envelope_diagram(arrays: &ComboArrays, result_type: ResultType, project: &BeamProject) -> CalcResult<Diagram> {
    let direction = direction_for(result_type, project);
    let envelope = envelope_max(arrays)?;
    let mut diagram = Diagram::new(&envelope.to_array(), result_type, direction, project.settings.units())?;
    diagram.title = format!("{}, max envelope", escape_typst(&diagram.title));
    Ok(diagram)
}

fn direction_for(result_type: ResultType, project: &BeamProject) -> Direction {
    match result_type {
        ResultType::Moment => project.settings.moment_direction,
        _ => project.settings.shear_direction,
    }
}

/// Filled diagram with the zero line and max/min markers.
///
/// Titles arrive already escaped.
fn diagram_figure(diagram: &Diagram, fill: &str) -> String {
    let (x0, x1) = diagram.span();
    let x_scale = PLOT_WIDTH / nonzero(x1 - x0);
    let peak = diagram.max.value.abs().max(diagram.min.value.abs());
    let y_scale = 0.45 * PLOT_HEIGHT / nonzero(peak);
    let mid = PLOT_HEIGHT / 2.0;

    let to_pt = |x: f64, v: f64| ((x - x0) * x_scale, mid - v * y_scale);

    let step = (diagram.positions.len() / MAX_PLOT_POINTS).max(1);
    let last = diagram.positions.len().saturating_sub(1);
    let mut vertices = vec![point(0.0, mid)];
    for (i, (&x, &v)) in diagram.positions.iter().zip(&diagram.values).enumerate() {
        if i % step == 0 || i == last {
            let (px, py) = to_pt(x, v);
            vertices.push(point(px, py));
        }
    }
    vertices.push(point(PLOT_WIDTH, mid));

    let (max_x, max_y) = to_pt(diagram.max.position, diagram.max.value);
    let (min_x, min_y) = to_pt(diagram.min.position, diagram.min.value);

    format!(
        r#"#figure(
  box(width: {w:.1}pt, height: {h:.1}pt, stroke: 0.4pt + luma(180))[
    #place(polygon(fill: {fill}, stroke: 0.6pt + luma(60), {vertices}))
    #place(line(start: (0pt, {mid:.2}pt), end: ({w:.1}pt, {mid:.2}pt), stroke: 0.8pt))
    #place(dx: {max_x:.2}pt - 2pt, dy: {max_y:.2}pt - 2pt, circle(radius: 2pt, fill: black))
    #place(dx: {min_x:.2}pt - 2pt, dy: {min_y:.2}pt - 2pt, circle(radius: 2pt, fill: black))
  ],
  caption: [{title}. Max {max} at x = {max_pos}, min {min} at x = {min_pos} ({x_label}).],
)"#,
        w = PLOT_WIDTH,
        h = PLOT_HEIGHT,
        fill = fill,
        vertices = vertices.join(", "),
        mid = mid,
        max_x = max_x,
        max_y = max_y,
        min_x = min_x,
        min_y = min_y,
        title = diagram.title,
        max = format_value(diagram.max.value),
        max_pos = format_value(diagram.max.position),
        min = format_value(diagram.min.value),
        min_pos = format_value(diagram.min.position),
        x_label = escape_typst(&diagram.x_label),
    )
}

/// Beam line with support symbols and load arrows.
fn schematic_figure(schematic: &BeamSchematic) -> String {
    let x_scale = PLOT_WIDTH / nonzero(schematic.length);
    let mid = PLOT_HEIGHT / 2.0;
    let y_scale = mid / schematic.y_extent;
    // loads plot at -magnitude, so a downward load hangs above the beam
    let load_y = |magnitude: f64| mid + magnitude * y_scale;

    let mut items = Vec::new();

    for load in &schematic.loads {
        match load {
            SchematicLoad::Distributed {
                start,
                end,
                start_magnitude,
                end_magnitude,
                case,
            } => {
                let (xa, xb) = (start * x_scale, end * x_scale);
                items.push(format!(
                    "#place(polygon(fill: rgb(\"#f39c12\").transparentize(60%), stroke: 0.5pt + rgb(\"#d35400\"), {}, {}, {}, {}))",
                    point(xa, mid),
                    point(xa, load_y(*start_magnitude)),
                    point(xb, load_y(*end_magnitude)),
                    point(xb, mid)
                ));
                items.push(label(
                    xa + 2.0,
                    load_y(*start_magnitude).min(mid) - 10.0,
                    &format!("{} ({})", format_value(start_magnitude.abs()), escape_typst(case)),
                ));
            }
            SchematicLoad::Point {
                position,
                magnitude,
                case,
            } => {
                let x = position * x_scale;
                let tail = load_y(*magnitude);
                // arrowhead sits on the beam, opening towards the tail
                let head = if *magnitude < 0.0 { mid - 6.0 } else { mid + 6.0 };
                items.push(format!(
                    "#place(line(start: {}, end: {}, stroke: 1pt + rgb(\"#1f4e79\")))",
                    point(x, tail),
                    point(x, mid)
                ));
                items.push(format!(
                    "#place(polygon(fill: rgb(\"#1f4e79\"), {}, {}, {}))",
                    point(x, mid),
                    point(x - 3.0, head),
                    point(x + 3.0, head)
                ));
                items.push(label(
                    x + 3.0,
                    tail.min(mid) - 10.0,
                    &format!("{} ({})", format_value(magnitude.abs()), escape_typst(case)),
                ));
            }
        }
    }

    items.push(format!(
        "#place(line(start: (0pt, {mid:.2}pt), end: ({w:.1}pt, {mid:.2}pt), stroke: 2pt))",
        mid = mid,
        w = PLOT_WIDTH
    ));

    for support in &schematic.supports {
        let x = support.position * x_scale;
        let symbol = match support.kind {
            RestraintKind::Pin => format!(
                "#place(polygon(fill: luma(90), {}, {}, {}))",
                point(x, mid),
                point(x - 6.0, mid + 10.0),
                point(x + 6.0, mid + 10.0)
            ),
            RestraintKind::Roller => format!(
                "#place(dx: {:.2}pt, dy: {:.2}pt, circle(radius: 5pt, fill: luma(90)))",
                x - 5.0,
                mid
            ),
            RestraintKind::Fixed => format!(
                "#place(dx: {:.2}pt, dy: {:.2}pt, rect(width: 10pt, height: 10pt, fill: luma(90)))",
                x - 5.0,
                mid - 5.0
            ),
            RestraintKind::Free => continue,
        };
        items.push(symbol);
    }

    format!(
        "#figure(\n  box(width: {:.1}pt, height: {:.1}pt)[\n    {}\n  ],\n  caption: [Beam schematic: {}],\n)",
        PLOT_WIDTH,
        PLOT_HEIGHT,
        items.join("\n    "),
        escape_typst(&schematic.name)
    )
}

fn point(x: f64, y: f64) -> String {
    format!("({:.2}pt, {:.2}pt)", x, y)
}

fn label(x: f64, y: f64, text: &str) -> String {
    format!("#place(dx: {:.2}pt, dy: {:.2}pt, text(size: 7pt)[{}])", x, y, text)
}

fn nonzero(value: f64) -> f64 {
    if value.abs() > f64::EPSILON {
        value
    } else {
        1.0
    }
}

/// Round to a whole number for tables, never printing `-0`.
fn format_value(value: f64) -> String {
    let rounded = value.round();
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{:.0}", rounded)
    }
}

/// Escape special Typst characters in user-provided strings
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
