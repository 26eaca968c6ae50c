//! # File I/O Module
//!
//! Reads beam text files and saves/loads beam projects.
//!
//! - **Beam text files**: the compact line format below
//! - **Project files**: JSON, saved atomically (write .tmp, fsync, rename)
//!   and version-checked on load
//! - **Settings files**: standalone JSON [`AnalysisSettings`]
//!
//! ## Beam Text Format
//!
//! ```text
//! Balcony transfer                     name
//! 4800, 24500, 1200000000, 1, 1        L, E, Iz[, Iy, A, J, nu, rho]
//! 1000:P, 3800:R                       position:kind (P, R, F or Free)
//! POINT:Fy, -10000, 4800, case:Live    direction, magnitude, location, case
//! DIST:Fy, 30, 30, 0, 4800, case:Dead  direction, w1, w2, x1, x2, case
//! ```
//!
//! Fields are comma separated and trimmed, blank lines are skipped and the
//! load type token is case-insensitive.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use beam_fe::LoadDirection;
use log::debug;

use crate::beam_data::{BeamAttributes, BeamLoad, RestraintKind, StructuredBeamData, Support};
use crate::errors::{CalcError, CalcResult};
use crate::project::{AnalysisSettings, BeamProject, SCHEMA_VERSION};

// ============================================================================
// Beam text files
// ============================================================================

/// Parse the contents of a beam text file.
///
/// # Example
/// ```
/// use beam_core::file_io::parse_beam_text;
///
/// let beam = parse_beam_text("Roof beam\n4800, 19200, 1000000000\n0:P, 4800:R\nDIST:Fy, -5, -5, 0, 4800, case:D\n")
///     .unwrap();
/// assert_eq!(beam.name, "Roof beam");
/// assert_eq!(beam.supports.len(), 2);
/// assert_eq!(beam.loads.len(), 1);
/// ```
pub fn parse_beam_text(text: &str) -> CalcResult<StructuredBeamData> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, name) = lines
        .next()
        .ok_or_else(|| CalcError::parse(1, "file is empty, expected the beam name"))?;

    let (attr_line, attr_text) = lines
        .next()
        .ok_or_else(|| CalcError::parse(2, "missing beam attributes (L, E, Iz, ...)"))?;
    let values = split_fields(attr_text)
        .map(|field| parse_number(attr_line, field))
        .collect::<CalcResult<Vec<f64>>>()?;
    let attributes = BeamAttributes::from_values(&values).map_err(|e| CalcError::parse(attr_line, e.to_string()))?;

    let (support_line, support_text) = lines
        .next()
        .ok_or_else(|| CalcError::parse(attr_line + 1, "missing support line (position:kind, ...)"))?;
    let fields: Vec<&str> = split_fields(support_text).collect();
    let supports = parse_supports(&fields).map_err(|e| CalcError::parse(support_line, e.to_string()))?;

    let loads = lines
        .map(|(line, text)| parse_load(line, text))
        .collect::<CalcResult<Vec<BeamLoad>>>()?;

    debug!(
        "Parsed beam '{}': {} supports, {} loads",
        name,
        supports.len(),
        loads.len()
    );

    Ok(StructuredBeamData {
        name: name.to_string(),
        attributes,
        supports,
        loads,
    })
}

/// Read and parse a beam text file.
pub fn read_beam_file(path: impl AsRef<Path>) -> CalcResult<StructuredBeamData> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    parse_beam_text(&text)
}

/// Parse `position:kind` support tokens.
///
/// # Example
/// ```
/// use beam_core::file_io::parse_supports;
/// use beam_core::beam_data::RestraintKind;
///
/// let supports = parse_supports(&["1000:P", "3800:R"]).unwrap();
/// assert_eq!(supports[1].position, 3800.0);
/// assert_eq!(supports[1].kind, RestraintKind::Roller);
/// ```
pub fn parse_supports(fields: &[&str]) -> CalcResult<Vec<Support>> {
    fields
        .iter()
        .map(|field| -> CalcResult<Support> {
            let (position, kind) = field
                .split_once(':')
                .ok_or_else(|| CalcError::invalid_input("support", *field, "expected position:kind"))?;
            let position = position
                .trim()
                .parse::<f64>()
                .map_err(|_| CalcError::invalid_input("support", *field, "position is not a number"))?;
            Ok(Support {
                position,
                kind: kind.parse::<RestraintKind>()?,
            })
        })
        .collect()
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(str::trim).filter(|f| !f.is_empty())
}

fn parse_number(line: usize, field: &str) -> CalcResult<f64> {
    field
        .parse::<f64>()
        .map_err(|_| CalcError::parse(line, format!("'{}' is not a number", field)))
}

fn parse_load(line: usize, text: &str) -> CalcResult<BeamLoad> {
    let fields: Vec<&str> = split_fields(text).collect();
    if fields.len() < 2 {
        return Err(CalcError::parse(line, "expected TYPE:direction, values and case:label"));
    }

    let (kind, direction) = fields
        .first()
        .and_then(|head| head.split_once(':'))
        .ok_or_else(|| CalcError::parse(line, "expected TYPE:direction as the first field"))?;
    let direction: LoadDirection = direction
        .parse()
        .map_err(|_| CalcError::parse(line, format!("unknown load direction '{}'", direction.trim())))?;

    let case = fields
        .last()
        .and_then(|tail| tail.split_once(':'))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("case"))
        .map(|(_, case)| case.trim().to_string())
        .filter(|case| !case.is_empty())
        .ok_or_else(|| CalcError::parse(line, "expected case:label as the last field"))?;

    let numbers = fields[1..fields.len() - 1]
        .iter()
        .map(|field| parse_number(line, field))
        .collect::<CalcResult<Vec<f64>>>()?;

    match (kind.trim().to_ascii_uppercase().as_str(), numbers.as_slice()) {
        ("POINT", &[magnitude, location]) => Ok(BeamLoad::point(direction, magnitude, location, case)),
        ("DIST", &[w1, w2, x1, x2]) => Ok(BeamLoad::distributed(direction, (w1, w2), (x1, x2), case)),
        ("POINT", _) => Err(CalcError::parse(line, "POINT loads take magnitude and location")),
        ("DIST", _) => Err(CalcError::parse(
            line,
            "DIST loads take start/end magnitude and start/end location",
        )),
        (other, _) => Err(CalcError::parse(line, format!("unknown load type '{}'", other))),
    }
}

// ============================================================================
// Project files
// ============================================================================

/// Save a project to a file with atomic write semantics.
///
/// 1. Serialize project to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename over the target
pub fn save_project(project: &BeamProject, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(project).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!("Saved project to {}", path.display());
    Ok(())
}

/// Load a project from a file.
///
/// # Returns
///
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_project(path: &Path) -> CalcResult<BeamProject> {
    let contents = read_text(path)?;

    let project: BeamProject = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&project.meta.version)?;
    Ok(project)
}

/// Load standalone analysis settings. Missing fields take their defaults.
pub fn load_settings(path: &Path) -> CalcResult<AnalysisSettings> {
    let contents = read_text(path)?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid settings in {}: {}", path.display(), e),
    })
}

fn read_text(path: &Path) -> CalcResult<String> {
    let mut file =
        File::open(path).map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [major, ..]) if file_major != major => Err(mismatch()),
        // 0.x: a newer minor may break the schema
        ([0, file_minor, ..], [0, minor, ..]) if file_minor > minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}
