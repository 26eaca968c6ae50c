//! # Project Data Structures
//!
//! A `BeamProject` bundles one beam with the analysis settings and report
//! metadata. Projects serialize to human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! BeamProject
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── settings: AnalysisSettings (stations, combinations, units, report choices)
//! └── beam: StructuredBeamData
//! ```
//!
//! ## Example
//!
//! ```rust
//! use beam_core::beam_data::{BeamAttributes, StructuredBeamData};
//! use beam_core::project::BeamProject;
//!
//! let attributes = BeamAttributes::from_values(&[6000.0, 200_000.0, 5.0e7]).unwrap();
//! let project = BeamProject::new("Jane Engineer", "25-042", StructuredBeamData::new("B1", attributes));
//!
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("\"n_points\": 500"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::beam_data::StructuredBeamData;
use crate::extraction::{Direction, DEFAULT_POINTS};
use crate::loads::{AlphaFactors, AlphaSelection};
use crate::units::{ForceUnit, LengthUnit, UnitSystem};

/// Current schema version for project files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamProject {
    pub meta: ProjectMetadata,

    #[serde(default)]
    pub settings: AnalysisSettings,

    pub beam: StructuredBeamData,
}

impl BeamProject {
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, beam: StructuredBeamData) -> Self {
        let now = Utc::now();
        BeamProject {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                title: beam.name.clone(),
                created: now,
                modified: now,
            },
            settings: AnalysisSettings::default(),
            beam,
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Report title
    pub title: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// How the ULS alpha factors are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    /// αD = 1.2, αE = 1.25, αP = 1.05, αL = 1.7 / 1.6 / 1.4, αL8 = 0
    #[default]
    Default,
    /// Look the factors up from category choices
    Advanced(AlphaSelection),
}

impl AlphaMode {
    pub fn alpha_factors(&self) -> AlphaFactors {
        match self {
            AlphaMode::Default => AlphaFactors::default(),
            AlphaMode::Advanced(selection) => selection.alpha_factors(),
        }
    }
}

/// Analysis and reporting options.
///
/// Every field has a default, so a settings file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Stations sampled along the beam
    pub n_points: usize,

    /// Register the CSA S6-2019 table instead of one combination per case
    pub include_standard_combos: bool,

    pub alpha_mode: AlphaMode,

    /// Log the load/reaction balance after solving
    pub check_statics: bool,

    pub force_unit: ForceUnit,

    pub length_unit: LengthUnit,

    pub shear_direction: Direction,

    pub moment_direction: Direction,

    /// Combination reported on its own; `None` reports the envelope only
    pub target_combo: Option<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            n_points: DEFAULT_POINTS,
            include_standard_combos: false,
            alpha_mode: AlphaMode::Default,
            check_statics: false,
            force_unit: ForceUnit::default(),
            length_unit: LengthUnit::default(),
            shear_direction: Direction::Fy,
            moment_direction: Direction::Mz,
            target_combo: None,
        }
    }
}

impl AnalysisSettings {
    pub fn units(&self) -> UnitSystem {
        UnitSystem::new(self.force_unit, self.length_unit)
    }

    pub fn alpha_factors(&self) -> AlphaFactors {
        self.alpha_mode.alpha_factors()
    }
}
