//! # beam_core - Beam analysis on top of beam_fe
//!
//! `beam_core` turns a plain description of a straight beam (length, section
//! properties, supports and loads tagged with load cases) into a solved
//! finite element model, then pulls shear, moment, axial, torque and
//! deflection arrays out of it for every load combination. Arrays can be
//! enveloped, searched for the governing combination, or combined
//! case-by-case with the CSA S6-2019 ULS/SLS table.
//!
//! ## Design Philosophy
//!
//! - **Ordered**: combinations are kept in registration order, which is the
//!   tie-break order everywhere
//! - **JSON-First**: beam data, settings and results implement Serialize/Deserialize
//! - **Rich Errors**: structured [`CalcError`] values with stable error codes
//!
//! ## Quick Start
//!
//! ```rust
//! use beam_core::file_io::parse_beam_text;
//! use beam_core::extraction::{extract_all_combos, Direction, ResultType};
//! use beam_core::loads::{envelope_max, AlphaFactors};
//! use beam_core::model::analyze_beam;
//!
//! let beam = parse_beam_text(
//!     "Balcony\n4800, 200000, 50000000\n1000:P, 3800:R\nDIST:Fy, 30, 30, 0, 4800, case:Dead\n",
//! )
//! .unwrap();
//!
//! let model = analyze_beam(&beam, false, &AlphaFactors::default(), false).unwrap();
//! let moments = extract_all_combos(&model, ResultType::Moment, Direction::Mz, 101).unwrap();
//! let envelope = envelope_max(&moments).unwrap();
//! assert_eq!(envelope.positions.len(), 101);
//! ```
//!
//! ## Modules
//!
//! - [`beam_data`] - Beam record: attributes, supports and loads
//! - [`model`] - Builds and solves the FE model of a beam
//! - [`extraction`] - Result arrays and reactions per combination
//! - [`loads`] - Combinations, alpha factors, envelopes and governing-combination search
//! - [`equations`] - Closed-form checks
//! - [`diagram`] - Plot data for diagrams and the beam schematic
//! - [`report`] - Typst PDF report
//! - [`project`] - Project container, metadata and analysis settings
//! - [`file_io`] - Beam text files and atomic project saves
//! - [`units`] - Unit labels
//! - [`errors`] - Structured error types

pub mod beam_data;
pub mod diagram;
pub mod equations;
pub mod errors;
pub mod extraction;
pub mod file_io;
pub mod loads;
pub mod model;
pub mod project;
pub mod report;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use beam_data::{BeamAttributes, BeamLoad, RestraintKind, StructuredBeamData, Support};
pub use errors::{CalcError, CalcResult};
pub use extraction::{extract_all_combos, extract_reactions, Direction, ResultType};
pub use file_io::{load_project, read_beam_file, save_project};
pub use model::{analyze_beam, build_beam};
pub use project::{AnalysisSettings, BeamProject, ProjectMetadata};
