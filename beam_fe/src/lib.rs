//! # beam_fe - Linear static solver for straight members
//!
//! A small direct-stiffness finite element engine for members lying on the
//! global X axis, with 6 degrees of freedom per node. Loads are tagged with a
//! load case and solved for every registered load combination.
//!
//! ## Example
//!
//! ```rust
//! use beam_fe::{Axis, FeModel, LoadCombo, LoadDirection, PointLoad, SectionProps};
//!
//! let mut model = FeModel::new();
//! model.add_node("N0", 0.0, 0.0, 0.0).unwrap();
//! model.add_node("N1", 4000.0, 0.0, 0.0).unwrap();
//! model.def_support("N0", [true; 6]).unwrap();
//! model.add_material("Steel", 200_000.0, 77_000.0, 0.3, 7.85e-9).unwrap();
//! let section = SectionProps { iy: 1.0e7, iz: 4.0e7, j: 1.0e5, a: 5000.0 };
//! model.add_member("M1", "N0", "N1", "Steel", section).unwrap();
//! model
//!     .add_member_pt_load("M1", PointLoad::new(LoadDirection::Fy, -5000.0, 4000.0).case("L"))
//!     .unwrap();
//! model.add_load_combo(LoadCombo::new("1.5L").with_factor("L", 1.5)).unwrap();
//! model.analyze(false).unwrap();
//!
//! let results = model.member_results("M1").unwrap();
//! let moment = results.moment(Axis::Z, 0.0, "1.5L").unwrap();
//! assert!((moment + 1.5 * 5000.0 * 4000.0).abs() < 1e-3);
//! ```

pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;

pub use error::{FeError, FeResult};
pub use loads::{DistLoad, LoadCombo, LoadDirection, PointLoad, DEFAULT_CASE, DEFAULT_COMBO};
pub use model::{FeModel, Member, Node, SectionProps, FIXED, FREE};
pub use results::{stations, Axis, MemberQuantity, MemberResults, ResultSamples};
