//! Load combinations per CSA S6-2019 and the envelope engine
//!
//! # Overview
//!
//! - [`CaseKey`] - Load case abbreviations used by the standard table (D, L, EQ, ...)
//! - [`LoadCombination`] - Named, ordered factors applied to case labels
//! - [`AlphaFactors`] / [`AlphaSelection`] - ULS load factors and how they are chosen
//! - [`ComboArrays`] / [`Envelope`] - Sampled results per combination and their envelopes
//!
//! # Example
//!
//! ```
//! use beam_core::loads::{csa_s6_2019_combinations, max_factored_load, AlphaFactors, CaseValues};
//!
//! let reactions: CaseValues = [("D".to_string(), 120.0), ("L".to_string(), 80.0)]
//!     .into_iter()
//!     .collect();
//! let combos = csa_s6_2019_combinations(&AlphaFactors::default());
//! let (value, name) = max_factored_load(&reactions, &combos).unwrap();
//! assert_eq!(name, "ULS1");
//! assert!((value - (1.2 * 120.0 + 1.7 * 80.0)).abs() < 1e-9);
//! ```

pub mod alpha_factors;
pub mod case_keys;
pub mod combinations;
pub mod envelope;

pub use alpha_factors::{
    AlphaFactors, AlphaSelection, Bound, CollisionKind, EarthPressureType, LiveLoadSpan, MaterialType,
};
pub use case_keys::CaseKey;
pub use combinations::{
    csa_s6_2019_combinations, factor_loads, max_factored_load, min_factored_load, unit_combinations, CaseValues,
    LoadCombination,
};
pub use envelope::{
    combine_cases, envelope_max, envelope_min, get_max_combo, get_min_combo, select_combo, ComboArrays, Envelope,
    ResultArray,
};
