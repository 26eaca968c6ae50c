//! CSA S6-2019 Load Combinations
//!
//! Combinations are ordered lists of `case label -> factor`. The standard
//! table is generated from a set of [`AlphaFactors`]; user-defined
//! combinations can name any case label.
//!
//! ## Factoring
//!
//! Cases absent from a combination have factor 0, and cases absent from the
//! values being factored contribute 0. Factoring is therefore total and
//! linear in both the values and the factors.

use std::collections::BTreeMap;

use beam_fe::LoadCombo;
use serde::{Deserialize, Serialize};

use super::alpha_factors::AlphaFactors;
use super::case_keys::CaseKey;

/// Per-case values to be factored (a load, a reaction, a moment at a point).
pub type CaseValues = BTreeMap<String, f64>;

/// A named, ordered set of case factors.
///
/// # Example
/// ```
/// use beam_core::loads::{CaseValues, LoadCombination};
///
/// let combo = LoadCombination::new("Service")
///     .with_factor("Dead", 1.0)
///     .with_factor("Live", 0.9);
///
/// let values: CaseValues = [("Dead".to_string(), 20.0), ("Live".to_string(), 10.0)]
///     .into_iter()
///     .collect();
/// assert_eq!(combo.apply(&values), 29.0);
/// assert_eq!(combo.equation(), "Dead + 0.9Live");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Combination identifier (e.g., "ULS1", "Dead")
    pub name: String,

    /// Factors in declaration order
    pub factors: Vec<(String, f64)>,
}

impl LoadCombination {
    pub fn new(name: impl Into<String>) -> Self {
        LoadCombination {
            name: name.into(),
            factors: Vec::new(),
        }
    }

    /// Set the factor for a case, replacing an earlier value (builder pattern)
    pub fn with_factor(mut self, case: impl Into<String>, factor: f64) -> Self {
        let case = case.into();
        match self.factors.iter_mut().find(|(c, _)| *c == case) {
            Some(entry) => entry.1 = factor,
            None => self.factors.push((case, factor)),
        }
        self
    }

    /// Factor for a case (0.0 if the combination does not name it)
    pub fn factor(&self, case: &str) -> f64 {
        self.factors
            .iter()
            .find(|(c, _)| c == case)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Total factored value of `values` under this combination
    pub fn apply(&self, values: &CaseValues) -> f64 {
        self.factors
            .iter()
            .map(|(case, factor)| factor * values.get(case).copied().unwrap_or(0.0))
            .sum()
    }

    /// Human-readable equation, e.g. `1.2D + 1.25E + 1.05P + 1.7L`
    pub fn equation(&self) -> String {
        let terms: Vec<String> = self
            .factors
            .iter()
            .filter(|(_, f)| *f != 0.0)
            .map(|(case, f)| {
                if (*f - 1.0).abs() < f64::EPSILON {
                    case.clone()
                } else {
                    format!("{}{}", f, case)
                }
            })
            .collect();

        if terms.is_empty() {
            "0".to_string()
        } else {
            terms.join(" + ")
        }
    }

    /// Case labels with a non-zero factor
    pub fn cases(&self) -> impl Iterator<Item = &str> {
        self.factors
            .iter()
            .filter(|(_, f)| *f != 0.0)
            .map(|(c, _)| c.as_str())
    }
}

impl From<&LoadCombination> for LoadCombo {
    fn from(combo: &LoadCombination) -> Self {
        combo
            .factors
            .iter()
            .fold(LoadCombo::new(combo.name.clone()), |fe, (case, factor)| {
                fe.with_factor(case.clone(), *factor)
            })
    }
}

impl From<&LoadCombo> for LoadCombination {
    fn from(combo: &LoadCombo) -> Self {
        LoadCombination {
            name: combo.name.clone(),
            factors: combo.factors.clone(),
        }
    }
}

/// Build one combination from a row of the table, dropping zero factors.
fn table_row(name: &str, row: [f64; 12]) -> LoadCombination {
    CaseKey::ALL
        .iter()
        .zip(row)
        .filter(|(_, factor)| *factor != 0.0)
        .fold(LoadCombination::new(name), |combo, (key, factor)| {
            combo.with_factor(key.code(), factor)
        })
}

/// Generate the CSA S6-2019 load combinations (Table 3.1)
///
/// Order: unfactored, FLS1, SLS1, SLS2, ULS1 through ULS9. Case columns are
/// `D, E, P, L, K, W, V, S, EQ, F, A, H`.
///
/// # Example
/// ```
/// use beam_core::loads::{csa_s6_2019_combinations, AlphaFactors};
///
/// let combos = csa_s6_2019_combinations(&AlphaFactors::default());
/// assert_eq!(combos.len(), 13);
/// assert_eq!(combos[4].name, "ULS1");
/// assert_eq!(combos[4].factor("L"), 1.7);
/// ```
pub fn csa_s6_2019_combinations(alphas: &AlphaFactors) -> Vec<LoadCombination> {
    let AlphaFactors { d, e, p, l1, l2, l3, l8 } = *alphas;

    vec![
        //                        D     E    P    L    K     W     V     S    EQ   F    A    H
        table_row("unfactored", [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
        table_row("FLS1", [1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        table_row("SLS1", [1.0, 1.0, 1.0, 0.9, 0.8, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
        table_row("SLS2", [0.0, 0.0, 0.0, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        table_row("ULS1", [d, e, p, l1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        table_row("ULS2", [d, e, p, l2, 1.15, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        table_row("ULS3", [d, e, p, l3, 1.0, 0.45, 0.45, 0.0, 0.0, 0.0, 0.0, 0.0]),
        table_row("ULS4", [d, e, p, 0.0, 1.25, 1.4, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        table_row("ULS5", [d, e, p, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]),
        table_row("ULS6", [d, e, p, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.3, 0.0, 0.0]),
        table_row("ULS7", [d, e, p, 0.0, 0.0, 0.75, 0.0, 0.0, 0.0, 0.0, 1.3, 0.0]),
        table_row("ULS8", [d, e, p, l8, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        table_row("ULS9", [1.35, e, p, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ]
}

/// One combination per case label, each with factor 1.0, in the given order.
pub fn unit_combinations<'a>(cases: impl IntoIterator<Item = &'a str>) -> Vec<LoadCombination> {
    cases
        .into_iter()
        .map(|case| LoadCombination::new(case).with_factor(case, 1.0))
        .collect()
}

/// Factored total of `case_values` under `combo`.
///
/// Missing cases on either side contribute 0, so this never fails.
pub fn factor_loads(case_values: &CaseValues, combo: &LoadCombination) -> f64 {
    combo.apply(case_values)
}

/// Largest factored value across `combos` and the first combination that
/// reaches it. `None` when `combos` is empty.
pub fn max_factored_load<'a>(
    case_values: &CaseValues,
    combos: &'a [LoadCombination],
) -> Option<(f64, &'a str)> {
    let mut best: Option<(f64, &str)> = None;
    for combo in combos {
        let load = combo.apply(case_values);
        if best.map_or(true, |(value, _)| load > value) {
            best = Some((load, combo.name.as_str()));
        }
    }
    best
}

/// Smallest factored value across `combos` (critical for uplift) and the
/// first combination that reaches it.
pub fn min_factored_load<'a>(
    case_values: &CaseValues,
    combos: &'a [LoadCombination],
) -> Option<(f64, &'a str)> {
    let mut best: Option<(f64, &str)> = None;
    for combo in combos {
        let load = combo.apply(case_values);
        if best.map_or(true, |(value, _)| load < value) {
            best = Some((load, combo.name.as_str()));
        }
    }
    best
}
