//! Envelopes and governing combinations
//!
//! Operates on sampled result arrays, one per load combination, all taken at
//! the same stations along the beam. Every function is pure: inputs are
//! borrowed, outputs are new values.
//!
//! ## Tie-breaking
//!
//! Combinations are kept in registration order. Whenever two combinations
//! produce the same extreme, the one registered first governs.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::loads::{envelope_max, get_max_combo, ComboArrays, ResultArray};
//!
//! let positions = vec![0.0, 1.0, 2.0];
//! let mut arrays = ComboArrays::new();
//! arrays.push("A", ResultArray::new(positions.clone(), vec![0.0, 5.0, 1.0]).unwrap());
//! arrays.push("B", ResultArray::new(positions, vec![2.0, 3.0, 4.0]).unwrap());
//!
//! let env = envelope_max(&arrays).unwrap();
//! assert_eq!(env.values, vec![2.0, 5.0, 4.0]);
//! assert_eq!(env.governing, vec!["B", "A", "B"]);
//!
//! let (name, _) = get_max_combo(&arrays).unwrap();
//! assert_eq!(name, "A");
//! ```

use serde::{Deserialize, Serialize};

use super::combinations::LoadCombination;
use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Arrays
// ============================================================================

/// Values of one result quantity sampled at stations along the beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultArray {
    pub positions: Vec<f64>,
    pub values: Vec<f64>,
}

impl ResultArray {
    /// Pair up positions and values; the two must have the same length and
    /// every entry must be finite.
    pub fn new(positions: Vec<f64>, values: Vec<f64>) -> CalcResult<Self> {
        if positions.len() != values.len() {
            return Err(CalcError::invalid_input(
                "values",
                values.len().to_string(),
                format!("expected {} values to match the stations", positions.len()),
            ));
        }
        let array = ResultArray { positions, values };
        array.check_finite("array")?;
        Ok(array)
    }

    fn check_finite(&self, name: &str) -> CalcResult<()> {
        let bad = self
            .positions
            .iter()
            .chain(&self.values)
            .find(|v| !v.is_finite());
        match bad {
            Some(v) => Err(CalcError::invalid_input(
                name,
                v.to_string(),
                "positions and values must be finite",
            )),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest value and its position (first occurrence)
    pub fn max(&self) -> Option<(f64, f64)> {
        self.extreme(|candidate, best| candidate > best)
    }

    /// Smallest value and its position (first occurrence)
    pub fn min(&self) -> Option<(f64, f64)> {
        self.extreme(|candidate, best| candidate < best)
    }

    fn extreme(&self, better: impl Fn(f64, f64) -> bool) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for (&x, &v) in self.positions.iter().zip(&self.values) {
            if best.map_or(true, |(value, _)| better(v, value)) {
                best = Some((v, x));
            }
        }
        best
    }
}

/// Ordered `(combination name, array)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboArrays {
    entries: Vec<(String, ResultArray)>,
}

impl ComboArrays {
    pub fn new() -> Self {
        ComboArrays { entries: Vec::new() }
    }

    /// Append an array; a repeated name replaces the earlier entry in place.
    pub fn push(&mut self, name: impl Into<String>, array: ResultArray) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = array,
            None => self.entries.push((name, array)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResultArray> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultArray)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Station positions shared by every array, after checking they agree
    /// in count and hold only finite numbers.
    fn common_positions(&self) -> CalcResult<&[f64]> {
        let (_, first) = self
            .entries
            .first()
            .ok_or_else(|| CalcError::invalid_input("arrays", "0", "no load combinations to envelope"))?;

        if let Some((name, array)) = self.entries.iter().find(|(_, a)| a.len() != first.len()) {
            return Err(CalcError::invalid_input(
                name.clone(),
                array.len().to_string(),
                format!("station count differs from {}", first.len()),
            ));
        }
        // public fields and serde bypass `new`
        for (name, array) in &self.entries {
            array.check_finite(name)?;
        }
        Ok(&first.positions)
    }
}

/// Per-station extreme across combinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub positions: Vec<f64>,
    pub values: Vec<f64>,
    /// Governing combination name at each station
    pub governing: Vec<String>,
}

impl Envelope {
    /// View the envelope as a plain array (drops the governing names)
    pub fn to_array(&self) -> ResultArray {
        ResultArray {
            positions: self.positions.clone(),
            values: self.values.clone(),
        }
    }
}

// ============================================================================
// Operations
// ============================================================================

/// The array for one named combination.
pub fn select_combo<'a>(arrays: &'a ComboArrays, name: &str) -> CalcResult<&'a ResultArray> {
    arrays.get(name).ok_or_else(|| CalcError::unknown_combo(name))
}

/// Per-station maximum across all combinations.
pub fn envelope_max(arrays: &ComboArrays) -> CalcResult<Envelope> {
    envelope(arrays, |candidate, best| candidate > best)
}

/// Per-station minimum across all combinations.
pub fn envelope_min(arrays: &ComboArrays) -> CalcResult<Envelope> {
    envelope(arrays, |candidate, best| candidate < best)
}

fn envelope(arrays: &ComboArrays, better: impl Fn(f64, f64) -> bool) -> CalcResult<Envelope> {
    let positions = arrays.common_positions()?.to_vec();
    let mut values = Vec::with_capacity(positions.len());
    let mut governing = Vec::with_capacity(positions.len());

    for i in 0..positions.len() {
        let mut best: Option<(f64, &str)> = None;
        for (name, array) in arrays.iter() {
            let v = array.values[i];
            if best.map_or(true, |(value, _)| better(v, value)) {
                best = Some((v, name));
            }
        }
        if let Some((value, name)) = best {
            values.push(value);
            governing.push(name.to_string());
        }
    }

    Ok(Envelope {
        positions,
        values,
        governing,
    })
}

/// The combination whose peak value anywhere along the beam is highest,
/// with its (unenveloped) array.
pub fn get_max_combo(arrays: &ComboArrays) -> CalcResult<(&str, &ResultArray)> {
    governing_combo(arrays, ResultArray::max, |candidate, best| candidate > best)
}

/// The combination whose lowest value anywhere along the beam is lowest.
pub fn get_min_combo(arrays: &ComboArrays) -> CalcResult<(&str, &ResultArray)> {
    governing_combo(arrays, ResultArray::min, |candidate, best| candidate < best)
}

fn governing_combo<'a>(
    arrays: &'a ComboArrays,
    peak: impl Fn(&ResultArray) -> Option<(f64, f64)>,
    better: impl Fn(f64, f64) -> bool,
) -> CalcResult<(&'a str, &'a ResultArray)> {
    arrays.common_positions()?;

    let mut best: Option<(f64, &str, &ResultArray)> = None;
    for (name, array) in arrays.iter() {
        if let Some((value, _)) = peak(array) {
            if best.map_or(true, |(b, _, _)| better(value, b)) {
                best = Some((value, name, array));
            }
        }
    }

    best.map(|(_, name, array)| (name, array))
        .ok_or_else(|| CalcError::invalid_input("arrays", "empty", "combinations have no stations"))
}

/// Combine per-case arrays into per-combination arrays, station by station.
///
/// Cases a combination names but `case_arrays` lacks contribute zero.
pub fn combine_cases(case_arrays: &ComboArrays, combos: &[LoadCombination]) -> CalcResult<ComboArrays> {
    let positions = case_arrays.common_positions()?;
    let mut out = ComboArrays::new();

    for combo in combos {
        let mut values = vec![0.0; positions.len()];
        for (case, factor) in &combo.factors {
            if let Some(array) = case_arrays.get(case) {
                for (total, v) in values.iter_mut().zip(&array.values) {
                    *total += factor * v;
                }
            }
        }
        out.push(combo.name.clone(), ResultArray::new(positions.to_vec(), values)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arrays(data: &[(&str, Vec<f64>)]) -> ComboArrays {
        let mut out = ComboArrays::new();
        for (name, values) in data {
            let positions = (0..values.len()).map(|i| i as f64).collect();
            out.push(*name, ResultArray::new(positions, values.clone()).unwrap());
        }
        out
    }

    #[test]
    fn test_select_combo() {
        let a = arrays(&[("D", vec![1.0, 2.0]), ("L", vec![3.0, 4.0])]);
        assert_eq!(select_combo(&a, "L").unwrap().values, vec![3.0, 4.0]);
        assert_eq!(select_combo(&a, "W").unwrap_err(), CalcError::unknown_combo("W"));
    }

    #[test]
    fn test_envelope_dominance() {
        let a = arrays(&[
            ("C1", vec![0.0, -3.0, 4.0, 1.0]),
            ("C2", vec![1.0, -1.0, 2.0, -6.0]),
            ("C3", vec![-2.0, 5.0, 0.5, 0.0]),
        ]);
        let max = envelope_max(&a).unwrap();
        let min = envelope_min(&a).unwrap();
        for (_, array) in a.iter() {
            for i in 0..array.len() {
                assert!(max.values[i] >= array.values[i]);
                assert!(min.values[i] <= array.values[i]);
            }
        }
        assert_eq!(max.governing, vec!["C2", "C3", "C1", "C1"]);
        assert_eq!(min.governing, vec!["C3", "C1", "C3", "C2"]);
    }

    #[test]
    fn test_envelope_tie_goes_to_first() {
        let a = arrays(&[("first", vec![2.0, 1.0]), ("second", vec![2.0, 1.0])]);
        assert_eq!(envelope_max(&a).unwrap().governing, vec!["first", "first"]);
        assert_eq!(envelope_min(&a).unwrap().governing, vec!["first", "first"]);
    }

    #[test]
    fn test_envelope_rejects_bad_input() {
        assert_eq!(envelope_max(&ComboArrays::new()).unwrap_err().error_code(), "INVALID_INPUT");
        let a = arrays(&[("A", vec![1.0, 2.0]), ("B", vec![1.0])]);
        assert_eq!(envelope_min(&a).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let err = ResultArray::new(vec![0.0, 1.0], vec![f64::NAN, 2.0]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(ResultArray::new(vec![0.0, f64::INFINITY], vec![1.0, 2.0]).is_err());

        // a NaN leading combination must not stick as the envelope value
        let mut a = arrays(&[("B", vec![1.0, 2.0])]);
        a.entries.insert(
            0,
            (
                "A".to_string(),
                ResultArray {
                    positions: vec![0.0, 1.0],
                    values: vec![f64::NAN, 0.0],
                },
            ),
        );
        assert_eq!(envelope_max(&a).unwrap_err().error_code(), "INVALID_INPUT");
        assert_eq!(envelope_min(&a).unwrap_err().error_code(), "INVALID_INPUT");
        assert_eq!(get_max_combo(&a).unwrap_err().error_code(), "INVALID_INPUT");
        assert_eq!(get_min_combo(&a).unwrap_err().error_code(), "INVALID_INPUT");
        assert_eq!(
            combine_cases(&a, &[LoadCombination::new("C").with_factor("A", 1.0)])
                .unwrap_err()
                .error_code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_max_combo_is_global_peak() {
        // B wins more stations but A has the single highest value
        let a = arrays(&[("A", vec![0.0, 9.0, 0.0]), ("B", vec![5.0, 5.0, 5.0])]);
        let (name, array) = get_max_combo(&a).unwrap();
        assert_eq!(name, "A");
        assert_eq!(array.values, vec![0.0, 9.0, 0.0]);

        let (name, _) = get_min_combo(&a).unwrap();
        assert_eq!(name, "A");
    }

    #[test]
    fn test_max_combo_tie_first() {
        let a = arrays(&[("X", vec![1.0, 7.0]), ("Y", vec![7.0, 1.0])]);
        assert_eq!(get_max_combo(&a).unwrap().0, "X");
        assert_eq!(get_min_combo(&a).unwrap().0, "X");
    }

    #[test]
    fn test_combine_cases() {
        let cases = arrays(&[("D", vec![1.0, 2.0, 3.0]), ("L", vec![0.5, 0.0, -1.0])]);
        let combos = vec![
            LoadCombination::new("ULS1").with_factor("D", 1.2).with_factor("L", 1.7),
            LoadCombination::new("Wind").with_factor("W", 1.4),
        ];
        let combined = combine_cases(&cases, &combos).unwrap();
        assert_eq!(combined.names(), vec!["ULS1", "Wind"]);

        let uls1 = select_combo(&combined, "ULS1").unwrap();
        assert_relative_eq!(uls1.values[0], 2.05, epsilon = 1e-12);
        assert_relative_eq!(uls1.values[2], 1.9, epsilon = 1e-12);
        assert_eq!(select_combo(&combined, "Wind").unwrap().values, vec![0.0; 3]);
    }

    #[test]
    fn test_result_array_extremes() {
        let array = ResultArray::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 4.0, 4.0, -2.0]).unwrap();
        assert_eq!(array.max(), Some((4.0, 1.0)));
        assert_eq!(array.min(), Some((-2.0, 3.0)));
        assert!(ResultArray::new(vec![0.0], vec![]).is_err());
    }
}
