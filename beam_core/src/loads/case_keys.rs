//! Load case keys per CSA S6-2019
//!
//! The standard combination table is keyed by these abbreviations. Beam
//! files may use any case label; only labels matching a key pick up a
//! non-zero factor from the standard table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

/// Load case categories used by the CSA S6-2019 combinations.
///
/// # Example
/// ```
/// use beam_core::loads::CaseKey;
///
/// assert_eq!(CaseKey::Earthquake.code(), "EQ");
/// assert_eq!("D".parse::<CaseKey>().unwrap(), CaseKey::Dead);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseKey {
    /// D - Dead load
    Dead,
    /// E - Earth pressure and hydrostatic pressure
    EarthPressure,
    /// P - Secondary prestress effects
    Prestress,
    /// L - Live load
    Live,
    /// K - Strains, deformations and displacements
    Strain,
    /// W - Wind on structure
    WindStructure,
    /// V - Wind on traffic
    WindTraffic,
    /// S - Differential settlement
    Settlement,
    /// EQ - Earthquake
    Earthquake,
    /// F - Stream pressure, ice forces, debris torrents
    Stream,
    /// A - Ice accretion
    IceAccretion,
    /// H - Collision
    Collision,
}

impl CaseKey {
    /// All keys in the column order of the combination table
    pub const ALL: [CaseKey; 12] = [
        CaseKey::Dead,
        CaseKey::EarthPressure,
        CaseKey::Prestress,
        CaseKey::Live,
        CaseKey::Strain,
        CaseKey::WindStructure,
        CaseKey::WindTraffic,
        CaseKey::Settlement,
        CaseKey::Earthquake,
        CaseKey::Stream,
        CaseKey::IceAccretion,
        CaseKey::Collision,
    ];

    /// Abbreviation used as the case label
    pub fn code(&self) -> &'static str {
        match self {
            CaseKey::Dead => "D",
            CaseKey::EarthPressure => "E",
            CaseKey::Prestress => "P",
            CaseKey::Live => "L",
            CaseKey::Strain => "K",
            CaseKey::WindStructure => "W",
            CaseKey::WindTraffic => "V",
            CaseKey::Settlement => "S",
            CaseKey::Earthquake => "EQ",
            CaseKey::Stream => "F",
            CaseKey::IceAccretion => "A",
            CaseKey::Collision => "H",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CaseKey::Dead => "dead load",
            CaseKey::EarthPressure => {
                "loads due to earth pressure and hydrostatic pressure, including surcharges but excluding dead load"
            }
            CaseKey::Prestress => "secondary prestress effects",
            CaseKey::Live => "live load",
            CaseKey::Strain => "all strains, deformations, and displacements and their effects",
            CaseKey::WindStructure => "wind load on structure",
            CaseKey::WindTraffic => "wind load on traffic",
            CaseKey::Settlement => "differential settlement and/or movement of the foundation",
            CaseKey::Earthquake => "earthquake load",
            CaseKey::Stream => "loads due to stream pressure and ice forces or to debris torrents",
            CaseKey::IceAccretion => "ice accretion load",
            CaseKey::Collision => "collision load arising from highway vehicles or vessels",
        }
    }
}

impl fmt::Display for CaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CaseKey {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseKey::ALL
            .iter()
            .copied()
            .find(|k| k.code() == s.trim())
            .ok_or_else(|| CalcError::invalid_input("case_key", s, "not a CSA S6 load case key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = CaseKey::ALL.iter().map(|k| k.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), CaseKey::ALL.len());
    }

    #[test]
    fn test_parse_round_trip_codes() {
        for key in CaseKey::ALL {
            assert_eq!(key.code().parse::<CaseKey>().unwrap(), key);
        }
        assert!("Dead".parse::<CaseKey>().is_err());
    }

    #[test]
    fn test_description() {
        assert_eq!(CaseKey::Stream.description(), "loads due to stream pressure and ice forces or to debris torrents");
        assert_eq!(format!("{}", CaseKey::Earthquake), "EQ");
    }
}
