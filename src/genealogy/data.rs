//! Demographic source data.
//!
//! Life expectancy, birth/marriage rates, first-name frequencies and ranked
//! surnames, deserialized from JSON. Defaults are embedded in the binary via
//! `include_str!`; a JSON file with the same layout can replace them.

use std::collections::BTreeMap;
use std::path::Path;
use serde::{Serialize, Deserialize};
use tracing::info;

use crate::genealogy::error::Result;
use crate::genealogy::model::Rates;
use crate::genealogy::person::Gender;

const DEFAULT_DEMOGRAPHICS_JSON: &str = include_str!("../../data/defaults/demographics.json");

/// One name with its observed frequency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameFrequency {
    pub name: String,
    pub frequency: f64,
}

/// First names given in one decade to one gender.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FirstNameTable {
    pub decade: i32,
    pub gender: Gender,
    pub names: Vec<NameFrequency>,
}

/// A surname and its popularity rank (1 = most common).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedSurname {
    pub name: String,
    pub rank: u32,
}

/// Raw demographic tables, before normalization into a `DemographicModel`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicData {
    /// Decade -> life expectancy in years.
    pub life_expectancy: BTreeMap<i32, f64>,
    /// Decade -> average children per person and marriage probability.
    pub rates: BTreeMap<i32, Rates>,
    pub first_names: Vec<FirstNameTable>,
    pub last_names: Vec<RankedSurname>,
    /// Surname rank -> probability. Ranks without an entry are not weighted.
    pub rank_probabilities: BTreeMap<u32, f64>,
}

impl DemographicData {
    /// Load the embedded default dataset.
    pub fn defaults() -> Self {
        serde_json::from_str(DEFAULT_DEMOGRAPHICS_JSON)
            .expect("Failed to parse embedded demographics.json")
    }

    /// Load a dataset from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let data: DemographicData = serde_json::from_str(&contents)?;
        info!(
            path = %path.display(),
            decades = data.life_expectancy.len(),
            name_tables = data.first_names.len(),
            surnames = data.last_names.len(),
            "loaded demographic data"
        );
        Ok(data)
    }

    /// Load from `path` if given, otherwise the embedded defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::defaults()),
        }
    }
}
