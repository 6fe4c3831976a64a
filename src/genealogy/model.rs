//! Demographic model: decade-indexed statistics and weighted name pools.
//!
//! Built once from [`DemographicData`] and read-only afterwards. Every lookup
//! that has no data fails with `MissingData`; degenerate weights are not
//! errors and fall back to uniform selection.

use std::collections::BTreeMap;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use super::data::{DemographicData, FirstNameTable, NameFrequency, RankedSurname};
use super::error::{GenealogyError, Result};
use super::person::Gender;

/// Birth and marriage statistics for one decade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    /// Average number of children per couple.
    pub birth_rate: f64,
    /// Probability that a person finds a partner.
    pub marriage_rate: f64,
}

/// A list of names sampled in proportion to their weights.
///
/// Without usable weights the pool samples uniformly.
#[derive(Clone, Debug)]
pub struct WeightedPool {
    names: Vec<String>,
    weights: Option<Vec<f64>>,
    sampler: Option<WeightedIndex<f64>>,
}

impl WeightedPool {
    /// Build a weighted pool. Weights that are all zero, negative or
    /// non-finite make the pool uniform.
    pub fn new(names: Vec<String>, weights: Vec<f64>) -> Result<Self> {
        if names.len() != weights.len() {
            return Err(GenealogyError::invalid(format!(
                "{} names but {} weights", names.len(), weights.len(),
            )));
        }
        if !weights.iter().all(|w| w.is_finite() && *w >= 0.0) {
            return Ok(Self::uniform(names));
        }
        let sampler = WeightedIndex::new(&weights);
        match sampler {
            Ok(sampler) => Ok(Self { names, weights: Some(weights), sampler: Some(sampler) }),
            Err(_) => Ok(Self::uniform(names)),
        }
    }

    pub fn uniform(names: Vec<String>) -> Self {
        Self { names, weights: None, sampler: None }
    }

    /// Surname pool from ranked names and a rank -> probability table.
    ///
    /// Names whose rank has a probability are kept and their probabilities
    /// normalized to sum to 1. If no rank resolves, or the resolved weights
    /// sum to zero, every known surname is equally likely.
    pub fn from_ranks(surnames: &[RankedSurname], rank_probabilities: &BTreeMap<u32, f64>) -> Self {
        let mut names = Vec::new();
        let mut weights = Vec::new();
        for surname in surnames {
            if let Some(&p) = rank_probabilities.get(&surname.rank) {
                names.push(surname.name.clone());
                weights.push(p);
            }
        }

        let all = || surnames.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
        let total: f64 = weights.iter().sum();
        let valid = weights.iter().all(|w| w.is_finite() && *w >= 0.0);
        if weights.is_empty() || !valid || total <= 0.0 || !total.is_finite() {
            if !surnames.is_empty() {
                warn!(surnames = surnames.len(), "no usable surname probabilities, sampling uniformly");
            }
            return Self::uniform(all());
        }

        let normalized: Vec<f64> = weights.iter().map(|w| w / total).collect();
        let sampler = WeightedIndex::new(&normalized);
        match sampler {
            Ok(sampler) => Self { names, weights: Some(normalized), sampler: Some(sampler) },
            Err(_) => Self::uniform(all()),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_uniform(&self) -> bool {
        self.sampler.is_none()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Sampling weights, or `None` for a uniform pool.
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Draw one name. `None` only if the pool is empty.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        if self.names.is_empty() {
            return None;
        }
        let idx = match &self.sampler {
            Some(sampler) => sampler.sample(rng),
            None => rng.gen_range(0..self.names.len()),
        };
        Some(&self.names[idx])
    }
}

/// Read-only demographic lookups and name sampling.
#[derive(Clone, Debug)]
pub struct DemographicModel {
    life_expectancy: BTreeMap<i32, f64>,
    rates: BTreeMap<i32, Rates>,
    // BTreeMap keeps gender fallback candidates in a stable order
    first_names: BTreeMap<(i32, Gender), WeightedPool>,
    surnames: WeightedPool,
}

impl DemographicModel {
    /// Normalize raw tables into a model.
    pub fn from_data(data: DemographicData) -> Result<Self> {
        let mut grouped: BTreeMap<(i32, Gender), (Vec<String>, Vec<f64>)> = BTreeMap::new();
        for table in data.first_names {
            let entry = grouped.entry((table.decade, table.gender)).or_default();
            for NameFrequency { name, frequency } in table.names {
                entry.0.push(name);
                entry.1.push(frequency);
            }
        }

        let mut first_names = BTreeMap::new();
        for (key, (names, weights)) in grouped {
            if names.is_empty() {
                continue;
            }
            let pool = WeightedPool::new(names, weights)?;
            if pool.is_uniform() {
                warn!(decade = key.0, gender = %key.1, "degenerate name frequencies, sampling uniformly");
            }
            first_names.insert(key, pool);
        }

        let surnames = WeightedPool::from_ranks(&data.last_names, &data.rank_probabilities);

        info!(
            decades = data.life_expectancy.len(),
            name_pools = first_names.len(),
            surnames = surnames.len(),
            uniform_surnames = surnames.is_uniform(),
            "demographic model ready"
        );

        Ok(Self {
            life_expectancy: data.life_expectancy,
            rates: data.rates,
            first_names,
            surnames,
        })
    }

    /// Model over the embedded default dataset.
    pub fn defaults() -> Result<Self> {
        Self::from_data(DemographicData::defaults())
    }

    pub fn builder() -> DemographicModelBuilder {
        DemographicModelBuilder::new()
    }

    pub fn life_expectancy(&self, decade: i32) -> Result<f64> {
        self.life_expectancy
            .get(&decade)
            .copied()
            .ok_or_else(|| GenealogyError::missing(format!("no life expectancy for the {}s", decade)))
    }

    pub fn rates(&self, decade: i32) -> Result<Rates> {
        self.rates
            .get(&decade)
            .copied()
            .ok_or_else(|| GenealogyError::missing(format!("no birth/marriage rates for the {}s", decade)))
    }

    /// Weighted first name for a decade and gender.
    ///
    /// Falls back to another gender's pool from the same decade, never to a
    /// different decade.
    pub fn sample_first_name<R: Rng>(&self, decade: i32, gender: Gender, rng: &mut R) -> Result<String> {
        let pool = match self.first_names.get(&(decade, gender)) {
            Some(pool) => pool,
            None => {
                let candidates: Vec<&WeightedPool> = self.first_names
                    .range((decade, Gender::Male)..=(decade, Gender::Female))
                    .filter(|((_, g), _)| *g != gender)
                    .map(|(_, pool)| pool)
                    .collect();
                if candidates.is_empty() {
                    return Err(GenealogyError::missing(format!("no first names for the {}s", decade)));
                }
                debug!(decade, gender = %gender, "no name pool for gender, using another pool of the decade");
                candidates[rng.gen_range(0..candidates.len())]
            }
        };
        pool.sample(rng)
            .map(str::to_string)
            .ok_or_else(|| GenealogyError::missing(format!("empty first name pool for the {}s", decade)))
    }

    /// Surname from the global pool.
    pub fn sample_last_name<R: Rng>(&self, rng: &mut R) -> Result<String> {
        self.surnames
            .sample(rng)
            .map(str::to_string)
            .ok_or_else(|| GenealogyError::missing("no surnames loaded"))
    }

    /// Decades that have life expectancy data, ascending.
    pub fn decades(&self) -> impl Iterator<Item = i32> + '_ {
        self.life_expectancy.keys().copied()
    }

    pub fn earliest_decade(&self) -> Option<i32> {
        self.life_expectancy.keys().next().copied()
    }

    /// Normalized surname probabilities, or `None` when sampling uniformly.
    pub fn surname_probabilities(&self) -> Option<&[f64]> {
        self.surnames.weights()
    }

    pub fn surname_pool(&self) -> &WeightedPool {
        &self.surnames
    }
}

/// Programmatic construction of a model, mainly for tests and small setups.
#[derive(Clone, Debug, Default)]
pub struct DemographicModelBuilder {
    data: DemographicData,
}

impl DemographicModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn life_expectancy(mut self, decade: i32, years: f64) -> Self {
        self.data.life_expectancy.insert(decade, years);
        self
    }

    pub fn rates(mut self, decade: i32, birth_rate: f64, marriage_rate: f64) -> Self {
        self.data.rates.insert(decade, Rates { birth_rate, marriage_rate });
        self
    }

    pub fn first_names(mut self, decade: i32, gender: Gender, names: &[(&str, f64)]) -> Self {
        self.data.first_names.push(FirstNameTable {
            decade,
            gender,
            names: names
                .iter()
                .map(|(name, frequency)| NameFrequency { name: name.to_string(), frequency: *frequency })
                .collect(),
        });
        self
    }

    pub fn surname(mut self, name: &str, rank: u32) -> Self {
        self.data.last_names.push(RankedSurname { name: name.to_string(), rank });
        self
    }

    pub fn rank_probability(mut self, rank: u32, probability: f64) -> Self {
        self.data.rank_probabilities.insert(rank, probability);
        self
    }

    /// Same statistics and name pools for every decade in `decades`.
    pub fn every_decade(
        mut self,
        decades: impl IntoIterator<Item = i32>,
        life_expectancy: f64,
        birth_rate: f64,
        marriage_rate: f64,
        names: &[(Gender, &str, f64)],
    ) -> Self {
        for decade in decades {
            self = self
                .life_expectancy(decade, life_expectancy)
                .rates(decade, birth_rate, marriage_rate);
            for (gender, name, frequency) in names {
                self = self.first_names(decade, *gender, &[(*name, *frequency)]);
            }
        }
        self
    }

    pub fn build(self) -> Result<DemographicModel> {
        DemographicModel::from_data(self.data)
    }
}
