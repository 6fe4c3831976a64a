//! Family tree generation engine.
//!
//! Owns the seeded RNG and runs the whole pipeline: config validation,
//! founding couple, breadth-first expansion.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use super::config::TreeConfig;
use super::decade_of;
use super::error::{GenealogyError, Result};
use super::factory::PersonFactory;
use super::model::DemographicModel;
use super::tree::FamilyTree;

/// The family tree generation engine.
pub struct TreeEngine {
    pub seed: u64,
    pub rng: ChaCha8Rng,
}

impl TreeEngine {
    /// Create a new engine with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Engine seeded from the config, or from entropy if it has no seed.
    pub fn from_config(config: &TreeConfig) -> Self {
        Self::new(config.seed.unwrap_or_else(|| rand::random()))
    }

    /// Grow a complete family tree.
    pub fn grow(&mut self, model: &DemographicModel, config: &TreeConfig) -> Result<FamilyTree> {
        let mut tree = FamilyTree::new(config)?;
        match model.earliest_decade() {
            Some(earliest) if earliest <= decade_of(config.start_year) => {}
            _ => {
                return Err(GenealogyError::missing(format!(
                    "dataset starts after the {}s",
                    decade_of(config.start_year)
                )))
            }
        }
        let factory = PersonFactory::new(model, config.start_year);

        info!(
            seed = self.seed,
            start_year = config.start_year,
            end_year = config.end_year,
            decades = model.decades().count(),
            surnames = model.surname_pool().len(),
            "growing family tree"
        );
        tree.build(&factory, &mut self.rng)?;
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genealogy::person::Gender;

    #[test]
    fn test_same_seed_same_tree() {
        let model = DemographicModel::defaults().unwrap();
        let config = TreeConfig::new(1950, 2040);

        let a = TreeEngine::new(2024).grow(&model, &config).unwrap();
        let b = TreeEngine::new(2024).grow(&model, &config).unwrap();
        assert_eq!(a.population().as_slice(), b.population().as_slice());
        assert_eq!(a.duplicate_full_names(), b.duplicate_full_names());
    }

    #[test]
    fn test_config_seed_is_used() {
        let mut config = TreeConfig::new(1950, 2000);
        config.seed = Some(77);
        let engine = TreeEngine::from_config(&config);
        assert_eq!(engine.seed, 77);
    }

    #[test]
    fn test_default_data_grows_full_range() {
        let model = DemographicModel::defaults().unwrap();
        let tree = TreeEngine::new(7).grow(&model, &TreeConfig::default()).unwrap();
        assert!(tree.total_people() >= 2);
        assert!(tree.people().all(|p| p.first_name.len() > 1 && p.last_name.len() > 1));
        assert!(tree.people().filter(|p| !tree.roots().contains(&p.id)).all(|p| p.birth_year >= 1950));
    }

    #[test]
    fn test_dataset_starting_late_is_rejected() {
        let model = DemographicModel::builder()
            .every_decade([1980, 1990], 70.0, 2.0, 1.0, &[(Gender::Female, "Ada", 1.0)])
            .surname("Lovelace", 1)
            .build()
            .unwrap();
        let err = TreeEngine::new(1).grow(&model, &TreeConfig::new(1950, 2000)).unwrap_err();
        assert!(matches!(err, GenealogyError::MissingData(_)));
    }

    #[test]
    fn test_invalid_config_fails_before_generation() {
        let model = DemographicModel::defaults().unwrap();
        let result = TreeEngine::new(1).grow(&model, &TreeConfig::new(2100, 2000));
        assert!(result.is_err());
    }
}
