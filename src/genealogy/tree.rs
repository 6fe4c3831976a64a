//! The family tree: breadth-first expansion from a founding couple.

use std::collections::{BTreeMap, VecDeque};
use rand::Rng;
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use super::config::TreeConfig;
use super::error::{GenealogyError, Result};
use super::factory::PersonFactory;
use super::person::{Person, Population};
use super::queries::{self, TreeSummary};
use super::PersonId;

/// Build progress of a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeState {
    /// No founders yet.
    Empty,
    /// Founding couple created, not yet expanded.
    Rooted,
    /// Fully expanded.
    Built,
    /// A build aborted. The partial population is kept for inspection but
    /// the tree cannot be built again.
    Failed,
}

/// A generated family tree and the population it owns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FamilyTree {
    start_year: i32,
    end_year: i32,
    roots: Vec<PersonId>,
    people: Population,
    /// Generation of each person, indexed like `people`. Founders are 0,
    /// partners share their spouse's generation.
    generations: Vec<u32>,
    state: TreeState,
}

impl FamilyTree {
    pub fn new(config: &TreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            start_year: config.start_year,
            end_year: config.end_year,
            roots: Vec::new(),
            people: Population::new(),
            generations: Vec::new(),
            state: TreeState::Empty,
        })
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    pub fn state(&self) -> TreeState {
        self.state
    }

    pub fn roots(&self) -> &[PersonId] {
        &self.roots
    }

    pub fn population(&self) -> &Population {
        &self.people
    }

    /// Everyone in discovery order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.people.get(id)
    }

    pub fn generation(&self, id: PersonId) -> Option<u32> {
        self.generations.get(id.index()).copied()
    }

    /// Create the two founders, both born in the start year, as partners.
    ///
    /// Does nothing if the tree already has founders. A failure marks the
    /// tree as `Failed`.
    pub fn create_initial_couple<R: Rng>(
        &mut self,
        factory: &PersonFactory<'_>,
        rng: &mut R,
    ) -> Result<(PersonId, PersonId)> {
        if self.state == TreeState::Failed {
            return Err(GenealogyError::BuildFailed);
        }
        if let [a, b] = self.roots.as_slice() {
            return Ok((*a, *b));
        }

        let founders = self.found_couple(factory, rng);
        if founders.is_err() {
            self.state = TreeState::Failed;
        }
        founders
    }

    fn found_couple<R: Rng>(
        &mut self,
        factory: &PersonFactory<'_>,
        rng: &mut R,
    ) -> Result<(PersonId, PersonId)> {
        let a = factory.create_person(&mut self.people, self.start_year, rng)?;
        self.record_generation(a, 0);
        let b = factory.create_person(&mut self.people, self.start_year, rng)?;
        self.record_generation(b, 0);
        self.people.link_partners(a, b)?;

        self.roots = vec![a, b];
        self.state = TreeState::Rooted;
        debug!(founder_a = %self.people[a], founder_b = %self.people[b], "founding couple created");
        Ok((a, b))
    }

    /// Expand the tree breadth-first until no one born by the end year is
    /// left to process.
    ///
    /// Each person may gain a partner; children are generated by the partner
    /// with the earlier (or equal) birth year. A failed lookup aborts the
    /// build, keeps the partial population and leaves the tree `Failed`.
    pub fn build<R: Rng>(&mut self, factory: &PersonFactory<'_>, rng: &mut R) -> Result<()> {
        match self.state {
            TreeState::Built => return Err(GenealogyError::AlreadyBuilt),
            TreeState::Failed => return Err(GenealogyError::BuildFailed),
            TreeState::Empty => {
                self.create_initial_couple(factory, rng)?;
            }
            TreeState::Rooted => {}
        }

        if let Err(e) = self.expand(factory, rng) {
            self.state = TreeState::Failed;
            warn!(error = %e, people = self.people.len(), "family tree build aborted");
            return Err(e);
        }

        self.state = TreeState::Built;
        info!(
            total = self.people.len(),
            generations = self.generation_count(),
            end_year = self.end_year,
            "family tree built"
        );
        Ok(())
    }

    fn expand<R: Rng>(&mut self, factory: &PersonFactory<'_>, rng: &mut R) -> Result<()> {
        let mut queue: VecDeque<PersonId> = self.roots.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            let generation = self.generations[id.index()];
            let mut partner = self.people[id].partner;

            if partner.is_none() && factory.has_partner(&self.people[id], rng)? {
                let created = factory.create_partner(&mut self.people, id, rng)?;
                self.record_generation(created, generation);
                queue.push_back(created);
                partner = Some(created);
            }

            let Some(partner) = partner else { continue };
            if self.people[id].birth_year > self.people[partner].birth_year {
                continue;
            }

            let created = factory.create_children(&mut self.people, id, partner, self.end_year, rng);
            // Children adopted before a failure still belong to this couple
            while self.generations.len() < self.people.len() {
                self.generations.push(generation + 1);
            }
            let children = created?;
            for &child in &children {
                if self.people[child].birth_year <= self.end_year {
                    queue.push_back(child);
                }
            }
            if !children.is_empty() {
                debug!(
                    parent = %self.people[id],
                    partner = %self.people[partner],
                    children = children.len(),
                    "couple had children"
                );
            }
        }
        Ok(())
    }

    fn record_generation(&mut self, id: PersonId, generation: u32) {
        debug_assert_eq!(id.index(), self.generations.len());
        self.generations.push(generation);
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn total_people(&self) -> usize {
        self.people.len()
    }

    /// People per birth decade, ascending.
    pub fn total_people_by_decade(&self) -> BTreeMap<i32, usize> {
        queries::count_by_decade(self.people.iter())
    }

    /// Full names held by more than one person, most common first.
    pub fn duplicate_full_names(&self) -> Vec<(String, usize)> {
        queries::duplicate_full_names(self.people.iter())
    }

    /// Number of generations present, counting the founders.
    pub fn generation_count(&self) -> u32 {
        self.generations.iter().max().map_or(0, |g| g + 1)
    }

    pub fn summary(&self) -> TreeSummary {
        TreeSummary::compute(
            self.start_year,
            self.end_year,
            self.people.as_slice(),
            &self.roots,
            self.generation_count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genealogy::model::DemographicModel;
    use crate::genealogy::person::Gender;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// One name per gender, one surname, birth rate 2, everyone marries.
    fn minimal_model() -> DemographicModel {
        DemographicModel::builder()
            .every_decade(
                (1950..=2150).step_by(10),
                70.0,
                2.0,
                1.0,
                &[(Gender::Female, "Ada", 1.0), (Gender::Male, "Alan", 1.0)],
            )
            .surname("Lovelace", 1)
            .rank_probability(1, 1.0)
            .build()
            .unwrap()
    }

    fn grow(model: &DemographicModel, start: i32, end: i32, seed: u64) -> FamilyTree {
        let factory = PersonFactory::new(model, start);
        let mut tree = FamilyTree::new(&TreeConfig::new(start, end)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        tree.build(&factory, &mut rng).unwrap();
        tree
    }

    /// Structural relationship graph: (birth year, partner, children) per person.
    fn graph(tree: &FamilyTree) -> Vec<(i32, Option<PersonId>, Vec<PersonId>)> {
        tree.people()
            .map(|p| (p.birth_year, p.partner, p.children.clone()))
            .collect()
    }

    fn assert_tree_invariants(tree: &FamilyTree) {
        let pop = tree.population();
        for person in tree.people() {
            if let Some(partner) = person.partner {
                assert_eq!(pop[partner].partner, Some(person.id), "partner link not symmetric");
            }

            let mut seen = std::collections::HashSet::new();
            for &child in &person.children {
                assert!(seen.insert(child), "child listed twice");
                let partner = person.partner.expect("parents are always partners");
                assert!(pop[partner].children.contains(&child), "child missing from partner");

                let elder = person.birth_year.min(pop[partner].birth_year);
                let age = pop[child].birth_year - elder;
                assert!((25..=45).contains(&age), "elder parent aged {} at birth", age);
                assert!(pop[child].birth_year <= tree.end_year());
            }
        }
    }

    #[test]
    fn test_same_start_and_end_year_yields_founders_only() {
        let model = minimal_model();
        let tree = grow(&model, 1950, 1950, 1);
        assert_eq!(tree.total_people(), 2);
        assert_eq!(tree.state(), TreeState::Built);
        let roots = tree.roots();
        assert_eq!(roots.len(), 2);
        assert_eq!(tree.population()[roots[0]].partner, Some(roots[1]));
        assert_eq!(tree.population()[roots[1]].partner, Some(roots[0]));
        assert!(tree.people().all(|p| p.birth_year == 1950));
    }

    #[test]
    fn test_build_is_deterministic_for_a_seed() {
        let model = minimal_model();
        let a = grow(&model, 1950, 1995, 1234);
        let b = grow(&model, 1950, 1995, 1234);
        assert_eq!(a.total_people(), b.total_people());
        assert_eq!(graph(&a), graph(&b));
        assert_eq!(a.population().as_slice(), b.population().as_slice());
    }

    #[test]
    fn test_children_born_in_window_and_before_end() {
        let model = minimal_model();
        for seed in 0..10 {
            let tree = grow(&model, 1950, 2060, seed);
            assert_tree_invariants(&tree);
        }
    }

    #[test]
    fn test_founders_come_first_and_share_birth_year() {
        let model = minimal_model();
        let tree = grow(&model, 1950, 2000, 77);
        assert_eq!(tree.roots(), &[PersonId(0), PersonId(1)]);
        for &root in tree.roots() {
            assert_eq!(tree.get(root).unwrap().birth_year, 1950);
            assert_eq!(tree.generation(root), Some(0));
        }
    }

    #[test]
    fn test_partners_share_generation_children_next() {
        let model = minimal_model();
        let tree = grow(&model, 1950, 2050, 5);
        for person in tree.people() {
            let generation = tree.generation(person.id).unwrap();
            if let Some(partner) = person.partner {
                assert_eq!(tree.generation(partner), Some(generation));
            }
            for &child in &person.children {
                assert_eq!(tree.generation(child), Some(generation + 1));
            }
        }
    }

    #[test]
    fn test_build_twice_is_rejected() {
        let model = minimal_model();
        let factory = PersonFactory::new(&model, 1950);
        let mut tree = FamilyTree::new(&TreeConfig::new(1950, 1990)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        tree.build(&factory, &mut rng).unwrap();
        let before = tree.total_people();
        let err = tree.build(&factory, &mut rng).unwrap_err();
        assert!(matches!(err, GenealogyError::AlreadyBuilt));
        assert_eq!(tree.total_people(), before);
    }

    #[test]
    fn test_build_from_rooted_state() {
        let model = minimal_model();
        let factory = PersonFactory::new(&model, 1950);
        let mut tree = FamilyTree::new(&TreeConfig::new(1950, 1990)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(tree.state(), TreeState::Empty);
        let (a, b) = tree.create_initial_couple(&factory, &mut rng).unwrap();
        assert_eq!(tree.state(), TreeState::Rooted);
        // A second call keeps the same founders
        assert_eq!(tree.create_initial_couple(&factory, &mut rng).unwrap(), (a, b));
        tree.build(&factory, &mut rng).unwrap();
        assert_eq!(tree.roots(), &[a, b]);
        assert_eq!(tree.state(), TreeState::Built);
    }

    #[test]
    fn test_missing_data_aborts_build() {
        // Data stops at the 1960s, children arrive from 1975 onwards
        let model = DemographicModel::builder()
            .every_decade(
                [1950, 1960],
                70.0,
                3.0,
                1.0,
                &[(Gender::Female, "Ada", 1.0), (Gender::Male, "Alan", 1.0)],
            )
            .surname("Lovelace", 1)
            .build()
            .unwrap();
        let factory = PersonFactory::new(&model, 1950);
        let mut tree = FamilyTree::new(&TreeConfig::new(1950, 2000)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let err = tree.build(&factory, &mut rng).unwrap_err();
        assert!(matches!(err, GenealogyError::MissingData(_)));
        assert_eq!(tree.state(), TreeState::Failed);
    }

    #[test]
    fn test_failed_build_cannot_be_resumed() {
        // High birth rate, data only up to the 1970s, children born until 2000
        let partial = DemographicModel::builder()
            .every_decade(
                [1950, 1960, 1970],
                70.0,
                6.0,
                1.0,
                &[(Gender::Female, "Ada", 1.0), (Gender::Male, "Alan", 1.0)],
            )
            .surname("Lovelace", 1)
            .build()
            .unwrap();
        let factory = PersonFactory::new(&partial, 1950);
        let mut tree = FamilyTree::new(&TreeConfig::new(1950, 2000)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(tree.build(&factory, &mut rng).is_err());
        assert_eq!(tree.state(), TreeState::Failed);

        // Every partially created person still has a generation
        let partial_count = tree.total_people();
        assert!(partial_count >= 2);
        for person in tree.people() {
            assert!(tree.generation(person.id).is_some());
        }
        for &root in tree.roots() {
            for &child in &tree.population()[root].children {
                assert_eq!(tree.generation(child), Some(1));
            }
        }

        // Complete data does not revive the tree
        let full = minimal_model();
        let factory = PersonFactory::new(&full, 1950);
        let err = tree.build(&factory, &mut rng).unwrap_err();
        assert!(matches!(err, GenealogyError::BuildFailed));
        let err = tree.create_initial_couple(&factory, &mut rng).unwrap_err();
        assert!(matches!(err, GenealogyError::BuildFailed));
        assert_eq!(tree.total_people(), partial_count);
        assert_eq!(tree.state(), TreeState::Failed);
    }

    #[test]
    fn test_single_name_pool_build_is_deterministic() {
        // Only a female pool: male draws fall back within the same decade
        let model = DemographicModel::builder()
            .every_decade((1950..=2010).step_by(10), 70.0, 2.0, 1.0, &[(Gender::Female, "Ada", 1.0)])
            .surname("Lovelace", 1)
            .build()
            .unwrap();
        let mut saw_male = false;
        for seed in 0..20 {
            let a = grow(&model, 1950, 1995, seed);
            let b = grow(&model, 1950, 1995, seed);

            assert_eq!(a.population().as_slice(), b.population().as_slice());
            assert_eq!(graph(&a), graph(&b));
            assert!(a.people().all(|p| p.first_name == "Ada" && p.last_name == "Lovelace"));
            assert_tree_invariants(&a);
            saw_male |= a.people().any(|p| p.gender == Gender::Male);
        }
        assert!(saw_male);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = FamilyTree::new(&TreeConfig::new(2000, 1950)).unwrap_err();
        assert!(matches!(err, GenealogyError::InvalidConfig(_)));
    }

    #[test]
    fn test_nobody_marries_means_no_children() {
        let model = DemographicModel::builder()
            .every_decade((1950..=2000).step_by(10), 70.0, 3.0, 0.0, &[(Gender::Female, "Ada", 1.0)])
            .surname("Lovelace", 1)
            .build()
            .unwrap();
        let tree = grow(&model, 1950, 2000, 8);
        // The founders are always partnered with each other and still have children
        assert!(tree.total_people() >= 2);
        for person in tree.people().skip(2) {
            assert!(person.partner.is_none());
            assert!(person.children.is_empty());
        }
    }

    #[test]
    fn test_queries_are_consistent_and_idempotent() {
        let model = minimal_model();
        let tree = grow(&model, 1950, 2080, 99);

        let by_decade = tree.total_people_by_decade();
        assert_eq!(by_decade.values().sum::<usize>(), tree.total_people());
        for decade in by_decade.keys() {
            assert!(tree.people().any(|p| p.birth_year / 10 * 10 == *decade));
        }

        let dups = tree.duplicate_full_names();
        assert!(dups.iter().all(|(_, count)| *count > 1));
        for pair in dups.windows(2) {
            let ordered = pair[0].1 > pair[1].1 || (pair[0].1 == pair[1].1 && pair[0].0 < pair[1].0);
            assert!(ordered, "{:?} before {:?}", pair[0], pair[1]);
        }
        // Two names and one surname guarantee duplicates in any sizeable tree
        if tree.total_people() > 3 {
            assert!(!dups.is_empty());
        }

        assert_eq!(tree.total_people_by_decade(), by_decade);
        assert_eq!(tree.duplicate_full_names(), dups);
        assert_eq!(tree.summary(), tree.summary());
    }

    #[test]
    fn test_queries_on_empty_tree() {
        let tree = FamilyTree::new(&TreeConfig::default()).unwrap();
        assert_eq!(tree.total_people(), 0);
        assert!(tree.total_people_by_decade().is_empty());
        assert!(tree.duplicate_full_names().is_empty());
        assert_eq!(tree.generation_count(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_tree_invariants_hold(seed in any::<u64>(), end in 1950i32..2070) {
            let model = minimal_model();
            let tree = grow(&model, 1950, end, seed);
            assert_tree_invariants(&tree);
            prop_assert_eq!(tree.total_people_by_decade().values().sum::<usize>(), tree.total_people());
        }
    }
}
