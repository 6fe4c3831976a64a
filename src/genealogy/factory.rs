//! Person generation.
//!
//! Creates individuals, partners and batches of children. Every random
//! choice goes through the caller's RNG and every statistic comes from the
//! `DemographicModel`.

use rand::Rng;
use tracing::trace;

use super::decade_of;
use super::error::Result;
use super::model::DemographicModel;
use super::person::{Gender, Person, Population};
use super::PersonId;

/// Lifespan varies by up to this many years around the decade's expectancy.
pub const LIFESPAN_VARIANCE: i32 = 10;
/// Partners are born within this many years of each other.
pub const PARTNER_AGE_GAP: i32 = 10;
/// Age of the elder parent at the first possible birth.
pub const FERTILITY_START_AGE: i32 = 25;
/// Age of the elder parent at the last possible birth.
pub const FERTILITY_END_AGE: i32 = 45;
/// Child counts range this far either side of the decade's birth rate.
pub const CHILD_COUNT_SPREAD: f64 = 1.5;
/// Maximum jitter applied to evenly spaced child birth years.
pub const BIRTH_YEAR_JITTER: f64 = 1.0;

/// Stateless person generator over a demographic model.
#[derive(Clone, Copy, Debug)]
pub struct PersonFactory<'a> {
    model: &'a DemographicModel,
    /// Earliest birth year a partner may have.
    birth_year_floor: i32,
}

impl<'a> PersonFactory<'a> {
    pub fn new(model: &'a DemographicModel, birth_year_floor: i32) -> Self {
        Self { model, birth_year_floor }
    }

    /// Death year: birth year plus the decade's life expectancy, +/- 10 years.
    pub fn death_year<R: Rng>(&self, birth_year: i32, rng: &mut R) -> Result<i32> {
        let life_expectancy = self.model.life_expectancy(decade_of(birth_year))?;
        let variance = rng.gen_range(-LIFESPAN_VARIANCE..=LIFESPAN_VARIANCE);
        Ok(birth_year + (life_expectancy + variance as f64).round_ties_even() as i32)
    }

    /// Create a person born in `birth_year` and adopt them into `population`.
    pub fn create_person<R: Rng>(
        &self,
        population: &mut Population,
        birth_year: i32,
        rng: &mut R,
    ) -> Result<PersonId> {
        let gender = Gender::random(rng);
        let first_name = self.model.sample_first_name(decade_of(birth_year), gender, rng)?;
        let last_name = self.model.sample_last_name(rng)?;
        let death_year = self.death_year(birth_year, rng)?;

        let id = population.adopt(Person::new(first_name, last_name, gender, birth_year, death_year));
        trace!(person = %population[id], "created person");
        Ok(id)
    }

    /// Bernoulli draw against the marriage rate of the person's birth decade.
    pub fn has_partner<R: Rng>(&self, person: &Person, rng: &mut R) -> Result<bool> {
        let rates = self.model.rates(person.decade())?;
        Ok(rng.gen::<f64>() < rates.marriage_rate)
    }

    /// Create and link a partner born within ten years of `person`.
    ///
    /// A person who already has a partner gets that partner back and no one
    /// new is created.
    pub fn create_partner<R: Rng>(
        &self,
        population: &mut Population,
        person: PersonId,
        rng: &mut R,
    ) -> Result<PersonId> {
        if let Some(existing) = population[person].partner {
            return Ok(existing);
        }

        let offset = rng.gen_range(-PARTNER_AGE_GAP..=PARTNER_AGE_GAP);
        let birth_year = (population[person].birth_year + offset).max(self.birth_year_floor);

        let partner = self.create_person(population, birth_year, rng)?;
        population.link_partners(person, partner)?;
        trace!(person = %population[person], partner = %population[partner], "linked partners");
        Ok(partner)
    }

    /// Number of children for a couple, uniform in
    /// `[max(0, round(rate - 1.5)), round(rate + 1.5)]`.
    pub fn number_of_children<R: Rng>(&self, person: &Person, rng: &mut R) -> Result<u32> {
        let birth_rate = self.model.rates(person.decade())?.birth_rate;
        let low = (birth_rate - CHILD_COUNT_SPREAD).round_ties_even().max(0.0) as u32;
        let high = ((birth_rate + CHILD_COUNT_SPREAD).round_ties_even().max(0.0) as u32).max(low);
        Ok(rng.gen_range(low..=high))
    }

    /// Create the children of a couple, born while the elder parent is
    /// between 25 and 45.
    ///
    /// Children that would be born after `end_year` are dropped, so the
    /// result may be shorter than the drawn count. Each child is appended
    /// once to both parents.
    pub fn create_children<R: Rng>(
        &self,
        population: &mut Population,
        parent1: PersonId,
        parent2: PersonId,
        end_year: i32,
        rng: &mut R,
    ) -> Result<Vec<PersonId>> {
        let count = self.number_of_children(&population[parent1], rng)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let elder_birth = population[parent1].birth_year.min(population[parent2].birth_year);
        let years = child_birth_years(count, elder_birth, rng);

        let mut children = Vec::with_capacity(years.len());
        for year in years {
            if year > end_year {
                continue;
            }
            let child = self.create_child(population, year, parent1, parent2, rng)?;
            population.add_child(parent1, child);
            population.add_child(parent2, child);
            children.push(child);
        }
        Ok(children)
    }

    /// Like `create_person`, but the surname comes from one of the parents.
    fn create_child<R: Rng>(
        &self,
        population: &mut Population,
        birth_year: i32,
        parent1: PersonId,
        parent2: PersonId,
        rng: &mut R,
    ) -> Result<PersonId> {
        let gender = Gender::random(rng);
        let first_name = self.model.sample_first_name(decade_of(birth_year), gender, rng)?;
        let last_name = if rng.gen_bool(0.5) {
            population[parent1].last_name.clone()
        } else {
            population[parent2].last_name.clone()
        };
        let death_year = self.death_year(birth_year, rng)?;

        let id = population.adopt(Person::new(first_name, last_name, gender, birth_year, death_year));
        trace!(child = %population[id], "created child");
        Ok(id)
    }
}

/// Birth years for `count` children inside the elder parent's fertility window.
///
/// One child gets a uniform year in the window. Several children are spaced
/// evenly across it, each nudged by up to a year and clamped back inside.
pub fn child_birth_years<R: Rng>(count: u32, elder_birth: i32, rng: &mut R) -> Vec<i32> {
    let start = elder_birth + FERTILITY_START_AGE;
    let end = elder_birth + FERTILITY_END_AGE;

    match count {
        0 => Vec::new(),
        1 => vec![rng.gen_range(start..=end)],
        _ => {
            let step = (end - start) as f64 / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    let jitter = rng.gen_range(-BIRTH_YEAR_JITTER..=BIRTH_YEAR_JITTER);
                    let year = (start as f64 + step * i as f64 + jitter).round_ties_even() as i32;
                    year.clamp(start, end)
                })
                .collect()
        }
    }
}
