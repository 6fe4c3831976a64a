//! Read-only folds over a generated population.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use serde::Serialize;

use super::person::Person;
use super::PersonId;

/// Number of people born in each decade, ascending by decade.
pub fn count_by_decade<'a>(people: impl IntoIterator<Item = &'a Person>) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for person in people {
        *counts.entry(person.decade()).or_insert(0) += 1;
    }
    counts
}

/// Full names shared by more than one person, most frequent first, ties by name.
pub fn duplicate_full_names<'a>(people: impl IntoIterator<Item = &'a Person>) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for person in people {
        *counts.entry(person.full_name()).or_insert(0) += 1;
    }
    let mut duplicates: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect();
    duplicates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    duplicates
}

/// Overview of a tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreeSummary {
    pub start_year: i32,
    pub end_year: i32,
    pub total_people: usize,
    pub roots: Vec<String>,
    pub couples: usize,
    /// Founders are generation 0; this counts generations including them.
    pub generations: u32,
    pub earliest_birth: Option<i32>,
    pub latest_birth: Option<i32>,
}

impl TreeSummary {
    pub fn compute(
        start_year: i32,
        end_year: i32,
        people: &[Person],
        roots: &[PersonId],
        generations: u32,
    ) -> Self {
        let couples = people
            .iter()
            .filter(|p| p.partner.map_or(false, |q| p.id < q))
            .count();
        Self {
            start_year,
            end_year,
            total_people: people.len(),
            roots: roots
                .iter()
                .filter_map(|id| people.get(id.index()))
                .map(|p| p.to_string())
                .collect(),
            couples,
            generations,
            earliest_birth: people.iter().map(|p| p.birth_year).min(),
            latest_birth: people.iter().map(|p| p.birth_year).max(),
        }
    }
}

impl fmt::Display for TreeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FamilyTree Summary")?;
        writeln!(f, "Start year: {}", self.start_year)?;
        writeln!(f, "End year: {}", self.end_year)?;
        writeln!(f, "Total people: {}", self.total_people)?;
        writeln!(f, "Couples: {}", self.couples)?;
        writeln!(f, "Generations: {}", self.generations)?;
        if let (Some(first), Some(last)) = (self.earliest_birth, self.latest_birth) {
            writeln!(f, "Births: {} to {}", first, last)?;
        }
        if self.roots.len() == 2 {
            write!(f, "Roots: {} AND {}", self.roots[0], self.roots[1])?;
        }
        Ok(())
    }
}
