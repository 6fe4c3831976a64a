//! People in the tree and the arena that owns them.

use std::fmt;
use std::ops::Index;
use rand::Rng;
use serde::{Serialize, Deserialize};

use super::error::{GenealogyError, Result};
use super::{decade_of, PersonId};

/// Gender tag, drawn independently for every person.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M", alias = "m", alias = "male", alias = "Male")]
    Male,
    #[serde(rename = "F", alias = "f", alias = "female", alias = "Female")]
    Female,
}

impl Gender {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A generated person.
///
/// Demographic fields never change after creation. The partner link is set
/// at most once and the children list only grows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_year: i32,
    /// Always set: the generator never leaves anyone alive.
    pub death_year: i32,

    pub partner: Option<PersonId>,
    pub children: Vec<PersonId>,
}

impl Person {
    /// Create an unlinked person. The id is assigned by [`Population::adopt`].
    pub fn new(
        first_name: String,
        last_name: String,
        gender: Gender,
        birth_year: i32,
        death_year: i32,
    ) -> Self {
        Self {
            id: PersonId(0),
            first_name,
            last_name,
            gender,
            birth_year,
            death_year,
            partner: None,
            children: Vec::new(),
        }
    }

    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn age_at_death(&self) -> i32 {
        self.death_year - self.birth_year
    }

    /// Birth decade (1987 -> 1980).
    pub fn decade(&self) -> i32 {
        decade_of(self.birth_year)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.full_name(), self.birth_year, self.death_year)
    }
}

/// Owning arena of every person ever created, in creation order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Population {
    people: Vec<Person>,
}

impl Population {
    pub fn new() -> Self {
        Self { people: Vec::new() }
    }

    /// Take ownership of a freshly created person and assign its id.
    pub fn adopt(&mut self, mut person: Person) -> PersonId {
        let id = PersonId(self.people.len() as u64);
        person.id = id;
        self.people.push(person);
        id
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.people.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    pub fn as_slice(&self) -> &[Person] {
        &self.people
    }

    /// Link two people as partners on both sides.
    ///
    /// Returns `Ok(false)` if they are already partners of each other.
    pub fn link_partners(&mut self, a: PersonId, b: PersonId) -> Result<bool> {
        debug_assert_ne!(a, b, "a person cannot partner themselves");
        match (self[a].partner, self[b].partner) {
            (Some(pa), Some(pb)) if pa == b && pb == a => return Ok(false),
            (Some(_), _) => return Err(GenealogyError::AlreadyPartnered(a)),
            (_, Some(_)) => return Err(GenealogyError::AlreadyPartnered(b)),
            (None, None) => {}
        }
        self.people[a.index()].partner = Some(b);
        self.people[b.index()].partner = Some(a);
        Ok(true)
    }

    /// Append a child to a parent's list. Returns false if already present.
    pub fn add_child(&mut self, parent: PersonId, child: PersonId) -> bool {
        let children = &mut self.people[parent.index()].children;
        if children.contains(&child) {
            return false;
        }
        children.push(child);
        true
    }
}

impl Index<PersonId> for Population {
    type Output = Person;

    fn index(&self, id: PersonId) -> &Person {
        &self.people[id.index()]
    }
}
