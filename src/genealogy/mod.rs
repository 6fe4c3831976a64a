//! Family tree generation module
//!
//! Grows a multi-generational family tree from one founding couple:
//! partners, children, names, and lifespans are sampled decade by decade
//! from demographic tables until a configured end year.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod factory;
pub mod model;
pub mod person;
pub mod queries;
pub mod tree;

use std::fmt;
use serde::{Serialize, Deserialize};

pub use config::TreeConfig;
pub use data::DemographicData;
pub use engine::TreeEngine;
pub use error::{GenealogyError, Result};
pub use factory::PersonFactory;
pub use model::{DemographicModel, DemographicModelBuilder, Rates};
pub use person::{Gender, Person, Population};
pub use tree::{FamilyTree, TreeState};

// =============================================================================
// ID TYPES
// =============================================================================

/// Macro to generate newtype ID wrappers with common derives and Display.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

// Index into the population arena, assigned in creation order.
define_id!(PersonId);

impl PersonId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Floor a year to its decade (1987 -> 1980, -5 -> -10).
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}
