//! Family tree generation library
//!
//! Re-exports modules for use by the binary and tools.

pub mod export;
pub mod genealogy;
pub mod menu;
