//! Family tree export.
//!
//! Writes a human-readable text report and a JSON snapshot of the whole
//! population (with seed reference, so the run can be reproduced).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;
use serde::{Serialize, Deserialize};

use crate::genealogy::{FamilyTree, GenealogyError};

/// Format version of the JSON snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Wrapper written by [`export_json`].
#[derive(Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Format version for forward compatibility
    pub version: u32,
    /// Seed the tree was grown from
    pub seed: u64,
    /// Local time of export
    pub generated: String,
    pub tree: FamilyTree,
}

/// Export a text report: summary, decade histogram, duplicates, and everyone.
pub fn export_report(tree: &FamilyTree, seed: u64, path: &Path) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "=== FAMILY TREE REPORT ===")?;
    writeln!(file, "Seed: {}", seed)?;
    writeln!(file, "Years: {} to {}", tree.start_year(), tree.end_year())?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    writeln!(file, "=== SUMMARY ===")?;
    writeln!(file, "{}", tree.summary())?;
    writeln!(file)?;

    writeln!(file, "=== PEOPLE BY DECADE ===")?;
    for (decade, count) in tree.total_people_by_decade() {
        writeln!(file, "{}s: {}", decade, count)?;
    }
    writeln!(file)?;

    writeln!(file, "=== DUPLICATE NAMES ===")?;
    let duplicates = tree.duplicate_full_names();
    if duplicates.is_empty() {
        writeln!(file, "None")?;
    }
    for (name, count) in duplicates {
        writeln!(file, "{}: {}", name, count)?;
    }
    writeln!(file)?;

    writeln!(file, "=== PEOPLE ===")?;
    for person in tree.people() {
        let generation = tree.generation(person.id).unwrap_or(0);
        write!(file, "[{}] gen {} {} {}", person.id.0, generation, person.gender, person)?;
        if let Some(partner) = person.partner {
            write!(file, " partner={}", partner.0)?;
        }
        if !person.children.is_empty() {
            let ids: Vec<String> = person.children.iter().map(|c| c.0.to_string()).collect();
            write!(file, " children={}", ids.join(","))?;
        }
        writeln!(file)?;
    }

    file.flush()
}

/// Export the tree as a JSON snapshot.
pub fn export_json(tree: &FamilyTree, seed: u64, path: &Path) -> Result<(), GenealogyError> {
    let snapshot = TreeSnapshot {
        version: SNAPSHOT_VERSION,
        seed,
        generated: Local::now().to_rfc3339(),
        tree: tree.clone(),
    };
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

/// Read a snapshot written by [`export_json`].
pub fn load_json(path: &Path) -> Result<TreeSnapshot, GenealogyError> {
    let contents = std::fs::read_to_string(path)?;
    let snapshot: TreeSnapshot = serde_json::from_str(&contents)?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(GenealogyError::invalid(format!(
            "snapshot version {} is newer than supported version {}",
            snapshot.version, SNAPSHOT_VERSION,
        )));
    }
    Ok(snapshot)
}
