use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::models::sequence::Sequence;
use crate::{Error, Result};

/// In-memory registry of sequences keyed by name. Stands in for the
/// storage collaborator of the surrounding service in tests and small
/// deployments.
#[derive(Clone, Debug, Default)]
pub struct SequenceCatalog {
    sequences: HashMap<String, Sequence>,
}

impl SequenceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: &str) -> Result<&mut Sequence> {
        match self.sequences.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::ResourceAlreadyExists(format!(
                "Sequence with name {} already exists",
                name
            ))),
            Entry::Vacant(entry) => Ok(entry.insert(Sequence::new(name))),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&Sequence> {
        self.sequences
            .get(name)
            .ok_or_else(|| Error::SequenceNotFound(format!(
                "Sequence with name {} was not found",
                name
            )))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Result<&mut Sequence> {
        self.sequences
            .get_mut(name)
            .ok_or_else(|| Error::SequenceNotFound(format!(
                "Sequence with name {} was not found",
                name
            )))
    }

    /// All sequences, name-sorted for stable listings.
    pub fn all(&self) -> Vec<&Sequence> {
        let mut sequences: Vec<&Sequence> = self.sequences.values().collect();
        sequences.sort_by(|a, b| a.name.cmp(&b.name));
        sequences
    }

    /// Remove a sequence and, with it, all of its values.
    pub fn remove(&mut self, name: &str) -> Result<Sequence> {
        self.sequences
            .remove(name)
            .ok_or_else(|| Error::SequenceNotFound(format!(
                "Sequence with name {} was not found",
                name
            )))
    }
}
