//! Label graph algorithms.
//!
//! Labels are interned into a [`LabelArena`] once; connectivity and
//! partitioning then work on integer ids and per-label incidence lists
//! instead of repeatedly scanning relationship lists by name.

pub mod connectivity;
pub mod enrichment;
pub mod partition;

use std::collections::HashMap;

use crate::query_model::Relationship;

pub use connectivity::is_connected;
pub use enrichment::enrich;
pub use partition::{partition, MatchGroup};

pub type LabelId = usize;

#[derive(Debug, Clone, Default)]
pub struct LabelArena {
    names: Vec<String>,
    index: HashMap<String, LabelId>,
    /// (from, to) per relationship, in relationship order
    edges: Vec<(LabelId, LabelId)>,
    /// Relationship indices touching each label, in relationship order
    incident: Vec<Vec<usize>>,
}

impl LabelArena {
    /// Intern `labels` in order, then any relationship endpoint not seen yet
    pub fn build<'a, I>(labels: I, relationships: &[Relationship]) -> LabelArena
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut arena = LabelArena::default();
        for label in labels {
            arena.intern(label);
        }
        for (rel_idx, rel) in relationships.iter().enumerate() {
            let from = arena.intern(&rel.from);
            let to = arena.intern(&rel.to);
            arena.edges.push((from, to));
            arena.incident[from].push(rel_idx);
            if to != from {
                arena.incident[to].push(rel_idx);
            }
        }
        arena
    }

    fn intern(&mut self, name: &str) -> LabelId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.incident.push(Vec::new());
        id
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn id(&self, name: &str) -> Option<LabelId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, id: LabelId) -> &str {
        &self.names[id]
    }

    pub fn edges(&self) -> &[(LabelId, LabelId)] {
        &self.edges
    }

    pub fn incident(&self, id: LabelId) -> &[usize] {
        &self.incident[id]
    }

    /// The endpoint of relationship `rel_idx` opposite to `id`
    pub fn other_end(&self, rel_idx: usize, id: LabelId) -> LabelId {
        let (from, to) = self.edges[rel_idx];
        if from == id {
            to
        } else {
            from
        }
    }
}
