//! Optional-match partitioning.
//!
//! Mandatory labels form group 0. Optional labels are visited in frontier
//! order: the next one is the first label, most relationships to mandatory
//! labels first, that touches a mandatory label or an already-visited label.
//! An optional label with no mandatory neighbor joins the group of its first
//! visited neighbor, otherwise it opens a new group. Only when nothing on the
//! frontier is left does an unreachable label open a group of its own.
//! Relationships are emitted with the group in which their second endpoint
//! becomes matched, so no pattern ever refers to a variable a later clause
//! introduces.

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::Serialize;

use super::{LabelArena, LabelId};
use crate::errors::{CompileError, CompileResult};
use crate::query_model::{Label, Relationship};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchGroup {
    pub labels: Vec<Label>,
    pub relationships: Vec<Relationship>,
    /// Rendered as `OPTIONAL MATCH`
    pub optional: bool,
}

impl MatchGroup {
    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }

    /// First label of an earlier group this group's relationships reach
    pub fn anchor<'a>(&'a self, earlier: &HashSet<&str>) -> Option<&'a str> {
        self.relationships.iter().find_map(|rel| {
            [rel.from.as_str(), rel.to.as_str()]
                .into_iter()
                .find(|endpoint| earlier.contains(endpoint))
        })
    }
}

pub fn partition(labels: &[Label], relationships: &[Relationship]) -> CompileResult<Vec<MatchGroup>> {
    if labels.is_empty() {
        return Ok(Vec::new());
    }

    let arena = LabelArena::build(labels.iter().map(|l| l.name.as_str()), relationships);
    if arena.len() < labels.len() {
        return Err(CompileError::PartitioningInvariantViolation(
            "label names are not unique".to_string(),
        ));
    }
    if arena.len() > labels.len() {
        let unknown: Vec<&str> = (labels.len()..arena.len()).map(|id| arena.name(id)).collect();
        return Err(CompileError::PartitioningInvariantViolation(format!(
            "relationship endpoints {:?} are not among the labels",
            unknown
        )));
    }

    // Label ids coincide with positions in `labels`
    let optional: Vec<bool> = labels.iter().map(|l| l.optional).collect();
    let to_mandatory: Vec<usize> = (0..arena.len())
        .map(|id| {
            arena
                .incident(id)
                .iter()
                .filter(|&&rel_idx| {
                    let (from, to) = arena.edges()[rel_idx];
                    !optional[from] || !optional[to]
                })
                .count()
        })
        .collect();

    let mut order: Vec<LabelId> = (0..arena.len()).collect();
    order.sort_by_key(|&id| (optional[id], Reverse(to_mandatory[id])));

    let mut group_of: Vec<Option<usize>> = vec![None; arena.len()];
    let mut members: Vec<Vec<LabelId>> = vec![Vec::new()];
    for &id in order.iter().filter(|&&id| !optional[id]) {
        group_of[id] = Some(0);
        members[0].push(id);
    }

    let mut pending: Vec<LabelId> = order.into_iter().filter(|&id| optional[id]).collect();
    while !pending.is_empty() {
        let next = pending
            .iter()
            .position(|&id| {
                to_mandatory[id] > 0 || visited_neighbor_group(&arena, &group_of, id).is_some()
            })
            .unwrap_or(0);
        let id = pending.remove(next);
        let group = match visited_neighbor_group(&arena, &group_of, id) {
            Some(group) if to_mandatory[id] == 0 => group,
            _ => {
                members.push(Vec::new());
                members.len() - 1
            }
        };
        group_of[id] = Some(group);
        members[group].push(id);
    }

    if let Some(unplaced) = group_of.iter().position(Option::is_none) {
        return Err(CompileError::PartitioningInvariantViolation(format!(
            "label '{}' was not placed into any group",
            arena.name(unplaced)
        )));
    }

    let mut matched = vec![false; arena.len()];
    let mut emitted = vec![false; relationships.len()];
    let mut groups = Vec::with_capacity(members.len());
    for (index, group_members) in members.iter().enumerate() {
        if group_members.is_empty() {
            // only group 0 can be empty, when every label is optional
            continue;
        }
        for &id in group_members {
            matched[id] = true;
        }
        let mut group_rels = Vec::new();
        for &id in group_members {
            for &rel_idx in arena.incident(id) {
                let (from, to) = arena.edges()[rel_idx];
                if !emitted[rel_idx] && matched[from] && matched[to] {
                    emitted[rel_idx] = true;
                    group_rels.push(relationships[rel_idx].clone());
                }
            }
        }
        let group = MatchGroup {
            labels: group_members.iter().map(|&id| labels[id].clone()).collect(),
            relationships: group_rels,
            optional: index > 0,
        };
        log::debug!(
            "Match group {}: labels {:?}, {} relationship(s), optional={}",
            index,
            group.label_names(),
            group.relationships.len(),
            group.optional
        );
        groups.push(group);
    }

    Ok(groups)
}

/// Group of the first neighbor of `id`, in relationship order, that is
/// already placed
fn visited_neighbor_group(arena: &LabelArena, group_of: &[Option<usize>], id: LabelId) -> Option<usize> {
    arena
        .incident(id)
        .iter()
        .map(|&rel_idx| arena.other_end(rel_idx, id))
        .find_map(|neighbor| group_of[neighbor])
}
