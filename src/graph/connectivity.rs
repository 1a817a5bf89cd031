use std::collections::VecDeque;

use super::LabelArena;
use crate::query_model::Relationship;

/// Whether `labels` and `relationships` form one connected graph.
///
/// Relationship direction is ignored. A single label (or none) without
/// relationships is trivially connected; two or more labels without
/// relationships are not. Every label must be an endpoint of some
/// relationship, and every relationship must be reachable from the first.
pub fn is_connected<S: AsRef<str>>(labels: &[S], relationships: &[Relationship]) -> bool {
    if relationships.is_empty() {
        return labels.len() <= 1;
    }

    let arena = LabelArena::build(labels.iter().map(AsRef::as_ref), relationships);
    if let Some(isolated) = labels
        .iter()
        .map(AsRef::as_ref)
        .find(|label| arena.id(label).is_some_and(|id| arena.incident(id).is_empty()))
    {
        log::debug!("Label '{}' is not an endpoint of any relationship", isolated);
        return false;
    }

    let (first_from, first_to) = arena.edges()[0];
    let mut reached = vec![false; arena.len()];
    let mut frontier = VecDeque::from([first_from, first_to]);
    reached[first_from] = true;
    reached[first_to] = true;
    while let Some(id) = frontier.pop_front() {
        for &rel_idx in arena.incident(id) {
            let next = arena.other_end(rel_idx, id);
            if !reached[next] {
                reached[next] = true;
                frontier.push_back(next);
            }
        }
    }

    // A relationship is absorbed once either endpoint is reached
    arena
        .edges()
        .iter()
        .all(|&(from, to)| reached[from] || reached[to])
}
