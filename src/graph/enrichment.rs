use std::collections::HashMap;

use crate::query_model::{Label, Relationship};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Proof {
    Mandatory,
    Optional,
}

/// Backfill relationship endpoints into the label list and settle optionality.
///
/// Output keeps the given labels in order, followed by newly discovered
/// endpoints in relationship-encounter order (`from` before `to`).
///
/// A label touched by relationships is optional only if every touching
/// relationship is optional; one mandatory relationship settles it as
/// mandatory for good. When every relationship is optional, `from` endpoints
/// count as mandatory so that something remains to match on. Labels that no
/// relationship touches keep their own flag.
pub fn enrich(labels: &[Label], relationships: &[Relationship]) -> Vec<Label> {
    if relationships.is_empty() {
        return labels.to_vec();
    }

    let all_optional = relationships.iter().all(|r| r.optional);
    let mut proofs: HashMap<&str, Proof> = HashMap::new();
    let mut discovered: Vec<&str> = Vec::new();
    for rel in relationships {
        for (endpoint, is_to) in [(rel.from.as_str(), false), (rel.to.as_str(), true)] {
            let rel_optional = if all_optional {
                rel.optional && is_to
            } else {
                rel.optional
            };
            let proof = if rel_optional {
                Proof::Optional
            } else {
                Proof::Mandatory
            };
            match proofs.get(endpoint) {
                None => {
                    discovered.push(endpoint);
                    proofs.insert(endpoint, proof);
                }
                Some(Proof::Optional) if proof == Proof::Mandatory => {
                    proofs.insert(endpoint, Proof::Mandatory);
                }
                Some(_) => {}
            }
        }
    }

    let mut enriched: Vec<Label> = Vec::with_capacity(labels.len() + discovered.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for label in labels {
        if seen.contains_key(&label.name) {
            log::warn!("Label '{}' listed more than once, keeping the first", label.name);
            continue;
        }
        let mut label = label.clone();
        if let Some(proof) = proofs.get(label.name.as_str()) {
            label.optional = *proof == Proof::Optional;
        }
        seen.insert(label.name.clone(), enriched.len());
        enriched.push(label);
    }
    for name in discovered {
        if seen.contains_key(name) {
            continue;
        }
        let label = if proofs.get(name) == Some(&Proof::Optional) {
            Label::optional(name)
        } else {
            Label::new(name)
        };
        log::debug!("Adding label '{}' implied by relationships", label.name);
        seen.insert(name.to_string(), enriched.len());
        enriched.push(label);
    }
    enriched
}
