use std::collections::HashSet;

use cyphergen::graph::{enrich, is_connected, partition};
use cyphergen::{Label, Relationship};
use test_case::test_case;

#[test_case(&["A"], &[] => true ; "single label")]
#[test_case(&[], &[] => true ; "nothing")]
#[test_case(&["A", "B"], &[] => false ; "two labels no relationship")]
#[test_case(&["A", "B"], &[("A", "B")] => true ; "one edge")]
#[test_case(&["A", "B", "C"], &[("A", "B")] => false ; "isolated label")]
#[test_case(&["A", "B", "C", "D"], &[("A", "B"), ("C", "D")] => false ; "two islands")]
#[test_case(&["A", "B", "C"], &[("A", "B"), ("C", "B")] => true ; "direction ignored")]
fn test_connectivity(labels: &[&str], pairs: &[(&str, &str)]) -> bool {
    let rels: Vec<Relationship> = pairs
        .iter()
        .map(|(from, to)| Relationship::new(*from, *to))
        .collect();
    is_connected(labels, &rels)
}

#[test]
fn test_mandatory_relationship_wins_over_optional_marker() {
    let labels = vec![Label::new("Subject"), Label::optional("Sex")];
    let rels = vec![Relationship::new("Subject", "Sex")];
    let enriched = enrich(&labels, &rels);
    assert!(enriched.iter().all(|l| !l.optional));
}

#[test]
fn test_optional_group_is_anchored_on_mandatory_label() {
    let labels = vec![
        Label::new("Subject"),
        Label::new("Sex"),
        Label::optional("Exposure"),
    ];
    let rels = vec![
        Relationship::new("Subject", "Sex"),
        Relationship::optional("Subject", "Exposure"),
    ];
    let groups = partition(&enrich(&labels, &rels), &rels).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].label_names(), vec!["Subject", "Sex"]);
    assert!(!groups[0].optional);
    assert_eq!(groups[1].label_names(), vec!["Exposure"]);
    assert!(groups[1].optional);

    let earlier: HashSet<&str> = groups[0].label_names().into_iter().collect();
    assert_eq!(groups[1].anchor(&earlier), Some("Subject"));
}

#[test]
fn test_relationship_emitted_once_across_groups() {
    let labels = vec![
        Label::new("Subject"),
        Label::optional("Exposure"),
        Label::optional("Visit"),
        Label::optional("Vitals"),
    ];
    let rels = vec![
        Relationship::optional("Subject", "Exposure"),
        Relationship::optional("Subject", "Vitals"),
        Relationship::optional("Exposure", "Visit"),
        Relationship::optional("Vitals", "Visit"),
    ];
    let groups = partition(&labels, &rels).unwrap();
    let emitted: Vec<(&str, &str)> = groups
        .iter()
        .flat_map(|g| g.relationships.iter())
        .map(|r| (r.from.as_str(), r.to.as_str()))
        .collect();
    assert_eq!(emitted.len(), rels.len());
    let unique: HashSet<_> = emitted.iter().collect();
    assert_eq!(unique.len(), emitted.len());
}
