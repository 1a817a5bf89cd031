use cyphergen::{
    CompileError, CompilerConfig, QueryCompiler, QueryRequest, Relationship, ReturnOptions,
};
use serde_json::{json, Value};

fn bare_options() -> ReturnOptions {
    ReturnOptions {
        return_nodeid: false,
        return_propname: false,
        ..ReturnOptions::default()
    }
}

fn body(query: &str) -> Vec<&str> {
    query
        .lines()
        .take_while(|line| !line.starts_with("RETURN") && !line.starts_with("WITH"))
        .collect()
}

#[test]
fn test_single_mandatory_group() {
    let request = QueryRequest::new(["Subject", "Sex"])
        .with_relationships(vec![Relationship::new("Subject", "Sex")])
        .with_options(bare_options());
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    assert_eq!(
        compiled.query,
        "MATCH (`Subject`:`Subject`),\n\
         (`Sex`:`Sex`),\n\
         (`Subject`)-[`Subject_Sex_Sex`:`Sex`]->(`Sex`)\n\
         RETURN apoc.map.mergeList([CASE WHEN `Subject`{.*} IS NULL THEN {} ELSE `Subject`{.*} END\n, \
         CASE WHEN `Sex`{.*} IS NULL THEN {} ELSE `Sex`{.*} END]) as all"
    );
    assert!(compiled.params.is_empty());
}

#[test]
fn test_optional_label_gets_its_own_optional_match() {
    let request = QueryRequest::new(["Subject", "Sex", "Exposure**"]).with_relationships(vec![
        Relationship::new("Subject", "Sex"),
        Relationship::optional("Subject", "Exposure"),
    ]);
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    assert_eq!(
        body(&compiled.query),
        vec![
            "MATCH (`Subject`:`Subject`),",
            "(`Sex`:`Sex`),",
            "(`Subject`)-[`Subject_Sex_Sex`:`Sex`]->(`Sex`)",
            "OPTIONAL MATCH (`Exposure`:`Exposure`),",
            "(`Subject`)-[`Subject_Exposure_Exposure`:`Exposure`]->(`Exposure`)",
        ]
    );
    assert!(compiled.query.contains("{`_id_Exposure`:id(`Exposure`)}"));
    assert!(compiled.query.contains("[\"Exposure\" + \".\" + key, "));
}

#[test]
fn test_range_filter_in_compiled_query() {
    let request = QueryRequest::new(["Age"]).with_filters(json!({
        "Age": {"AGE": {"min": 18, "max": 65, "min_include": true, "max_include": false}}
    }));
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    assert_eq!(
        body(&compiled.query),
        vec!["MATCH (`Age`:`Age`)", "WHERE ($par_1 <= `Age`.`AGE` < $par_2)"]
    );
    assert_eq!(Value::Object(compiled.params), json!({"par_1": 18, "par_2": 65}));
}

#[test]
fn test_not_exists_excluding_matched_neighbors() {
    let request = QueryRequest::new(["nobs", "Ser", "Pop"])
        .with_relationships(vec![
            Relationship::new("nobs", "Ser"),
            Relationship::new("nobs", "Pop"),
        ])
        .with_existence(json!({"nobs": {"NOT EXISTS": {"exclude_matched": ["Ser", "Pop"]}}}));
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    let body = body(&compiled.query);
    assert_eq!(
        body.last().copied(),
        Some("WHERE NOT EXISTS {MATCH (`nobs`)-[]-(x) WHERE NOT (x in [`Ser`, `Pop`])}")
    );
    assert!(compiled.params.is_empty());
}

#[test]
fn test_matched_neighbor_from_optional_group() {
    let request = QueryRequest::new(["Subject", "Exposure**"])
        .with_relationships(vec![Relationship::optional("Subject", "Exposure")])
        .with_existence(json!({"Subject": {"EXISTS": {"include_matched": ["Exposure"]}}}));
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    let body = body(&compiled.query);
    let matched_at = body
        .iter()
        .position(|line| line.starts_with("OPTIONAL MATCH (`Exposure`:`Exposure`)"))
        .unwrap();
    let used_at = body
        .iter()
        .position(|line| line.contains("x in [`Exposure`]"))
        .unwrap();
    assert!(matched_at < used_at);
    assert_eq!(
        body,
        vec![
            "MATCH (`Subject`:`Subject`)",
            "OPTIONAL MATCH (`Exposure`:`Exposure`),",
            "(`Subject`)-[`Subject_Exposure_Exposure`:`Exposure`]->(`Exposure`)",
            "WHERE EXISTS {MATCH (`Subject`)-[]-(x) WHERE x in [`Exposure`]}",
        ]
    );
}

#[test]
fn test_optional_chain_reached_through_later_label() {
    let request = QueryRequest::new(["M", "N", "A**", "X**", "W**", "V**"]).with_relationships(vec![
        Relationship::new("M", "N"),
        Relationship::optional("M", "A"),
        Relationship::optional("V", "W"),
        Relationship::optional("V", "X"),
        Relationship::optional("A", "V"),
    ]);
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    assert_eq!(
        body(&compiled.query),
        vec![
            "MATCH (`M`:`M`),",
            "(`N`:`N`),",
            "(`M`)-[`M_N_N`:`N`]->(`N`)",
            "OPTIONAL MATCH (`A`:`A`),",
            "(`V`:`V`),",
            "(`X`:`X`),",
            "(`W`:`W`),",
            "(`M`)-[`M_A_A`:`A`]->(`A`),",
            "(`A`)-[`A_V_V`:`V`]->(`V`),",
            "(`V`)-[`V_W_W`:`W`]->(`W`),",
            "(`V`)-[`V_X_X`:`X`]->(`X`)",
        ]
    );
}

#[test]
fn test_relationship_endpoint_is_backfilled() {
    let request = QueryRequest::new(["Subject"])
        .with_relationships(vec![Relationship::new("Subject", "Exposure")]);
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    assert_eq!(
        body(&compiled.query),
        vec![
            "MATCH (`Subject`:`Subject`),",
            "(`Exposure`:`Exposure`),",
            "(`Subject`)-[`Subject_Exposure_Exposure`:`Exposure`]->(`Exposure`)",
        ]
    );
    assert!(compiled.query.contains("id(`Exposure`)"));
}

#[test]
fn test_filters_follow_their_group() {
    let request = QueryRequest::new(["Subject", "Exposure**"])
        .with_relationships(vec![Relationship::optional("Subject", "Exposure")])
        .with_filters(json!({
            "Exposure": {"EXTRT": ["A", "B"]},
            "Subject": {"USUBJID": "01-001"}
        }));
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    assert_eq!(
        body(&compiled.query),
        vec![
            "MATCH (`Subject`:`Subject`)",
            "WHERE `Subject`.`USUBJID` = $par_1",
            "OPTIONAL MATCH (`Exposure`:`Exposure`),",
            "(`Subject`)-[`Subject_Exposure_Exposure`:`Exposure`]->(`Exposure`)",
            "WHERE `Exposure`.`EXTRT` in $par_2",
        ]
    );
    assert_eq!(
        Value::Object(compiled.params),
        json!({"par_1": "01-001", "par_2": ["A", "B"]})
    );
}

#[test]
fn test_unrelated_labels() {
    let request = QueryRequest::new(["Subject", "Sex"]).with_options(bare_options());
    let err = QueryCompiler::default().compile(&request).unwrap_err();
    assert!(err.is_connectivity());
    assert!(err.to_string().contains("Subject"));

    let compiled = QueryCompiler::default()
        .compile(&request.allow_unrelated_subgraphs(true))
        .unwrap();
    assert_eq!(
        body(&compiled.query),
        vec!["MATCH (`Subject`:`Subject`),", "(`Sex`:`Sex`)"]
    );
}

#[test]
fn test_custom_markers_and_neighbor_variable() {
    let config = CompilerConfig {
        optional_marker: "?".to_string(),
        not_marker: "~".to_string(),
        neighbor_variable: "nb".to_string(),
        ..CompilerConfig::default()
    };
    let request = QueryRequest::new(["Subject", "Visit?"])
        .with_relationships(vec![Relationship::optional("Subject", "Visit")])
        .with_filters(json!({"~Visit": {"VISITNUM": 1}}))
        .with_existence(json!({"Subject": {"EXISTS": {"include": ["Site"]}}}));
    let compiled = QueryCompiler::new(config).compile(&request).unwrap();
    assert_eq!(
        body(&compiled.query),
        vec![
            "MATCH (`Subject`:`Subject`)",
            "WHERE EXISTS {MATCH (`Subject`)-[]-(nb) WHERE (nb:`Site`)}",
            "OPTIONAL MATCH (`Visit`:`Visit`),",
            "(`Subject`)-[`Subject_Visit_Visit`:`Visit`]->(`Visit`)",
            "WHERE NOT (`Visit`.`VISITNUM` = $par_1)",
        ]
    );
}

#[test]
fn test_disjoint_return_with_limit() {
    let request = QueryRequest::new(["Subject", "Sex"])
        .with_relationships(vec![Relationship::new("Subject", "Sex")])
        .with_options(ReturnOptions {
            return_disjoint: true,
            limit: Some(10),
            ..bare_options()
        });
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    assert!(compiled.query.contains(
        "RETURN collect(distinct apoc.map.mergeList([CASE WHEN `Subject`{.*} IS NULL THEN {} ELSE `Subject`{.*} END])) as `Subject`\n, "
    ));
    assert!(compiled.query.ends_with(" as `Sex` LIMIT 10"));
}

#[test]
fn test_option_conflicts_are_configuration_errors() {
    let request = QueryRequest::new(["Subject"]).with_options(ReturnOptions {
        return_disjoint: true,
        order_by: vec!["Subject.USUBJID".to_string()],
        ..ReturnOptions::default()
    });
    let err = QueryCompiler::default().compile(&request).unwrap_err();
    assert!(matches!(err, CompileError::Configuration(_)));
}

#[test]
fn test_concurrent_compilation_is_deterministic() {
    let compiler = QueryCompiler::default();
    let request = QueryRequest::new(["Subject", "Exposure**"])
        .with_relationships(vec![Relationship::optional("Subject", "Exposure")])
        .with_filters(json!({"Subject": {"A": 1}, "Exposure": {"B": {"min": 2}}}));
    let expected = compiler.compile(&request).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| compiler.compile(&request).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
