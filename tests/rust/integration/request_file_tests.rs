use std::io::Write;

use cyphergen::{CompilerConfig, InMemorySchema, QueryCompiler, QueryRequest};
use serde_json::{json, Value};
use serial_test::serial;
use tempfile::NamedTempFile;

#[test]
fn test_json_request_with_alias_key_names() {
    let request: QueryRequest = serde_json::from_value(json!({
        "labels": ["Subject", "Age Group"],
        "rels": [{"from": "Subject", "to": "Age Group", "type": "HAS_AGEGR"}],
        "where_map": {"Subject": {"USUBJID": ["01", "02"]}},
        "return_nodeid": "false",
        "return_propname": false,
        "only_props": "rdfs:label",
        "limit": 20
    }))
    .unwrap();
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    assert!(compiled.query.starts_with(
        "MATCH (`Subject`:`Subject`),\n(`Age Group`:`Age Group`),\n\
         (`Subject`)-[`Subject_HAS_AGEGR_Age Group`:`HAS_AGEGR`]->(`Age Group`)\n\
         WHERE `Subject`.`USUBJID` in $par_1\nRETURN "
    ));
    assert!(compiled.query.ends_with(" as all LIMIT 20"));
    assert_eq!(
        Value::Object(compiled.params),
        json!({"only_props": ["rdfs:label"], "par_1": ["01", "02"]})
    );
}

#[test]
fn test_yaml_request_with_packing() {
    let yaml = r#"
labels:
  - Subject
  - Population
relationships:
  - from: Subject
    to: Population
    type: IN_POP
only_props: rdfs:label
return_nodeid: false
return_propname: false
labels_to_pack:
  Population: [Subject]
"#;
    let request: QueryRequest = serde_yaml::from_str(yaml).unwrap();
    let compiled = QueryCompiler::default().compile(&request).unwrap();
    let lines: Vec<&str> = compiled.query.lines().collect();
    assert_eq!(
        lines[3],
        "CALL apoc.path.subgraphNodes(`Subject`, {relationshipFilter: \"IN_POP\", optional:true, minLevel: 1, maxLevel: 1}) YIELD node AS `Population_coll`"
    );
    assert_eq!(lines[4], "WITH `Subject`");
    assert_eq!(
        lines[5],
        ", collect(distinct `Population_coll`.`rdfs:label`) AS `Population_coll`"
    );
    assert!(lines[6].starts_with("RETURN apoc.map.mergeList("));
}

#[test]
fn test_schema_file_drives_inference() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "relationships:\n  - from: Subject\n    to: Visit\n    type: HAS_VISIT\nshort_labels:\n  Visit: VIS"
    )
    .unwrap();
    let schema = InMemorySchema::from_yaml_file(file.path()).unwrap();

    let request: QueryRequest = serde_json::from_value(json!({
        "labels": ["Subject", "Visit**"],
        "infer_rels": true,
        "use_shortlabel": true,
        "return_nodeid": false
    }))
    .unwrap();
    let compiled = QueryCompiler::default()
        .with_schema(schema)
        .compile(&request)
        .unwrap();
    assert!(compiled.query.starts_with(
        "MATCH (`Subject`:`Subject`)\nOPTIONAL MATCH (`VIS`:`Visit`),\n\
         (`Subject`)-[`Subject_HAS_VISIT_VIS`:`HAS_VISIT`]->(`VIS`)\nRETURN "
    ));
    assert!(compiled.query.contains("[\"VIS\" + \".\" + key, "));
}

#[test]
fn test_without_schema_nothing_is_inferred() {
    let request: QueryRequest = serde_json::from_value(json!({
        "labels": ["Subject", "Visit"],
        "infer_rels": true
    }))
    .unwrap();
    assert!(QueryCompiler::default()
        .compile(&request)
        .unwrap_err()
        .is_connectivity());
}

#[test]
#[serial]
fn test_config_from_env() {
    std::env::set_var("CYPHERGEN_OPTIONAL_MARKER", "?");
    std::env::set_var("CYPHERGEN_NEIGHBOR_VARIABLE", "n");
    let config = CompilerConfig::from_env();
    std::env::remove_var("CYPHERGEN_OPTIONAL_MARKER");
    std::env::remove_var("CYPHERGEN_NEIGHBOR_VARIABLE");

    let config = config.unwrap();
    assert_eq!(config.optional_marker, "?");
    assert_eq!(config.neighbor_variable, "n");

    let request = QueryRequest::new(["Subject", "Visit?"])
        .allow_unrelated_subgraphs(true)
        .with_existence(json!({"Subject": {"EXISTS": {"include": ["Visit"]}}}));
    let compiled = QueryCompiler::new(config).compile(&request).unwrap();
    assert!(compiled
        .query
        .contains("WHERE EXISTS {MATCH (`Subject`)-[]-(n) WHERE (n:`Visit`)}"));
    assert!(compiled.query.contains("OPTIONAL MATCH (`Visit`:`Visit`)"));
}

#[test]
#[serial]
fn test_invalid_env_config() {
    std::env::set_var("CYPHERGEN_VERBOSE", "sometimes");
    let result = CompilerConfig::from_env();
    std::env::remove_var("CYPHERGEN_VERBOSE");
    assert!(result.is_err());
}
