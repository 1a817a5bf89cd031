use cyphergen::predicate_compiler::{compile_existence, compile_filters};
use cyphergen::query_model::{ExistenceMap, FilterMap};
use serde_json::{json, Value};
use test_case::test_case;

fn filters(map: Value) -> (Vec<String>, Value) {
    let (clauses, params) = compile_filters(&FilterMap::from_json(&map, "!").unwrap());
    (clauses, Value::Object(params))
}

#[test_case(json!("01"), "`S`.`ID` = $par_1" ; "scalar")]
#[test_case(json!(true), "`S`.`ID` = $par_1" ; "boolean scalar")]
#[test_case(json!([1, 2]), "`S`.`ID` in $par_1" ; "list")]
#[test_case(json!({"not_in": "01"}), "NOT (`S`.`ID` = $par_1)" ; "negated scalar")]
#[test_case(json!({"min": 1, "max": 9}), "($par_1 < `S`.`ID` < $par_2)" ; "open range")]
#[test_case(json!({"min": 1, "min_include": true}), "($par_1 <= `S`.`ID`)" ; "closed lower bound")]
#[test_case(json!({"incl_null": true}), "`S`.`ID` IS NULL" ; "null only")]
fn test_condition_shapes(condition: Value, expected: &str) {
    let (clauses, _) = filters(json!({"S": {"ID": condition}}));
    assert_eq!(clauses, vec![expected]);
}

#[test]
fn test_age_range_half_open() {
    let (clauses, params) = filters(json!({"Age": {"AGE": {
        "min": 18, "max": 65, "min_include": true, "max_include": false
    }}}));
    assert_eq!(clauses, vec!["($par_1 <= `Age`.`AGE` < $par_2)"]);
    assert_eq!(params, json!({"par_1": 18, "par_2": 65}));
}

#[test]
fn test_numbering_follows_map_order() {
    let (clauses, params) = filters(json!({
        "B": {"y": 2},
        "A": {"x": 1, "r": {"max": 3}},
        "!C": {"z": [4]}
    }));
    assert_eq!(
        clauses,
        vec![
            "`B`.`y` = $par_1",
            "`A`.`x` = $par_2",
            "(`A`.`r` < $par_4)",
            "NOT (`C`.`z` in $par_5)",
        ]
    );
    assert_eq!(
        params,
        json!({"par_1": 2, "par_2": 1, "par_3": null, "par_4": 3, "par_5": [4]})
    );
}

#[test]
fn test_malformed_filters_are_rejected() {
    assert!(FilterMap::from_json(&json!(["A"]), "!").is_err());
    assert!(FilterMap::from_json(&json!({"A": 5}), "!").is_err());
}

#[test_case("EXISTS", "include", "EXISTS {MATCH (`nobs`)-[]-(x) WHERE (x:`Ser` OR x:`Pop`)}" ; "include")]
#[test_case("EXISTS", "exclude", "EXISTS {MATCH (`nobs`)-[]-(x) WHERE NOT (x:`Ser` OR x:`Pop`)}" ; "exclude")]
#[test_case("NOT EXISTS", "include_matched", "NOT EXISTS {MATCH (`nobs`)-[]-(x) WHERE x in [`Ser`, `Pop`]}" ; "include matched")]
#[test_case("NOT EXISTS", "exclude_matched", "NOT EXISTS {MATCH (`nobs`)-[]-(x) WHERE NOT (x in [`Ser`, `Pop`])}" ; "exclude matched")]
fn test_existence_operators(kind: &str, operator: &str, expected: &str) {
    let map = json!({"nobs": {kind: {operator: ["Ser", "Pop"]}}});
    let (clauses, params) = compile_existence(&ExistenceMap::from_json(&map).unwrap(), "x");
    assert_eq!(clauses, vec![expected]);
    assert!(params.is_empty());
}

#[test]
fn test_existence_with_custom_neighbor_variable() {
    let map = json!({"nobs": {"EXISTS<": {"include": ["Ser"]}}});
    let (clauses, _) = compile_existence(&ExistenceMap::from_json(&map).unwrap(), "nb");
    assert_eq!(clauses, vec!["EXISTS {MATCH (`nobs`)<-[]-(nb) WHERE (nb:`Ser`)}"]);
}
