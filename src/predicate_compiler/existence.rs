use super::filters::compile_condition;
use super::{LabelAsVariable, ParameterGenerator, Params, VariableResolver};
use crate::cypher_generator::escape_identifier;
use crate::query_model::{Direction, ExistenceCheck, ExistenceMap, NeighborItem, NeighborOperator};

/// Compile neighbor-existence checks with a fresh parameter scope.
///
/// Neighbor types are identifiers and are escaped into the text; params only
/// fill up when a neighbor item carries property conditions.
pub fn compile_existence(existence: &ExistenceMap, neighbor: &str) -> (Vec<String>, Params) {
    let mut params = ParameterGenerator::new();
    let clauses = compile_existence_with(existence, neighbor, &LabelAsVariable, &mut params);
    (clauses, params.into_params())
}

/// One `EXISTS {...}` / `NOT EXISTS {...}` fragment per (label, check kind)
pub fn compile_existence_with(
    existence: &ExistenceMap,
    neighbor: &str,
    resolver: &dyn VariableResolver,
    params: &mut ParameterGenerator,
) -> Vec<String> {
    let mut clauses = Vec::new();
    for entry in &existence.entries {
        let variable = escape_identifier(&resolver.variable_for(&entry.label));
        for check in &entry.checks {
            clauses.push(compile_check(&variable, check, neighbor, resolver, params));
        }
    }
    clauses
}

fn compile_check(
    variable: &str,
    check: &ExistenceCheck,
    neighbor: &str,
    resolver: &dyn VariableResolver,
    params: &mut ParameterGenerator,
) -> String {
    let (left, right) = match check.direction {
        Direction::Undirected => ("", ""),
        Direction::Outgoing => ("", ">"),
        Direction::Incoming => ("<", ""),
    };

    let inner: Vec<String> = check
        .clauses
        .iter()
        .map(|clause| match clause.operator {
            NeighborOperator::Include => type_disjunction(&clause.items, neighbor, params),
            NeighborOperator::Exclude => {
                format!("NOT {}", type_disjunction(&clause.items, neighbor, params))
            }
            NeighborOperator::IncludeMatched => {
                format!("{} in {}", neighbor, matched_list(&clause.items, resolver))
            }
            NeighborOperator::ExcludeMatched => {
                format!("NOT ({} in {})", neighbor, matched_list(&clause.items, resolver))
            }
        })
        .collect();

    format!(
        "{} {{MATCH ({}){}-[]-{}({}) WHERE {}}}",
        check.kind.keyword(),
        variable,
        left,
        right,
        neighbor,
        inner.join(" AND ")
    )
}

/// `` (x:`A` OR (x:`B` AND x.`p` = $par_1)) ``
fn type_disjunction(items: &[NeighborItem], neighbor: &str, params: &mut ParameterGenerator) -> String {
    let alternatives: Vec<String> = items
        .iter()
        .map(|item| {
            let type_test = format!("{}:{}", neighbor, escape_identifier(item.label()));
            let NeighborItem::Constrained { properties, .. } = item else {
                return type_test;
            };
            let mut parts = vec![type_test];
            for filter in properties {
                let subject = format!("{}.{}", neighbor, escape_identifier(&filter.property));
                parts.extend(compile_condition(&subject, &filter.condition, params));
            }
            if parts.len() == 1 {
                parts.remove(0)
            } else {
                format!("({})", parts.join(" AND "))
            }
        })
        .collect();
    format!("({})", alternatives.join(" OR "))
}

fn matched_list(items: &[NeighborItem], resolver: &dyn VariableResolver) -> String {
    let names: Vec<String> = items
        .iter()
        .map(|item| escape_identifier(&resolver.variable_for(item.label())))
        .collect();
    format!("[{}]", names.join(", "))
}
