use serde_json::Value;

use super::{LabelAsVariable, ParameterGenerator, Params, VariableResolver};
use crate::cypher_generator::PropertyRef;
use crate::query_model::{Condition, FilterMap, RangeSpec};

/// Compile a filter map with a fresh parameter scope.
///
/// Label names are used as variables. Returns one fragment per condition
/// (ranges without bounds or null handling contribute none) and the bound
/// parameters.
pub fn compile_filters(filters: &FilterMap) -> (Vec<String>, Params) {
    let mut params = ParameterGenerator::new();
    let clauses = compile_filters_with(filters, &LabelAsVariable, &mut params);
    (clauses, params.into_params())
}

/// Compile a filter map into an existing parameter scope
pub fn compile_filters_with(
    filters: &FilterMap,
    resolver: &dyn VariableResolver,
    params: &mut ParameterGenerator,
) -> Vec<String> {
    let mut clauses = Vec::new();
    for entry in &filters.entries {
        let variable = resolver.variable_for(&entry.label);
        for filter in &entry.properties {
            let subject = PropertyRef::new(variable.as_str(), filter.property.as_str()).to_string();
            if let Some(clause) = compile_condition(&subject, &filter.condition, params) {
                clauses.push(clause);
            }
        }
    }
    clauses
}

/// Compile one condition on an already rendered property reference.
///
/// Scalars and lists bind one parameter, ranges always bind two.
pub fn compile_condition(
    subject: &str,
    condition: &Condition,
    params: &mut ParameterGenerator,
) -> Option<String> {
    match condition {
        Condition::Equals(value) => {
            let p = params.bind(value.clone());
            Some(format!("{} = {}", subject, p))
        }
        Condition::OneOf(values) => {
            let p = params.bind(Value::Array(values.clone()));
            Some(format!("{} in {}", subject, p))
        }
        Condition::Range(range) => compile_range(subject, range, params),
        Condition::Not(inner) => {
            compile_condition(subject, inner, params).map(|clause| format!("NOT ({})", clause))
        }
    }
}

fn compile_range(
    subject: &str,
    range: &RangeSpec,
    params: &mut ParameterGenerator,
) -> Option<String> {
    // Both slots are bound even for a missing bound, keeping numbering
    // independent of how complete each range is.
    let min = params.bind(range.min.clone().unwrap_or(Value::Null));
    let max = params.bind(range.max.clone().unwrap_or(Value::Null));

    let mut bounds = Vec::with_capacity(3);
    if range.min.is_some() {
        let op = if range.min_include { "<=" } else { "<" };
        bounds.push(format!("{} {}", min, op));
    }
    if range.has_bounds() {
        bounds.push(subject.to_string());
    }
    if range.max.is_some() {
        let op = if range.max_include { "<=" } else { "<" };
        bounds.push(format!("{} {}", op, max));
    }
    let bounds = (!bounds.is_empty()).then(|| format!("({})", bounds.join(" ")));

    let null_check = match range.incl_null {
        None => None,
        Some(true) => Some((format!("{} IS NULL", subject), "OR")),
        Some(false) => Some((format!("{} IS NOT NULL", subject), "AND")),
    };

    match (null_check, bounds) {
        (None, None) => {
            log::debug!("Range on {} has no bounds and no null handling, no clause emitted", subject);
            None
        }
        (None, Some(bounds)) => Some(bounds),
        (Some((check, _)), None) => Some(check),
        (Some((check, joiner)), Some(bounds)) => Some(format!("({} {} {})", check, joiner, bounds)),
    }
}
