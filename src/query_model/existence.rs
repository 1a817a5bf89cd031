//! Neighbor-existence conditions.
//!
//! ```text
//! {
//!     "nobs": {
//!         "EXISTS>":     { "include": ["Ser", {"Pop": {"FLAG": "Y"}}] },
//!         "NOT EXISTS":  { "exclude_matched": ["Ser", "Pop"] }
//!     }
//! }
//! ```

use serde::Serialize;
use serde_json::Value;

use super::condition::{Condition, PropertyFilter};
use crate::errors::{CompileError, CompileResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckKind {
    Exists,
    NotExists,
}

impl CheckKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            CheckKind::Exists => "EXISTS",
            CheckKind::NotExists => "NOT EXISTS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Undirected,
    /// `>` suffix
    Outgoing,
    /// `<` suffix
    Incoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NeighborOperator {
    Include,
    Exclude,
    IncludeMatched,
    ExcludeMatched,
}

impl NeighborOperator {
    fn parse(key: &str) -> Option<NeighborOperator> {
        match key {
            "include" => Some(NeighborOperator::Include),
            "exclude" => Some(NeighborOperator::Exclude),
            "include_matched" => Some(NeighborOperator::IncludeMatched),
            "exclude_matched" => Some(NeighborOperator::ExcludeMatched),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(
            self,
            NeighborOperator::IncludeMatched | NeighborOperator::ExcludeMatched
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NeighborItem {
    /// A bare neighbor type name
    Type(String),
    /// A neighbor type with property conditions on the neighbor
    Constrained {
        label: String,
        properties: Vec<PropertyFilter>,
    },
}

impl NeighborItem {
    pub fn label(&self) -> &str {
        match self {
            NeighborItem::Type(label) => label,
            NeighborItem::Constrained { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorClause {
    pub operator: NeighborOperator,
    pub items: Vec<NeighborItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExistenceCheck {
    pub kind: CheckKind,
    pub direction: Direction,
    pub clauses: Vec<OperatorClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelExistence {
    pub label: String,
    pub checks: Vec<ExistenceCheck>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExistenceMap {
    pub entries: Vec<LabelExistence>,
}

impl ExistenceCheck {
    /// Labels this check refers to as already-matched variables
    pub fn matched_labels(&self) -> impl Iterator<Item = &str> {
        self.clauses
            .iter()
            .filter(|c| c.operator.is_matched())
            .flat_map(|c| c.items.iter().map(NeighborItem::label))
    }

    /// Split `"NOT EXISTS<"` into kind and direction
    pub fn parse_kind(raw: &str) -> Option<(CheckKind, Direction)> {
        let (base, direction) = if let Some(base) = raw.strip_suffix('>') {
            (base, Direction::Outgoing)
        } else if let Some(base) = raw.strip_suffix('<') {
            (base, Direction::Incoming)
        } else {
            (raw, Direction::Undirected)
        };
        let kind = match base {
            "EXISTS" => CheckKind::Exists,
            "NOT EXISTS" => CheckKind::NotExists,
            _ => return None,
        };
        Some((kind, direction))
    }
}

impl ExistenceMap {
    pub fn from_json(value: &Value) -> CompileResult<ExistenceMap> {
        let outer = match value {
            Value::Null => return Ok(ExistenceMap::default()),
            Value::Object(outer) => outer,
            other => {
                return Err(CompileError::configuration(format!(
                    "Existence map must be a map of label to checks, found {}",
                    other
                )))
            }
        };

        let mut entries = Vec::with_capacity(outer.len());
        for (label, checks_raw) in outer {
            if label.is_empty() {
                return Err(CompileError::configuration(
                    "Existence map has an empty label name",
                ));
            }
            let context = || format!("neighbor existence conditions for label '{}'", label);
            let checks_obj = checks_raw.as_object().ok_or_else(|| {
                CompileError::configuration_with_context(
                    format!("Checks must be a map of check kind to operators, found {}", checks_raw),
                    context(),
                )
            })?;

            let mut checks = Vec::with_capacity(checks_obj.len());
            for (kind_raw, operators_raw) in checks_obj {
                let (kind, direction) = ExistenceCheck::parse_kind(kind_raw).ok_or_else(|| {
                    CompileError::configuration_with_context(
                        format!(
                            "Unknown check kind '{}' (expected EXISTS or NOT EXISTS, optionally followed by > or <)",
                            kind_raw
                        ),
                        context(),
                    )
                })?;
                let clauses = parse_operators(operators_raw)
                    .map_err(|msg| CompileError::configuration_with_context(msg, context()))?;
                checks.push(ExistenceCheck {
                    kind,
                    direction,
                    clauses,
                });
            }
            entries.push(LabelExistence {
                label: label.clone(),
                checks,
            });
        }
        Ok(ExistenceMap { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.checks.is_empty())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Labels referenced as matched variables by `*_matched` operators
    pub fn matched_labels(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|e| e.checks.iter())
            .flat_map(ExistenceCheck::matched_labels)
    }

    /// `(owning label, check)` pairs in map order
    pub fn checks(&self) -> impl Iterator<Item = (&str, &ExistenceCheck)> {
        self.entries
            .iter()
            .flat_map(|e| e.checks.iter().map(move |c| (e.label.as_str(), c)))
    }

    /// Keep only the checks accepted by `keep`; labels left without checks
    /// are dropped
    pub fn filter_checks<F>(&self, keep: F) -> ExistenceMap
    where
        F: Fn(&str, &ExistenceCheck) -> bool,
    {
        ExistenceMap {
            entries: self
                .entries
                .iter()
                .filter_map(|e| {
                    let checks: Vec<ExistenceCheck> = e
                        .checks
                        .iter()
                        .filter(|c| keep(&e.label, c))
                        .cloned()
                        .collect();
                    (!checks.is_empty()).then(|| LabelExistence {
                        label: e.label.clone(),
                        checks,
                    })
                })
                .collect(),
        }
    }
}

fn parse_operators(raw: &Value) -> Result<Vec<OperatorClause>, String> {
    let obj = raw
        .as_object()
        .ok_or_else(|| format!("Operators must be a map, found {}", raw))?;
    if obj.is_empty() {
        return Err("A check needs at least one operator".to_string());
    }

    let mut clauses = Vec::with_capacity(obj.len());
    for (key, items_raw) in obj {
        let operator = NeighborOperator::parse(key).ok_or_else(|| {
            format!(
                "Unknown operator '{}' (expected include, exclude, include_matched or exclude_matched)",
                key
            )
        })?;
        let items_list = items_raw
            .as_array()
            .ok_or_else(|| format!("'{}' expects a list, found {}", key, items_raw))?;
        if items_list.is_empty() {
            return Err(format!("'{}' expects at least one neighbor type", key));
        }

        let mut items = Vec::with_capacity(items_list.len());
        for item in items_list {
            match item {
                Value::String(name) if !name.is_empty() => items.push(NeighborItem::Type(name.clone())),
                Value::Object(nested) if !operator.is_matched() => {
                    for (label, props) in nested {
                        items.push(parse_constrained(label, props)?);
                    }
                }
                Value::Object(_) => {
                    return Err(format!(
                        "'{}' only accepts neighbor type names, found {}",
                        key, item
                    ))
                }
                other => return Err(format!("Invalid neighbor item {} under '{}'", other, key)),
            }
        }
        clauses.push(OperatorClause { operator, items });
    }
    Ok(clauses)
}

fn parse_constrained(label: &str, props: &Value) -> Result<NeighborItem, String> {
    if label.is_empty() {
        return Err("Neighbor type name cannot be empty".to_string());
    }
    let props = match props {
        Value::Null => return Ok(NeighborItem::Type(label.to_string())),
        Value::Object(props) if props.is_empty() => return Ok(NeighborItem::Type(label.to_string())),
        Value::Object(props) => props,
        other => {
            return Err(format!(
                "Conditions on neighbor '{}' must be a map, found {}",
                label, other
            ))
        }
    };
    let properties = props
        .iter()
        .map(|(property, raw)| {
            Condition::from_json(raw)
                .map(|condition| PropertyFilter {
                    property: property.clone(),
                    condition,
                })
                .map_err(|msg| format!("{} (neighbor '{}'.'{}')", msg, label, property))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NeighborItem::Constrained {
        label: label.to_string(),
        properties,
    })
}
