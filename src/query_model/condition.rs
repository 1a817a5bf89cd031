//! Filter conditions.
//!
//! A filter map arrives as nested JSON:
//!
//! ```text
//! {
//!     "Subject": { "USUBJID": "01-001", "ARM": ["A", "B"] },
//!     "!Domain": { "rdfs:label": "LB" },
//!     "Age":     { "AGE": { "min": 18, "max": 65, "min_include": true } }
//! }
//! ```
//!
//! The shape of each value decides its [`Condition`] once, here, so the
//! compiler never has to guess from the keys present.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{CompileError, CompileResult};

const RANGE_KEYS: [&str; 5] = ["min", "max", "min_include", "max_include", "incl_null"];
const NOT_IN_KEY: &str = "not_in";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    /// `prop = $par`
    Equals(Value),
    /// `prop in $par`
    OneOf(Vec<Value>),
    /// Numeric (or otherwise ordered) interval with tri-state null handling
    Range(RangeSpec),
    /// `NOT (inner)`
    Not(Box<Condition>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RangeSpec {
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub min_include: bool,
    pub max_include: bool,
    /// `Some(true)`: nulls pass, `Some(false)`: nulls fail, `None`: not mentioned
    pub incl_null: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyFilter {
    pub property: String,
    pub condition: Condition,
}

/// All conditions attached to one label key of the filter map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelFilters {
    /// Label name with any NOT marker removed
    pub label: String,
    pub properties: Vec<PropertyFilter>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilterMap {
    pub entries: Vec<LabelFilters>,
}

impl Condition {
    pub fn negate(self) -> Condition {
        Condition::Not(Box::new(self))
    }

    /// Number of parameters this condition binds when compiled
    pub fn parameter_count(&self) -> usize {
        match self {
            Condition::Equals(_) | Condition::OneOf(_) => 1,
            Condition::Range(_) => 2,
            Condition::Not(inner) => inner.parameter_count(),
        }
    }

    /// Decide the condition variant from the JSON shape of a filter value
    pub fn from_json(value: &Value) -> Result<Condition, String> {
        match value {
            Value::Array(items) => {
                if !items.is_empty() && items.iter().all(Value::is_object) {
                    // [{"not_in": "DS"}, {"not_in": "LB"}]
                    let excluded = items
                        .iter()
                        .map(|item| match item.as_object() {
                            Some(obj) if obj.len() == 1 && obj.contains_key(NOT_IN_KEY) => {
                                Ok(obj[NOT_IN_KEY].clone())
                            }
                            _ => Err(format!(
                                "list items must all be {{\"{}\": value}} objects, found {}",
                                NOT_IN_KEY, item
                            )),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Condition::OneOf(excluded).negate())
                } else if let Some(bad) = items.iter().find(|v| v.is_object()) {
                    Err(format!("list mixes scalars and objects ({})", bad))
                } else {
                    Ok(Condition::OneOf(items.clone()))
                }
            }
            Value::Object(obj) => {
                if obj.contains_key(NOT_IN_KEY) {
                    if obj.len() != 1 {
                        return Err(format!(
                            "'{}' cannot be combined with other keys",
                            NOT_IN_KEY
                        ));
                    }
                    match &obj[NOT_IN_KEY] {
                        Value::Array(items) => Ok(Condition::OneOf(items.clone()).negate()),
                        Value::Object(_) => Err(format!("'{}' value cannot be a map", NOT_IN_KEY)),
                        scalar => Ok(Condition::Equals(scalar.clone()).negate()),
                    }
                } else if obj.keys().any(|k| RANGE_KEYS.contains(&k.as_str())) {
                    RangeSpec::from_json(obj).map(Condition::Range)
                } else {
                    Err(format!("unrecognised condition shape {}", value))
                }
            }
            scalar => Ok(Condition::Equals(scalar.clone())),
        }
    }
}

impl RangeSpec {
    fn from_json(obj: &Map<String, Value>) -> Result<RangeSpec, String> {
        if let Some(unknown) = obj.keys().find(|k| !RANGE_KEYS.contains(&k.as_str())) {
            return Err(format!("unknown range key '{}'", unknown));
        }

        let bound = |key: &str| -> Result<Option<Value>, String> {
            match obj.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Array(_)) | Some(Value::Object(_)) => {
                    Err(format!("range bound '{}' must be a scalar", key))
                }
                Some(v) => Ok(Some(v.clone())),
            }
        };
        let flag = |key: &str| -> Result<Option<bool>, String> {
            match obj.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Bool(b)) => Ok(Some(*b)),
                Some(other) => Err(format!("range flag '{}' must be a boolean, found {}", key, other)),
            }
        };

        Ok(RangeSpec {
            min: bound("min")?,
            max: bound("max")?,
            min_include: flag("min_include")?.unwrap_or(false),
            max_include: flag("max_include")?.unwrap_or(false),
            incl_null: flag("incl_null")?,
        })
    }

    pub fn has_bounds(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

impl FilterMap {
    /// Parse a filter map; `Null` or `{}` gives an empty map.
    ///
    /// Label keys starting with `not_marker` negate every condition below them.
    pub fn from_json(value: &Value, not_marker: &str) -> CompileResult<FilterMap> {
        let outer = match value {
            Value::Null => return Ok(FilterMap::default()),
            Value::Object(outer) => outer,
            other => {
                return Err(CompileError::configuration(format!(
                    "Filter map must be a map of label to property conditions, found {}",
                    other
                )))
            }
        };

        let mut entries = Vec::with_capacity(outer.len());
        for (key, inner) in outer {
            let (label, negated) = match key.strip_prefix(not_marker) {
                Some(stripped) if !not_marker.is_empty() => (stripped, true),
                _ => (key.as_str(), false),
            };
            if label.is_empty() {
                return Err(CompileError::configuration(format!(
                    "Filter map key '{}' has an empty label name",
                    key
                )));
            }
            let inner = inner.as_object().ok_or_else(|| {
                CompileError::configuration_with_context(
                    format!("Conditions must be a map of property to value, found {}", inner),
                    format!("filters for label '{}'", key),
                )
            })?;

            let mut properties = Vec::with_capacity(inner.len());
            for (property, raw) in inner {
                let condition = Condition::from_json(raw).map_err(|msg| {
                    CompileError::configuration_with_context(
                        msg,
                        format!("filter on '{}'.'{}'", key, property),
                    )
                })?;
                properties.push(PropertyFilter {
                    property: property.clone(),
                    condition: if negated { condition.negate() } else { condition },
                });
            }
            entries.push(LabelFilters {
                label: label.to_string(),
                properties,
            });
        }
        Ok(FilterMap { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.properties.is_empty())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Entries whose label is one of `labels`, original order kept
    pub fn restricted_to<S: AsRef<str>>(&self, labels: &[S]) -> FilterMap {
        FilterMap {
            entries: self
                .entries
                .iter()
                .filter(|e| labels.iter().any(|l| l.as_ref() == e.label))
                .cloned()
                .collect(),
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|e| e.properties.iter())
            .map(|p| p.condition.parameter_count())
            .sum()
    }
}
