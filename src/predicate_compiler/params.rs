//! Per-call parameter scope.
//!
//! Parameter names are `par_1`, `par_2`, ... in the order values are bound.
//! One generator lives for exactly one compilation call and is threaded by
//! `&mut` through every sub-compiler, so numbering is gap-free across all
//! match groups and never shared between concurrent calls.

use std::fmt;

use serde_json::{Map, Value};

use crate::errors::{CompileError, CompileResult};

pub type Params = Map<String, Value>;

const GENERATED_PREFIX: &str = "par_";

/// Reference to a bound parameter; displays as `$name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRef(String);

impl ParamRef {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct ParameterGenerator {
    counter: usize,
    params: Params,
}

impl ParameterGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under the next generated name
    pub fn bind(&mut self, value: Value) -> ParamRef {
        self.counter += 1;
        let name = format!("{}{}", GENERATED_PREFIX, self.counter);
        self.params.insert(name.clone(), value);
        ParamRef(name)
    }

    /// Bind `value` under a fixed, feature-specific name such as `only_props`
    pub fn bind_fixed(&mut self, name: &str, value: Value) -> CompileResult<ParamRef> {
        let looks_generated = name
            .strip_prefix(GENERATED_PREFIX)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()));
        if name.is_empty() || looks_generated {
            return Err(CompileError::configuration(format!(
                "'{}' is not a valid fixed parameter name",
                name
            )));
        }
        if let Some(existing) = self.params.get(name) {
            if existing != &value {
                return Err(CompileError::configuration(format!(
                    "Fixed parameter '{}' bound twice with different values",
                    name
                )));
            }
        } else {
            self.params.insert(name.to_string(), value);
        }
        Ok(ParamRef(name.to_string()))
    }

    /// Number of generated (`par_N`) parameters so far
    pub fn allocated(&self) -> usize {
        self.counter
    }

    pub fn into_params(self) -> Params {
        self.params
    }
}
