//! WHERE-fragment compilation.
//!
//! [`filters`] turns property conditions into boolean fragments with bound
//! parameters; [`existence`] turns neighbor-type checks into existential
//! sub-patterns. Neither adds the surrounding `WHERE`; callers AND the
//! fragments together.

pub mod existence;
pub mod filters;
pub mod params;

use std::collections::HashMap;

pub use existence::{compile_existence, compile_existence_with};
pub use filters::{compile_condition, compile_filters, compile_filters_with};
pub use params::{ParamRef, ParameterGenerator, Params};

/// Maps a label name to the Cypher variable bound to it
pub trait VariableResolver {
    fn variable_for(&self, label: &str) -> String;
}

/// Uses every label name as its own variable
pub struct LabelAsVariable;

impl VariableResolver for LabelAsVariable {
    fn variable_for(&self, label: &str) -> String {
        label.to_string()
    }
}

impl VariableResolver for HashMap<String, String> {
    fn variable_for(&self, label: &str) -> String {
        self.get(label).cloned().unwrap_or_else(|| label.to_string())
    }
}
