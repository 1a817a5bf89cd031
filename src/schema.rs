//! Schema-metadata seam.
//!
//! The compiler never talks to a live schema store. Whatever knows the schema
//! implements [`SchemaMetadata`]; its answers are plain [`Relationship`] and
//! tag values, treated exactly like caller input.
//!
//! ```yaml
//! relationships:
//!   - from: Subject
//!     to: Sex
//!     type: HAS_SEX
//! short_labels:
//!   Study Subject: SUBJ
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;
use crate::query_model::{Label, Relationship};

pub trait SchemaMetadata {
    /// Relationships connecting the requested labels
    fn infer_relationships(&self, labels: &[Label]) -> Vec<Relationship>;

    /// Short alias of a label, used as its tag
    fn short_label(&self, label: &str) -> Option<String>;
}

/// No schema: nothing is inferred, no label has a short alias
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSchema;

impl SchemaMetadata for NoSchema {
    fn infer_relationships(&self, _labels: &[Label]) -> Vec<Relationship> {
        Vec::new()
    }

    fn short_label(&self, _label: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InMemorySchema {
    pub relationships: Vec<Relationship>,
    pub short_labels: HashMap<String, String>,
}

impl InMemorySchema {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "schema_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let schema: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            field: "schema_content".to_string(),
            value: yaml.to_string(),
            source: Box::new(e),
        })?;
        for rel in &schema.relationships {
            if rel.from.is_empty() || rel.to.is_empty() {
                return Err(ConfigError::Conflict(format!(
                    "schema relationship {:?} is missing an endpoint",
                    rel
                )));
            }
        }
        Ok(schema)
    }
}

impl SchemaMetadata for InMemorySchema {
    /// Schema relationships with both endpoints requested; optional when
    /// either endpoint is optional
    fn infer_relationships(&self, labels: &[Label]) -> Vec<Relationship> {
        let find = |name: &str| labels.iter().find(|l| l.name == name);
        self.relationships
            .iter()
            .filter_map(|rel| {
                let from = find(&rel.from)?;
                let to = find(&rel.to)?;
                let mut rel = rel.clone();
                rel.optional |= from.optional || to.optional;
                Some(rel)
            })
            .collect()
    }

    fn short_label(&self, label: &str) -> Option<String> {
        self.short_labels.get(label).cloned()
    }
}
