use serde::Deserialize;
use serde_json::Value;

use super::{LabelSpec, Relationship, ReturnOptions};

/// One compilation request as received from a caller or a request file.
///
/// Filter and existence maps are kept as JSON here and parsed by the
/// compiler, because their NOT marker comes from the compiler configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    pub labels: Vec<LabelSpec>,
    #[serde(alias = "rels")]
    pub relationships: Vec<Relationship>,
    #[serde(alias = "where_map")]
    pub filters: Value,
    #[serde(alias = "where_rel_map")]
    pub existence: Value,
    /// Ask the schema collaborator for relationships when none are given
    pub infer_rels: bool,
    /// Use the schema collaborator's short labels as variable tags
    pub use_shortlabel: bool,
    pub allow_unrelated_subgraphs: bool,
    #[serde(flatten)]
    pub options: ReturnOptions,
}

impl QueryRequest {
    pub fn new<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LabelSpec>,
    {
        QueryRequest {
            labels: labels.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_relationships(mut self, relationships: Vec<Relationship>) -> Self {
        self.relationships = relationships;
        self
    }

    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_existence(mut self, existence: Value) -> Self {
        self.existence = existence;
        self
    }

    pub fn with_options(mut self, options: ReturnOptions) -> Self {
        self.options = options;
        self
    }

    pub fn allow_unrelated_subgraphs(mut self, allow: bool) -> Self {
        self.allow_unrelated_subgraphs = allow;
        self
    }
}
