//! Request pipeline.
//!
//! ```text
//! QueryRequest
//!   -> labels/relationships parsed, relationships inferred if asked
//!   -> enrichment, default relationship types, tags
//!   -> connectivity check
//!   -> partition into match groups
//!   -> assembly
//! CompiledQuery
//! ```
//!
//! A [`QueryCompiler`] holds only configuration and the schema collaborator,
//! so one instance can serve any number of concurrent calls.

use std::collections::{HashMap, HashSet};

use crate::config::CompilerConfig;
use crate::cypher_generator::{Assembler, CompiledQuery};
use crate::errors::{CompileError, CompileResult};
use crate::graph::{enrich, is_connected, partition, MatchGroup};
use crate::query_model::{ExistenceMap, FilterMap, Label, QueryRequest, Relationship};
use crate::schema::{NoSchema, SchemaMetadata};

pub struct QueryCompiler<S: SchemaMetadata = NoSchema> {
    config: CompilerConfig,
    schema: S,
}

impl QueryCompiler<NoSchema> {
    pub fn new(config: CompilerConfig) -> Self {
        QueryCompiler {
            config,
            schema: NoSchema,
        }
    }
}

impl Default for QueryCompiler<NoSchema> {
    fn default() -> Self {
        QueryCompiler::new(CompilerConfig::default())
    }
}

impl<S: SchemaMetadata> QueryCompiler<S> {
    pub fn with_schema<T: SchemaMetadata>(self, schema: T) -> QueryCompiler<T> {
        QueryCompiler {
            config: self.config,
            schema,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile(&self, request: &QueryRequest) -> CompileResult<CompiledQuery> {
        let marker = &self.config.optional_marker;
        let labels = request
            .labels
            .iter()
            .cloned()
            .map(|spec| spec.into_label(marker))
            .collect::<CompileResult<Vec<Label>>>()?;
        for rel in &request.relationships {
            rel.validate()?;
        }
        if labels.is_empty() && request.relationships.is_empty() {
            return Err(CompileError::configuration(
                "A request needs at least one label or relationship",
            ));
        }

        let mut relationships = request.relationships.clone();
        if relationships.is_empty() && request.infer_rels {
            relationships = self.schema.infer_relationships(&labels);
            log::debug!("Inferred {} relationship(s) from schema", relationships.len());
        }

        let mut labels = enrich(&labels, &relationships);
        let relationships: Vec<Relationship> = relationships
            .into_iter()
            .map(Relationship::with_default_type)
            .collect();
        if request.use_shortlabel {
            for label in labels.iter_mut().filter(|l| l.tag.is_none()) {
                label.tag = self.schema.short_label(&label.name);
            }
        }
        check_unique_tags(&labels, &self.config.neighbor_variable)?;
        log::debug!(
            "Labels after enrichment: {:?}",
            labels
                .iter()
                .map(|l| l.marked_name(marker))
                .collect::<Vec<_>>()
        );

        let filters = FilterMap::from_json(&request.filters, &self.config.not_marker)?;
        let existence = ExistenceMap::from_json(&request.existence)?;
        check_references(&labels, &filters, &existence)?;

        let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
        if !request.allow_unrelated_subgraphs && !is_connected(&names, &relationships) {
            return Err(CompileError::connectivity(names));
        }

        let groups = partition(&labels, &relationships)?;
        if !request.allow_unrelated_subgraphs {
            check_groups(&groups, &names)?;
        }

        let compiled = Assembler::new(&self.config).assemble(
            &labels,
            &groups,
            &filters,
            &existence,
            &request.options,
        )?;
        if self.config.verbose {
            log::info!("QUERY: {}", compiled.query);
            log::info!("PARAMS: {:?}", compiled.params);
        } else {
            log::debug!(
                "Compiled query with {} parameter(s) over {} match group(s)",
                compiled.params.len(),
                groups.len()
            );
        }
        Ok(compiled)
    }
}

/// Tags must be distinct and must not shadow the existence-check neighbor
fn check_unique_tags(labels: &[Label], neighbor: &str) -> CompileResult<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for label in labels {
        if label.tag() == neighbor {
            return Err(CompileError::configuration(format!(
                "Label '{}' uses the tag '{}', which is reserved for existence-check neighbors",
                label.name, neighbor
            )));
        }
        if let Some(other) = seen.insert(label.tag(), &label.name) {
            return Err(CompileError::configuration(format!(
                "Labels '{}' and '{}' share the tag '{}'",
                other,
                label.name,
                label.tag()
            )));
        }
    }
    Ok(())
}

fn check_references(labels: &[Label], filters: &FilterMap, existence: &ExistenceMap) -> CompileResult<()> {
    let known: HashSet<&str> = labels.iter().map(|l| l.name.as_str()).collect();
    if let Some(unknown) = filters.labels().find(|l| !known.contains(l)) {
        return Err(CompileError::configuration_with_context(
            format!("Label '{}' is not part of the query", unknown),
            "filters",
        ));
    }
    if let Some(unknown) = existence
        .labels()
        .chain(existence.matched_labels())
        .find(|l| !known.contains(l))
    {
        return Err(CompileError::configuration_with_context(
            format!("Label '{}' is not part of the query", unknown),
            "neighbor existence conditions",
        ));
    }
    Ok(())
}

/// Each group must be connected on its own, and each group after the first
/// must reach a label matched earlier
fn check_groups(groups: &[MatchGroup], names: &[&str]) -> CompileResult<()> {
    let mut earlier: HashSet<&str> = HashSet::new();
    for (index, group) in groups.iter().enumerate() {
        let group_names = group.label_names();
        if !is_connected(&group_names, &group.relationships) {
            log::debug!("Match group {} {:?} is not connected", index, group_names);
            return Err(CompileError::connectivity(names.iter().copied()));
        }
        if index > 0 && group.anchor(&earlier).is_none() {
            log::debug!("Match group {} {:?} has no anchor", index, group_names);
            return Err(CompileError::connectivity(names.iter().copied()));
        }
        earlier.extend(group_names);
    }
    Ok(())
}
