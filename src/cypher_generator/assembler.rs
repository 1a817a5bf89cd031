//! Final query assembly.
//!
//! Sections are rendered in this order and joined by newlines, empty ones
//! skipped:
//!
//! 1. one `MATCH` / `OPTIONAL MATCH` per match group, each with the filter
//!    and existence fragments of its own labels
//! 2. `CALL` for collect packs
//! 3. `WITH` when packing is requested
//! 4. `RETURN` (or `WITH ... ORDER BY ... RETURN all` when ordering)
//!
//! One [`ParameterGenerator`] is used for the whole query, so parameter names
//! never collide between groups.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use super::match_clause::{MatchClause, NodePattern, PropertyRef, RelationshipPattern};
use super::projection::{
    CallClause, KeyRename, LabelProjection, PropertySource, ReturnClause, ReturnEntry,
    ReturnShape, WithClause, WithItem,
};
use super::ToCypher;
use crate::config::CompilerConfig;
use crate::errors::{CompileError, CompileResult};
use crate::graph::MatchGroup;
use crate::predicate_compiler::{
    compile_existence_with, compile_filters_with, ParamRef, ParameterGenerator, Params,
};
use crate::query_model::{
    ExistenceCheck, ExistenceMap, FilterMap, Label, PackSpec, Relationship, ReturnOptions,
};

const ONLY_PROPS_PARAM: &str = "only_props";
const RENAME_KEYS_PARAM: &str = "rename_keys";

/// Query text plus everything it references through `$name`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub query: String,
    pub params: Params,
}

pub struct Assembler<'a> {
    config: &'a CompilerConfig,
}

impl<'a> Assembler<'a> {
    pub fn new(config: &'a CompilerConfig) -> Self {
        Assembler { config }
    }

    pub fn assemble(
        &self,
        labels: &[Label],
        groups: &[MatchGroup],
        filters: &FilterMap,
        existence: &ExistenceMap,
        options: &ReturnOptions,
    ) -> CompileResult<CompiledQuery> {
        if labels.is_empty() {
            return Err(CompileError::configuration("Nothing to return: no labels"));
        }
        check_options(labels, options)?;

        let tags: HashMap<String, String> = labels
            .iter()
            .map(|l| (l.name.clone(), l.tag().to_string()))
            .collect();
        let tag_of = |name: &str| tags.get(name).map(String::as_str).unwrap_or(name).to_string();

        let mut params = ParameterGenerator::new();
        let only_props = options
            .only_props
            .as_ref()
            .map(|props| params.bind_fixed(ONLY_PROPS_PARAM, Value::from(props.clone())))
            .transpose()?;
        let rename_table = options
            .rename_keys
            .as_ref()
            .map(|rename| {
                let table = rename
                    .names
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                params.bind_fixed(RENAME_KEYS_PARAM, Value::Object(table))
            })
            .transpose()?;

        let group_of: HashMap<&str, usize> = groups
            .iter()
            .enumerate()
            .flat_map(|(index, g)| g.labels.iter().map(move |l| (l.name.as_str(), index)))
            .collect();
        if let Some((label, _)) = existence
            .checks()
            .find(|(label, check)| check_group(&group_of, label, check).is_none())
        {
            return Err(CompileError::configuration_with_context(
                "Existence check refers to a label that is not matched",
                format!("neighbor existence conditions for label '{}'", label),
            ));
        }
        let mut sections = Vec::with_capacity(groups.len() + 3);

        for (index, group) in groups.iter().enumerate() {
            let names = group.label_names();
            let mut clause = MatchClause::new(group.optional);
            clause.nodes = group
                .labels
                .iter()
                .map(|l| NodePattern::labelled(l.tag(), l.name.as_str()))
                .collect();
            clause.relationships = group
                .relationships
                .iter()
                .map(|rel| relationship_pattern(rel, &tag_of(&rel.from), &tag_of(&rel.to)))
                .collect();
            clause.where_clause.extend(compile_filters_with(
                &filters.restricted_to(&names),
                &tags,
                &mut params,
            ));
            let placed_here = existence
                .filter_checks(|label, check| check_group(&group_of, label, check) == Some(index));
            clause.where_clause.extend(compile_existence_with(
                &placed_here,
                &self.config.neighbor_variable,
                &tags,
                &mut params,
            ));
            sections.push(clause.to_cypher());
        }
        log::debug!(
            "Rendered {} match group(s) with {} generated parameter(s)",
            groups.len(),
            params.allocated()
        );

        let packs = &options.labels_to_pack;
        if !packs.is_empty() {
            let relationships: Vec<&Relationship> =
                groups.iter().flat_map(|g| g.relationships.iter()).collect();
            let calls = packs
                .iter()
                .filter_map(|(label, spec)| match spec {
                    PackSpec::Collect { anchor } => Some((label, anchor)),
                    PackSpec::Fold { .. } => None,
                })
                .map(|(label, anchor)| {
                    let rel = relationships
                        .iter()
                        .find(|r| r.from == *anchor && r.to == label)
                        .ok_or_else(|| {
                            CompileError::configuration_with_context(
                                format!("No relationship from '{}' to '{}'", anchor, label),
                                format!("labels_to_pack entry for '{}'", label),
                            )
                        })?;
                    Ok(CallClause {
                        anchor: tag_of(anchor),
                        rel_type: rel.type_name().to_string(),
                        yield_as: collected_name(&tag_of(label)),
                    }
                    .to_cypher())
                })
                .collect::<CompileResult<Vec<_>>>()?;
            sections.extend(calls);
            sections.push(self.with_clause(labels, options, &tag_of).to_cypher());
        }

        let return_clause = self.return_clause(labels, options, only_props, rename_table);
        sections.push(return_clause.to_cypher());

        let query = sections
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CompiledQuery {
            query,
            params: params.into_params(),
        })
    }

    fn with_clause(
        &self,
        labels: &[Label],
        options: &ReturnOptions,
        tag_of: &dyn Fn(&str) -> String,
    ) -> WithClause {
        // checked to hold exactly one entry whenever packing is requested
        let property = options
            .only_props
            .as_ref()
            .and_then(|props| props.first())
            .cloned()
            .unwrap_or_default();
        let packs = &options.labels_to_pack;

        let items = labels
            .iter()
            .filter(|l| !packs.is_definition(&l.name))
            .map(|l| {
                let tag = l.tag();
                match packs.get(&l.name) {
                    None => WithItem::Variable(tag.to_string()),
                    Some(PackSpec::Collect { .. }) => WithItem::CollectDistinct {
                        source: PropertyRef::new(collected_name(tag), property.as_str()),
                        alias: collected_name(tag),
                    },
                    Some(PackSpec::Fold { definition }) => {
                        let definition = tag_of(definition);
                        WithItem::FoldPairs {
                            keys: self
                                .config
                                .fold_key_properties
                                .iter()
                                .map(|k| PropertyRef::new(definition.as_str(), k.as_str()))
                                .collect(),
                            value: PropertyRef::new(tag, property.as_str()),
                            alias: collected_name(tag),
                        }
                    }
                }
            })
            .collect();
        WithClause { items }
    }

    fn return_clause(
        &self,
        labels: &[Label],
        options: &ReturnOptions,
        only_props: Option<ParamRef>,
        rename_table: Option<ParamRef>,
    ) -> ReturnClause {
        let packs = &options.labels_to_pack;
        let returned: Vec<&Label> = labels
            .iter()
            .filter(|l| !packs.is_definition(&l.name))
            .collect();
        let all_upper = is_all_upper(returned.iter().map(|l| l.tag()));

        let projections = returned
            .iter()
            .map(|label| {
                let tag = label.tag();
                let key_prefix = options.return_propname.then(|| tag.to_string());
                let rename = rename_table.as_ref().and_then(|table| {
                    let rename = options.rename_keys.as_ref()?;
                    rename.names.contains_key(tag).then(|| KeyRename {
                        property: rename.property.clone(),
                        table: table.clone(),
                        column: tag.to_string(),
                    })
                });

                let mut entries = Vec::new();
                let properties = match packs.get(&label.name) {
                    Some(spec) => ReturnEntry::Properties {
                        source: PropertySource::Packed {
                            column: tag.to_string(),
                            collected: collected_name(tag),
                        },
                        // fold packs are already keyed by definition
                        key_prefix: match spec {
                            PackSpec::Collect { .. } => key_prefix,
                            PackSpec::Fold { .. } => None,
                        },
                        rename: None,
                    },
                    None => {
                        if options.return_nodeid {
                            entries.push(ReturnEntry::NodeId {
                                column: format!("_id_{}", tag),
                                variable: tag.to_string(),
                            });
                        }
                        if options.return_termorder {
                            let column = if all_upper {
                                format!("{}N", tag)
                            } else {
                                format!("{} (N)", tag)
                            };
                            entries.push(ReturnEntry::TermOrder {
                                column,
                                variable: tag.to_string(),
                            });
                        }
                        if options.return_class_uris {
                            entries.push(ReturnEntry::ClassUri {
                                column: format!("_uri_{}", tag),
                                variable: tag.to_string(),
                            });
                        }
                        let source = match &only_props {
                            Some(keys) => PropertySource::Submap {
                                variable: tag.to_string(),
                                keys: keys.clone(),
                            },
                            None => PropertySource::All {
                                variable: tag.to_string(),
                            },
                        };
                        ReturnEntry::Properties {
                            source,
                            key_prefix,
                            rename,
                        }
                    }
                };
                entries.push(properties);
                LabelProjection {
                    column: tag.to_string(),
                    entries,
                }
            })
            .collect();

        let shape = if options.return_disjoint {
            ReturnShape::Disjoint
        } else if !options.order_by.is_empty() {
            ReturnShape::Ordered(options.order_by.clone())
        } else {
            ReturnShape::Merge
        };
        ReturnClause {
            shape,
            projections,
            limit: options.limit,
        }
    }
}

fn relationship_pattern(rel: &Relationship, from_tag: &str, to_tag: &str) -> RelationshipPattern {
    RelationshipPattern {
        from: NodePattern::bare(from_tag),
        to: NodePattern::bare(to_tag),
        variable: rel.type_tag_for(from_tag, to_tag),
        rel_type: Some(rel.type_name().to_string()),
    }
}

/// Latest group among the owning label and the labels the check expects to
/// be matched already; the check can only be rendered once all of them are
fn check_group(group_of: &HashMap<&str, usize>, label: &str, check: &ExistenceCheck) -> Option<usize> {
    std::iter::once(label)
        .chain(check.matched_labels())
        .map(|l| group_of.get(l).copied())
        .try_fold(0, |latest, group| group.map(|g| latest.max(g)))
}

fn collected_name(tag: &str) -> String {
    format!("{}_coll", tag)
}

/// Upper case in the sense of "has cased letters and none in lower case"
fn is_all_upper<'a>(names: impl Iterator<Item = &'a str>) -> bool {
    let mut any_cased = false;
    for c in names.flat_map(str::chars) {
        if c.is_lowercase() {
            return false;
        }
        any_cased |= c.is_uppercase();
    }
    any_cased
}

fn check_options(labels: &[Label], options: &ReturnOptions) -> CompileResult<()> {
    if options.return_disjoint && !options.order_by.is_empty() {
        return Err(CompileError::configuration(
            "order_by cannot be combined with return_disjoint",
        ));
    }
    if options.only_props.as_ref().is_some_and(|p| p.is_empty()) {
        return Err(CompileError::configuration("only_props cannot be an empty list"));
    }

    let packs = &options.labels_to_pack;
    if packs.is_empty() {
        return Ok(());
    }
    match options.only_props.as_deref() {
        Some([_]) => {}
        other => {
            return Err(CompileError::configuration(format!(
                "labels_to_pack needs exactly one only_props entry, found {:?}",
                other.unwrap_or_default()
            )))
        }
    }
    let known = |name: &str| labels.iter().any(|l| l.name == name);
    for (label, spec) in packs.iter() {
        let referenced = match spec {
            PackSpec::Collect { anchor } => anchor,
            PackSpec::Fold { definition } => definition,
        };
        for name in [label, referenced.as_str()] {
            if !known(name) {
                return Err(CompileError::configuration_with_context(
                    format!("Label '{}' is not part of the query", name),
                    format!("labels_to_pack entry for '{}'", label),
                ));
            }
        }
    }
    Ok(())
}
