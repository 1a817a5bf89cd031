//! CALL / WITH / RETURN builders.
//!
//! Every per-label return entry is null-guarded, so a label left unmatched by
//! an `OPTIONAL MATCH` contributes `{}` to the merged row instead of failing
//! the whole row.

use super::{escape_identifier, quote_string, PropertyRef, ToCypher};
use crate::predicate_compiler::ParamRef;

/// `CALL apoc.path.subgraphNodes(...)` collecting direct neighbors of `anchor`
#[derive(Debug, Clone, PartialEq)]
pub struct CallClause {
    pub anchor: String,
    pub rel_type: String,
    pub yield_as: String,
}

impl ToCypher for CallClause {
    fn to_cypher(&self) -> String {
        format!(
            "CALL apoc.path.subgraphNodes({}, {{relationshipFilter: {}, optional:true, minLevel: 1, maxLevel: 1}}) YIELD node AS {}",
            escape_identifier(&self.anchor),
            quote_string(&self.rel_type),
            escape_identifier(&self.yield_as)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WithItem {
    /// Carry a variable through unchanged
    Variable(String),
    /// `collect(distinct source) AS alias`
    CollectDistinct { source: PropertyRef, alias: String },
    /// `apoc.map.fromPairs(collect([coalesce(keys...), value])) AS alias`
    FoldPairs {
        keys: Vec<PropertyRef>,
        value: PropertyRef,
        alias: String,
    },
}

impl ToCypher for WithItem {
    fn to_cypher(&self) -> String {
        match self {
            WithItem::Variable(variable) => escape_identifier(variable),
            WithItem::CollectDistinct { source, alias } => {
                format!("collect(distinct {}) AS {}", source, escape_identifier(alias))
            }
            WithItem::FoldPairs { keys, value, alias } => {
                let key = match keys.as_slice() {
                    [single] => single.to_string(),
                    many => format!(
                        "coalesce({})",
                        many.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
                    ),
                };
                format!(
                    "apoc.map.fromPairs(collect([{}, {}])) AS {}",
                    key,
                    value,
                    escape_identifier(alias)
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WithClause {
    pub items: Vec<WithItem>,
}

impl ToCypher for WithClause {
    fn to_cypher(&self) -> String {
        let items: Vec<String> = self.items.iter().map(ToCypher::to_cypher).collect();
        format!("WITH {}", items.join("\n, "))
    }
}

/// Where a label's property map comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PropertySource {
    /// `` `t`{.*} ``
    All { variable: String },
    /// `apoc.map.submap(`t`, $only_props, NULL, False)`
    Submap { variable: String, keys: ParamRef },
    /// `` {`column`: `t_coll`} `` for a packed label
    Packed { column: String, collected: String },
}

impl ToCypher for PropertySource {
    fn to_cypher(&self) -> String {
        match self {
            PropertySource::All { variable } => format!("{}{{.*}}", escape_identifier(variable)),
            PropertySource::Submap { variable, keys } => format!(
                "apoc.map.submap({}, {}, NULL, False)",
                escape_identifier(variable),
                keys
            ),
            PropertySource::Packed { column, collected } => format!(
                "{{{}: {}}}",
                escape_identifier(column),
                escape_identifier(collected)
            ),
        }
    }
}

/// Renames the key `property` through `$table["<column>"]`
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRename {
    pub property: String,
    pub table: ParamRef,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnEntry {
    /// `` {`_id_L`:id(`t`)} ``
    NodeId { column: String, variable: String },
    /// The label's `Order` property
    TermOrder { column: String, variable: String },
    /// The label's `uri` property
    ClassUri { column: String, variable: String },
    Properties {
        source: PropertySource,
        /// `"L."` prefix for every key
        key_prefix: Option<String>,
        rename: Option<KeyRename>,
    },
}

fn null_guarded(expr: &str) -> String {
    format!("CASE WHEN {} IS NULL THEN {{}} ELSE {} END", expr, expr)
}

fn guarded_property(variable: &str, property: &str, column: &str) -> String {
    let subject = format!("{}.{}", escape_identifier(variable), property);
    format!(
        "CASE WHEN {} IS NULL THEN {{}} ELSE {{{}:{}}} END",
        subject,
        escape_identifier(column),
        subject
    )
}

impl ToCypher for ReturnEntry {
    fn to_cypher(&self) -> String {
        match self {
            ReturnEntry::NodeId { column, variable } => format!(
                "{{{}:id({})}}",
                escape_identifier(column),
                escape_identifier(variable)
            ),
            ReturnEntry::TermOrder { column, variable } => guarded_property(variable, "Order", column),
            ReturnEntry::ClassUri { column, variable } => guarded_property(variable, "uri", column),
            ReturnEntry::Properties {
                source,
                key_prefix,
                rename,
            } => {
                let guarded = null_guarded(&source.to_cypher());
                if key_prefix.is_none() && rename.is_none() {
                    return guarded;
                }
                let mut key = match rename {
                    Some(r) => format!(
                        "CASE WHEN key = {} THEN {}[{}] ELSE key END",
                        quote_string(&r.property),
                        r.table,
                        quote_string(&r.column)
                    ),
                    None => "key".to_string(),
                };
                if let Some(prefix) = key_prefix {
                    key = format!("{} + \".\" + {}", quote_string(prefix), key);
                }
                format!(
                    "apoc.map.fromPairs([key in keys({}) | [{}, {}[key]]])",
                    guarded, key, guarded
                )
            }
        }
    }
}

/// All return entries of one label; `column` names its disjoint-mode column
#[derive(Debug, Clone, PartialEq)]
pub struct LabelProjection {
    pub column: String,
    pub entries: Vec<ReturnEntry>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReturnShape {
    /// One merged row: `RETURN apoc.map.mergeList([...]) as all`
    #[default]
    Merge,
    /// One distinct-collected map per label
    Disjoint,
    /// Merged row bound in a `WITH`, ordered by these keys
    Ordered(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnClause {
    pub shape: ReturnShape,
    pub projections: Vec<LabelProjection>,
    pub limit: Option<u64>,
}

impl ReturnClause {
    fn merged_entries(&self) -> String {
        let entries: Vec<String> = self
            .projections
            .iter()
            .flat_map(|p| p.entries.iter())
            .map(ToCypher::to_cypher)
            .collect();
        format!("apoc.map.mergeList([{}])", entries.join("\n, "))
    }
}

impl ToCypher for ReturnClause {
    fn to_cypher(&self) -> String {
        let limit = self.limit.map(|n| format!("LIMIT {}", n));
        match &self.shape {
            ReturnShape::Merge => {
                let mut out = format!("RETURN {} as all", self.merged_entries());
                if let Some(limit) = limit {
                    out.push(' ');
                    out.push_str(&limit);
                }
                out
            }
            ReturnShape::Disjoint => {
                let columns: Vec<String> = self
                    .projections
                    .iter()
                    .map(|p| {
                        let entries: Vec<String> = p.entries.iter().map(ToCypher::to_cypher).collect();
                        format!(
                            "collect(distinct apoc.map.mergeList([{}])) as {}",
                            entries.join(", "),
                            escape_identifier(&p.column)
                        )
                    })
                    .collect();
                let mut out = format!("RETURN {}", columns.join("\n, "));
                if let Some(limit) = limit {
                    out.push(' ');
                    out.push_str(&limit);
                }
                out
            }
            ReturnShape::Ordered(keys) => {
                let order: Vec<String> = keys
                    .iter()
                    .map(|k| format!("all.{}", escape_identifier(k)))
                    .collect();
                let mut lines = vec![
                    format!("WITH {} AS all", self.merged_entries()),
                    format!("ORDER BY {}", order.join(", ")),
                ];
                lines.extend(limit);
                lines.push("RETURN all".to_string());
                lines.join("\n")
            }
        }
    }
}
