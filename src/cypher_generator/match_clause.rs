use std::fmt;

use super::{escape_identifier, ToCypher};

/// `` (`var`:`Label`) `` or `` (`var`) ``
#[derive(Debug, Clone, PartialEq)]
pub struct NodePattern {
    pub variable: String,
    pub label: Option<String>,
}

impl NodePattern {
    pub fn labelled(variable: impl Into<String>, label: impl Into<String>) -> Self {
        NodePattern {
            variable: variable.into(),
            label: Some(label.into()),
        }
    }

    pub fn bare(variable: impl Into<String>) -> Self {
        NodePattern {
            variable: variable.into(),
            label: None,
        }
    }
}

impl ToCypher for NodePattern {
    fn to_cypher(&self) -> String {
        match &self.label {
            Some(label) => format!(
                "({}:{})",
                escape_identifier(&self.variable),
                escape_identifier(label)
            ),
            None => format!("({})", escape_identifier(&self.variable)),
        }
    }
}

/// `` (`from`)-[`var`:`TYPE`]->(`to`) ``
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipPattern {
    pub from: NodePattern,
    pub to: NodePattern,
    pub variable: String,
    pub rel_type: Option<String>,
}

impl ToCypher for RelationshipPattern {
    fn to_cypher(&self) -> String {
        let type_ext = match self.rel_type.as_deref() {
            Some(t) if !t.is_empty() => format!(":{}", escape_identifier(t)),
            _ => String::new(),
        };
        format!(
            "{}-[{}{}]->{}",
            self.from.to_cypher(),
            escape_identifier(&self.variable),
            type_ext,
            self.to.to_cypher()
        )
    }
}

/// `` `var`.`property` ``
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRef {
    pub variable: String,
    pub property: String,
}

impl PropertyRef {
    pub fn new(variable: impl Into<String>, property: impl Into<String>) -> Self {
        PropertyRef {
            variable: variable.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            escape_identifier(&self.variable),
            escape_identifier(&self.property)
        )
    }
}

/// Conditions ANDed under one `WHERE`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhereClause {
    pub conditions: Vec<String>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn extend(&mut self, conditions: impl IntoIterator<Item = String>) {
        self.conditions.extend(conditions);
    }
}

impl ToCypher for WhereClause {
    fn to_cypher(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchClause {
    pub optional: bool,
    pub nodes: Vec<NodePattern>,
    pub relationships: Vec<RelationshipPattern>,
    pub where_clause: WhereClause,
}

impl MatchClause {
    pub fn new(optional: bool) -> Self {
        MatchClause {
            optional,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

impl ToCypher for MatchClause {
    fn to_cypher(&self) -> String {
        let keyword = if self.optional { "OPTIONAL MATCH" } else { "MATCH" };
        let patterns: Vec<String> = self
            .nodes
            .iter()
            .map(ToCypher::to_cypher)
            .chain(self.relationships.iter().map(ToCypher::to_cypher))
            .collect();
        let mut out = format!("{} {}", keyword, patterns.join(",\n"));
        if !self.where_clause.is_empty() {
            out.push('\n');
            out.push_str(&self.where_clause.to_cypher());
        }
        out
    }
}
