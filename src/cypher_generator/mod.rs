//! Typed Cypher clause builders.
//!
//! All query text is produced here. Identifiers pass through
//! [`escape_identifier`]; values never do, they are bound as parameters and
//! referenced through [`ParamRef`](crate::predicate_compiler::ParamRef).

pub mod assembler;
pub mod match_clause;
pub mod projection;

pub use assembler::{Assembler, CompiledQuery};
pub use match_clause::{MatchClause, NodePattern, PropertyRef, RelationshipPattern, WhereClause};
pub use projection::{
    CallClause, KeyRename, LabelProjection, PropertySource, ReturnClause, ReturnEntry, ReturnShape,
    WithClause, WithItem,
};

pub trait ToCypher {
    fn to_cypher(&self) -> String;
}

/// Backtick-quote an identifier, doubling embedded backticks
pub fn escape_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Double-quoted Cypher string literal for identifier-like text
/// (label names used as map keys, relationship type filters)
pub fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
