//! Request data model.
//!
//! Everything a caller hands to the compiler is parsed into these types
//! before any graph or text work starts, so later stages never inspect raw
//! JSON shapes again.

pub mod condition;
pub mod existence;
pub mod label;
pub mod options;
pub mod relationship;
pub mod request;

pub use condition::{Condition, FilterMap, LabelFilters, PropertyFilter, RangeSpec};
pub use existence::{
    CheckKind, Direction, ExistenceCheck, ExistenceMap, LabelExistence, NeighborItem,
    NeighborOperator, OperatorClause,
};
pub use label::{Label, LabelSpec};
pub use options::{LabelsToPack, PackSpec, PropertyRename, ReturnOptions};
pub use relationship::Relationship;
pub use request::QueryRequest;

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Accepts either `"key"` or `["key", ...]`
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(OneOrMany::deserialize(deserializer)?.into())
}

pub(crate) fn optional_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(Into::into))
}

/// Accepts `true`/`false` as well as the strings `"true"`/`"false"`
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Text(String),
    }

    match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(b) => Ok(b),
        BoolLike::Text(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, found '{}'",
                other
            ))),
        },
    }
}
