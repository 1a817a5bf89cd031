use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a packed label is folded into the row of another label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PackSpec {
    /// `{"Population": ["Subject"]}`: collect the packed label's display
    /// property over the anchor's direct neighbors
    Collect { anchor: String },
    /// `{"Subject": "Age Group"}`: fold pairs of (definition key, display
    /// property) into one map; the definition label is not returned itself
    Fold { definition: String },
}

/// Ordered label → [`PackSpec`] table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct LabelsToPack(pub Vec<(String, PackSpec)>);

impl LabelsToPack {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&PackSpec> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, spec)| spec)
    }

    /// True for definition labels of fold packs
    pub fn is_definition(&self, label: &str) -> bool {
        self.0.iter().any(|(_, spec)| {
            matches!(spec, PackSpec::Fold { definition } if definition == label)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PackSpec)> {
        self.0.iter().map(|(l, spec)| (l.as_str(), spec))
    }
}

impl TryFrom<Value> for LabelsToPack {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let obj = match value {
            Value::Null => return Ok(LabelsToPack::default()),
            Value::Object(obj) => obj,
            other => return Err(format!("labels_to_pack must be a map, found {}", other)),
        };
        let mut packs = Vec::with_capacity(obj.len());
        for (label, spec) in obj {
            let spec = match spec {
                Value::String(definition) if !definition.is_empty() => PackSpec::Fold { definition },
                Value::Array(items) => match items.as_slice() {
                    [Value::String(anchor)] if !anchor.is_empty() => PackSpec::Collect {
                        anchor: anchor.clone(),
                    },
                    _ => {
                        return Err(format!(
                            "labels_to_pack['{}'] must list exactly one anchor label, found {} items",
                            label,
                            items.len()
                        ))
                    }
                },
                other => {
                    return Err(format!(
                        "labels_to_pack['{}'] must be a label name or a one-item list, found {}",
                        label, other
                    ))
                }
            };
            packs.push((label, spec));
        }
        Ok(LabelsToPack(packs))
    }
}

/// Renames one property key per label through the `$rename_keys` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRename {
    pub property: String,
    pub names: BTreeMap<String, String>,
}

/// Options shaping the WITH/RETURN sections of the compiled query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnOptions {
    /// Add `{_id_<Label>: id(var)}` per label
    #[serde(deserialize_with = "super::lenient_bool")]
    pub return_nodeid: bool,
    /// Prefix every returned property key with `"<Label>."`
    #[serde(deserialize_with = "super::lenient_bool")]
    pub return_propname: bool,
    /// Add the label's `Order` property as `<Label> (N)`
    #[serde(deserialize_with = "super::lenient_bool")]
    pub return_termorder: bool,
    /// Add the label's `uri` property as `_uri_<Label>`
    #[serde(deserialize_with = "super::lenient_bool")]
    pub return_class_uris: bool,
    /// Return only these properties (all when absent)
    #[serde(deserialize_with = "super::optional_one_or_many")]
    pub only_props: Option<Vec<String>>,
    /// One distinct-collected column per label instead of one merged row
    #[serde(deserialize_with = "super::lenient_bool")]
    pub return_disjoint: bool,
    pub labels_to_pack: LabelsToPack,
    /// Keys of the merged row to order by
    #[serde(deserialize_with = "super::one_or_many")]
    pub order_by: Vec<String>,
    pub limit: Option<u64>,
    pub rename_keys: Option<PropertyRename>,
}

impl Default for ReturnOptions {
    fn default() -> Self {
        Self {
            return_nodeid: true,
            return_propname: true,
            return_termorder: false,
            return_class_uris: false,
            only_props: None,
            return_disjoint: false,
            labels_to_pack: LabelsToPack::default(),
            order_by: Vec::new(),
            limit: None,
            rename_keys: None,
        }
    }
}
