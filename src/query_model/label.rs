use serde::{Deserialize, Serialize};

use crate::errors::{CompileError, CompileResult};

/// A node type taking part in the query.
///
/// `tag` is the Cypher variable bound to the label; it defaults to the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub name: String,
    pub tag: Option<String>,
    pub optional: bool,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Label {
            name: name.into(),
            tag: None,
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Label {
            optional: true,
            ..Label::new(name)
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Variable name used for this label in the query text
    pub fn tag(&self) -> &str {
        self.tag.as_deref().unwrap_or(&self.name)
    }

    /// String form with the optional marker appended when optional
    pub fn marked_name(&self, marker: &str) -> String {
        if self.optional {
            format!("{}{}", self.name, marker)
        } else {
            self.name.clone()
        }
    }

    /// Parse `"Name"` or `"Name<marker>"`
    pub fn parse_marked(raw: &str, marker: &str) -> CompileResult<Label> {
        let (name, optional) = match raw.strip_suffix(marker) {
            Some(stripped) if !marker.is_empty() => (stripped, true),
            _ => (raw, false),
        };
        if name.is_empty() {
            return Err(CompileError::configuration(format!(
                "Label name cannot be empty (got '{}')",
                raw
            )));
        }
        Ok(Label {
            name: name.to_string(),
            tag: None,
            optional,
        })
    }
}

/// Label as it appears in a request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LabelSpec {
    Plain(String),
    Detailed {
        label: String,
        #[serde(default, alias = "short_label")]
        tag: Option<String>,
        #[serde(default, deserialize_with = "super::lenient_bool")]
        optional: bool,
    },
}

impl LabelSpec {
    pub fn into_label(self, marker: &str) -> CompileResult<Label> {
        match self {
            LabelSpec::Plain(raw) => Label::parse_marked(&raw, marker),
            LabelSpec::Detailed {
                label,
                tag,
                optional,
            } => {
                let mut parsed = Label::parse_marked(&label, marker)?;
                parsed.optional |= optional;
                if let Some(tag) = tag {
                    if tag.is_empty() {
                        return Err(CompileError::configuration(format!(
                            "Tag for label '{}' cannot be empty",
                            parsed.name
                        )));
                    }
                    parsed.tag = Some(tag);
                }
                Ok(parsed)
            }
        }
    }
}

impl From<&str> for LabelSpec {
    fn from(value: &str) -> Self {
        LabelSpec::Plain(value.to_string())
    }
}

impl From<Label> for LabelSpec {
    fn from(label: Label) -> Self {
        LabelSpec::Detailed {
            label: label.name,
            tag: label.tag,
            optional: label.optional,
        }
    }
}
