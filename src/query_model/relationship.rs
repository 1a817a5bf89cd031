use serde::{Deserialize, Serialize};

use crate::errors::{CompileError, CompileResult};

/// A directed, typed edge definition between two labels.
///
/// Endpoints are referenced by label *name*; they are rendered through the
/// labels' tags at assembly time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Relationship {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub rel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_bool")]
    pub optional: bool,
}

impl Relationship {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Relationship {
            from: from.into(),
            to: to.into(),
            rel_type: None,
            type_tag: None,
            optional: false,
        }
    }

    pub fn optional(from: impl Into<String>, to: impl Into<String>) -> Self {
        Relationship {
            optional: true,
            ..Relationship::new(from, to)
        }
    }

    pub fn with_type(mut self, rel_type: impl Into<String>) -> Self {
        self.rel_type = Some(rel_type.into());
        self
    }

    pub fn with_type_tag(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    /// Relationship type; the `to` label's name unless set explicitly
    pub fn type_name(&self) -> &str {
        self.rel_type.as_deref().unwrap_or(&self.to)
    }

    /// Fill in the default relationship type
    pub fn with_default_type(mut self) -> Self {
        if self.rel_type.as_deref().map_or(true, str::is_empty) {
            self.rel_type = Some(self.to.clone());
        }
        self
    }

    /// Relationship variable: `<from>_<type>_<to>` built from endpoint tags
    pub fn type_tag_for(&self, from_tag: &str, to_tag: &str) -> String {
        match &self.type_tag {
            Some(tag) => tag.clone(),
            None => format!("{}_{}_{}", from_tag, self.type_name(), to_tag),
        }
    }

    /// Reject missing or empty endpoints and empty explicit tags
    pub fn validate(&self) -> CompileResult<()> {
        for (key, value) in [("from", &self.from), ("to", &self.to)] {
            if value.is_empty() {
                return Err(CompileError::configuration_with_context(
                    format!("Relationship is missing its '{}' label", key),
                    format!("{:?}", self),
                ));
            }
        }
        if self.type_tag.as_deref() == Some("") {
            return Err(CompileError::configuration_with_context(
                "Relationship type tag cannot be empty",
                format!("{:?}", self),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_type_and_tag() {
        let rel = Relationship::new("Subject", "Exposure").with_default_type();
        assert_eq!(rel.type_name(), "Exposure");
        assert_eq!(
            rel.type_tag_for("Subject", "Exposure"),
            "Subject_Exposure_Exposure"
        );

        let rel = Relationship::new("Subject", "Exposure").with_type("HAS");
        assert_eq!(rel.type_tag_for("USUBJID", "Exposure"), "USUBJID_HAS_Exposure");
    }

    #[test]
    fn test_explicit_type_tag() {
        let rel = Relationship::new("A", "B").with_type_tag("ab");
        assert_eq!(rel.type_tag_for("A", "B"), "ab");
    }

    #[test]
    fn test_deserialize_with_string_optional() {
        let rel: Relationship = serde_json::from_str(
            r#"{"to": "Exposure", "from": "Subject", "type": "HAS", "optional": "true"}"#,
        )
        .unwrap();
        assert!(rel.optional);
        assert_eq!(rel.rel_type.as_deref(), Some("HAS"));
        assert!(rel.validate().is_ok());
    }

    #[test]
    fn test_missing_endpoint() {
        let rel: Relationship = serde_json::from_str(r#"{"from": "Subject"}"#).unwrap();
        let err = rel.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("'to'"));
    }
}
