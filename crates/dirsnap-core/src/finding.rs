//! Check findings as seen by the mute-list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The facts about a finding that suppression rules match against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Identifier of the check that produced the finding.
    pub check_id: String,
    /// Location/region the finding applies to (`global` for directory-wide).
    pub location: String,
    /// Name of the affected resource.
    pub resource_name: String,
    /// Tags attached to the resource.
    #[serde(default)]
    pub resource_tags: BTreeMap<String, String>,
}

impl Finding {
    /// Creates a finding with no tags.
    #[must_use]
    pub fn new(
        check_id: impl Into<String>,
        location: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            location: location.into(),
            resource_name: resource_name.into(),
            resource_tags: BTreeMap::new(),
        }
    }

    /// Adds a resource tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.resource_tags.insert(key.into(), value.into());
        self
    }

    /// Unrolls the tag map into `key=value` strings for pattern matching.
    #[must_use]
    pub fn unrolled_tags(&self) -> Vec<String> {
        self.resource_tags
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrolled_tags_sorted_key_value() {
        let finding = Finding::new("check_1", "global", "res")
            .with_tag("env", "prod")
            .with_tag("app", "payments");

        assert_eq!(finding.unrolled_tags(), vec!["app=payments", "env=prod"]);
    }

    #[test]
    fn test_unrolled_tags_empty() {
        let finding = Finding::new("check_1", "global", "res");
        assert!(finding.unrolled_tags().is_empty());
    }
}
