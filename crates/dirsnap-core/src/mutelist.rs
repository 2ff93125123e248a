//! Mute-list: suppression rules for findings.
//!
//! A mute-list marks certain findings as intentionally ignored, keyed by
//! check id, resource location, resource name and tags. Rules are scoped to a
//! tenant id (`*` applies to every tenant) and every pattern is an unanchored
//! regular expression, so `breakglass` matches `admin-breakglass-01`.
//!
//! File format:
//!
//! ```yaml
//! rules:
//!   "*":
//!     - check: "entra_security_defaults_.*"
//!       resources: ["SecurityDefaults"]
//!   "contoso.onmicrosoft.com":
//!     - check: "entra_admin_mfa_enabled"
//!       resources: ["breakglass-.*"]
//!       tags: ["env=lab"]
//! ```

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::{Finding, TenantId};

/// Errors raised while loading a mute-list.
#[derive(Debug, Error)]
pub enum MutelistError {
    /// Failed to read the mute-list file.
    #[error("Failed to read mute-list file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML or does not match the schema.
    #[error("Invalid mute-list YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A rule pattern is not a valid regular expression.
    #[error("Invalid mute-list pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Raw rule as it appears in YAML, before pattern compilation.
#[derive(Debug, Deserialize)]
struct RawRule {
    check: String,
    #[serde(default)]
    locations: Vec<String>,
    #[serde(default)]
    resources: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawMutelist {
    #[serde(default)]
    rules: BTreeMap<String, Vec<RawRule>>,
}

/// A compiled suppression rule.
#[derive(Debug)]
pub struct MutelistRule {
    check: Regex,
    locations: Vec<Regex>,
    resources: Vec<Regex>,
    tags: Vec<Regex>,
}

impl MutelistRule {
    /// Returns true if this rule suppresses the given finding.
    ///
    /// An empty pattern list matches anything; `locations` and `resources`
    /// require one matching pattern, while `tags` requires every pattern to
    /// match at least one `key=value` tag.
    fn matches(&self, finding: &Finding) -> bool {
        if !self.check.is_match(&finding.check_id) {
            return false;
        }

        if !self.locations.is_empty()
            && !self.locations.iter().any(|p| p.is_match(&finding.location))
        {
            return false;
        }

        if !self.resources.is_empty()
            && !self
                .resources
                .iter()
                .any(|p| p.is_match(&finding.resource_name))
        {
            return false;
        }

        let tags = finding.unrolled_tags();
        self.tags
            .iter()
            .all(|p| tags.iter().any(|tag| p.is_match(tag)))
    }
}

/// Tenant-scoped suppression rules, compiled once at load.
#[derive(Debug, Default)]
pub struct Mutelist {
    rules: BTreeMap<String, Vec<MutelistRule>>,
}

impl Mutelist {
    /// Loads a mute-list from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a pattern does not
    /// compile.
    pub fn from_yaml(yaml: &str) -> Result<Self, MutelistError> {
        let raw: RawMutelist = serde_yaml::from_str(yaml)?;

        let mut rules = BTreeMap::new();
        for (scope, raw_rules) in raw.rules {
            let compiled = raw_rules
                .into_iter()
                .map(|rule| {
                    Ok(MutelistRule {
                        check: compile(&rule.check)?,
                        locations: rule.locations.iter().map(|p| compile(p)).collect::<Result<_, _>>()?,
                        resources: rule.resources.iter().map(|p| compile(p)).collect::<Result<_, _>>()?,
                        tags: rule.tags.iter().map(|p| compile(p)).collect::<Result<_, _>>()?,
                    })
                })
                .collect::<Result<Vec<_>, MutelistError>>()?;
            rules.insert(scope, compiled);
        }

        Ok(Self { rules })
    }

    /// Loads a mute-list from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MutelistError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Returns true if the finding is muted for the given tenant.
    ///
    /// Rules scoped to the tenant id and rules scoped to `*` both apply.
    #[must_use]
    pub fn is_muted(&self, tenant: &TenantId, finding: &Finding) -> bool {
        self.rules_for(tenant.as_str())
            .chain(self.rules_for("*"))
            .any(|rule| rule.matches(finding))
    }

    fn rules_for(&self, scope: &str) -> impl Iterator<Item = &MutelistRule> {
        self.rules.get(scope).into_iter().flatten()
    }
}

fn compile(pattern: &str) -> Result<Regex, MutelistError> {
    Regex::new(pattern).map_err(|source| MutelistError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mutelist {
        Mutelist::from_yaml(
            r#"
rules:
  "*":
    - check: "entra_security_defaults_.*"
      resources: ["SecurityDefaults"]
  "contoso.onmicrosoft.com":
    - check: "entra_admin_mfa_enabled"
      locations: ["global"]
      resources: ["breakglass-.*"]
      tags: ["env=lab"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_wildcard_scope_applies_to_any_tenant() {
        let mutelist = sample();
        let finding = Finding::new(
            "entra_security_defaults_enabled",
            "global",
            "SecurityDefaults",
        );

        assert!(mutelist.is_muted(&TenantId::from("anything"), &finding));
    }

    #[test]
    fn test_tenant_scoped_rule_requires_matching_tenant() {
        let mutelist = sample();
        let finding = Finding::new("entra_admin_mfa_enabled", "global", "breakglass-01")
            .with_tag("env", "lab");

        assert!(mutelist.is_muted(&TenantId::from("contoso.onmicrosoft.com"), &finding));
        assert!(!mutelist.is_muted(&TenantId::from("fabrikam.onmicrosoft.com"), &finding));
    }

    #[test]
    fn test_patterns_match_unanchored() {
        let mutelist = Mutelist::from_yaml(
            r#"
rules:
  "*":
    - check: "mfa"
"#,
        )
        .unwrap();
        let finding = Finding::new("entra_admin_mfa_enabled", "global", "res");

        assert!(mutelist.is_muted(&TenantId::from("t"), &finding));
    }

    #[test]
    fn test_all_tag_patterns_must_match() {
        let mutelist = sample();
        let untagged = Finding::new("entra_admin_mfa_enabled", "global", "breakglass-01");

        assert!(!mutelist.is_muted(&TenantId::from("contoso.onmicrosoft.com"), &untagged));
    }

    #[test]
    fn test_resource_mismatch_not_muted() {
        let mutelist = sample();
        let finding = Finding::new("entra_security_defaults_enabled", "global", "OtherResource");

        assert!(!mutelist.is_muted(&TenantId::from("t"), &finding));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = Mutelist::from_yaml(
            r#"
rules:
  "*":
    - check: "["
"#,
        );

        assert!(matches!(result, Err(MutelistError::Pattern { .. })));
    }

    #[test]
    fn test_empty_mutelist() {
        let mutelist = Mutelist::from_yaml("rules: {}").unwrap();
        let finding = Finding::new("any", "global", "res");

        assert!(!mutelist.is_muted(&TenantId::from("t"), &finding));
    }
}
