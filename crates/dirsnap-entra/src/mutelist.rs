//! Mute-list adapter for Entra findings.

use std::path::Path;

use dirsnap_core::{Finding, Mutelist, MutelistError, TenantId};

/// Entra-scoped view over the shared mute-list engine.
///
/// Findings from this provider are keyed by the tenant they were collected
/// from, so muting delegates to the engine with the finding's tenant id.
#[derive(Debug, Default)]
pub struct EntraMutelist {
    mutelist: Mutelist,
}

impl EntraMutelist {
    /// Wraps an already-loaded mute-list.
    #[must_use]
    pub fn new(mutelist: Mutelist) -> Self {
        Self { mutelist }
    }

    /// Loads the mute-list from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MutelistError> {
        Ok(Self::new(Mutelist::from_file(path)?))
    }

    /// Returns true if the finding is muted for the tenant it was collected
    /// from.
    #[must_use]
    pub fn is_finding_muted(&self, finding: &Finding, tenant_id: &TenantId) -> bool {
        self.mutelist.is_muted(tenant_id, finding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegates_to_engine_with_tenant_scope() {
        let mutelist = EntraMutelist::new(
            Mutelist::from_yaml(
                r#"
rules:
  "contoso.onmicrosoft.com":
    - check: "entra_policy_guest_invite_only_for_admin_roles"
"#,
            )
            .unwrap(),
        );

        let finding = Finding::new(
            "entra_policy_guest_invite_only_for_admin_roles",
            "global",
            "Authorization Policy",
        );

        assert!(mutelist.is_finding_muted(&finding, &TenantId::from("contoso.onmicrosoft.com")));
        assert!(!mutelist.is_finding_muted(&finding, &TenantId::from("fabrikam.onmicrosoft.com")));
    }

    #[test]
    fn test_empty_mutelist_mutes_nothing() {
        let mutelist = EntraMutelist::default();
        let finding = Finding::new("any_check", "global", "res");

        assert!(!mutelist.is_finding_muted(&finding, &TenantId::from("t")));
    }
}
