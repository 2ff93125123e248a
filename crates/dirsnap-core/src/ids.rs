//! Strongly Typed Identifiers
//!
//! The newtype pattern prevents accidental misuse of identifier strings at
//! compile time: a function taking a [`TenantId`] cannot be handed a plain
//! user id.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier of a directory tenant (the customer/organization boundary).
///
/// Tenants come from configuration as either a GUID or a verified domain
/// such as `contoso.onmicrosoft.com`; both are carried verbatim. Ordered so
/// that tenant iteration in collections is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant id from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TenantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_display_roundtrip() {
        let id = TenantId::new("contoso.onmicrosoft.com");
        assert_eq!(id.to_string(), "contoso.onmicrosoft.com");
        assert_eq!(id.as_str(), "contoso.onmicrosoft.com");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut map = BTreeMap::new();
        map.insert(TenantId::from("beta"), 2);
        map.insert(TenantId::from("alpha"), 1);

        let keys: Vec<_> = map.keys().map(TenantId::as_str).collect();
        assert_eq!(keys, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_serde_transparent() {
        let id = TenantId::from("tenant-a");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"tenant-a\"");
    }
}
