//! The assembled snapshot and its fault report.

use std::collections::{BTreeMap, HashMap};

use dirsnap_core::TenantId;

use crate::records::{
    AuthorizationPolicy, ConditionalAccessPolicy, DirectoryRole, GroupSetting, NamedLocation,
    SecurityDefault, User,
};
use crate::EntraError;

/// Per-tenant map used throughout the snapshot.
pub type TenantMap<T> = BTreeMap<TenantId, T>;

/// The snapshot field a fault was recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotField {
    Users,
    AuthorizationPolicy,
    GroupSettings,
    SecurityDefaults,
    NamedLocations,
    DirectoryRoles,
    ConditionalAccessPolicies,
}

/// One recorded collection failure.
///
/// Collection is best-effort: a fault means the named field holds partial
/// (possibly empty) data for the named tenant onward, never that the snapshot
/// as a whole was aborted.
#[derive(Debug)]
pub struct CollectionFault {
    /// Field the failure occurred in.
    pub field: SnapshotField,
    /// Tenant being fetched when the failure occurred, when attributable.
    pub tenant: Option<TenantId>,
    /// The underlying error.
    pub error: EntraError,
}

/// Faults recorded during one collection pass.
#[derive(Debug, Default)]
pub struct SnapshotReport {
    pub faults: Vec<CollectionFault>,
}

impl SnapshotReport {
    /// True if every fetch completed without a fault.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.faults.is_empty()
    }

    /// Faults recorded against one field.
    pub fn faults_for(&self, field: SnapshotField) -> impl Iterator<Item = &CollectionFault> {
        self.faults.iter().filter(move |f| f.field == field)
    }
}

/// A tenant-partitioned directory snapshot.
///
/// Built once per collection pass and read-only afterward. Tenant maps are
/// ordered so downstream output is deterministic.
#[derive(Debug, Default)]
pub struct EntraSnapshot {
    /// Users keyed by object id, per tenant.
    pub users: TenantMap<HashMap<String, User>>,
    /// The tenant-wide authorization policy.
    pub authorization_policy: TenantMap<AuthorizationPolicy>,
    /// Group settings keyed by setting id, per tenant.
    pub group_settings: TenantMap<HashMap<String, GroupSetting>>,
    /// The tenant-wide security-defaults policy.
    pub security_defaults: TenantMap<SecurityDefault>,
    /// Named locations keyed by location id, per tenant.
    pub named_locations: TenantMap<HashMap<String, NamedLocation>>,
    /// Directory roles keyed by role display name, per tenant.
    pub directory_roles: TenantMap<HashMap<String, DirectoryRole>>,
    /// Conditional-access policies keyed by policy id, per tenant.
    pub conditional_access_policies: TenantMap<HashMap<String, ConditionalAccessPolicy>>,
    /// Faults recorded while collecting.
    pub report: SnapshotReport,
}
