//! Microsoft Entra ID directory snapshot collector
//!
//! Fetches directory-level entities (users with authentication methods,
//! authorization policy, group settings, security defaults, named locations,
//! directory roles with resolved members, conditional-access policies) from
//! the Microsoft Graph API and assembles them into a typed, tenant-partitioned
//! [`EntraSnapshot`] for downstream policy checks.
//!
//! Collection is best-effort by contract: any fetch failure is logged,
//! recorded in the snapshot's [`SnapshotReport`] and leaves partial data in
//! place; [`EntraCollector::collect`] never fails.
//!
//! # Example
//!
//! ```no_run
//! use dirsnap_entra::{EntraCollector, EntraConfig, EntraCredentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EntraConfig::builder()
//!     .tenant_id("contoso.onmicrosoft.com")
//!     .build()?;
//!
//! let credentials = EntraCredentials {
//!     client_id: "your-client-id".to_string(),
//!     client_secret: "your-client-secret".to_string().into(),
//! };
//!
//! let collector = EntraCollector::for_tenants([(config, credentials)])?;
//! let snapshot = collector.collect().await;
//! println!("collected users for {} tenant(s)", snapshot.users.len());
//! # Ok(())
//! # }
//! ```

mod auth;
mod collector;
mod config;
mod error;
mod graph_client;
mod mutelist;
mod records;
mod snapshot;

// Re-exports
pub use auth::TokenCache;
pub use collector::EntraCollector;
pub use config::{EntraCloudEnvironment, EntraConfig, EntraConfigBuilder, EntraCredentials};
pub use error::{EntraError, EntraResult};
pub use graph_client::{GraphClient, ODataError, ODataResponse};
pub use mutelist::EntraMutelist;
pub use records::{
    AccessControls, AuthMethod, AuthorizationPolicy, ConditionalAccessPolicy,
    DefaultUserRolePermissions, DirectoryRole, GroupSetting, NamedLocation, PolicyUsers,
    SecurityDefault, SettingValue, TargetResources, User, GUEST_USER_ROLE_UNRESTRICTED,
};
pub use snapshot::{CollectionFault, EntraSnapshot, SnapshotField, SnapshotReport, TenantMap};
