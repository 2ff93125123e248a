//! dirsnap Core Library
//!
//! Shared types for dirsnap.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed tenant identifier
//! - [`finding`] - Check findings handed to the mute-list
//! - [`mutelist`] - YAML-loaded suppression rules
//!
//! # Example
//!
//! ```
//! use dirsnap_core::{Finding, Mutelist, TenantId};
//!
//! let tenant: TenantId = "contoso.onmicrosoft.com".into();
//! let mutelist = Mutelist::from_yaml("rules: {}").unwrap();
//! let finding = Finding::new("entra_security_defaults_enabled", "global", "SecurityDefaults");
//! assert!(!mutelist.is_muted(&tenant, &finding));
//! ```

pub mod finding;
pub mod ids;
pub mod mutelist;

pub use finding::Finding;
pub use ids::TenantId;
pub use mutelist::{Mutelist, MutelistError, MutelistRule};
