//! Typed directory records with defensive JSON decoding.
//!
//! Every record is decoded from the raw Graph response in exactly one place,
//! with all defaulting rules for missing upstream fields expressed here
//! rather than scattered across the collector.

use serde::{Deserialize, Serialize};
use uuid::{uuid, Uuid};

/// Well-known role id meaning guest users have unrestricted member access.
pub const GUEST_USER_ROLE_UNRESTRICTED: Uuid = uuid!("a0b1b346-4d3e-4e8b-98f8-753987be4970");

fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn bool_field(value: &serde_json::Value, key: &str) -> Option<bool> {
    value.get(key).and_then(serde_json::Value::as_bool)
}

fn str_list(value: &serde_json::Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// A registered authentication method on a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthMethod {
    /// Method id.
    pub id: String,
    /// `OData` type tag identifying the method kind.
    pub method_type: Option<String>,
}

impl AuthMethod {
    /// Decodes a method entry; entries without an id are not representable.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        Some(Self {
            id: str_field(value, "id")?,
            method_type: str_field(value, "@odata.type"),
        })
    }
}

/// A directory user with its authentication methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Object id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Registered authentication methods (best-effort; empty when the
    /// methods fetch was not permitted).
    pub authentication_methods: Vec<AuthMethod>,
}

/// Permission flags granted to the default user role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultUserRolePermissions {
    pub allowed_to_create_apps: Option<bool>,
    pub allowed_to_create_security_groups: Option<bool>,
    pub allowed_to_create_tenants: Option<bool>,
    pub allowed_to_read_bitlocker_keys_for_owned_device: Option<bool>,
    pub allowed_to_read_other_users: Option<bool>,
    pub odata_type: Option<String>,
    pub permission_grant_policies_assigned: Vec<String>,
}

impl DefaultUserRolePermissions {
    /// Decodes the nested permissions object; `None` yields all-default flags.
    #[must_use]
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };

        Self {
            allowed_to_create_apps: bool_field(value, "allowedToCreateApps"),
            allowed_to_create_security_groups: bool_field(value, "allowedToCreateSecurityGroups"),
            allowed_to_create_tenants: bool_field(value, "allowedToCreateTenants"),
            allowed_to_read_bitlocker_keys_for_owned_device: bool_field(
                value,
                "allowedToReadBitlockerKeysForOwnedDevice",
            ),
            allowed_to_read_other_users: bool_field(value, "allowedToReadOtherUsers"),
            odata_type: str_field(value, "@odata.type"),
            permission_grant_policies_assigned: str_list(value, "permissionGrantPoliciesAssigned"),
        }
    }
}

/// The tenant-wide authorization policy. One per tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationPolicy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_user_role_permissions: DefaultUserRolePermissions,
    /// Who may invite guests. Defaults to `everyone` when the policy does not
    /// carry the setting.
    pub guest_invite_settings: String,
    /// Role assigned to guest users. Defaults to the well-known unrestricted
    /// member role.
    pub guest_user_role_id: Uuid,
}

impl AuthorizationPolicy {
    /// Decodes the authorization policy response.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self {
            id: str_field(value, "id").unwrap_or_default(),
            name: str_field(value, "displayName").unwrap_or_default(),
            description: str_field(value, "description").unwrap_or_default(),
            default_user_role_permissions: DefaultUserRolePermissions::from_json(
                value.get("defaultUserRolePermissions"),
            ),
            guest_invite_settings: str_field(value, "allowInvitesFrom")
                .unwrap_or_else(|| "everyone".to_string()),
            guest_user_role_id: str_field(value, "guestUserRoleId")
                .and_then(|s| Uuid::parse_str(&s).ok())
                .unwrap_or(GUEST_USER_ROLE_UNRESTRICTED),
        }
    }
}

/// One name/value entry inside a group setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingValue {
    pub name: Option<String>,
    pub odata_type: Option<String>,
    pub value: Option<String>,
}

impl SettingValue {
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self {
            name: str_field(value, "name"),
            odata_type: str_field(value, "@odata.type"),
            value: str_field(value, "value"),
        }
    }
}

/// A tenant group-setting object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSetting {
    pub name: Option<String>,
    pub template_id: Option<String>,
    pub settings: Vec<SettingValue>,
}

impl GroupSetting {
    /// Decodes a group setting; all fields are optional upstream.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self {
            name: str_field(value, "displayName"),
            template_id: str_field(value, "templateId"),
            settings: value
                .get("values")
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().map(SettingValue::from_json).collect())
                .unwrap_or_default(),
        }
    }
}

/// The security-defaults enforcement policy. One per tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityDefault {
    pub id: String,
    pub name: String,
    pub is_enabled: bool,
}

impl SecurityDefault {
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self {
            id: str_field(value, "id").unwrap_or_default(),
            name: str_field(value, "displayName").unwrap_or_default(),
            is_enabled: bool_field(value, "isEnabled").unwrap_or(false),
        }
    }
}

/// A named network location used as a policy condition input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedLocation {
    pub id: String,
    pub name: String,
    /// CIDR ranges; entries without an address are dropped.
    pub ip_ranges_addresses: Vec<String>,
    pub is_trusted: bool,
}

impl NamedLocation {
    /// Decodes a named location; entries without an id are not representable.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        Some(Self {
            id: str_field(value, "id")?,
            name: str_field(value, "displayName").unwrap_or_default(),
            ip_ranges_addresses: value
                .get("ipRanges")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|range| str_field(range, "cidrAddress"))
                        .collect()
                })
                .unwrap_or_default(),
            is_trusted: bool_field(value, "isTrusted").unwrap_or(false),
        })
    }
}

/// A directory role with its resolved member records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryRole {
    pub id: String,
    /// Members resolved against the tenant's user map; unresolved ids are
    /// dropped.
    pub members: Vec<User>,
}

/// Include/exclude user sets on a conditional-access policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyUsers {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Include/exclude application (or user-action) targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetResources {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Built-in controls split into grant and block sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessControls {
    pub grant: Vec<String>,
    pub block: Vec<String>,
}

impl AccessControls {
    /// Splits built-in control names: a control containing `Grant` counts as
    /// a grant control, anything else as a block control. Existing behavior,
    /// preserved verbatim.
    #[must_use]
    pub fn classify(built_in_controls: Vec<String>) -> Self {
        let mut controls = Self::default();
        for control in built_in_controls {
            if control.contains("Grant") {
                controls.grant.push(control);
            } else {
                controls.block.push(control);
            }
        }
        controls
    }
}

/// A conditional-access policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionalAccessPolicy {
    pub id: String,
    pub name: String,
    pub state: Option<String>,
    pub users: PolicyUsers,
    pub target_resources: TargetResources,
    pub access_controls: AccessControls,
}

impl ConditionalAccessPolicy {
    /// Decodes a conditional-access policy; entries without an id are not
    /// representable.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let conditions = value.get("conditions");

        let users = conditions
            .and_then(|c| c.get("users"))
            .map(|users| PolicyUsers {
                include: str_list(users, "includeUsers"),
                exclude: str_list(users, "excludeUsers"),
            })
            .unwrap_or_default();

        // Explicit application ids win; user-action identifiers are the
        // fallback when no applications are listed.
        let target_resources = conditions
            .and_then(|c| c.get("applications"))
            .map(|apps| {
                let include = match str_list(apps, "includeApplications") {
                    apps_list if !apps_list.is_empty() => apps_list,
                    _ => str_list(apps, "includeUserActions"),
                };
                let exclude = match str_list(apps, "excludeApplications") {
                    apps_list if !apps_list.is_empty() => apps_list,
                    _ => str_list(apps, "excludeUserActions"),
                };
                TargetResources { include, exclude }
            })
            .unwrap_or_default();

        let access_controls = value
            .get("grantControls")
            .map(|grant| AccessControls::classify(str_list(grant, "builtInControls")))
            .unwrap_or_default();

        Some(Self {
            id: str_field(value, "id")?,
            name: str_field(value, "displayName").unwrap_or_default(),
            state: str_field(value, "state"),
            users,
            target_resources,
            access_controls,
        })
    }
}
