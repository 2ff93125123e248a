//! Tenant directory snapshot collection.
//!
//! One collection pass fetches users first (directory-role member resolution
//! depends on the user map), then fans out the six remaining field fetches
//! concurrently and joins on all of them. Collection is best-effort: every
//! failure is logged, recorded in the snapshot report and leaves partial
//! data in place; nothing propagates past [`EntraCollector::collect`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use dirsnap_core::TenantId;

use crate::records::{
    AuthMethod, AuthorizationPolicy, ConditionalAccessPolicy, DirectoryRole, GroupSetting,
    NamedLocation, SecurityDefault, User,
};
use crate::snapshot::{CollectionFault, EntraSnapshot, SnapshotField, SnapshotReport, TenantMap};
use crate::{EntraConfig, EntraCredentials, EntraError, EntraResult, GraphClient, TokenCache};

type FieldResult<T> = (TenantMap<T>, Vec<CollectionFault>);

/// Collects a [`EntraSnapshot`] from one Graph client per tenant.
pub struct EntraCollector {
    clients: BTreeMap<TenantId, GraphClient>,
}

impl EntraCollector {
    /// Creates a collector over pre-built per-tenant clients.
    #[must_use]
    pub fn new(clients: BTreeMap<TenantId, GraphClient>) -> Self {
        Self { clients }
    }

    /// Builds clients for each tenant configuration and wraps them in a
    /// collector.
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be constructed.
    pub fn for_tenants(
        tenants: impl IntoIterator<Item = (EntraConfig, EntraCredentials)>,
    ) -> EntraResult<Self> {
        let mut clients = BTreeMap::new();
        for (config, credentials) in tenants {
            let tenant = TenantId::new(config.tenant_id.clone());
            let token_cache = Arc::new(TokenCache::new(&config, credentials));
            clients.insert(tenant, GraphClient::new(token_cache, &config)?);
        }
        Ok(Self { clients })
    }

    /// Runs one collection pass.
    ///
    /// Infallible by contract: faults are recorded in the returned snapshot's
    /// report instead of being raised.
    #[instrument(skip(self))]
    pub async fn collect(&self) -> EntraSnapshot {
        info!(
            "Collecting directory snapshot for {} tenant(s)",
            self.clients.len()
        );

        // Users must be complete before role member resolution starts.
        let (users, mut faults) = self.fetch_users().await;

        let (
            (authorization_policy, f_auth),
            (group_settings, f_groups),
            (security_defaults, f_sec),
            (named_locations, f_loc),
            (directory_roles, f_roles),
            (conditional_access_policies, f_cap),
        ) = tokio::join!(
            self.fetch_authorization_policy(),
            self.fetch_group_settings(),
            self.fetch_security_defaults(),
            self.fetch_named_locations(),
            self.fetch_directory_roles(&users),
            self.fetch_conditional_access_policies(),
        );

        for field_faults in [f_auth, f_groups, f_sec, f_loc, f_roles, f_cap] {
            faults.extend(field_faults);
        }

        EntraSnapshot {
            users,
            authorization_policy,
            group_settings,
            security_defaults,
            named_locations,
            directory_roles,
            conditional_access_policies,
            report: SnapshotReport { faults },
        }
    }

    /// Lists users per tenant and fetches each user's authentication methods.
    ///
    /// A failing user list aborts the field for remaining tenants; a failing
    /// methods fetch aborts only that tenant's remaining user detail.
    #[instrument(skip(self))]
    async fn fetch_users(&self) -> FieldResult<HashMap<String, User>> {
        info!("Fetching users");
        let mut users: TenantMap<HashMap<String, User>> = BTreeMap::new();
        let mut faults = Vec::new();

        for (tenant, client) in &self.clients {
            let url = format!("{}/users?$top={}", client.base_url(), client.page_size());

            let mut listed: Vec<(String, String)> = Vec::new();
            let result = client
                .get_paginated(&url, |page: Vec<serde_json::Value>| {
                    for value in &page {
                        if let Some(id) = value.get("id").and_then(|v| v.as_str()) {
                            let name = value
                                .get("displayName")
                                .and_then(|v| v.as_str())
                                .unwrap_or_default();
                            listed.push((id.to_string(), name.to_string()));
                        }
                    }
                })
                .await;

            if let Err(err) = result {
                error!(tenant = %tenant, error = %err, "Failed to list users");
                faults.push(CollectionFault {
                    field: SnapshotField::Users,
                    tenant: Some(tenant.clone()),
                    error: err,
                });
                break;
            }

            let tenant_users = users.entry(tenant.clone()).or_default();
            for (id, name) in listed {
                match self.fetch_auth_methods(client, &id).await {
                    Ok(methods) => {
                        tenant_users.insert(
                            id.clone(),
                            User {
                                id,
                                name,
                                authentication_methods: methods,
                            },
                        );
                    }
                    Err(err @ EntraError::PermissionDenied(_)) => {
                        warn!(
                            tenant = %tenant,
                            "You need 'UserAuthenticationMethod.Read.All' permission to access \
                             this information. It can only be granted through Service Principal \
                             authentication."
                        );
                        faults.push(CollectionFault {
                            field: SnapshotField::Users,
                            tenant: Some(tenant.clone()),
                            error: err,
                        });
                        break;
                    }
                    Err(err) => {
                        error!(
                            tenant = %tenant,
                            user = %id,
                            error = %err,
                            "Failed to fetch authentication methods"
                        );
                        faults.push(CollectionFault {
                            field: SnapshotField::Users,
                            tenant: Some(tenant.clone()),
                            error: err,
                        });
                        break;
                    }
                }
            }
        }

        (users, faults)
    }

    async fn fetch_auth_methods(
        &self,
        client: &GraphClient,
        user_id: &str,
    ) -> EntraResult<Vec<AuthMethod>> {
        let url = format!("{}/users/{}/authentication/methods", client.base_url(), user_id);

        let mut methods = Vec::new();
        client
            .get_paginated(&url, |page: Vec<serde_json::Value>| {
                methods.extend(page.iter().filter_map(AuthMethod::from_json));
            })
            .await?;

        Ok(methods)
    }

    #[instrument(skip(self))]
    async fn fetch_authorization_policy(&self) -> FieldResult<AuthorizationPolicy> {
        info!("Fetching authorization policy");
        let mut policies = BTreeMap::new();
        let mut faults = Vec::new();

        for (tenant, client) in &self.clients {
            let url = format!("{}/policies/authorizationPolicy", client.base_url());
            match client.get::<serde_json::Value>(&url).await {
                Ok(value) => {
                    policies.insert(tenant.clone(), AuthorizationPolicy::from_json(&value));
                }
                Err(err) => {
                    error!(tenant = %tenant, error = %err, "Failed to fetch authorization policy");
                    faults.push(CollectionFault {
                        field: SnapshotField::AuthorizationPolicy,
                        tenant: Some(tenant.clone()),
                        error: err,
                    });
                    break;
                }
            }
        }

        (policies, faults)
    }

    #[instrument(skip(self))]
    async fn fetch_group_settings(&self) -> FieldResult<HashMap<String, GroupSetting>> {
        info!("Fetching group settings");
        let mut settings: TenantMap<HashMap<String, GroupSetting>> = BTreeMap::new();
        let mut faults = Vec::new();

        for (tenant, client) in &self.clients {
            let url = format!("{}/groupSettings", client.base_url());
            let tenant_settings = settings.entry(tenant.clone()).or_default();

            let result = client
                .get_paginated(&url, |page: Vec<serde_json::Value>| {
                    for value in &page {
                        if let Some(id) = value.get("id").and_then(|v| v.as_str()) {
                            tenant_settings.insert(id.to_string(), GroupSetting::from_json(value));
                        }
                    }
                })
                .await;

            if let Err(err) = result {
                error!(tenant = %tenant, error = %err, "Failed to fetch group settings");
                faults.push(CollectionFault {
                    field: SnapshotField::GroupSettings,
                    tenant: Some(tenant.clone()),
                    error: err,
                });
                break;
            }
        }

        (settings, faults)
    }

    #[instrument(skip(self))]
    async fn fetch_security_defaults(&self) -> FieldResult<SecurityDefault> {
        info!("Fetching security defaults");
        let mut defaults = BTreeMap::new();
        let mut faults = Vec::new();

        for (tenant, client) in &self.clients {
            let url = format!(
                "{}/policies/identitySecurityDefaultsEnforcementPolicy",
                client.base_url()
            );
            match client.get::<serde_json::Value>(&url).await {
                Ok(value) => {
                    defaults.insert(tenant.clone(), SecurityDefault::from_json(&value));
                }
                Err(err) => {
                    error!(tenant = %tenant, error = %err, "Failed to fetch security defaults");
                    faults.push(CollectionFault {
                        field: SnapshotField::SecurityDefaults,
                        tenant: Some(tenant.clone()),
                        error: err,
                    });
                    break;
                }
            }
        }

        (defaults, faults)
    }

    #[instrument(skip(self))]
    async fn fetch_named_locations(&self) -> FieldResult<HashMap<String, NamedLocation>> {
        info!("Fetching named locations");
        let mut locations: TenantMap<HashMap<String, NamedLocation>> = BTreeMap::new();
        let mut faults = Vec::new();

        for (tenant, client) in &self.clients {
            let url = format!(
                "{}/identity/conditionalAccess/namedLocations",
                client.base_url()
            );
            let tenant_locations = locations.entry(tenant.clone()).or_default();

            let result = client
                .get_paginated(&url, |page: Vec<serde_json::Value>| {
                    for value in &page {
                        if let Some(location) = NamedLocation::from_json(value) {
                            tenant_locations.insert(location.id.clone(), location);
                        }
                    }
                })
                .await;

            if let Err(err) = result {
                error!(tenant = %tenant, error = %err, "Failed to fetch named locations");
                faults.push(CollectionFault {
                    field: SnapshotField::NamedLocations,
                    tenant: Some(tenant.clone()),
                    error: err,
                });
                break;
            }
        }

        (locations, faults)
    }

    /// Lists directory roles and resolves each role's members against the
    /// pre-built user map. Member ids without a user record are dropped.
    #[instrument(skip(self, users))]
    async fn fetch_directory_roles(
        &self,
        users: &TenantMap<HashMap<String, User>>,
    ) -> FieldResult<HashMap<String, DirectoryRole>> {
        info!("Fetching directory roles");
        let mut roles: TenantMap<HashMap<String, DirectoryRole>> = BTreeMap::new();
        let mut faults = Vec::new();
        let no_users = HashMap::new();

        'tenants: for (tenant, client) in &self.clients {
            let tenant_roles = roles.entry(tenant.clone()).or_default();
            let tenant_users = users.get(tenant).unwrap_or(&no_users);

            let url = format!("{}/directoryRoles", client.base_url());
            let mut listed: Vec<(String, String)> = Vec::new();
            let result = client
                .get_paginated(&url, |page: Vec<serde_json::Value>| {
                    for value in &page {
                        if let (Some(id), Some(display_name)) = (
                            value.get("id").and_then(|v| v.as_str()),
                            value.get("displayName").and_then(|v| v.as_str()),
                        ) {
                            listed.push((id.to_string(), display_name.to_string()));
                        }
                    }
                })
                .await;

            if let Err(err) = result {
                error!(tenant = %tenant, error = %err, "Failed to list directory roles");
                faults.push(CollectionFault {
                    field: SnapshotField::DirectoryRoles,
                    tenant: Some(tenant.clone()),
                    error: err,
                });
                break;
            }

            for (role_id, role_name) in listed {
                let members_url =
                    format!("{}/directoryRoles/{}/members", client.base_url(), role_id);
                let mut member_ids: Vec<String> = Vec::new();
                let result = client
                    .get_paginated(&members_url, |page: Vec<serde_json::Value>| {
                        member_ids.extend(
                            page.iter()
                                .filter_map(|v| v.get("id").and_then(|v| v.as_str()))
                                .map(String::from),
                        );
                    })
                    .await;

                if let Err(err) = result {
                    error!(
                        tenant = %tenant,
                        role = %role_name,
                        error = %err,
                        "Failed to list directory role members"
                    );
                    faults.push(CollectionFault {
                        field: SnapshotField::DirectoryRoles,
                        tenant: Some(tenant.clone()),
                        error: err,
                    });
                    break 'tenants;
                }

                let members = member_ids
                    .iter()
                    .filter_map(|id| tenant_users.get(id).cloned())
                    .collect();
                tenant_roles.insert(
                    role_name,
                    DirectoryRole {
                        id: role_id,
                        members,
                    },
                );
            }
        }

        (roles, faults)
    }

    #[instrument(skip(self))]
    async fn fetch_conditional_access_policies(
        &self,
    ) -> FieldResult<HashMap<String, ConditionalAccessPolicy>> {
        info!("Fetching conditional access policies");
        let mut policies: TenantMap<HashMap<String, ConditionalAccessPolicy>> = BTreeMap::new();
        let mut faults = Vec::new();

        for (tenant, client) in &self.clients {
            let url = format!("{}/identity/conditionalAccess/policies", client.base_url());
            let tenant_policies = policies.entry(tenant.clone()).or_default();

            let result = client
                .get_paginated(&url, |page: Vec<serde_json::Value>| {
                    for value in &page {
                        if let Some(policy) = ConditionalAccessPolicy::from_json(value) {
                            tenant_policies.insert(policy.id.clone(), policy);
                        }
                    }
                })
                .await;

            if let Err(err) = result {
                error!(
                    tenant = %tenant,
                    error = %err,
                    "Failed to fetch conditional access policies"
                );
                faults.push(CollectionFault {
                    field: SnapshotField::ConditionalAccessPolicies,
                    tenant: Some(tenant.clone()),
                    error: err,
                });
                break;
            }
        }

        (policies, faults)
    }
}
