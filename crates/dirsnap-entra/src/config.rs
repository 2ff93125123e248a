//! Configuration for the Entra collector.

use secrecy::SecretString;
use url::Url;

use crate::{EntraError, EntraResult};

/// Microsoft cloud environment to target.
///
/// Sovereign clouds use distinct Graph and login endpoints; `Custom` points
/// both at explicit URLs (private clouds, test servers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntraCloudEnvironment {
    /// Worldwide commercial cloud (default).
    Commercial,
    /// US Government (GCC High / DoD).
    UsGovernment,
    /// 21Vianet-operated China cloud.
    China,
    /// Explicit endpoints.
    Custom {
        graph_endpoint: String,
        login_endpoint: String,
    },
}

impl EntraCloudEnvironment {
    /// Returns the Graph API base endpoint, without version segment.
    #[must_use]
    pub fn graph_endpoint(&self) -> &str {
        match self {
            Self::Commercial => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
            Self::Custom { graph_endpoint, .. } => graph_endpoint,
        }
    }

    /// Returns the `OAuth2` login endpoint.
    #[must_use]
    pub fn login_endpoint(&self) -> &str {
        match self {
            Self::Commercial => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
            Self::Custom { login_endpoint, .. } => login_endpoint,
        }
    }
}

impl Default for EntraCloudEnvironment {
    fn default() -> Self {
        Self::Commercial
    }
}

/// Client-credentials secret pair for a tenant's app registration.
#[derive(Debug, Clone)]
pub struct EntraCredentials {
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: SecretString,
}

/// Per-tenant collector configuration.
#[derive(Debug, Clone)]
pub struct EntraConfig {
    /// Directory (tenant) id or verified domain.
    pub tenant_id: String,
    /// Cloud environment to target.
    pub cloud_environment: EntraCloudEnvironment,
    /// Graph API version segment.
    pub api_version: String,
    /// Page size for list requests.
    pub page_size: u32,
}

impl EntraConfig {
    /// Returns a builder with defaults (commercial cloud, `v1.0`, page size 100).
    #[must_use]
    pub fn builder() -> EntraConfigBuilder {
        EntraConfigBuilder::default()
    }
}

/// Builder for [`EntraConfig`].
#[derive(Debug, Default)]
pub struct EntraConfigBuilder {
    tenant_id: Option<String>,
    cloud_environment: EntraCloudEnvironment,
    api_version: Option<String>,
    page_size: Option<u32>,
}

impl EntraConfigBuilder {
    /// Sets the tenant id (required).
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Sets the cloud environment.
    #[must_use]
    pub fn cloud_environment(mut self, env: EntraCloudEnvironment) -> Self {
        self.cloud_environment = env;
        self
    }

    /// Sets the Graph API version segment (default `v1.0`).
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the list page size (default 100).
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant id is missing/empty, the page size is
    /// zero, or a custom endpoint is not a valid URL.
    pub fn build(self) -> EntraResult<EntraConfig> {
        let tenant_id = self
            .tenant_id
            .filter(|t| !t.is_empty())
            .ok_or_else(|| EntraError::Config("tenant_id is required".into()))?;

        let page_size = self.page_size.unwrap_or(100);
        if page_size == 0 {
            return Err(EntraError::Config("page_size must be non-zero".into()));
        }

        if let EntraCloudEnvironment::Custom {
            graph_endpoint,
            login_endpoint,
        } = &self.cloud_environment
        {
            Url::parse(graph_endpoint)?;
            Url::parse(login_endpoint)?;
        }

        Ok(EntraConfig {
            tenant_id,
            cloud_environment: self.cloud_environment,
            api_version: self.api_version.unwrap_or_else(|| "v1.0".to_string()),
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EntraConfig::builder()
            .tenant_id("contoso.onmicrosoft.com")
            .build()
            .unwrap();

        assert_eq!(config.api_version, "v1.0");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.cloud_environment, EntraCloudEnvironment::Commercial);
    }

    #[test]
    fn test_builder_requires_tenant_id() {
        assert!(matches!(
            EntraConfig::builder().build(),
            Err(EntraError::Config(_))
        ));
        assert!(matches!(
            EntraConfig::builder().tenant_id("").build(),
            Err(EntraError::Config(_))
        ));
    }

    #[test]
    fn test_builder_rejects_zero_page_size() {
        let result = EntraConfig::builder()
            .tenant_id("contoso.onmicrosoft.com")
            .page_size(0)
            .build();

        assert!(matches!(result, Err(EntraError::Config(_))));
    }

    #[test]
    fn test_custom_environment_validated() {
        let result = EntraConfig::builder()
            .tenant_id("contoso.onmicrosoft.com")
            .cloud_environment(EntraCloudEnvironment::Custom {
                graph_endpoint: "not a url".into(),
                login_endpoint: "http://localhost:9000".into(),
            })
            .build();

        assert!(matches!(result, Err(EntraError::Url(_))));
    }

    #[test]
    fn test_sovereign_endpoints() {
        assert_eq!(
            EntraCloudEnvironment::UsGovernment.graph_endpoint(),
            "https://graph.microsoft.us"
        );
        assert_eq!(
            EntraCloudEnvironment::China.login_endpoint(),
            "https://login.chinacloudapi.cn"
        );
    }
}
