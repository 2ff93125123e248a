//! Microsoft Graph HTTP client with pagination and bounded retries.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{EntraConfig, EntraError, EntraResult, TokenCache};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "innerError")]
    pub inner_error: Option<serde_json::Value>,
}

/// Envelope for paginated Graph API list responses.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Read-only Graph API client for one tenant.
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    base_url: String,
    page_size: u32,
    max_retries: u32,
}

impl GraphClient {
    /// Creates a Graph client from the tenant's configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token_cache: Arc<TokenCache>, config: &EntraConfig) -> EntraResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EntraError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            token_cache,
            base_url: format!(
                "{}/{}",
                config.cloud_environment.graph_endpoint(),
                config.api_version
            ),
            page_size: config.page_size,
            max_retries: 5,
        })
    }

    /// Returns the versioned base URL for Graph requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configured list page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Performs a GET request with token injection and retry handling.
    ///
    /// # Errors
    ///
    /// Returns [`EntraError::PermissionDenied`] on 403, `GraphApi` on other
    /// API errors, and `MaxRetriesExceeded` when throttling persists.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> EntraResult<T> {
        let mut retries = 0;
        let mut delay = Duration::from_secs(1);

        loop {
            let token = self.token_cache.get_token().await?;

            let response = self
                .http_client
                .get(url)
                .bearer_auth(&token)
                .send()
                .await?;
            let status = response.status();

            // Throttled: honor Retry-After up to max_retries attempts.
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if retries >= self.max_retries {
                    return Err(EntraError::MaxRetriesExceeded { attempts: retries });
                }
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);

                retries += 1;
                warn!(
                    "Throttled, retry {}/{} after {}s",
                    retries, self.max_retries, retry_after
                );
                tokio::time::sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            // Transient gateway errors: exponential backoff.
            if matches!(
                status,
                reqwest::StatusCode::BAD_GATEWAY
                    | reqwest::StatusCode::SERVICE_UNAVAILABLE
                    | reqwest::StatusCode::GATEWAY_TIMEOUT
            ) && retries < self.max_retries
            {
                retries += 1;
                warn!(
                    "Transient error {}, retry {}/{} after {:?}",
                    status, retries, self.max_retries, delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            if status.is_success() {
                return response.json().await.map_err(EntraError::from);
            }

            let error_body = response.text().await.unwrap_or_default();
            let odata = serde_json::from_str::<ODataError>(&error_body).ok();

            if status == reqwest::StatusCode::FORBIDDEN {
                let message = odata
                    .map(|e| e.error.message)
                    .unwrap_or_else(|| error_body.clone());
                return Err(EntraError::PermissionDenied(message));
            }

            if let Some(odata_error) = odata {
                return Err(EntraError::GraphApi {
                    code: odata_error.error.code,
                    message: odata_error.error.message,
                    inner_error: odata_error.error.inner_error.map(|v| v.to_string()),
                });
            }

            return Err(EntraError::GraphApi {
                code: status.to_string(),
                message: error_body,
                inner_error: None,
            });
        }
    }

    /// Fetches all pages of a list response, handing each page to `callback`.
    ///
    /// Pages already delivered to the callback are kept by the caller even if
    /// a later page fails, which is what the collector's partial-data
    /// semantics rely on.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered while fetching a page.
    #[instrument(skip(self, callback))]
    pub async fn get_paginated<T, F>(&self, initial_url: &str, mut callback: F) -> EntraResult<()>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>),
    {
        let mut url = initial_url.to_string();

        loop {
            debug!("Fetching page: {}", url);
            let response: ODataResponse<T> = self.get(&url).await?;

            callback(response.value);

            match response.next_link {
                Some(next) => url = next,
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odata_error_parsing() {
        let json = r#"{
            "error": {
                "code": "Request_ResourceNotFound",
                "message": "Resource not found",
                "innerError": {"date": "2026-08-01"}
            }
        }"#;

        let error: ODataError = serde_json::from_str(json).unwrap();
        assert_eq!(error.error.code, "Request_ResourceNotFound");
        assert_eq!(error.error.message, "Resource not found");
        assert!(error.error.inner_error.is_some());
    }

    #[test]
    fn test_odata_response_parsing() {
        let json = r#"{
            "value": [{"id": "1"}, {"id": "2"}],
            "@odata.nextLink": "https://graph.microsoft.com/v1.0/users?$skiptoken=xxx"
        }"#;

        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct TestItem {
            id: String,
        }

        let response: ODataResponse<TestItem> = serde_json::from_str(json).unwrap();
        assert_eq!(response.value.len(), 2);
        assert!(response.next_link.is_some());
    }

    #[test]
    fn test_odata_response_missing_value_defaults_empty() {
        let response: ODataResponse<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(response.value.is_empty());
        assert!(response.next_link.is_none());
    }
}
