//! Common test utilities for dirsnap-entra integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dirsnap_entra::{EntraCloudEnvironment, EntraConfig, EntraCredentials};

/// Test data factory for a directory user.
pub fn create_test_user(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "displayName": name,
        "userPrincipalName": format!("{}@test.onmicrosoft.com", name),
        "accountEnabled": true
    })
}

/// Test data factory for an authentication method.
pub fn create_auth_method(id: &str, method_type: &str) -> Value {
    json!({
        "id": id,
        "@odata.type": format!("#microsoft.graph.{}AuthenticationMethod", method_type)
    })
}

/// Wraps items in an OData list envelope.
pub fn odata_list(items: Vec<Value>) -> Value {
    json!({ "value": items })
}

/// Creates an OData error body.
pub fn odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Mock Graph server standing in for one tenant's cloud endpoints.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    /// Starts a mock server with the tenant's token endpoint already mounted.
    pub async fn start(tenant_id: &str) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/{tenant_id}/oauth2/v2.0/token")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mock-access-token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Builds a tenant configuration pointing both endpoints at this server.
    pub fn tenant_config(&self, tenant_id: &str) -> (EntraConfig, EntraCredentials) {
        let config = EntraConfig::builder()
            .tenant_id(tenant_id)
            .cloud_environment(EntraCloudEnvironment::Custom {
                graph_endpoint: self.uri(),
                login_endpoint: self.uri(),
            })
            .page_size(50)
            .build()
            .unwrap();

        let credentials = EntraCredentials {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string().into(),
        };

        (config, credentials)
    }

    /// Mounts a single-page list endpoint.
    pub async fn mock_list(&self, endpoint: &str, items: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/{endpoint}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(odata_list(items)))
            .mount(&self.server)
            .await;
    }

    /// Mounts a single-object endpoint.
    pub async fn mock_object(&self, endpoint: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/{endpoint}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts an endpoint that fails with the given status and an empty body.
    pub async fn mock_status(&self, endpoint: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/{endpoint}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mounts an endpoint that denies access with an OData 403 body.
    pub async fn mock_permission_denied(&self, endpoint: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/{endpoint}")))
            .respond_with(ResponseTemplate::new(403).set_body_json(odata_error(
                "Authorization_RequestDenied",
                "Insufficient privileges to complete the operation.",
            )))
            .mount(&self.server)
            .await;
    }

    /// Mounts a user's authentication-methods endpoint.
    pub async fn mock_auth_methods(&self, user_id: &str, methods: Vec<Value>) {
        self.mock_list(&format!("users/{user_id}/authentication/methods"), methods)
            .await;
    }
}
