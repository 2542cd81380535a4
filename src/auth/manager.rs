//! Token manager
//!
//! Exchanges the current refresh token for a new token pair.

use super::types::{Credentials, ParamsLocation, RefreshEndpoint, TokenPair};
use crate::error::{Error, Result};
use crate::http::{ApiRequest, RequestExecutor};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Grant type sent with every refresh call
pub const REFRESH_GRANT_TYPE: &str = "refresh_token";

/// Performs the refresh-token grant through a [`RequestExecutor`]
pub struct TokenManager {
    executor: Arc<dyn RequestExecutor>,
    endpoint: RefreshEndpoint,
}

impl TokenManager {
    /// Create a token manager for the given refresh endpoint
    pub fn new(executor: Arc<dyn RequestExecutor>, endpoint: RefreshEndpoint) -> Self {
        Self { executor, endpoint }
    }

    /// Refresh endpoint this manager calls
    pub fn endpoint(&self) -> &RefreshEndpoint {
        &self.endpoint
    }

    /// Exchange the refresh token and return rotated credentials
    ///
    /// The call is authorized with the current access token. Any failure is
    /// returned unchanged and nothing is retried; the caller decides that a
    /// failed refresh ends the run.
    pub async fn refresh(&self, credentials: &Credentials) -> Result<Credentials> {
        let request = self.build_request(credentials);
        debug!(
            "Refreshing token via {} {}",
            self.endpoint.method, self.endpoint.path
        );

        let body = self.executor.execute(&request).await?;
        let tokens: TokenPair = serde_json::from_value(body).map_err(|e| {
            Error::schema(format!(
                "Refresh response is missing access_token/refresh_token: {e}"
            ))
        })?;

        info!(client_id = %credentials.client_id, "Token refreshed");
        Ok(credentials.rotated(tokens))
    }

    fn build_request(&self, credentials: &Credentials) -> ApiRequest {
        let request = ApiRequest::new(self.endpoint.method, self.endpoint.path.clone())
            .header("Accept", "application/json")
            .header("Authorization", credentials.bearer());

        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", REFRESH_GRANT_TYPE),
            ("refresh_token", credentials.refresh_token.as_str()),
        ];

        match self.endpoint.params {
            ParamsLocation::Body => {
                let body: serde_json::Map<String, serde_json::Value> = params
                    .iter()
                    .map(|(key, value)| ((*key).to_string(), json!(value)))
                    .collect();
                request.json(serde_json::Value::Object(body))
            }
            ParamsLocation::Query => params
                .iter()
                .fold(request, |request, (key, value)| request.query(*key, *value)),
        }
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
