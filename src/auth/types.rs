//! Auth types
//!
//! Credentials are immutable values: a refresh never edits one in place, it
//! produces a rotated copy.

use crate::types::Method;
use serde::{Deserialize, Serialize};

/// Client identity plus the current token pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// OAuth2 client id
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Current bearer token
    pub access_token: String,
    /// Current refresh token
    pub refresh_token: String,
    /// Any other keys found next to the credentials, written back unchanged
    #[serde(flatten, default)]
    pub extra: serde_yaml::Mapping,
}

impl Credentials {
    /// Create a credential set
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            extra: serde_yaml::Mapping::new(),
        }
    }

    /// A copy carrying a new token pair; the client identity is unchanged
    #[must_use]
    pub fn rotated(&self, tokens: TokenPair) -> Self {
        Self {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            extra: self.extra.clone(),
        }
    }

    /// `Authorization` header value for the current access token
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("extra_keys", &self.extra.len())
            .finish()
    }
}

/// Token pair returned by the refresh endpoint
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    /// New bearer token
    pub access_token: String,
    /// New refresh token
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

/// Where the refresh grant parameters travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamsLocation {
    /// JSON request body
    #[default]
    Body,
    /// URL query string
    Query,
}

/// Refresh endpoint settings
#[derive(Debug, Clone)]
pub struct RefreshEndpoint {
    /// HTTP method of the refresh call
    pub method: Method,
    /// Path of the refresh call, relative to the base URL
    pub path: String,
    /// Placement of the grant parameters
    pub params: ParamsLocation,
}

impl RefreshEndpoint {
    /// Create a refresh endpoint sending its parameters in the body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: ParamsLocation::Body,
        }
    }

    /// Choose where the grant parameters go
    #[must_use]
    pub fn with_params(mut self, params: ParamsLocation) -> Self {
        self.params = params;
        self
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("client", "secret", "T1", "R1")
    }

    #[test]
    fn test_rotated_keeps_client_identity() {
        let rotated = creds().rotated(TokenPair {
            access_token: "T2".into(),
            refresh_token: "R2".into(),
        });

        assert_eq!(rotated.client_id, "client");
        assert_eq!(rotated.client_secret, "secret");
        assert_eq!(rotated.access_token, "T2");
        assert_eq!(rotated.refresh_token, "R2");
    }

    #[test]
    fn test_bearer_header_value() {
        assert_eq!(creds().bearer(), "Bearer T1");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", creds());
        assert!(rendered.contains("client"));
        assert!(!rendered.contains("secret\""));
        assert!(!rendered.contains("T1"));
        assert!(!rendered.contains("R1"));
    }

    #[test]
    fn test_params_location_default() {
        assert_eq!(ParamsLocation::default(), ParamsLocation::Body);
        let endpoint = RefreshEndpoint::new(Method::POST, "/oauth2/token");
        assert_eq!(endpoint.params, ParamsLocation::Body);
    }
}
