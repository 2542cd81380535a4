//! Authentication module
//!
//! Bearer-token lifecycle: the refresh-token exchange and the secret store
//! that persists rotated tokens.
//!
//! The `TokenManager` runs once per process, before any page is fetched.

mod manager;
mod store;
mod types;

pub use manager::{TokenManager, REFRESH_GRANT_TYPE};
pub use store::{MemorySecretStore, SecretStore, YamlSecretStore};
pub use types::{Credentials, ParamsLocation, RefreshEndpoint, TokenPair};
