//! Normalized SDK configuration.
//!
//! # Design
//! `ClientConfig` is the validated output of `Sdk::new` and the only
//! configuration a service client ever sees. `BaseUris` has one field per
//! service, so a partially populated map cannot be represented.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::transport::Transport;

/// Request timeout, in seconds, used when the bag does not set one.
pub const DEFAULT_TIMEOUT: f64 = 2.0;

/// One of the four backend services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceName {
    Id,
    License,
    Profile,
    Ecom,
}

impl ServiceName {
    /// All services in validation order.
    pub const ALL: [ServiceName; 4] = [
        ServiceName::Id,
        ServiceName::License,
        ServiceName::Profile,
        ServiceName::Ecom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceName::Id => "id",
            ServiceName::License => "license",
            ServiceName::Profile => "profile",
            ServiceName::Ecom => "ecom",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment tier with a hardcoded set of base URIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Staging,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
        }
    }

    pub fn base_uris(self) -> BaseUris {
        match self {
            Environment::Production => BaseUris::new(
                "https://id.serato.com",
                "https://license.serato.com",
                "https://profile.serato.com",
                "https://ecom.serato.com",
            ),
            Environment::Staging => BaseUris::new(
                "https://staging-id.serato.net",
                "https://staging-license.serato.net",
                "https://staging-profile.serato.net",
                "https://staging-ecom.serato.net",
            ),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            other => Err(ConfigError::InvalidEnv {
                found: format!("{other:?}"),
            }),
        }
    }
}

/// Base URI for every service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUris {
    pub id: String,
    pub license: String,
    pub profile: String,
    pub ecom: String,
}

impl BaseUris {
    pub fn new(
        id: impl Into<String>,
        license: impl Into<String>,
        profile: impl Into<String>,
        ecom: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            license: license.into(),
            profile: profile.into(),
            ecom: ecom.into(),
        }
    }

    pub fn get(&self, service: ServiceName) -> &str {
        match service {
            ServiceName::Id => &self.id,
            ServiceName::License => &self.license,
            ServiceName::Profile => &self.profile,
            ServiceName::Ecom => &self.ecom,
        }
    }
}

/// Application credentials bound into every created client.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub app_password: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_password: app_password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_password", &"<redacted>")
            .finish()
    }
}

/// Validated configuration handed to each service client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Per-request timeout in seconds.
    pub timeout: f64,
    /// Transport override. When `None`, clients use `UreqTransport`.
    pub handler: Option<Arc<dyn Transport>>,
    pub base_uri: BaseUris,
}

impl ClientConfig {
    pub fn new(base_uri: BaseUris) -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            handler: None,
            base_uri,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("timeout", &self.timeout)
            .field("handler", &self.handler.as_ref().map(|_| "<transport>"))
            .field("base_uri", &self.base_uri)
            .finish()
    }
}

/// Two configs are equal when they share the same transport handle (or
/// both have none) and every other field matches.
impl PartialEq for ClientConfig {
    fn eq(&self, other: &Self) -> bool {
        let same_handler = match (&self.handler, &other.handler) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>(),
            _ => false,
        };
        same_handler && self.timeout == other.timeout && self.base_uri == other.base_uri
    }
}
