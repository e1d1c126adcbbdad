//! Error types for SDK configuration and service client calls.
//!
//! # Design
//! `ConfigError` is raised only while an `Sdk` is being constructed. Every
//! rejected rule has its own variant and a stable numeric code so callers
//! on the other side of the FFI boundary can tell them apart. The codes are
//! opaque identifiers with no ordering or severity.
//!
//! `ApiError` covers the request/response path of created clients. `NotFound`
//! gets a dedicated variant because callers frequently distinguish "the
//! resource does not exist" from "the server returned an unexpected status."

use thiserror::Error;

use crate::config::ServiceName;

/// Invalid configuration supplied to `Sdk::new`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("`timeout` must be a floating point number of seconds, got {found}")]
    InvalidTimeout { found: &'static str },

    #[error("`handler` must be a transport, got {found}")]
    InvalidHandler { found: &'static str },

    #[error("`env` must be `production` or `staging`, got {found}")]
    InvalidEnv { found: String },

    #[error("`base_uri` must be a map with `id`, `license`, `profile` and `ecom` keys")]
    IncompleteBaseUri,

    #[error("`base_uri.{service}` must begin with `http://` or `https://`, got {found}")]
    MissingProtocol { service: ServiceName, found: String },

    #[error("no base URIs configured: provide `env` or `base_uri`")]
    MissingBaseUri,
}

impl ConfigError {
    pub fn code(&self) -> u16 {
        match self {
            ConfigError::InvalidTimeout { .. } => 1000,
            ConfigError::InvalidHandler { .. } => 1001,
            ConfigError::InvalidEnv { .. } => 1002,
            ConfigError::IncompleteBaseUri => 1003,
            ConfigError::MissingProtocol { service, .. } => match service {
                ServiceName::Id => 1004,
                ServiceName::License => 1005,
                ServiceName::Profile => 1006,
                ServiceName::Ecom => 1007,
            },
            ConfigError::MissingBaseUri => 1008,
        }
    }
}

/// A transport could not complete the HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {url} failed: {message}")]
pub struct TransportError {
    pub method: &'static str,
    pub url: String,
    pub message: String,
}

/// Errors returned by service client request/response helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than the expected one (and not 404).
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
