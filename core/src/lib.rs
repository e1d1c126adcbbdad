//! Client factory for the Serato identity, license, profile and ecom APIs.
//!
//! # Overview
//! `Sdk::new` validates a configuration bag (environment preset or explicit
//! per-service base URIs, request timeout, transport override) together with
//! application credentials. The resulting `Sdk` hands out one client per
//! service, each bound to the normalized `ClientConfig` and a copy of the
//! credentials.
//!
//! # Design
//! - Validation is a single fail-fast pass; no partially built `Sdk` exists.
//! - `ClientConfig` is strongly typed; the loose `SdkArgs` bag only exists
//!   at the input boundary.
//! - Clients build `HttpRequest` values and parse `HttpResponse` values.
//!   The round-trip goes through a `Transport`, which callers may replace.
//!
//! ```no_run
//! use serato_sdk::{Environment, HttpMethod, Sdk, SdkArgs, ServiceClient};
//!
//! let sdk = Sdk::new(SdkArgs::new().env(Environment::Staging), "app1", "secret1")?;
//! let identity = sdk.create_identity_client();
//! let request = identity.build_request(HttpMethod::Get, "/api/v1/me");
//! let response = identity.execute(&request)?;
//! println!("identity answered {}", response.status);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod sdk;
pub mod transport;

pub use args::{ArgValue, SdkArgs};
pub use client::{ClientCore, EcomClient, IdentityClient, LicenseClient, ProfileClient, ServiceClient};
pub use config::{BaseUris, ClientConfig, Credentials, Environment, ServiceName, DEFAULT_TIMEOUT};
pub use error::{ApiError, ConfigError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use sdk::Sdk;
pub use transport::{Transport, UreqTransport};
