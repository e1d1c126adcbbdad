//! Service clients created by the `Sdk` factory.
//!
//! # Design
//! Each backend gets its own client type so callers cannot mix them up,
//! but all four share `ClientCore`: the validated config, a copy of the
//! credentials taken at creation time, and the resolved transport. Request
//! handling follows a build / execute / parse split so the I/O step can be
//! driven by the client or by the caller.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ClientConfig, Credentials, ServiceName};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// State shared by every service client.
#[derive(Clone)]
pub struct ClientCore {
    service: ServiceName,
    config: ClientConfig,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl ClientCore {
    pub fn new(service: ServiceName, config: ClientConfig, credentials: Credentials) -> Self {
        let transport = match &config.handler {
            Some(handler) => Arc::clone(handler),
            None => Arc::new(UreqTransport::new(config.timeout)) as Arc<dyn Transport>,
        };
        Self {
            service,
            config,
            credentials,
            transport,
        }
    }

    pub fn service(&self) -> ServiceName {
        self.service
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl fmt::Debug for ClientCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCore")
            .field("service", &self.service)
            .field("config", &self.config)
            .field("app_id", &self.credentials.app_id)
            .finish_non_exhaustive()
    }
}

/// Common contract of the four service clients.
pub trait ServiceClient {
    const SERVICE: ServiceName;

    fn new(config: ClientConfig, app_id: &str, app_password: &str) -> Self;

    fn core(&self) -> &ClientCore;

    fn base_uri(&self) -> &str {
        self.core().config().base_uri.get(Self::SERVICE)
    }

    fn app_id(&self) -> &str {
        &self.core().credentials().app_id
    }

    fn app_password(&self) -> &str {
        &self.core().credentials().app_password
    }

    fn timeout(&self) -> f64 {
        self.core().config().timeout
    }

    /// Build a request for `path` relative to this service's base URI.
    fn build_request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: join_url(self.base_uri(), path),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    /// Build a request carrying `body` serialized as JSON.
    fn build_json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut request = self.build_request(method, path);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    /// Send `request` through the configured transport.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        Ok(self.core().transport().send(request)?)
    }

    /// Check the status against `expected` and decode the JSON body.
    fn parse_json<T: DeserializeOwned>(&self, response: HttpResponse, expected: u16) -> Result<T, ApiError> {
        check_status(&response, expected)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Client for the identity service.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    core: ClientCore,
}

impl ServiceClient for IdentityClient {
    const SERVICE: ServiceName = ServiceName::Id;

    fn new(config: ClientConfig, app_id: &str, app_password: &str) -> Self {
        Self {
            core: ClientCore::new(Self::SERVICE, config, Credentials::new(app_id, app_password)),
        }
    }

    fn core(&self) -> &ClientCore {
        &self.core
    }
}

/// Client for the license service.
#[derive(Debug, Clone)]
pub struct LicenseClient {
    core: ClientCore,
}

impl ServiceClient for LicenseClient {
    const SERVICE: ServiceName = ServiceName::License;

    fn new(config: ClientConfig, app_id: &str, app_password: &str) -> Self {
        Self {
            core: ClientCore::new(Self::SERVICE, config, Credentials::new(app_id, app_password)),
        }
    }

    fn core(&self) -> &ClientCore {
        &self.core
    }
}

/// Client for the profile service.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    core: ClientCore,
}

impl ServiceClient for ProfileClient {
    const SERVICE: ServiceName = ServiceName::Profile;

    fn new(config: ClientConfig, app_id: &str, app_password: &str) -> Self {
        Self {
            core: ClientCore::new(Self::SERVICE, config, Credentials::new(app_id, app_password)),
        }
    }

    fn core(&self) -> &ClientCore {
        &self.core
    }
}

/// Client for the e-commerce service.
#[derive(Debug, Clone)]
pub struct EcomClient {
    core: ClientCore,
}

impl ServiceClient for EcomClient {
    const SERVICE: ServiceName = ServiceName::Ecom;

    fn new(config: ClientConfig, app_id: &str, app_password: &str) -> Self {
        Self {
            core: ClientCore::new(Self::SERVICE, config, Credentials::new(app_id, app_password)),
        }
    }

    fn core(&self) -> &ClientCore {
        &self.core
    }
}
