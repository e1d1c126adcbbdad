//! Pluggable HTTP transport.
//!
//! A `Transport` executes one `HttpRequest` and returns the raw
//! `HttpResponse`. Callers override it through the `handler` slot of the
//! configuration bag, typically to stub the network in tests. Without an
//! override, service clients fall back to `UreqTransport`.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};
use ureq::typestate::WithBody;
use ureq::RequestBuilder;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes HTTP requests on behalf of service clients.
///
/// Implementations must return non-2xx responses as data; status
/// interpretation belongs to the client.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Option<Duration>,
}

impl UreqTransport {
    /// Build a transport whose requests time out after `timeout` seconds.
    ///
    /// A timeout that is not a positive finite number disables the limit.
    pub fn new(seconds: f64) -> Self {
        let timeout = if seconds.is_finite() && seconds > 0.0 {
            Duration::try_from_secs_f64(seconds).ok()
        } else {
            None
        };
        if timeout.is_none() {
            warn!(seconds, "request timeout disabled");
        }
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), headers).call(),
            HttpMethod::Post => send_body(with_headers(self.agent.post(url), headers), body),
            HttpMethod::Put => send_body(with_headers(self.agent.put(url), headers), body),
            HttpMethod::Patch => send_body(with_headers(self.agent.patch(url), headers), body),
        };
        let fail = |e: ureq::Error| TransportError {
            method: request.method.as_str(),
            url: request.url.clone(),
            message: e.to_string(),
        };

        let mut response = result.map_err(fail)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response.body_mut().read_to_string().map_err(fail)?;
        debug!(status, url = %request.url, "received response");

        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: RequestBuilder<WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_timeout_is_applied() {
        let transport = UreqTransport::new(2.5);
        assert_eq!(transport.timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn non_positive_timeout_disables_limit() {
        assert_eq!(UreqTransport::new(0.0).timeout(), None);
        assert_eq!(UreqTransport::new(-1.0).timeout(), None);
        assert_eq!(UreqTransport::new(f64::NAN).timeout(), None);
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let transport = UreqTransport::new(0.5);
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:1/unreachable".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.send(&request).unwrap_err();
        assert_eq!(err.method, "GET");
        assert_eq!(err.url, "http://127.0.0.1:1/unreachable");
    }
}
