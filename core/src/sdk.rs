//! The `Sdk` factory: validates a configuration bag once and creates
//! service clients bound to the resulting config and credentials.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::args::{ArgValue, SdkArgs};
use crate::client::{EcomClient, IdentityClient, LicenseClient, ProfileClient, ServiceClient};
use crate::config::{BaseUris, ClientConfig, Credentials, Environment, ServiceName, DEFAULT_TIMEOUT};
use crate::error::ConfigError;
use crate::transport::Transport;

/// Factory for Serato service clients.
///
/// Construction either yields a fully validated `Sdk` or fails with the
/// first violated rule. Credentials can be changed afterwards; clients
/// already created keep the values they were built with.
#[derive(Debug, Clone)]
pub struct Sdk {
    config: ClientConfig,
    credentials: Credentials,
}

impl Sdk {
    pub fn new(
        args: SdkArgs,
        app_id: impl Into<String>,
        app_password: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = validate(args).inspect_err(|e| {
            debug!(code = e.code(), error = %e, "rejected sdk configuration");
        })?;
        debug!(
            timeout = config.timeout,
            custom_handler = config.handler.is_some(),
            id = %config.base_uri.id,
            "sdk configured"
        );
        Ok(Self {
            config,
            credentials: Credentials::new(app_id, app_password),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn app_id(&self) -> &str {
        &self.credentials.app_id
    }

    pub fn set_app_id(&mut self, app_id: impl Into<String>) {
        self.credentials.app_id = app_id.into();
    }

    pub fn app_password(&self) -> &str {
        &self.credentials.app_password
    }

    pub fn set_app_password(&mut self, app_password: impl Into<String>) {
        self.credentials.app_password = app_password.into();
    }

    pub fn create_identity_client(&self) -> IdentityClient {
        self.create()
    }

    pub fn create_license_client(&self) -> LicenseClient {
        self.create()
    }

    pub fn create_profile_client(&self) -> ProfileClient {
        self.create()
    }

    pub fn create_ecom_client(&self) -> EcomClient {
        self.create()
    }

    fn create<C: ServiceClient>(&self) -> C {
        let service = C::SERVICE;
        debug!(%service, app_id = %self.credentials.app_id, "creating client");
        C::new(
            self.config.clone(),
            &self.credentials.app_id,
            &self.credentials.app_password,
        )
    }
}

fn validate(args: SdkArgs) -> Result<ClientConfig, ConfigError> {
    let timeout = match args.timeout {
        None => DEFAULT_TIMEOUT,
        Some(ArgValue::Float(seconds)) => seconds,
        Some(other) => {
            return Err(ConfigError::InvalidTimeout {
                found: other.type_name(),
            })
        }
    };

    let handler: Option<Arc<dyn Transport>> = match args.handler {
        None => None,
        Some(ArgValue::Transport(transport)) => Some(transport),
        Some(other) => {
            return Err(ConfigError::InvalidHandler {
                found: other.type_name(),
            })
        }
    };

    let mut base_uri = match args.env {
        None => None,
        Some(ArgValue::Str(name)) => Some(name.parse::<Environment>()?.base_uris()),
        Some(other) => {
            return Err(ConfigError::InvalidEnv {
                found: other.type_name().to_string(),
            })
        }
    };

    if let Some(value) = args.base_uri {
        base_uri = Some(parse_base_uris(value)?);
    }

    let base_uri = base_uri.ok_or(ConfigError::MissingBaseUri)?;
    Ok(ClientConfig {
        timeout,
        handler,
        base_uri,
    })
}

fn parse_base_uris(value: ArgValue) -> Result<BaseUris, ConfigError> {
    let ArgValue::Map(map) = value else {
        return Err(ConfigError::IncompleteBaseUri);
    };
    if !ServiceName::ALL.iter().all(|s| map.contains_key(s.as_str())) {
        return Err(ConfigError::IncompleteBaseUri);
    }

    Ok(BaseUris {
        id: service_uri(&map, ServiceName::Id)?,
        license: service_uri(&map, ServiceName::License)?,
        profile: service_uri(&map, ServiceName::Profile)?,
        ecom: service_uri(&map, ServiceName::Ecom)?,
    })
}

fn service_uri(map: &BTreeMap<String, ArgValue>, service: ServiceName) -> Result<String, ConfigError> {
    match map.get(service.as_str()) {
        Some(ArgValue::Str(uri)) if uri.starts_with("http://") || uri.starts_with("https://") => {
            Ok(uri.clone())
        }
        Some(ArgValue::Str(uri)) => Err(ConfigError::MissingProtocol {
            service,
            found: format!("{uri:?}"),
        }),
        other => Err(ConfigError::MissingProtocol {
            service,
            found: other.map_or("nothing", ArgValue::type_name).to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    struct NullTransport;

    impl Transport for NullTransport {
        fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 204,
                headers: Vec::new(),
                body: String::new(),
            })
        }
    }

    fn custom_uris() -> BaseUris {
        BaseUris::new(
            "http://localhost:8001",
            "https://license.example.test",
            "http://localhost:8003",
            "https://ecom.example.test/v2",
        )
    }

    fn base_uri_map(skip: Option<ServiceName>) -> ArgValue {
        let uris = custom_uris();
        ServiceName::ALL
            .iter()
            .filter(|&&s| Some(s) != skip)
            .map(|&s| (s.as_str(), uris.get(s).to_string()))
            .collect()
    }

    #[test]
    fn staging_scenario() {
        let sdk = Sdk::new(SdkArgs::new().env(Environment::Staging), "app1", "secret1").unwrap();
        let config = sdk.config();
        assert_eq!(config.timeout, 2.0);
        assert!(config.handler.is_none());
        assert_eq!(config.base_uri, Environment::Staging.base_uris());
        assert_eq!(config.base_uri.id, "https://staging-id.serato.net");
        assert_eq!(sdk.app_id(), "app1");
        assert_eq!(sdk.app_password(), "secret1");
    }

    #[test]
    fn production_env_uses_production_preset() {
        let sdk = Sdk::new(SdkArgs::new().env(Environment::Production), "", "").unwrap();
        assert_eq!(sdk.config().base_uri, Environment::Production.base_uris());
    }

    #[test]
    fn empty_bag_is_missing_base_uri() {
        let err = Sdk::new(SdkArgs::new(), "app1", "secret1").unwrap_err();
        assert_eq!(err, ConfigError::MissingBaseUri);
        assert_eq!(err.code(), 1008);
    }

    #[test]
    fn other_fields_do_not_satisfy_base_uri() {
        let args = SdkArgs::new().timeout(3.0).handler(Arc::new(NullTransport));
        let err = Sdk::new(args, "app1", "secret1").unwrap_err();
        assert_eq!(err, ConfigError::MissingBaseUri);
    }

    #[test]
    fn explicit_base_uri_is_kept_verbatim() {
        let sdk = Sdk::new(SdkArgs::new().base_uri(custom_uris()), "", "").unwrap();
        assert_eq!(sdk.config().base_uri, custom_uris());
    }

    #[test]
    fn base_uri_overrides_env() {
        let args = SdkArgs::new().env(Environment::Production).base_uri(custom_uris());
        let sdk = Sdk::new(args, "", "").unwrap();
        assert_eq!(sdk.config().base_uri, custom_uris());
    }

    #[test]
    fn base_uri_overrides_env_regardless_of_insertion_order() {
        let mut args = SdkArgs::new();
        args.set("base_uri", base_uri_map(None)).set("env", "staging");
        let sdk = Sdk::new(args, "", "").unwrap();
        assert_eq!(sdk.config().base_uri, custom_uris());
    }

    #[test]
    fn base_uri_ignores_extra_keys() {
        let ArgValue::Map(mut map) = base_uri_map(None) else {
            unreachable!()
        };
        map.insert("shop".to_string(), ArgValue::from("ftp://nope"));
        let mut args = SdkArgs::new();
        args.set("base_uri", ArgValue::Map(map));
        assert!(Sdk::new(args, "", "").is_ok());
    }

    #[test]
    fn timeout_defaults_and_overrides() {
        let sdk = Sdk::new(SdkArgs::new().env(Environment::Staging), "", "").unwrap();
        assert_eq!(sdk.config().timeout, DEFAULT_TIMEOUT);

        let sdk = Sdk::new(SdkArgs::new().env(Environment::Staging).timeout(0.25), "", "").unwrap();
        assert_eq!(sdk.config().timeout, 0.25);
    }

    #[test]
    fn non_float_timeout_is_rejected() {
        for value in [ArgValue::from(2), ArgValue::from("2.0"), ArgValue::Null] {
            let mut args = SdkArgs::new().env(Environment::Staging);
            args.set("timeout", value);
            let err = Sdk::new(args, "", "").unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout { .. }), "{err}");
            assert_eq!(err.code(), 1000);
        }
    }

    #[test]
    fn integer_timeout_beyond_i64_is_rejected() {
        let args = SdkArgs::from_json(&serde_json::json!({
            "env": "staging",
            "timeout": 18446744073709551615u64
        }));
        let err = Sdk::new(args, "", "").unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeout { found: "int" });
    }

    #[test]
    fn timeout_is_checked_before_base_uri() {
        let mut args = SdkArgs::new();
        args.set("timeout", 5);
        let err = Sdk::new(args, "", "").unwrap_err();
        assert_eq!(err.code(), 1000);
    }

    #[test]
    fn handler_is_stored_unchanged() {
        let transport: Arc<dyn Transport> = Arc::new(NullTransport);
        let args = SdkArgs::new().env(Environment::Staging).handler(Arc::clone(&transport));
        let sdk = Sdk::new(args, "", "").unwrap();
        let stored = sdk.config().handler.as_ref().unwrap();
        assert!(std::ptr::addr_eq(Arc::as_ptr(stored), Arc::as_ptr(&transport)));
    }

    #[test]
    fn non_transport_handler_is_rejected() {
        let mut args = SdkArgs::new().env(Environment::Staging);
        args.set("handler", "curl");
        let err = Sdk::new(args, "", "").unwrap_err();
        assert_eq!(err, ConfigError::InvalidHandler { found: "string" });
        assert_eq!(err.code(), 1001);
    }

    #[test]
    fn unknown_env_is_rejected() {
        let mut args = SdkArgs::new();
        args.set("env", "development");
        let err = Sdk::new(args, "", "").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
        assert_eq!(err.code(), 1002);

        let mut args = SdkArgs::new();
        args.set("env", 1);
        assert_eq!(Sdk::new(args, "", "").unwrap_err().code(), 1002);
    }

    #[test]
    fn each_missing_key_is_incomplete() {
        for service in ServiceName::ALL {
            let mut args = SdkArgs::new();
            args.set("base_uri", base_uri_map(Some(service)));
            let err = Sdk::new(args, "", "").unwrap_err();
            assert_eq!(err, ConfigError::IncompleteBaseUri, "omitting {service}");
            assert_eq!(err.code(), 1003);
        }
    }

    #[test]
    fn non_map_base_uri_is_incomplete() {
        let mut args = SdkArgs::new();
        args.set("base_uri", "https://id.serato.com");
        assert_eq!(Sdk::new(args, "", "").unwrap_err(), ConfigError::IncompleteBaseUri);
    }

    #[test]
    fn each_unprefixed_uri_names_its_service() {
        let expected = [(ServiceName::Id, 1004), (ServiceName::License, 1005), (ServiceName::Profile, 1006), (ServiceName::Ecom, 1007)];
        for (service, code) in expected {
            let ArgValue::Map(mut map) = base_uri_map(None) else {
                unreachable!()
            };
            map.insert(service.as_str().to_string(), ArgValue::from("example.test"));
            let mut args = SdkArgs::new();
            args.set("base_uri", ArgValue::Map(map));
            let err = Sdk::new(args, "", "").unwrap_err();
            assert!(
                matches!(err, ConfigError::MissingProtocol { service: s, .. } if s == service),
                "{err}"
            );
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn non_string_uri_is_missing_protocol() {
        let ArgValue::Map(mut map) = base_uri_map(None) else {
            unreachable!()
        };
        map.insert("license".to_string(), ArgValue::from(443));
        let mut args = SdkArgs::new();
        args.set("base_uri", ArgValue::Map(map));
        assert_eq!(Sdk::new(args, "", "").unwrap_err().code(), 1005);
    }

    #[test]
    fn protocol_checks_run_in_service_order() {
        let bad: ArgValue = ServiceName::ALL
            .iter()
            .map(|s| (s.as_str(), format!("{s}.example.test")))
            .collect();
        let mut args = SdkArgs::new();
        args.set("base_uri", bad);
        assert_eq!(Sdk::new(args, "", "").unwrap_err().code(), 1004);
    }

    #[test]
    fn credentials_default_to_empty() {
        let sdk = Sdk::new(SdkArgs::new().env(Environment::Staging), "", "").unwrap();
        assert_eq!(sdk.app_id(), "");
        assert_eq!(sdk.app_password(), "");
    }

    #[test]
    fn setters_apply_to_later_clients_only() {
        let mut sdk = Sdk::new(SdkArgs::new().env(Environment::Staging), "app1", "secret1").unwrap();
        let before = sdk.create_identity_client();

        sdk.set_app_id("app2");
        sdk.set_app_password("secret2");
        assert_eq!(sdk.app_id(), "app2");
        assert_eq!(sdk.app_password(), "secret2");

        let after = sdk.create_identity_client();
        assert_eq!(before.app_id(), "app1");
        assert_eq!(before.app_password(), "secret1");
        assert_eq!(after.app_id(), "app2");
        assert_eq!(after.app_password(), "secret2");
    }

    #[test]
    fn debug_output_hides_the_password() {
        let mut sdk = Sdk::new(SdkArgs::new().env(Environment::Staging), "app1", "hunter2").unwrap();
        let printed = format!("{sdk:?}");
        assert!(printed.contains("app1"));
        assert!(!printed.contains("hunter2"), "{printed}");

        sdk.set_app_password("secret2");
        assert!(!format!("{sdk:#?}").contains("secret2"));
        assert!(!format!("{:?}", sdk.create_license_client()).contains("secret2"));
    }

    #[test]
    fn factory_creates_each_service_client() {
        let sdk = Sdk::new(SdkArgs::new().env(Environment::Production), "app1", "secret1").unwrap();
        assert_eq!(sdk.create_identity_client().base_uri(), "https://id.serato.com");
        assert_eq!(sdk.create_license_client().base_uri(), "https://license.serato.com");
        assert_eq!(sdk.create_profile_client().base_uri(), "https://profile.serato.com");
        assert_eq!(sdk.create_ecom_client().base_uri(), "https://ecom.serato.com");
    }

    #[test]
    fn created_clients_share_the_config() {
        let transport: Arc<dyn Transport> = Arc::new(NullTransport);
        let args = SdkArgs::new().env(Environment::Staging).timeout(9.0).handler(transport);
        let sdk = Sdk::new(args, "app1", "secret1").unwrap();
        let client = sdk.create_ecom_client();
        assert_eq!(client.core().config(), sdk.config());
        let req = client.build_request(HttpMethod::Get, "/api/v1/orders");
        assert_eq!(client.execute(&req).unwrap().status, 204);
    }
}
