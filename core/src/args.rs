//! The configuration bag accepted by `Sdk::new`.
//!
//! # Design
//! Configuration often arrives from loosely typed sources (JSON documents,
//! host languages over FFI), so the bag stores `ArgValue`s and leaves type
//! checking to `Sdk::new`. Only the four recognized slots are kept; anything
//! else is dropped on the way in.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::config::{BaseUris, Environment, ServiceName};
use crate::transport::Transport;

/// A loosely typed configuration value.
#[derive(Clone)]
pub enum ArgValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<ArgValue>),
    Map(BTreeMap<String, ArgValue>),
    Transport(Arc<dyn Transport>),
}

impl ArgValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Null => "null",
            ArgValue::Bool(_) => "bool",
            ArgValue::Int(_) | ArgValue::UInt(_) => "int",
            ArgValue::Float(_) => "float",
            ArgValue::Str(_) => "string",
            ArgValue::List(_) => "list",
            ArgValue::Map(_) => "map",
            ArgValue::Transport(_) => "transport",
        }
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => f.write_str("Null"),
            ArgValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            ArgValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            ArgValue::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            ArgValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            ArgValue::Str(v) => f.debug_tuple("Str").field(v).finish(),
            ArgValue::List(v) => f.debug_tuple("List").field(v).finish(),
            ArgValue::Map(v) => f.debug_tuple("Map").field(v).finish(),
            ArgValue::Transport(_) => f.write_str("Transport(..)"),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(v.into())
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<Arc<dyn Transport>> for ArgValue {
    fn from(v: Arc<dyn Transport>) -> Self {
        ArgValue::Transport(v)
    }
}

impl From<BaseUris> for ArgValue {
    fn from(uris: BaseUris) -> Self {
        let map = ServiceName::ALL
            .iter()
            .map(|&s| (s.as_str().to_string(), ArgValue::Str(uris.get(s).to_string())))
            .collect();
        ArgValue::Map(map)
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for ArgValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ArgValue::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<&serde_json::Value> for ArgValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ArgValue::Null,
            Value::Bool(b) => ArgValue::Bool(*b),
            // Only a fraction or exponent makes a float; integers of any
            // magnitude stay integers.
            Value::Number(n) if n.is_f64() => ArgValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => ArgValue::Int(i),
                (None, Some(u)) => ArgValue::UInt(u),
                (None, None) => ArgValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ArgValue::Str(s.clone()),
            Value::Array(items) => ArgValue::List(items.iter().map(ArgValue::from).collect()),
            Value::Object(map) => {
                ArgValue::Map(map.iter().map(|(k, v)| (k.clone(), ArgValue::from(v))).collect())
            }
        }
    }
}

/// Caller-supplied configuration for `Sdk::new`.
///
/// Recognized keys: `timeout`, `handler`, `env`, `base_uri`.
#[derive(Debug, Clone, Default)]
pub struct SdkArgs {
    pub(crate) timeout: Option<ArgValue>,
    pub(crate) handler: Option<ArgValue>,
    pub(crate) env: Option<ArgValue>,
    pub(crate) base_uri: Option<ArgValue>,
}

impl SdkArgs {
    pub const TIMEOUT: &'static str = "timeout";
    pub const HANDLER: &'static str = "handler";
    pub const ENV: &'static str = "env";
    pub const BASE_URI: &'static str = "base_uri";

    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from a JSON object. Unknown keys are ignored, and a
    /// document that is not an object yields an empty bag.
    pub fn from_json(document: &serde_json::Value) -> Self {
        let mut args = Self::new();
        if let Some(object) = document.as_object() {
            for (key, value) in object {
                args.set(key, ArgValue::from(value));
            }
        }
        args
    }

    /// Store `value` under `key`. Unrecognized keys are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<ArgValue>) -> &mut Self {
        let slot = match key {
            Self::TIMEOUT => &mut self.timeout,
            Self::HANDLER => &mut self.handler,
            Self::ENV => &mut self.env,
            Self::BASE_URI => &mut self.base_uri,
            other => {
                trace!(key = other, "ignoring unrecognized configuration key");
                return self;
            }
        };
        *slot = Some(value.into());
        self
    }

    pub fn timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(ArgValue::Float(seconds));
        self
    }

    pub fn handler(mut self, transport: Arc<dyn Transport>) -> Self {
        self.handler = Some(ArgValue::Transport(transport));
        self
    }

    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(ArgValue::Str(env.as_str().to_string()));
        self
    }

    pub fn base_uri(mut self, uris: BaseUris) -> Self {
        self.base_uri = Some(uris.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        match key {
            Self::TIMEOUT => self.timeout.as_ref(),
            Self::HANDLER => self.handler.as_ref(),
            Self::ENV => self.env.as_ref(),
            Self::BASE_URI => self.base_uri.as_ref(),
            _ => None,
        }
    }
}
