//! Built-in node handlers.
//!
//! Each submodule owns one node type and exposes a `register` function;
//! [`register_all`] is the single initialization routine that wires them into
//! a [`HandlerRegistry`].

pub mod delay;
pub mod discord;
pub mod minitap;
pub mod process;
pub mod slack;
pub mod start;

use serde_json::{Map, Value};
use tracing::warn;

use crate::registry::{BuiltinOptions, HandlerRegistry};

/// Register every built-in handler.
pub fn register_all(registry: &mut HandlerRegistry, options: &BuiltinOptions) {
    let client = reqwest::Client::builder()
        .timeout(options.http_timeout)
        .build()
        .unwrap_or_else(|err| {
            warn!(error = %err, "failed to build HTTP client with timeout, using defaults");
            reqwest::Client::new()
        });

    start::register(registry);
    delay::register(registry);
    process::register(registry);
    slack::register(registry);
    discord::register(registry, client.clone());
    minitap::register(registry, client);
}

/// Non-empty string field of a node's configuration.
pub(crate) fn config_str<'a>(config: &'a Value, key: &str) -> Option<&'a str> {
    config
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Items carried by the first input slot.
///
/// An array contributes its elements, an empty slot or `null` contributes
/// nothing, any other value is treated as a single item.
pub(crate) fn first_input_items(inputs: &[Option<Value>]) -> Vec<Value> {
    match inputs.first().and_then(Option::as_ref) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

/// Copy `item` and attach `tag` under `key`. Non-object items are kept under
/// `value`.
pub(crate) fn tag_item(item: Value, key: &str, tag: Value) -> Value {
    let mut fields = into_fields(item);
    fields.insert(key.to_owned(), tag);
    Value::Object(fields)
}

pub(crate) fn into_fields(item: Value) -> Map<String, Value> {
    match item {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_owned(), other);
            map
        }
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
