//! Template expression resolution for handler payloads.
//!
//! Replaces placeholders of the form `{{ $json.some.path }}` with values
//! looked up in an upstream data item (`{ "json": { ... } }`). Unresolvable
//! placeholders are left in the output verbatim.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::warn;

fn placeholder_regex() -> Option<&'static Regex> {
    static PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| match Regex::new(r"\{\{\s*\$json\.([\w.]+)\s*\}\}") {
            Ok(re) => Some(re),
            Err(err) => {
                warn!(error = %err, "placeholder pattern failed to compile");
                None
            }
        })
        .as_ref()
}

/// Resolve every `{{ $json.<path> }}` placeholder in `template` against `item`.
///
/// Returns `template` unchanged when `item` is absent or its `json` field is
/// not an object or array.
pub fn resolve(template: &str, item: Option<&Value>) -> String {
    let root = match item.and_then(|i| i.get("json")) {
        Some(json @ (Value::Object(_) | Value::Array(_))) => json,
        _ => return template.to_owned(),
    };

    let Some(placeholder) = placeholder_regex() else {
        return template.to_owned();
    };

    placeholder
        .replace_all(template, |caps: &Captures<'_>| {
            match lookup(root, &caps[1]) {
                Some(value) => render(value),
                None => caps[0].to_owned(),
            }
        })
        .into_owned()
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Display on Value is compact JSON for objects, arrays and scalars alike.
        other => other.to_string(),
    }
}
