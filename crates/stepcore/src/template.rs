//! `{{key}}` placeholder substitution into nested request templates.
//!
//! A string that is exactly one placeholder is replaced by the bound value
//! itself, keeping its type. Placeholders embedded in longer strings are
//! interpolated as text. Non-string leaves pass through untouched.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::value::{display_string, Value, ValueMap};
use crate::TemplateError;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"))
}

fn exact_placeholder() -> &'static Regex {
    static EXACT: OnceLock<Regex> = OnceLock::new();
    EXACT.get_or_init(|| Regex::new(r"^\{\{(\w+)\}\}$").expect("placeholder pattern is valid"))
}

/// Render `template` against `values`.
///
/// In strict mode an unbound key is an error; otherwise the placeholder text
/// is left as it was.
pub fn render_template(
    template: &Value,
    values: &ValueMap,
    strict: bool,
) -> Result<Value, TemplateError> {
    match template {
        Value::Object(map) => {
            let mut rendered = ValueMap::with_capacity(map.len());
            for (key, value) in map {
                rendered.insert(key.clone(), render_template(value, values, strict)?);
            }
            Ok(Value::Object(rendered))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| render_template(item, values, strict))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::String(text) => render_str(text, values, strict),
        other => Ok(other.clone()),
    }
}

fn render_str(template: &str, values: &ValueMap, strict: bool) -> Result<Value, TemplateError> {
    if let Some(caps) = exact_placeholder().captures(template) {
        let key = &caps[1];
        return match values.get(key) {
            Some(value) => Ok(value.clone()),
            None if strict => Err(TemplateError::MissingKey(key.to_string())),
            None => Ok(Value::String(template.to_string())),
        };
    }

    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in placeholder().captures_iter(template) {
        let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        match values.get(key.as_str()) {
            Some(value) => out.push_str(&display_string(value)),
            None if strict => return Err(TemplateError::MissingKey(key.as_str().to_string())),
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(Value::String(out))
}

/// All placeholder names found anywhere in `template`.
pub fn extract_template_keys(template: &Value) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    collect_keys(template, &mut keys);
    keys
}

fn collect_keys(template: &Value, keys: &mut BTreeSet<String>) {
    match template {
        Value::Object(map) => map.values().for_each(|v| collect_keys(v, keys)),
        Value::Array(items) => items.iter().for_each(|v| collect_keys(v, keys)),
        Value::String(text) => {
            for caps in placeholder().captures_iter(text) {
                keys.insert(caps[1].to_string());
            }
        }
        _ => {}
    }
}
