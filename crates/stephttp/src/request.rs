use regex::Regex;
use std::sync::OnceLock;

use stepcore::value::display_string;
use stepcore::{StepExecutionError, Value, ValueMap};

fn path_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("static regex"))
}

/// `base_url` joined with `path`, with exactly one slash between them.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Substitute the declared `params` into `path`, removing them from `inputs`.
pub(crate) fn substitute_declared(path: &str, params: &[String], inputs: &mut ValueMap) -> String {
    let mut path = path.to_string();
    for param in params {
        if let Some(value) = inputs.remove(param) {
            path = path.replace(&format!("{{{param}}}"), &display_string(&value));
        }
    }
    path
}

/// Substitute every `{name}` placeholder found in `path` that has an input.
pub(crate) fn substitute_placeholders(path: &str, inputs: &mut ValueMap) -> String {
    let names: Vec<String> = path_placeholder()
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect();
    substitute_declared(path, &names, inputs)
}

/// Move the declared query params out of `inputs`.
pub(crate) fn take_query(params: &[String], inputs: &mut ValueMap) -> ValueMap {
    params
        .iter()
        .filter_map(|p| inputs.remove(p).map(|v| (p.clone(), v)))
        .collect()
}

/// Flatten a mapping into `key=value` pairs. Lists repeat the key; nulls are
/// dropped.
pub(crate) fn to_pairs(values: &ValueMap) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in values {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| (key.clone(), display_string(item))));
            }
            other => pairs.push((key.clone(), display_string(other))),
        }
    }
    pairs
}

/// Form fields from a rendered body, which must be a mapping.
pub(crate) fn form_fields(body: &Value) -> Result<Vec<(String, String)>, StepExecutionError> {
    match body {
        Value::Object(map) => Ok(to_pairs(map)),
        other => Err(StepExecutionError::InvalidRequest(format!(
            "form-encoded body must be a mapping, got {}",
            stepcore::value::type_name(other)
        ))),
    }
}
