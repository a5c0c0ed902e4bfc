use serde_json::json;

use stepcore::value::{split_path, traverse};
use stepcore::{ResponseExtractConfig, StepExecutionError, Value, ValueMap};

/// Turn a successful response body into a step output.
///
/// Bodies that are not JSON come back as `{status_code, body}`. With an
/// extraction descriptor the output holds exactly its fields; without one a
/// list is wrapped as `{items, count}` and any other non-mapping as `{value}`.
pub(crate) fn to_output(
    status: u16,
    body: &str,
    extract: Option<&ResponseExtractConfig>,
) -> Result<ValueMap, StepExecutionError> {
    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(_) => {
            tracing::debug!("Response is not JSON; returning raw body");
            return Ok(as_map(json!({"status_code": status, "body": body})));
        }
    };

    match extract {
        Some(extract) if !extract.fields.is_empty() => extract_fields(&data, extract),
        _ => Ok(wrap(data)),
    }
}

fn extract_fields(data: &Value, extract: &ResponseExtractConfig) -> Result<ValueMap, StepExecutionError> {
    let mut output = ValueMap::new();
    for (key, path) in &extract.fields {
        let value = match traverse(data, &split_path(path)) {
            Ok(found) => found.clone(),
            Err(_) if !extract.strict => Value::Null,
            Err(_) => return Err(StepExecutionError::Extraction { path: path.clone() }),
        };
        output.insert(key.clone(), value);
    }
    Ok(output)
}

fn wrap(data: Value) -> ValueMap {
    match data {
        Value::Object(map) => map,
        Value::Array(items) => {
            let count = items.len();
            as_map(json!({"items": items, "count": count}))
        }
        scalar => as_map(json!({"value": scalar})),
    }
}

fn as_map(value: Value) -> ValueMap {
    match value {
        Value::Object(map) => map,
        _ => ValueMap::new(),
    }
}
