//! Declarative checks over a step's resolved inputs or raw output.

use regex::Regex;

use stepcore::value::{display_string, length, split_path, traverse_map, type_name};
use stepcore::{StepValidation, ValidationTarget, Value, ValueMap};

const KNOWN_TYPES: [&str; 6] = ["str", "int", "float", "list", "dict", "bool"];

/// Failed checks, split by whether they are critical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run every validation aimed at `target` against `data`.
///
/// All checks run; nothing short-circuits. A failure goes to `errors` when
/// the validation is critical and to `warnings` otherwise, using the custom
/// message if one is set.
pub fn check(data: &ValueMap, validations: &[StepValidation], target: ValidationTarget) -> ValidationReport {
    let mut report = ValidationReport::default();
    for validation in validations.iter().filter(|v| v.target == target) {
        let value = lookup(data, &validation.field);
        let Some(default_message) = run_check(value, validation) else {
            continue;
        };
        let message = validation.message.clone().unwrap_or(default_message);
        if validation.critical {
            report.errors.push(message);
        } else {
            report.warnings.push(message);
        }
    }
    report
}

// Absent paths are a value of their own here, not an error.
fn lookup<'v>(data: &'v ValueMap, field: &str) -> Option<&'v Value> {
    traverse_map(data, &split_path(field)).ok()
}

fn run_check(value: Option<&Value>, validation: &StepValidation) -> Option<String> {
    let field = &validation.field;
    let param = validation.value.as_deref().unwrap_or("");
    let present = value.filter(|v| !v.is_null());

    match validation.check.as_str() {
        "not_null" => present.is_none().then(|| format!("'{field}' is null")),
        "not_empty" => {
            let empty = match present {
                None => true,
                Some(v) => length(v) == Some(0),
            };
            empty.then(|| format!("'{field}' is empty"))
        }
        "min_length" => {
            let Some(v) = present else {
                return Some(format!("'{field}' is null (expected min_length {param})"));
            };
            let min = match param {
                "" => Some(0),
                p => p.trim().parse::<usize>().ok(),
            };
            let Some(min) = min else {
                return Some(format!("'{field}' has invalid min_length '{param}'"));
            };
            match length(v) {
                None => Some(format!("'{field}' has no length (type: {})", type_name(v))),
                Some(len) if len < min => Some(format!("'{field}' length {len} < {param}")),
                Some(_) => None,
            }
        }
        "regex" => {
            let Some(v) = present else {
                return Some(format!("'{field}' is null (expected to match /{param}/)"));
            };
            match Regex::new(param) {
                Ok(re) if re.is_match(&display_string(v)) => None,
                Ok(_) => Some(format!("'{field}' does not match /{param}/")),
                Err(_) => Some(format!("Invalid regex /{param}/ for '{field}'")),
            }
        }
        "type" => {
            if !KNOWN_TYPES.contains(&param) {
                return Some(format!("Unknown type check: '{param}'"));
            }
            let actual = value.map(type_name).unwrap_or("null");
            (actual != param).then(|| format!("'{field}' is {actual}, expected {param}"))
        }
        other => Some(format!("Unknown check: '{other}'")),
    }
}
