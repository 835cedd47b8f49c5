//! Helpers for reading visualization settings out of a JSON params object.
//!
//! Readers never fail: a missing key or a value of the wrong type yields the
//! default. Range checks that matter for geometry happen later, when the
//! field is constructed.

use crate::error::EngineError;
use serde_json::{json, Value};

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Integers are accepted and converted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Like [`param_f64`] but clamps the result into `[min, max]`.
///
/// Used for blend-like settings where any value outside the range is meaningless.
pub fn param_f64_clamped(params: &Value, name: &str, default: f64, min: f64, max: f64) -> f64 {
    let v = param_f64(params, name, default);
    if v.is_nan() {
        default
    } else {
        v.clamp(min, max)
    }
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or
/// not a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// One `param_schema()` entry for a numeric setting.
pub fn number_schema(default: f64, min: f64, max: f64, description: &str) -> Value {
    json!({
        "type": "number",
        "default": default,
        "min": min,
        "max": max,
        "description": description,
    })
}

/// One `param_schema()` entry for an integer setting.
pub fn integer_schema(default: usize, min: usize, max: usize, description: &str) -> Value {
    json!({
        "type": "integer",
        "default": default,
        "min": min,
        "max": max,
        "description": description,
    })
}

/// Checks every key of `params` against a `param_schema()` object.
///
/// The readers above silently fall back to defaults; this is the strict path
/// for user-supplied overrides. A key the schema does not list yields
/// `EngineError::ParamNotFound`, a value of the wrong JSON type
/// `EngineError::ParamTypeMismatch`.
pub fn check_params(params: &Value, schema: &Value) -> Result<(), EngineError> {
    let Some(entries) = params.as_object() else {
        return Err(EngineError::ParamTypeMismatch {
            name: "params".into(),
            expected: "object".into(),
            got: json_type(params).into(),
        });
    };
    for (name, value) in entries {
        let expected = schema
            .get(name)
            .and_then(|entry| entry.get("type"))
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::ParamNotFound(name.clone()))?;
        let matches = match expected {
            "number" => value.is_number(),
            "integer" => value.is_u64(),
            "boolean" => value.is_boolean(),
            _ => true,
        };
        if !matches {
            return Err(EngineError::ParamTypeMismatch {
                name: name.clone(),
                expected: expected.into(),
                got: json_type(value).into(),
            });
        }
    }
    Ok(())
}

/// JSON type name as used in schemas and error messages.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
