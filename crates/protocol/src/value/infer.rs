//! Type inference for dynamically typed input
//!
//! Maps a `serde_json::Value` onto the closed set of encodable types. The
//! widest native type is chosen: `i64` for integers, `u64` only when the
//! integer does not fit in `i64`, and `f64` for everything else numeric.

use serde_json::Value as Json;

use super::Value;
use crate::{ProtocolError, Result};

pub(super) fn infer_value(value: &Json) -> Result<Value> {
    match value {
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Number(n) => Ok(infer_number(n)),
        Json::Array(items) => infer_array(items),
        other => Err(ProtocolError::unsupported_type(format!(
            "cannot encode JSON {}",
            json_kind(other)
        ))),
    }
}

fn infer_number(n: &serde_json::Number) -> Value {
    if let Some(v) = n.as_i64() {
        Value::I64(v)
    } else if let Some(v) = n.as_u64() {
        Value::U64(v)
    } else {
        Value::F64(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn infer_array(items: &[Json]) -> Result<Value> {
    if items.is_empty() {
        return Ok(Value::ArrayF64(Vec::new()));
    }

    if items.iter().all(Json::is_string) {
        let strings = items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect();
        return Ok(Value::ArrayString(strings));
    }

    let numbers = items
        .iter()
        .map(|item| match item {
            Json::Number(n) => Ok(n),
            other => Err(ProtocolError::unsupported_type(format!(
                "array element is a JSON {}; arrays must be all numbers or all strings",
                json_kind(other)
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(ints) = numbers.iter().map(|n| n.as_i64()).collect::<Option<Vec<_>>>() {
        return Ok(Value::ArrayI64(ints));
    }
    if let Some(uints) = numbers.iter().map(|n| n.as_u64()).collect::<Option<Vec<_>>>() {
        return Ok(Value::ArrayU64(uints));
    }

    let floats = numbers
        .iter()
        .map(|n| n.as_f64().unwrap_or(f64::NAN))
        .collect();
    Ok(Value::ArrayF64(floats))
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object (complex or structured values are not supported)",
    }
}
