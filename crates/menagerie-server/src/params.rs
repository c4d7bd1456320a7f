//! Request parameter merging.

use menagerie_core::{Fault, Params};
use serde_json::Value;

/// Merges body, query and path parameters into one mapping.
///
/// Later sources override earlier ones: body, then query, then path. Query
/// and path values arrive as strings and are left for the validator to
/// coerce. A repeated query key keeps its last value.
///
/// # Errors
///
/// Returns [`Fault::MalformedBody`] if a non-empty body is not a JSON object
/// and [`Fault::MalformedQuery`] if the query string cannot be decoded.
///
/// # Example
///
/// ```
/// use menagerie_server::merge_params;
/// use serde_json::json;
///
/// let params = merge_params(br#"{"page": 1}"#, Some("page=2"), [("petId", "7")]).unwrap();
/// assert_eq!(params["page"], json!("2"));
/// assert_eq!(params["petId"], json!("7"));
/// ```
pub fn merge_params<'a, I>(body: &[u8], query: Option<&str>, path: I) -> Result<Params, Fault>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut params = body_params(body)?;

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        // serde_urlencoded replaces invalid UTF-8 instead of failing.
        std::str::from_utf8(&urlencoding::decode_binary(query.as_bytes()))
            .map_err(|e| Fault::malformed_query(e.to_string()))?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| Fault::malformed_query(e.to_string()))?;
        for (key, value) in pairs {
            params.insert(key, Value::String(value));
        }
    }

    for (key, value) in path {
        params.insert(key.to_string(), Value::String(value.to_string()));
    }

    Ok(params)
}

fn body_params(body: &[u8]) -> Result<Params, Fault> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Params::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Fault::malformed_body(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
        Err(e) => Err(Fault::malformed_body(e.to_string())),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
