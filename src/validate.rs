//! Field-level checks for JSON request bodies.
//!
//! Every helper returns the caller-facing detail on failure; the handlers
//! wrap it into `AppError::Validation`.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::models::rating::{MAX_SCORE, MIN_SCORE};

/// Date-time layouts accepted for `data_hora`.
const DATE_TIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Decode a request body into a JSON object.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err("corpo da requisição vazio".to_string());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("corpo da requisição deve ser um objeto JSON".to_string()),
        Err(e) => Err(format!("JSON inválido: {e}")),
    }
}

/// Coerce a field to an integer: JSON integers, floats (truncated toward
/// zero) and numeric strings are accepted.
pub fn coerce_int(body: &Map<String, Value>, field: &str) -> Result<i64, String> {
    let invalid = || format!("campo '{field}' deve ser um número inteiro");
    match body.get(field) {
        None | Some(Value::Null) => Err(format!("campo '{field}' é obrigatório")),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// A required string field.
pub fn require_string(body: &Map<String, Value>, field: &str) -> Result<String, String> {
    match body.get(field) {
        None | Some(Value::Null) => Err(format!("campo '{field}' é obrigatório")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(format!("campo '{field}' deve ser texto")),
    }
}

/// An optional string field; absent or null yields an empty string.
pub fn optional_string(body: &Map<String, Value>, field: &str) -> Result<String, String> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(format!("campo '{field}' deve ser texto")),
    }
}

/// Validate a required text field with a max length (in characters).
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("campo '{field_name}' é obrigatório"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("campo '{field_name}' deve ter no máximo {max_len} caracteres"));
    }
    None
}

/// Scores must lie in `MIN_SCORE..=MAX_SCORE`.
pub fn validate_score(score: i64) -> Option<String> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Some(format!("nota deve ser entre {MIN_SCORE} e {MAX_SCORE}"));
    }
    None
}

pub fn parse_date_time(value: &str) -> Result<NaiveDateTime, String> {
    let trimmed = value.trim();
    DATE_TIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            format!("campo 'data_hora' inválido: '{value}', esperado AAAA-MM-DD HH:MM[:SS]")
        })
}

/// Store participant lists as text: strings verbatim, anything else as JSON.
pub fn participants_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
