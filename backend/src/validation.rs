//! Turns a raw request body into a [`LoanApplication`].
//!
//! Urlencoded forms, multipart forms and JSON bodies are accepted. Every
//! field is required and must be an integer; all problems are reported at
//! once.

use crate::error::ApiError;
use crate::models::{FieldError, LoanApplication, FEATURE_NAMES};
use actix_multipart::{Multipart, MultipartError};
use actix_web::error::PayloadError;
use actix_web::http::header::HeaderMap;
use actix_web::web::Bytes;
use futures::StreamExt;
use serde_json::{Map, Value};

const MSG_MISSING: &str = "Field required";
const MSG_INT_PARSING: &str = "Input should be a valid integer, unable to parse string as an integer";
const MSG_INT_FROM_FLOAT: &str = "Input should be a valid integer, got a number with a fractional part";
const MSG_INT_SIZE: &str = "Input should be a valid integer, the number is too large";
const MSG_INT_TYPE: &str = "Input should be a valid integer";

/// Body encodings accepted by the predict endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Form,
    Multipart,
    Json,
}

impl BodyFormat {
    /// Picks the decoder from the media type; urlencoded is the fallback.
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.trim();
        if content_type.eq_ignore_ascii_case("application/json") {
            BodyFormat::Json
        } else if content_type.eq_ignore_ascii_case("multipart/form-data") {
            BodyFormat::Multipart
        } else {
            BodyFormat::Form
        }
    }
}

/// Decodes and validates a request body in one step.
///
/// `headers` are only read for multipart bodies, which carry their boundary
/// in the content type.
pub async fn parse_application(
    format: BodyFormat,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<LoanApplication, ApiError> {
    let fields = match format {
        BodyFormat::Form => decode_form(&body),
        BodyFormat::Multipart => decode_multipart(headers, body).await,
        BodyFormat::Json => decode_json(&body),
    }
    .map_err(|e| ApiError::Validation(vec![e]))?;
    validate(&fields).map_err(ApiError::Validation)
}

// An empty form input counts as not submitted.
fn insert_form_value(fields: &mut Map<String, Value>, name: String, value: String) {
    if value.is_empty() {
        fields.remove(&name);
    } else {
        fields.insert(name, Value::String(value));
    }
}

fn decode_form(body: &[u8]) -> Result<Map<String, Value>, FieldError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|_| FieldError::body("value_error", "Form body could not be decoded"))?;

    let mut fields = Map::new();
    for (name, value) in pairs {
        insert_form_value(&mut fields, name, value);
    }
    Ok(fields)
}

async fn decode_multipart(headers: &HeaderMap, body: Bytes) -> Result<Map<String, Value>, FieldError> {
    let undecodable =
        |_: MultipartError| FieldError::body("value_error", "Multipart body could not be decoded");

    let stream = futures::stream::once(async move { Ok::<_, PayloadError>(body) });
    let mut multipart = Multipart::new(headers, stream);
    let mut fields = Map::new();

    while let Some(field) = multipart.next().await {
        let mut field = field.map_err(undecodable)?;
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let mut value = Vec::new();
        while let Some(chunk) = field.next().await {
            value.extend_from_slice(&chunk.map_err(undecodable)?);
        }
        insert_form_value(&mut fields, name, String::from_utf8_lossy(&value).into_owned());
    }
    Ok(fields)
}

fn decode_json(body: &[u8]) -> Result<Map<String, Value>, FieldError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(FieldError::body(
            "model_attributes_type",
            "Input should be a valid dictionary or object to extract fields from",
        )),
        Err(e) => Err(FieldError::body("json_invalid", &format!("JSON decode error: {e}"))),
    }
}

/// Checks the five required fields, collecting every failure.
pub fn validate(fields: &Map<String, Value>) -> Result<LoanApplication, Vec<FieldError>> {
    let mut values = [0i64; 5];
    let mut errors = Vec::new();

    for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
        match fields.get(name) {
            None => errors.push(FieldError::field(name, "missing", MSG_MISSING, Value::Null)),
            Some(value) => match parse_integer(value) {
                Ok(parsed) => *slot = parsed,
                Err((kind, msg)) => errors.push(FieldError::field(name, kind, msg, value.clone())),
            },
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let [age, annual_income, credit_score, employment_years, loan_amount_requested] = values;
    Ok(LoanApplication {
        age,
        annual_income,
        credit_score,
        employment_years,
        loan_amount_requested,
    })
}

fn parse_integer(value: &Value) -> Result<i64, (&'static str, &'static str)> {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ("int_parsing", MSG_INT_PARSING)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() != 0.0 => Err(("int_from_float", MSG_INT_FROM_FLOAT)),
                Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
                _ => Err(("int_parsing_size", MSG_INT_SIZE)),
            }
        }
        _ => Err(("int_type", MSG_INT_TYPE)),
    }
}
