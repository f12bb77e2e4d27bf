//! Recipe write payloads from JSON or multipart bodies.
//!
//! Both encodings produce the same [`RecipeInput`]; type mismatches are kept
//! as [`Submitted::Invalid`] so the domain reports them next to every other
//! field problem.

use actix_multipart::{Field, Multipart};
use actix_web::http::header::{self, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::TryStreamExt;
use futures_util::future::LocalBoxFuture;
use serde_json::{Map, Value};

use crate::domain::image::INVALID_IMAGE;
use crate::domain::recipe::{INVALID_INTEGER, INVALID_LIST};
use crate::domain::{Error, FieldErrors, IngredientAmountInput, ImageUpload, RecipeInput, Submitted};

/// Upper bound for a single multipart part.
const MAX_PART_BYTES: usize = 10 * 1024 * 1024;

const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Recipe write body, decoded from `application/json` or `multipart/form-data`.
#[derive(Debug)]
pub struct RecipePayload(pub RecipeInput);

impl RecipePayload {
    pub fn into_inner(self) -> RecipeInput {
        self.0
    }
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("multipart/form-data"))
}

impl FromRequest for RecipePayload {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if is_multipart(req.headers()) {
            let multipart = Multipart::from_request(req, payload);
            Box::pin(async move {
                let multipart = multipart.await.map_err(|error| {
                    Error::invalid_request(format!("Multipart form parse error - {error}"))
                })?;
                from_multipart(multipart).await.map(Self)
            })
        } else {
            let json = web::Json::<Value>::from_request(req, payload);
            Box::pin(async move {
                let body = json.await.map_err(|error| {
                    Error::invalid_request(format!("JSON parse error - {error}"))
                })?;
                from_json(body.into_inner()).map(Self)
            })
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Decode a JSON object body.
pub fn from_json(body: Value) -> Result<RecipeInput, Error> {
    let Value::Object(mut fields) = body else {
        return Err(FieldErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type(&body)
            ),
        ));
    };
    Ok(RecipeInput {
        name: present(&mut fields, "name").map(text),
        text: present(&mut fields, "text").map(text),
        cooking_time: present(&mut fields, "cooking_time").map(|value| integer(&value)),
        image: present(&mut fields, "image").map(|value| image_from_json(&value)),
        ingredients: present(&mut fields, "ingredients").map(|value| ingredients(&value)),
    })
}

/// Remove `key` from `fields`; `null` counts as absent.
fn present(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    fields.remove(key).filter(|value| !value.is_null())
}

fn text(value: Value) -> String {
    match value {
        Value::String(raw) => raw,
        other => other.to_string(),
    }
}

fn integer(value: &Value) -> Submitted<i64> {
    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    };
    parsed.map_or(Submitted::Invalid(INVALID_INTEGER), Submitted::Value)
}

fn image_from_json(value: &Value) -> Submitted<ImageUpload> {
    value
        .as_str()
        .and_then(|raw| ImageUpload::from_base64(raw).ok())
        .map_or(Submitted::Invalid(INVALID_IMAGE), Submitted::Value)
}

fn ingredients(value: &Value) -> Submitted<Vec<IngredientAmountInput>> {
    match value {
        Value::Array(items) => Submitted::Value(items.iter().map(amount_entry).collect()),
        _ => Submitted::Invalid(INVALID_LIST),
    }
}

fn amount_entry(value: &Value) -> IngredientAmountInput {
    let Value::Object(entry) = value else {
        return IngredientAmountInput::default();
    };
    let field = |key: &str| {
        entry
            .get(key)
            .filter(|value| !value.is_null())
            .map(integer)
    };
    IngredientAmountInput {
        id: field("id"),
        amount: field("amount"),
    }
}

async fn read_part(field: &mut Field) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > MAX_PART_BYTES {
            return Err(Error::invalid_request("Multipart part is too large."));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn multipart_error(error: actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("Multipart form parse error - {error}"))
}

fn part_text(name: &str, bytes: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(bytes)
        .map_err(|_| FieldErrors::single(name, "Text parts must be valid UTF-8."))
}

/// Decode a `multipart/form-data` body.
///
/// `ingredients` is a JSON-encoded text part; `image` is a file part or a
/// base64 text part.
pub async fn from_multipart(mut multipart: Multipart) -> Result<RecipeInput, Error> {
    let mut input = RecipeInput::default();
    while let Some(mut field) = multipart.try_next().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        let is_file = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .is_some();
        let bytes = read_part(&mut field).await?;
        match name.as_str() {
            "name" => input.name = Some(part_text(&name, bytes)?),
            "text" => input.text = Some(part_text(&name, bytes)?),
            "cooking_time" => {
                input.cooking_time = Some(integer(&Value::String(part_text(&name, bytes)?)));
            }
            "image" if is_file => {
                input.image = Some(
                    ImageUpload::from_bytes(bytes)
                        .map_or(Submitted::Invalid(INVALID_IMAGE), Submitted::Value),
                );
            }
            "image" => {
                input.image = Some(image_from_json(&Value::String(part_text(&name, bytes)?)));
            }
            "ingredients" => {
                let raw = part_text(&name, bytes)?;
                input.ingredients = Some(
                    serde_json::from_str::<Value>(&raw)
                        .map_or(Submitted::Invalid(INVALID_LIST), |value| ingredients(&value)),
                );
            }
            other => tracing::debug!(part = other, "ignoring unknown multipart part"),
        }
    }
    Ok(input)
}
