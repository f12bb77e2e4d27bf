//! Extractor configuration shared by every route.
//!
//! Rejected bodies, paths and query strings are reported with the domain
//! error payload instead of Actix's plain-text defaults.

use std::future::{Ready, ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, error, web};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::Error;

/// Message for a path segment that cannot address a resource.
pub const NOT_FOUND: &str = "Not found.";

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        error::JsonPayloadError::ContentType => "Unsupported media type in request.".to_owned(),
        other => format!("JSON parse error - {other}"),
    };
    Error::invalid_request(message).into()
}

fn path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "unmatched path parameter");
    Error::not_found(NOT_FOUND).into()
}

/// JSON body configuration with domain-shaped errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

/// Path configuration: an unparsable identifier is a missing resource.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error)
}

/// Query-string extractor where a repeated key keeps its last value.
///
/// Every parameter arrives as a string, so handlers parse and ignore values
/// themselves; `?name=s&name=so` reads as `?name=so`.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<T> QueryParams<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for QueryParams<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: DeserializeOwned> QueryParams<T> {
    /// Parse a raw query string.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request [`Error`] when the parameters do not fit
    /// `T`.
    pub fn from_query(query: &str) -> Result<Self, Error> {
        let mut fields = Map::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            fields.insert(key.into_owned(), Value::String(value.into_owned()));
        }
        serde_json::from_value(Value::Object(fields))
            .map(Self)
            .map_err(|err| Error::invalid_request(format!("Query parse error - {err}")))
    }
}

impl<T: DeserializeOwned> FromRequest for QueryParams<T> {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_query(req.query_string()).map_err(Into::into))
    }
}
