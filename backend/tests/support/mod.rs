//! Shared harness for Foodgram integration tests.
//!
//! Builds the real application (services, handlers, middleware) over an
//! [`InMemoryStore`] and offers small helpers for signing users up and
//! sending JSON requests through `actix_web::test`.

#![allow(dead_code, reason = "each test crate uses a different subset of helpers")]

pub mod embedded_postgres;
pub mod pg_cluster;

use std::sync::Arc;

use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{Local, TimeZone};
use foodgram::Trace;
use foodgram::inbound::http::configure_api;
use foodgram::inbound::http::session_config::SessionSettings;
use foodgram::inbound::http::short_links::follow_short_link;
use foodgram::inbound::http::validation::{json_config, path_config};
use foodgram::test_support::InMemoryStore;
use mockable::MockClock;
use serde_json::{Value, json};

/// One-pixel GIF accepted as a recipe image or avatar.
pub const GIF_DATA_URI: &str = "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

/// Default password used by [`sign_up`].
pub const PASSWORD: &str = "s3cret-pass";

fn fixed_clock() -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_local().returning(|| {
        Local
            .with_ymd_and_hms(2026, 10, 16, 12, 0, 0)
            .single()
            .expect("valid local time")
    });
    clock
}

/// Application wired like the server, minus media files and Swagger.
pub fn build_app(
    store: &InMemoryStore,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };
    App::new()
        .app_data(web::Data::new(store.http_state(Arc::new(fixed_clock()))))
        .app_data(json_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(session.middleware())
                .configure(configure_api),
        )
        .service(follow_short_link)
}

/// Status and decoded body; non-JSON bodies decode to `Value::Null`.
pub async fn send<S>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

/// Attach `cookie` when present.
pub fn as_user(req: test::TestRequest, cookie: Option<&Cookie<'static>>) -> test::TestRequest {
    match cookie {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    }
}

/// A registered, logged-in user.
pub struct SignedIn {
    pub id: i64,
    pub cookie: Cookie<'static>,
}

/// Register `username` and log in, returning the id and session cookie.
pub async fn sign_up<S>(app: &S, username: &str) -> SignedIn
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let email = format!("{username}@example.com");
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "email": email,
            "username": username,
            "first_name": "Test",
            "last_name": "Cook",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_i64().expect("user id");

    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": email, "password": PASSWORD}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned();
    SignedIn { id, cookie }
}

/// JSON body for a recipe with the given `(ingredient id, amount)` lines.
pub fn recipe_body(name: &str, lines: &[(i64, i64)]) -> Value {
    json!({
        "name": name,
        "text": format!("How to make {name}."),
        "cooking_time": 15,
        "image": GIF_DATA_URI,
        "ingredients": lines
            .iter()
            .map(|(id, amount)| json!({"id": id, "amount": amount}))
            .collect::<Vec<_>>(),
    })
}

/// Publish a recipe as `author` and return its id.
pub async fn publish<S>(app: &S, author: &SignedIn, name: &str, lines: &[(i64, i64)]) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/recipes")
            .cookie(author.cookie.clone())
            .set_json(recipe_body(name, lines)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().expect("recipe id")
}
