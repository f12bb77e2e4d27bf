//! Handler tests for the account endpoints.

use super::*;
use crate::domain::image::fixtures::{GIF_BYTES, gif_data_uri};
use crate::domain::{User, UserProfile, Viewer};
use crate::inbound::http::test_utils::{
    MockPorts, configure_test_support, session_cookie_for, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::{App, test};
use mockall::predicate::eq;
use pagination::PageSlice;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(test_session_middleware())
        .configure(configure_test_support)
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(logout)
                .service(register)
                .service(list_users)
                .service(current_user)
                .service(get_user)
                .service(set_avatar)
                .service(clear_avatar),
        )
}

#[fixture]
fn alice() -> UserProfile {
    UserProfile {
        id: UserId::new(1),
        email: "alice@example.com".into(),
        username: "alice".into(),
        first_name: "Alice".into(),
        last_name: "Liddell".into(),
        avatar: None,
        is_subscribed: false,
    }
}

#[rstest]
#[actix_web::test]
async fn login_sets_cookie_and_returns_profile(alice: UserProfile) {
    let mut ports = MockPorts::default();
    ports
        .login
        .expect_authenticate()
        .withf(|credentials| credentials.email() == "alice@example.com")
        .times(1)
        .returning(|_| Ok(UserId::new(1)));
    ports
        .users
        .expect_me()
        .with(eq(Viewer::User(UserId::new(1))))
        .returning(move |_| Ok(alice.clone()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"email": " Alice@Example.com ", "password": "pw"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.response().cookies().any(|c| c.name() == "session"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["avatar"], Value::Null);
}

#[rstest]
#[actix_web::test]
async fn login_requires_both_fields() {
    let app = test::init_service(test_app(MockPorts::default().into_state())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"email": ""}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["fields"]["email"][0], FIELD_REQUIRED);
    assert_eq!(body["details"]["fields"]["password"][0], FIELD_REQUIRED);
}

#[rstest]
#[actix_web::test]
async fn rejected_credentials_are_unauthorised() {
    let mut ports = MockPorts::default();
    ports.login.expect_authenticate().returning(|_| {
        Err(Error::unauthorized(
            "Unable to log in with provided credentials.",
        ))
    });
    let app = test::init_service(test_app(ports.into_state())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"email": "a@b.c", "password": "wrong"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn register_returns_created_account() {
    let mut ports = MockPorts::default();
    ports
        .users_command
        .expect_register()
        .withf(|registration| registration.username.as_deref() == Some("bob"))
        .returning(|_| {
            Ok(User {
                id: UserId::new(5),
                email: "bob@example.com".into(),
                username: "bob".into(),
                first_name: "Bob".into(),
                last_name: "Builder".into(),
                avatar: None,
                is_staff: false,
            })
        });
    let app = test::init_service(test_app(ports.into_state())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "email": "bob@example.com",
            "username": "bob",
            "first_name": "Bob",
            "last_name": "Builder",
            "password": "hunter22"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({
            "id": 5,
            "email": "bob@example.com",
            "username": "bob",
            "first_name": "Bob",
            "last_name": "Builder"
        })
    );
}

#[rstest]
#[actix_web::test]
async fn list_users_is_paginated(alice: UserProfile) {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_list()
        .withf(|viewer, page| *viewer == Viewer::Anonymous && page.limit() == 1)
        .returning(move |_, _| Ok(PageSlice::new(vec![alice.clone()], 2)));
    let app = test::init_service(test_app(ports.into_state())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users?limit=1")
        .insert_header(("host", "food.example"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["next"], "http://food.example/api/v1/users?limit=1&page=2");
    assert_eq!(body["previous"], Value::Null);
    assert_eq!(body["results"][0]["id"], 1);
}

#[rstest]
#[actix_web::test]
async fn invalid_page_is_not_found() {
    let app = test::init_service(test_app(MockPorts::default().into_state())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users?page=zero")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Invalid page.");
}

#[rstest]
#[actix_web::test]
async fn me_uses_session_viewer(mut alice: UserProfile) {
    alice.avatar = Some("users/avatars/a.png".into());
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_me()
        .with(eq(Viewer::User(UserId::new(1))))
        .returning(move |_| Ok(alice.clone()));
    let app = test::init_service(test_app(ports.into_state())).await;
    let cookie = session_cookie_for(&app, 1).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(("host", "food.example"))
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["avatar"], "http://food.example/media/users/avatars/a.png");
}

#[rstest]
#[actix_web::test]
async fn anonymous_me_is_unauthorised() {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_me()
        .with(eq(Viewer::Anonymous))
        .returning(|_| Err(Error::not_authenticated()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let req = test::TestRequest::get().uri("/api/v1/users/me").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body["message"],
        "Authentication credentials were not provided."
    );
}

#[rstest]
#[actix_web::test]
async fn unknown_user_is_not_found() {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_profile()
        .with(eq(Viewer::Anonymous), eq(UserId::new(404)))
        .returning(|_, id| Err(Error::not_found(format!("user {id} not found"))));
    let app = test::init_service(test_app(ports.into_state())).await;

    let req = test::TestRequest::get().uri("/api/v1/users/404").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn avatar_upload_returns_absolute_url() {
    let mut ports = MockPorts::default();
    ports
        .users_command
        .expect_set_avatar()
        .withf(|viewer, image| {
            *viewer == Viewer::User(UserId::new(1)) && image.bytes() == GIF_BYTES
        })
        .returning(|_, _| Ok("users/avatars/new.gif".into()));
    let app = test::init_service(test_app(ports.into_state())).await;
    let cookie = session_cookie_for(&app, 1).await;

    let data_uri = gif_data_uri();
    let req = test::TestRequest::put()
        .uri("/api/v1/users/me/avatar")
        .insert_header(("host", "food.example"))
        .cookie(cookie)
        .set_json(json!({ "avatar": data_uri }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({"avatar": "http://food.example/media/users/avatars/new.gif"})
    );
}

#[rstest]
#[case(json!({}), FIELD_REQUIRED)]
#[case(json!({"avatar": "definitely not an image"}), INVALID_IMAGE)]
#[actix_web::test]
async fn avatar_upload_validates_payload(#[case] payload: Value, #[case] message: &str) {
    let app = test::init_service(test_app(MockPorts::default().into_state())).await;
    let cookie = session_cookie_for(&app, 1).await;

    let req = test::TestRequest::put()
        .uri("/api/v1/users/me/avatar")
        .cookie(cookie)
        .set_json(payload)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["fields"]["avatar"][0], message);
}

#[rstest]
#[actix_web::test]
async fn anonymous_avatar_upload_is_unauthorised() {
    let app = test::init_service(test_app(MockPorts::default().into_state())).await;

    let req = test::TestRequest::put()
        .uri("/api/v1/users/me/avatar")
        .set_json(json!({}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case::anonymous(false, StatusCode::UNAUTHORIZED, "unauthorized")]
#[case::signed_in(true, StatusCode::BAD_REQUEST, "invalid_request")]
#[actix_web::test]
async fn malformed_avatar_body_is_checked_after_sign_in(
    #[case] signed_in: bool,
    #[case] expected: StatusCode,
    #[case] code: &str,
) {
    let app = test::init_service(test_app(MockPorts::default().into_state())).await;
    let mut req = test::TestRequest::put()
        .uri("/api/v1/users/me/avatar")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");
    if signed_in {
        req = req.cookie(session_cookie_for(&app, 1).await);
    }
    let res = test::call_service(&app, req.to_request()).await;

    assert_eq!(res.status(), expected);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], code, "{body}");
}

#[rstest]
#[actix_web::test]
async fn clearing_avatar_is_no_content() {
    let mut ports = MockPorts::default();
    ports
        .users_command
        .expect_clear_avatar()
        .with(eq(Viewer::User(UserId::new(1))))
        .times(1)
        .returning(|_| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;
    let cookie = session_cookie_for(&app, 1).await;

    let req = test::TestRequest::delete()
        .uri("/api/v1/users/me/avatar")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn logout_clears_session() {
    let app = test::init_service(test_app(MockPorts::default().into_state())).await;
    let cookie = session_cookie_for(&app, 1).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/logout")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
