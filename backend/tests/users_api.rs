//! Account, profile, avatar, and subscription flows over HTTP.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use foodgram::test_support::InMemoryStore;
use rstest::rstest;
use serde_json::json;
use support::{GIF_DATA_URI, PASSWORD, as_user, build_app, publish, send, sign_up};

#[actix_web::test]
async fn registered_user_can_log_in_and_read_their_profile() {
    let store = InMemoryStore::default();
    let app = test::init_service(build_app(&store)).await;
    let alice = sign_up(&app, "alice").await;

    let (status, me) = send(
        &app,
        as_user(test::TestRequest::get().uri("/api/v1/users/me"), Some(&alice.cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], alice.id);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["email"], "alice@example.com");
    assert_eq!(me["is_subscribed"], false);
    assert!(me["avatar"].is_null());
    assert!(me.get("password").is_none());
}

#[actix_web::test]
async fn anonymous_callers_cannot_read_me() {
    let store = InMemoryStore::default();
    let app = test::init_service(build_app(&store)).await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/v1/users/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[case("alice@example.com", "someone_else", "email")]
#[case("other@example.com", "alice", "username")]
#[actix_web::test]
async fn duplicate_accounts_are_rejected(
    #[case] email: &str,
    #[case] username: &str,
    #[case] field: &str,
) {
    let store = InMemoryStore::default();
    let app = test::init_service(build_app(&store)).await;
    sign_up(&app, "alice").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "email": email,
            "username": username,
            "first_name": "Another",
            "last_name": "Cook",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["fields"][field].is_array(), "{body}");
}

#[actix_web::test]
async fn wrong_password_does_not_open_a_session() {
    let store = InMemoryStore::default();
    let app = test::init_service(build_app(&store)).await;
    sign_up(&app, "alice").await;

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "alice@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn avatar_can_be_set_and_cleared() {
    let store = InMemoryStore::default();
    let app = test::init_service(build_app(&store)).await;
    let alice = sign_up(&app, "alice").await;

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/users/me/avatar")
            .cookie(alice.cookie.clone())
            .set_json(json!({"avatar": GIF_DATA_URI})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["avatar"].as_str().expect("avatar url");
    assert!(url.contains("/media/users/"), "{url}");
    assert!(url.ends_with(".gif"), "{url}");
    assert_eq!(store.image_paths().len(), 1);

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/users/me/avatar")
            .cookie(alice.cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(store.image_paths().is_empty());

    let (_, me) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(alice.cookie.clone()),
    )
    .await;
    assert!(me["avatar"].is_null());
}

#[actix_web::test]
async fn subscriptions_follow_and_unfollow_authors() {
    let store = InMemoryStore::default();
    let flour = store.seed_ingredient("flour", "g").get();
    let app = test::init_service(build_app(&store)).await;
    let alice = sign_up(&app, "alice").await;
    let bob = sign_up(&app, "bob").await;
    for name in ["Bread", "Pancakes", "Scones"] {
        publish(&app, &alice, name, &[(flour, 100)]).await;
    }
    let subscribe_uri = format!("/api/v1/users/{}/subscribe", alice.id);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{subscribe_uri}?recipes_limit=2"))
            .cookie(bob.cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["username"], "alice");
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 3);
    assert_eq!(body["recipes"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri(&subscribe_uri)
            .cookie(bob.cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "already_subscribed");

    let (status, page) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/subscriptions")
            .cookie(bob.cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["id"], alice.id);

    let (_, profile) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}", alice.id))
            .cookie(bob.cookie.clone()),
    )
    .await;
    assert_eq!(profile["is_subscribed"], true);

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&subscribe_uri)
            .cookie(bob.cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri(&subscribe_uri)
            .cookie(bob.cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "not_subscribed");
}

#[actix_web::test]
async fn users_cannot_subscribe_to_themselves() {
    let store = InMemoryStore::default();
    let app = test::init_service(build_app(&store)).await;
    let alice = sign_up(&app, "alice").await;

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/users/{}/subscribe", alice.id))
            .cookie(alice.cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn user_list_is_public_and_paginated() {
    let store = InMemoryStore::default();
    let app = test::init_service(build_app(&store)).await;
    for name in ["carol", "alice", "bob"] {
        sign_up(&app, name).await;
    }

    let (status, page) = send(&app, test::TestRequest::get().uri("/api/v1/users?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"][0]["username"], "alice");
    assert_eq!(page["results"][1]["username"], "bob");
    assert!(page["next"].as_str().is_some_and(|next| next.contains("page=2")));
    assert!(page["previous"].is_null());
}
