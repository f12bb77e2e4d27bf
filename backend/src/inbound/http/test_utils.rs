//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};

use crate::domain::ports::{
    MockIngredientsQuery, MockLoginService, MockRecipesCommand, MockRecipesQuery,
    MockSubscriptionsCommand, MockSubscriptionsQuery, MockUsersCommand, MockUsersQuery,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::validation::{json_config, path_config};

/// Path of the helper route that signs a user in.
pub const SIGN_IN_PATH: &str = "/test/sign-in";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// One mock per driving port; set expectations, then call [`Self::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub users: MockUsersQuery,
    pub users_command: MockUsersCommand,
    pub ingredients: MockIngredientsQuery,
    pub recipes: MockRecipesQuery,
    pub recipes_command: MockRecipesCommand,
    pub subscriptions: MockSubscriptionsQuery,
    pub subscriptions_command: MockSubscriptionsCommand,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            users: Arc::new(self.users),
            users_command: Arc::new(self.users_command),
            ingredients: Arc::new(self.ingredients),
            recipes: Arc::new(self.recipes),
            recipes_command: Arc::new(self.recipes_command),
            subscriptions: Arc::new(self.subscriptions),
            subscriptions_command: Arc::new(self.subscriptions_command),
        }))
    }
}

async fn sign_in(session: SessionContext, path: web::Path<i64>) -> Result<HttpResponse, Error> {
    session.persist_user(UserId::new(path.into_inner()))?;
    Ok(HttpResponse::Ok().finish())
}

/// Register the sign-in helper route and shared extractor configuration.
pub fn configure_test_support(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .route(&format!("{SIGN_IN_PATH}/{{id}}"), web::get().to(sign_in));
}

/// Sign `user` in through [`SIGN_IN_PATH`] and return the session cookie.
pub async fn session_cookie_for<S>(app: &S, user: i64) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get()
        .uri(&format!("{SIGN_IN_PATH}/{user}"))
        .to_request();
    let res = test::call_service(app, req).await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
