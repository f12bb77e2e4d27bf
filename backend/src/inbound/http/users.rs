//! Account handlers: login, registration, profiles, and avatars.
//!
//! ```text
//! POST /api/v1/login {"email":"alice@example.com","password":"secret"}
//! GET /api/v1/users?page=1&limit=6
//! PUT /api/v1/users/me/avatar {"avatar":"data:image/png;base64,..."}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use pagination::Paginated;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::image::INVALID_IMAGE;
use crate::domain::{
    ApiResult, Error, FIELD_REQUIRED, FieldErrors, ImageUpload, LoginCredentials, UserId,
    UserRegistration, Viewer,
};
use crate::inbound::http::dto::{
    AvatarResponse, RegisteredUserResponse, RequestOrigin, UserResponse,
};
use crate::inbound::http::paging::{PageParams, paginate};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::QueryParams;

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

/// Registration body for `POST /api/v1/users`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

impl From<RegisterRequest> for UserRegistration {
    fn from(value: RegisterRequest) -> Self {
        Self {
            email: value.email,
            username: value.username,
            first_name: value.first_name,
            last_name: value.last_name,
            password: value.password,
        }
    }
}

/// Avatar upload body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct AvatarRequest {
    /// Base64 data URI or raw base64.
    pub avatar: Option<String>,
}

fn decode_avatar(request: AvatarRequest) -> Result<ImageUpload, Error> {
    let raw = request
        .avatar
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| FieldErrors::single("avatar", FIELD_REQUIRED))?;
    ImageUpload::from_base64(&raw).map_err(|_| FieldErrors::single("avatar", INVALID_IMAGE))
}

/// Authenticate by email and password and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(user_id)?;
    let profile = state.users.me(Viewer::User(user_id)).await?;
    Ok(web::Json(UserResponse::from_profile(
        profile,
        &RequestOrigin::of(&req),
    )))
}

/// Drop the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisteredUserResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users_command
        .register(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(RegisteredUserResponse::from(user)))
}

/// List user profiles ordered by username.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PageParams),
    responses(
        (status = 200, description = "Users", body = crate::inbound::http::schemas::UserPage),
        (status = 404, description = "Invalid page", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users")]
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: QueryParams<PageParams>,
) -> ApiResult<web::Json<Paginated<UserResponse>>> {
    let page = query.request()?;
    let slice = state.users.list(session.viewer(), &page).await?;
    let origin = RequestOrigin::of(&req);
    let body = paginate(&req, slice, page, |profile| {
        UserResponse::from_profile(profile, &origin)
    })?;
    Ok(web::Json(body))
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let profile = state.users.me(session.viewer()).await?;
    Ok(web::Json(UserResponse::from_profile(
        profile,
        &RequestOrigin::of(&req),
    )))
}

/// Profile of one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{id:\\d+}")]
pub async fn get_user(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = UserId::new(path.into_inner());
    let profile = state.users.profile(session.viewer(), id).await?;
    Ok(web::Json(UserResponse::from_profile(
        profile,
        &RequestOrigin::of(&req),
    )))
}

/// Replace the signed-in user's avatar.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Missing or invalid image", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "setAvatar"
)]
#[put("/users/me/avatar")]
pub async fn set_avatar(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Result<web::Json<AvatarRequest>, actix_web::Error>,
) -> ApiResult<web::Json<AvatarResponse>> {
    let viewer = session.viewer();
    viewer.require()?;
    let payload = payload.map_err(|err| {
        err.as_error::<Error>()
            .cloned()
            .unwrap_or_else(|| Error::invalid_request(err.to_string()))
    })?;
    let image = decode_avatar(payload.into_inner())?;
    let path = state.users_command.set_avatar(viewer, image).await?;
    Ok(web::Json(AvatarResponse {
        avatar: RequestOrigin::of(&req).media(&path),
    }))
}

/// Remove the signed-in user's avatar.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me/avatar",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "clearAvatar"
)]
#[delete("/users/me/avatar")]
pub async fn clear_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    state.users_command.clear_avatar(session.viewer()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
