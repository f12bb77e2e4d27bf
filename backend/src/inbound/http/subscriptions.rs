//! Follow handlers and the followed-authors feed.
//!
//! ```text
//! GET /api/v1/users/subscriptions?recipes_limit=3
//! POST /api/v1/users/7/subscribe
//! DELETE /api/v1/users/7/subscribe
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use pagination::Paginated;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{ApiResult, Error, UserId};
use crate::inbound::http::dto::{RequestOrigin, SubscriptionResponse};
use crate::inbound::http::paging::{PageParams, paginate};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::QueryParams;

/// Optional cap on the recipes embedded per author.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecipesLimitParams {
    /// Non-numeric values are ignored.
    pub recipes_limit: Option<String>,
}

impl RecipesLimitParams {
    fn limit(&self) -> Option<u32> {
        self.recipes_limit
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
    }
}

/// Query string of the subscriptions feed.
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionListParams {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(flatten)]
    pub recipes: RecipesLimitParams,
}

/// Authors the signed-in user follows.
#[utoipa::path(
    get,
    path = "/api/v1/users/subscriptions",
    params(PageParams, RecipesLimitParams),
    responses(
        (status = 200, description = "Followed authors",
            body = crate::inbound::http::schemas::SubscriptionPage),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Invalid page", body = Error)
    ),
    tags = ["subscriptions"],
    operation_id = "listSubscriptions"
)]
#[get("/users/subscriptions")]
pub async fn list_subscriptions(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: QueryParams<SubscriptionListParams>,
) -> ApiResult<web::Json<Paginated<SubscriptionResponse>>> {
    let viewer = session.viewer();
    viewer.require()?;
    let page = query.page.request()?;
    let slice = state
        .subscriptions
        .list(viewer, &page, query.recipes.limit())
        .await?;
    let origin = RequestOrigin::of(&req);
    let body = paginate(&req, slice, page, |author| {
        SubscriptionResponse::from_author(author, &origin)
    })?;
    Ok(web::Json(body))
}

/// Follow an author.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/subscribe",
    params(("id" = i64, Path, description = "Author id"), RecipesLimitParams),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Self-subscription or already subscribed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown author", body = Error)
    ),
    tags = ["subscriptions"],
    operation_id = "subscribe"
)]
#[post("/users/{id:\\d+}/subscribe")]
pub async fn subscribe(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    query: QueryParams<RecipesLimitParams>,
) -> ApiResult<HttpResponse> {
    let author = state
        .subscriptions_command
        .subscribe(
            session.viewer(),
            UserId::new(path.into_inner()),
            query.limit(),
        )
        .await?;
    Ok(HttpResponse::Created().json(SubscriptionResponse::from_author(
        author,
        &RequestOrigin::of(&req),
    )))
}

/// Stop following an author.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/subscribe",
    params(("id" = i64, Path, description = "Author id")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not subscribed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown author", body = Error)
    ),
    tags = ["subscriptions"],
    operation_id = "unsubscribe"
)]
#[delete("/users/{id:\\d+}/subscribe")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .subscriptions_command
        .unsubscribe(session.viewer(), UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
