//! Recipe handlers: listing, publishing, editing, favourites, the shopping
//! cart, and short links.
//!
//! ```text
//! GET /api/v1/recipes?author=2&is_favorited=1&ordering=-name
//! POST /api/v1/recipes {"name":"Soup","text":"...","cooking_time":15,"image":"data:...","ingredients":[{"id":1,"amount":2}]}
//! GET /api/v1/recipes/download_shopping_cart
//! ```

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::Paginated;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::RecipeList;
use crate::domain::{ApiResult, Error, RecipeId, RecipeListParams, WriteMode};
use crate::inbound::http::dto::{
    RecipeMinifiedResponse, RecipeResponse, RequestOrigin, ShortLinkResponse,
};
use crate::inbound::http::paging::{PageParams, paginate};
use crate::inbound::http::recipe_payload::RecipePayload;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::QueryParams;

/// File name of the downloadable shopping list.
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// Recipe list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecipeFilters {
    /// Author id.
    pub author: Option<String>,
    /// Case-insensitive substring of the recipe name.
    pub search: Option<String>,
    /// `pub_date`, `-pub_date`, `name`, or `-name`.
    pub ordering: Option<String>,
    /// `1`/`true` keeps favourites, `0`/`false` excludes them.
    pub is_favorited: Option<String>,
    /// `1`/`true` keeps cart recipes, `0`/`false` excludes them.
    pub is_in_shopping_cart: Option<String>,
}

impl From<RecipeFilters> for RecipeListParams {
    fn from(value: RecipeFilters) -> Self {
        Self {
            author: value.author,
            search: value.search,
            ordering: value.ordering,
            is_favorited: value.is_favorited,
            is_in_shopping_cart: value.is_in_shopping_cart,
        }
    }
}

/// Full query string of the recipe list.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(flatten)]
    pub filters: RecipeFilters,
}

fn recipe_id(path: web::Path<i64>) -> RecipeId {
    RecipeId::new(path.into_inner())
}

/// One page of recipes, newest first unless `ordering` says otherwise.
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    params(PageParams, RecipeFilters),
    responses(
        (status = 200, description = "Recipes", body = crate::inbound::http::schemas::RecipePage),
        (status = 400, description = "Invalid author filter", body = Error),
        (status = 404, description = "Invalid page", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security([])
)]
#[get("/recipes")]
pub async fn list_recipes(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: QueryParams<RecipeListQuery>,
) -> ApiResult<web::Json<Paginated<RecipeResponse>>> {
    let RecipeListQuery { page, filters } = query.into_inner();
    let page = page.request()?;
    let slice = state
        .recipes
        .list(session.viewer(), filters.into(), &page)
        .await?;
    let origin = RequestOrigin::of(&req);
    let body = paginate(&req, slice, page, |view| {
        RecipeResponse::from_view(view, &origin)
    })?;
    Ok(web::Json(body))
}

/// Publish a recipe authored by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body(
        content = crate::inbound::http::schemas::RecipeWriteSchema,
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Created", body = RecipeResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Result<RecipePayload, Error>,
) -> ApiResult<HttpResponse> {
    let viewer = session.viewer();
    viewer.require()?;
    let view = state
        .recipes_command
        .create(viewer, payload?.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from_view(view, &RequestOrigin::of(&req))))
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security([])
)]
#[get("/recipes/{id:\\d+}")]
pub async fn get_recipe(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let view = state.recipes.get(session.viewer(), recipe_id(path)).await?;
    Ok(web::Json(RecipeResponse::from_view(
        view,
        &RequestOrigin::of(&req),
    )))
}

async fn update(
    req: &HttpRequest,
    state: &HttpState,
    session: &SessionContext,
    id: RecipeId,
    payload: Result<RecipePayload, Error>,
    mode: WriteMode,
) -> ApiResult<web::Json<RecipeResponse>> {
    let viewer = session.viewer();
    viewer.require()?;
    let view = state
        .recipes_command
        .update(viewer, id, payload?.into_inner(), mode)
        .await?;
    Ok(web::Json(RecipeResponse::from_view(
        view,
        &RequestOrigin::of(req),
    )))
}

/// Replace every field of a recipe, image included.
#[utoipa::path(
    put,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body(
        content = crate::inbound::http::schemas::RecipeWriteSchema,
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Updated", body = RecipeResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "replaceRecipe"
)]
#[put("/recipes/{id:\\d+}")]
pub async fn replace_recipe(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: Result<RecipePayload, Error>,
) -> ApiResult<web::Json<RecipeResponse>> {
    update(
        &req,
        &state,
        &session,
        recipe_id(path),
        payload,
        WriteMode::Replace,
    )
    .await
}

/// Update a recipe; the image may be omitted to keep the stored one.
#[utoipa::path(
    patch,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body(
        content = crate::inbound::http::schemas::RecipeWriteSchema,
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Updated", body = RecipeResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "patchRecipe"
)]
#[patch("/recipes/{id:\\d+}")]
pub async fn patch_recipe(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: Result<RecipePayload, Error>,
) -> ApiResult<web::Json<RecipeResponse>> {
    update(
        &req,
        &state,
        &session,
        recipe_id(path),
        payload,
        WriteMode::Patch,
    )
    .await
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id:\\d+}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .recipes_command
        .delete(session.viewer(), recipe_id(path))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_to(
    req: &HttpRequest,
    state: &HttpState,
    session: &SessionContext,
    list: RecipeList,
    id: RecipeId,
) -> ApiResult<HttpResponse> {
    let summary = state
        .recipes_command
        .add_to_list(session.viewer(), list, id)
        .await?;
    Ok(HttpResponse::Created().json(RecipeMinifiedResponse::from_summary(
        summary,
        &RequestOrigin::of(req),
    )))
}

async fn remove_from(
    state: &HttpState,
    session: &SessionContext,
    list: RecipeList,
    id: RecipeId,
) -> ApiResult<HttpResponse> {
    state
        .recipes_command
        .remove_from_list(session.viewer(), list, id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/favorite",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added to favorites", body = RecipeMinifiedResponse),
        (status = 400, description = "Already a favorite", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addFavorite"
)]
#[post("/recipes/{id:\\d+}/favorite")]
pub async fn add_favorite(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_to(&req, &state, &session, RecipeList::Favorites, recipe_id(path)).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}/favorite",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 400, description = "Not a favorite", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFavorite"
)]
#[delete("/recipes/{id:\\d+}/favorite")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_from(&state, &session, RecipeList::Favorites, recipe_id(path)).await
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/shopping_cart",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added to the cart", body = RecipeMinifiedResponse),
        (status = 400, description = "Already in the cart", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addToShoppingCart"
)]
#[post("/recipes/{id:\\d+}/shopping_cart")]
pub async fn add_to_shopping_cart(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_to(
        &req,
        &state,
        &session,
        RecipeList::ShoppingCart,
        recipe_id(path),
    )
    .await
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}/shopping_cart",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from the cart"),
        (status = 400, description = "Not in the cart", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFromShoppingCart"
)]
#[delete("/recipes/{id:\\d+}/shopping_cart")]
pub async fn remove_from_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_from(&state, &session, RecipeList::ShoppingCart, recipe_id(path)).await
}

/// Aggregated ingredients of every recipe in the caller's cart.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/download_shopping_cart",
    responses(
        (status = 200, description = "Shopping list", body = String, content_type = "text/plain"),
        (status = 400, description = "Empty cart", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "downloadShoppingCart"
)]
#[get("/recipes/download_shopping_cart")]
pub async fn download_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let report = state.recipes.shopping_list(session.viewer()).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(SHOPPING_LIST_FILENAME.to_owned())],
            },
        ))
        .body(report))
}

/// Absolute short link that redirects to the recipe page.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}/get-link",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Short link", body = ShortLinkResponse),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipeShortLink",
    security([])
)]
#[get("/recipes/{id:\\d+}/get-link")]
pub async fn get_short_link(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ShortLinkResponse>> {
    let id = recipe_id(path);
    state.recipes.ensure_exists(id).await?;
    Ok(web::Json(ShortLinkResponse {
        short_link: RequestOrigin::of(&req).url(&format!("/s/{id}/")),
    }))
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
