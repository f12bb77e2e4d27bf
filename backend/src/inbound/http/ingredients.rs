//! Ingredient lookup handlers.

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{ApiResult, Error, IngredientFilter, IngredientId};
use crate::inbound::http::dto::IngredientResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::QueryParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct IngredientSearch {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

/// Every ingredient, optionally narrowed by name prefix. Unpaginated.
#[utoipa::path(
    get,
    path = "/api/v1/ingredients",
    params(IngredientSearch),
    responses(
        (status = 200, description = "Ingredients", body = [IngredientResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["ingredients"],
    operation_id = "listIngredients",
    security([])
)]
#[get("/ingredients")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    query: QueryParams<IngredientSearch>,
) -> ApiResult<web::Json<Vec<IngredientResponse>>> {
    let filter = IngredientFilter::by_name_prefix(query.name.as_deref());
    let ingredients = state.ingredients.list(filter).await?;
    Ok(web::Json(ingredients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Unknown ingredient", body = Error)
    ),
    tags = ["ingredients"],
    operation_id = "getIngredient",
    security([])
)]
#[get("/ingredients/{id:\\d+}")]
pub async fn get_ingredient(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<IngredientResponse>> {
    let ingredient = state
        .ingredients
        .get(IngredientId::new(path.into_inner()))
        .await?;
    Ok(web::Json(ingredient.into()))
}
