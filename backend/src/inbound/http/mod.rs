//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers translate requests into driving-port calls on [`state::HttpState`]
//! and map domain results back onto JSON. Routes are grouped by resource:
//! [`users`], [`subscriptions`], [`ingredients`], [`recipes`], plus the
//! [`short_links`] redirect and [`health`] probes outside the API scope.

pub mod dto;
pub mod error;
pub mod health;
pub mod ingredients;
pub mod paging;
pub mod recipe_payload;
pub mod recipes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod short_links;
pub mod state;
pub mod subscriptions;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal segments such as `/users/me` and `/recipes/download_shopping_cart`
/// never collide with the numeric `{id}` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::logout)
        .service(users::register)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::set_avatar)
        .service(users::clear_avatar)
        .service(subscriptions::list_subscriptions)
        .service(users::get_user)
        .service(subscriptions::subscribe)
        .service(subscriptions::unsubscribe)
        .service(ingredients::list_ingredients)
        .service(ingredients::get_ingredient)
        .service(recipes::download_shopping_cart)
        .service(recipes::list_recipes)
        .service(recipes::create_recipe)
        .service(recipes::get_recipe)
        .service(recipes::replace_recipe)
        .service(recipes::patch_recipe)
        .service(recipes::delete_recipe)
        .service(recipes::add_favorite)
        .service(recipes::remove_favorite)
        .service(recipes::add_to_shopping_cart)
        .service(recipes::remove_from_shopping_cart)
        .service(recipes::get_short_link);
}
