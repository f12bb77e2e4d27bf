//! Short-link redirect served outside the API scope.

use actix_web::{HttpResponse, get, http::header, web};

use crate::domain::{ApiResult, Error, RecipeId};
use crate::inbound::http::state::HttpState;

/// Redirect `/s/{id}/` to the recipe page.
#[utoipa::path(
    get,
    path = "/s/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 301, description = "Redirect to the recipe page"),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "followShortLink",
    security([])
)]
#[get("/s/{id:\\d+}/")]
pub async fn follow_short_link(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = RecipeId::new(path.into_inner());
    state.recipes.ensure_exists(id).await?;
    Ok(HttpResponse::MovedPermanently()
        .insert_header((header::LOCATION, format!("/recipes/{id}/")))
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use mockall::predicate::eq;
    use rstest::rstest;

    #[rstest]
    #[case(3, true, StatusCode::MOVED_PERMANENTLY)]
    #[case(4, false, StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn redirects_only_known_recipes(
        #[case] id: i64,
        #[case] exists: bool,
        #[case] expected: StatusCode,
    ) {
        let mut ports = MockPorts::default();
        ports
            .recipes
            .expect_ensure_exists()
            .with(eq(RecipeId::new(id)))
            .returning(move |id| {
                if exists {
                    Ok(())
                } else {
                    Err(Error::not_found(format!("recipe {id} not found")))
                }
            });
        let app = test::init_service(
            App::new()
                .app_data(ports.into_state())
                .service(follow_short_link),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/s/{id}/"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
        if exists {
            assert_eq!(
                res.headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok()),
                Some("/recipes/3/")
            );
        }
    }
}
