//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{Repositories, build_http_state};

use std::path::PathBuf;
use std::sync::Arc;

use actix_files::Files;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use foodgram::Trace;
#[cfg(debug_assertions)]
use foodgram::doc::ApiDoc;
use foodgram::domain::{ApiResult, Error};
use foodgram::inbound::http::configure_api;
use foodgram::inbound::http::health::{HealthState, live, ready};
use foodgram::inbound::http::session_config::SessionSettings;
use foodgram::inbound::http::short_links::follow_short_link;
use foodgram::inbound::http::state::HttpState;
use foodgram::inbound::http::validation::{NOT_FOUND, json_config, path_config};
use foodgram::outbound::media::CapStdImageStore;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
    media_root: PathBuf,
}

/// JSON 404 for every unmatched path.
async fn unmatched() -> ApiResult<actix_web::HttpResponse> {
    Err(Error::not_found(NOT_FOUND))
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
        media_root,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session.middleware())
        .configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(api)
        .service(follow_short_link)
        .service(ready)
        .service(live)
        .service(Files::new("/media", media_root));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(unmatched))
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when the media root cannot be opened, or when
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let images = Arc::new(CapStdImageStore::open(config.media_root())?);
    let http_state = build_http_state(Repositories::diesel(&config.db_pool, images));
    let ServerConfig {
        session,
        bind_addr,
        db_pool: _,
        media_root,
    } = config;

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
            media_root: media_root.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "foodgram listening");
    health_state.mark_ready();
    Ok(server)
}
