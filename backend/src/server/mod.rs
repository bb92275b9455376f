//! HTTP server assembly: adapters, middleware and routes.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use foodgram::Trace;
use foodgram::inbound::http::health::{HealthState, live, ready};
use foodgram::inbound::http::session_config::{SessionSettings, session_middleware};
use foodgram::inbound::http::state::HttpState;
use foodgram::inbound::http::{configure_api, configure_public};
use state_builders::build_http_state;

/// Routes and middleware for one worker.
///
/// Only `/api` carries the session cookie; media, short-link redirects and
/// health probes are stateless.
fn build_app(
    health: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: &SessionSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let app = App::new()
        .app_data(health)
        .app_data(http_state)
        .wrap(Trace)
        .service(
            web::scope("/api")
                .wrap(session_middleware(session))
                .configure(configure_api),
        )
        .configure(configure_public)
        .service(ready)
        .service(live);
    mount_docs(app)
}

#[cfg(debug_assertions)]
fn mount_docs<T>(app: App<T>) -> App<T>
where
    T: ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
{
    use foodgram::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(not(debug_assertions))]
fn mount_docs<T>(app: App<T>) -> App<T> {
    app
}

/// Bind the server and mark it ready.
///
/// # Errors
/// Returns [`std::io::Error`] when the media root cannot be opened or the
/// address cannot be bound.
pub fn create_server(
    health: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        session, bind_addr, ..
    } = config;

    let worker_health = health.clone();
    let server = HttpServer::new(move || {
        build_app(worker_health.clone(), http_state.clone(), &session)
    })
    .bind(bind_addr)?
    .run();

    health.mark_ready();
    info!(%bind_addr, "accepting connections");
    Ok(server)
}
