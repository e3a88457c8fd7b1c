//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;

use yamda::Trace;
use yamda::domain::{MovieService, UserService};
use yamda::inbound::http::error::route_not_found;
use yamda::inbound::http::json::BodyLimit;
use yamda::inbound::http::movies::{
    create_movie, delete_movie, list_movies, patch_movie, show_movie, update_movie,
};
use yamda::inbound::http::state::HttpState;
use yamda::inbound::http::users::register_user;
use yamda::outbound::persistence::{DbPool, DieselMovieRepository, DieselUserRepository};

/// Wire the Diesel adapters into the services handlers use.
fn build_http_state(pool: &DbPool) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        MovieService::new(
            Arc::new(DieselMovieRepository::new(pool.clone())),
            Arc::new(DefaultClock),
        ),
        UserService::new(Arc::new(DieselUserRepository::new(pool.clone()))),
    ))
}

fn build_app(
    http_state: web::Data<HttpState>,
    body_limit: BodyLimit,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/v1")
        .service(create_movie)
        .service(list_movies)
        .service(show_movie)
        .service(update_movie)
        .service(patch_movie)
        .service(delete_movie)
        .service(register_user);

    App::new()
        .app_data(http_state)
        .app_data(body_limit)
        .wrap(Trace)
        .service(api)
        .default_service(web::to(route_not_found))
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        db_pool,
        body_limit,
    } = config;
    let http_state = build_http_state(&db_pool);

    let server = HttpServer::new(move || build_app(http_state.clone(), body_limit))
        .bind(bind_addr)?
        .run();
    Ok(server)
}
