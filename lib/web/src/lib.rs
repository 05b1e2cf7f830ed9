//! The HTTP surface of the transform pipeline.
//!
//! - `GET /{path}/fcr:transform/{key}` applies the stored program of `key` to a resource.
//! - `POST /{path}/fcr:transform` applies the program in the body, typed by its `Content-Type`.
//! - `PUT /{path}` stores a resource description, or a program below the configuration root.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::net::SocketAddr;
use std::str::FromStr;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

mod config;
mod content_negotiation;
mod error;
mod repository;
mod routes;
mod state;

pub use config::{ServerConfig, MAX_BODY_SIZE};
pub use error::TransformServerError;
pub use repository::{ResourceRepository, StoredResource};
pub use state::AppState;

use crate::routes::create_resource_routes;

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from_str(&config.bind)?;
    let app_state = AppState::new(&config)?;

    let app = create_router(app_state);
    let app = if config.cors {
        app.layer(tower_http::cors::CorsLayer::permissive())
    } else {
        app
    };

    info!(%addr, base_url = %config.base_url(), "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    Ok(axum::serve(listener, app).await?)
}

/// Creates the router of a transform server.
pub fn create_router(app_state: AppState) -> Router {
    create_resource_routes()
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
