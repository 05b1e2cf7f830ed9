use crate::content_negotiation::RequestContentType;
use crate::error::TransformServerError;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use oxrdfio::RdfFormat;
use rdf_transform_model::ResourcePath;
use rdf_transform_sparql::QueryResultsFormat;
use target::RequestTarget;

mod resources;
mod target;
mod transform;

pub fn create_resource_routes() -> Router<AppState> {
    Router::new().route(
        "/{*path}",
        get(handle_get).post(handle_post).put(handle_put),
    )
}

fn parse_target(path: &str) -> Result<RequestTarget, TransformServerError> {
    RequestTarget::parse(path)
        .ok_or_else(|| TransformServerError::NotFound(format!("Nothing exists at '/{path}'")))
}

fn inline_only(resource: &ResourcePath) -> TransformServerError {
    TransformServerError::MethodNotAllowed(format!(
        "Inline transforms of '{resource}' must be POSTed"
    ))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(path): Path<String>,
    rdf_format: Result<RdfFormat, TransformServerError>,
    query_format: Result<QueryResultsFormat, TransformServerError>,
) -> Result<Response, TransformServerError> {
    match parse_target(&path)? {
        RequestTarget::Transform {
            resource,
            key: Some(key),
        } => transform::stored_transform(&state, resource, &key, rdf_format, query_format).await,
        RequestTarget::Transform {
            resource,
            key: None,
        } => Err(inline_only(&resource)),
        RequestTarget::Resource(path) if state.is_program_path(&path) => {
            resources::get_program(&state, &path)
        }
        RequestTarget::Resource(path) => resources::get_resource(&state, &path, rdf_format?),
    }
}

async fn handle_post(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RequestContentType(content_type): RequestContentType,
    rdf_format: Result<RdfFormat, TransformServerError>,
    query_format: Result<QueryResultsFormat, TransformServerError>,
    body: Bytes,
) -> Result<Response, TransformServerError> {
    match parse_target(&path)? {
        RequestTarget::Transform {
            resource,
            key: None,
        } => {
            transform::inline_transform(
                &state,
                resource,
                content_type,
                body,
                rdf_format,
                query_format,
            )
            .await
        }
        RequestTarget::Transform { resource, .. } | RequestTarget::Resource(resource) => {
            Err(TransformServerError::MethodNotAllowed(format!(
                "Only '{resource}/fcr:transform' accepts POST requests"
            )))
        }
    }
}

async fn handle_put(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RequestContentType(content_type): RequestContentType,
    body: Bytes,
) -> Result<Response, TransformServerError> {
    match parse_target(&path)? {
        RequestTarget::Resource(path) if state.is_program_path(&path) => {
            resources::put_program(&state, path, &body)
        }
        RequestTarget::Resource(path) => {
            resources::put_resource(&state, path, content_type.as_deref(), &body)
        }
        RequestTarget::Transform { resource, .. } => Err(TransformServerError::MethodNotAllowed(
            format!("Transforms of '{resource}' cannot be written"),
        )),
    }
}
