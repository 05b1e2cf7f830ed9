use crate::error::TransformServerError;
use crate::AppState;
use anyhow::anyhow;
use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oxrdfio::RdfFormat;
use rdf_transform::{TransformError, TransformRequest, TransformResult, TransformTarget};
use rdf_transform_model::{ProgramKey, ResourcePath};
use rdf_transform_sparql::{QueryEvaluationError, QueryResultsFormat};
use tracing::debug;

/// Applies the stored program of `key` to the resource at `path`.
pub async fn stored_transform(
    state: &AppState,
    path: ResourcePath,
    key: &str,
    rdf_format: Result<RdfFormat, TransformServerError>,
    query_format: Result<QueryResultsFormat, TransformServerError>,
) -> Result<Response, TransformServerError> {
    let key = ProgramKey::new(key).map_err(TransformError::from)?;
    let target = transform_target(state, path)?;
    let result = dispatch(state, target, TransformRequest::Stored { key }).await?;
    transform_response(result, rdf_format, query_format)
}

/// Applies the program in the request body to the resource at `path`.
pub async fn inline_transform(
    state: &AppState,
    path: ResourcePath,
    content_type: Option<String>,
    program: Bytes,
    rdf_format: Result<RdfFormat, TransformServerError>,
    query_format: Result<QueryResultsFormat, TransformServerError>,
) -> Result<Response, TransformServerError> {
    let Some(content_type) = content_type else {
        return Err(TransformServerError::UnsupportedMediaType(
            "An inline transform requires a Content-Type".to_owned(),
        ));
    };
    let target = transform_target(state, path)?;
    let request = TransformRequest::Inline {
        program: program.as_ref().into(),
        content_type,
    };
    let result = dispatch(state, target, request).await?;
    transform_response(result, rdf_format, query_format)
}

fn transform_target(
    state: &AppState,
    path: ResourcePath,
) -> Result<TransformTarget, TransformServerError> {
    let resource = state
        .resources
        .get(&path)
        .ok_or_else(|| TransformServerError::NotFound(format!("No resource exists at '{path}'")))?;
    Ok(TransformTarget {
        types: resource.types(),
        triples: resource.stream(),
        path,
    })
}

/// Runs the dispatch on the blocking pool; evaluation may fetch linked data synchronously.
async fn dispatch(
    state: &AppState,
    target: TransformTarget,
    request: TransformRequest,
) -> Result<TransformResult, TransformServerError> {
    let dispatcher = state.dispatcher.clone();
    let result = tokio::task::spawn_blocking(move || dispatcher.dispatch(target, request))
        .await
        .map_err(|error| TransformServerError::Internal(anyhow!(error)))??;
    Ok(result)
}

fn transform_response(
    result: TransformResult,
    rdf_format: Result<RdfFormat, TransformServerError>,
    query_format: Result<QueryResultsFormat, TransformServerError>,
) -> Result<Response, TransformServerError> {
    let results = match result {
        TransformResult::Fields(fields) => return Ok(Json(vec![fields]).into_response()),
        TransformResult::Query(results) => results,
    };

    let serialization_error =
        |error: QueryEvaluationError| TransformServerError::Internal(anyhow!(error));
    if results.is_graph() {
        let format = rdf_format?;
        debug!(?format, "Writing graph results");
        let body = results
            .write_graph(Vec::new(), format)
            .map_err(serialization_error)?;
        Ok(([(CONTENT_TYPE, format.media_type())], body).into_response())
    } else {
        let format = query_format?;
        debug!(?format, "Writing query results");
        let body = results
            .write(Vec::new(), format)
            .map_err(serialization_error)?;
        Ok(([(CONTENT_TYPE, format.media_type())], body).into_response())
    }
}
