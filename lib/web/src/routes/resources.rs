use crate::error::TransformServerError;
use crate::repository::StoredResource;
use crate::AppState;
use anyhow::anyhow;
use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use oxrdfio::{RdfFormat, RdfParser, RdfSerializer};
use rdf_transform::{ProgramStore, StoreError, StoreNode, WritableProgramStore};
use rdf_transform_model::{ResourcePath, Triple, PATH_QUERY_MEDIA_TYPE};
use tracing::info;

/// Stores the RDF description of the resource at `path`.
pub fn put_resource(
    state: &AppState,
    path: ResourcePath,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Response, TransformServerError> {
    let Some(format) = content_type.and_then(description_format) else {
        return Err(TransformServerError::UnsupportedMediaType(format!(
            "Resource descriptions must be RDF, not '{}'",
            content_type.unwrap_or_default()
        )));
    };
    let topic = state
        .topic(&path)
        .map_err(|error| TransformServerError::BadRequest(error.to_string()))?;

    let triples = RdfParser::from_format(format)
        .with_base_iri(topic.as_str())
        .map_err(|error| TransformServerError::BadRequest(error.to_string()))?
        .for_reader(body)
        .map(|quad| quad.map(Triple::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| TransformServerError::BadRequest(error.to_string()))?;

    info!(path = path.as_str(), triples = triples.len(), "Stored resource");
    let resource = StoredResource {
        topic,
        triples: triples.into(),
    };
    Ok(created_or_replaced(state.resources.put(path, resource)))
}

/// The RDF format of a resource description. `text/plain` is not taken for N-Triples.
fn description_format(content_type: &str) -> Option<RdfFormat> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case("text/plain") {
        return None;
    }
    RdfFormat::from_media_type(content_type)
}

/// Writes the description of the resource at `path` in the negotiated format.
pub fn get_resource(
    state: &AppState,
    path: &ResourcePath,
    format: RdfFormat,
) -> Result<Response, TransformServerError> {
    let resource = state
        .resources
        .get(path)
        .ok_or_else(|| TransformServerError::NotFound(format!("No resource exists at '{path}'")))?;

    let mut serializer = RdfSerializer::from_format(format).for_writer(Vec::new());
    for triple in resource.triples.iter() {
        serializer
            .serialize_triple(triple)
            .map_err(|error| TransformServerError::Internal(anyhow!(error)))?;
    }
    let body = serializer
        .finish()
        .map_err(|error| TransformServerError::Internal(anyhow!(error)))?;
    Ok(([(CONTENT_TYPE, format.media_type())], body).into_response())
}

/// Stores a program, or creates a key container if `path` is a direct child of the
/// configuration root.
pub fn put_program(
    state: &AppState,
    path: ResourcePath,
    body: &[u8],
) -> Result<Response, TransformServerError> {
    let depth = path
        .as_str()
        .strip_prefix(state.configuration_root().as_str())
        .unwrap_or_default()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .count();
    let created = state.programs.find(&path).map_err(store_error)?.is_none();

    match depth {
        1 => {
            state
                .programs
                .find_or_create_container(&path)
                .map_err(store_error)?;
            info!(path = path.as_str(), "Created transform container");
        }
        2 => {
            state
                .programs
                .put_program(&path, body.into())
                .map_err(store_error)?;
            info!(path = path.as_str(), "Stored transform program");
        }
        _ => {
            return Err(TransformServerError::BadRequest(format!(
                "Programs are stored at '{}/<key>/<type>', not at '{path}'",
                state.configuration_root()
            )))
        }
    }
    Ok(created_or_replaced(created))
}

/// Returns the program at `path`, or the paths of the programs of a key container.
pub fn get_program(state: &AppState, path: &ResourcePath) -> Result<Response, TransformServerError> {
    match state.programs.find(path).map_err(store_error)? {
        Some(StoreNode::Program(program)) => {
            Ok(([(CONTENT_TYPE, PATH_QUERY_MEDIA_TYPE)], program.content.to_vec()).into_response())
        }
        Some(StoreNode::Container(_)) => {
            let children = state
                .programs
                .find_children(path)
                .map_err(store_error)?
                .into_iter()
                .map(|child| format!("{}\n", child.path))
                .collect::<String>();
            Ok(([(CONTENT_TYPE, "text/plain")], children).into_response())
        }
        None => Err(TransformServerError::NotFound(format!(
            "No program exists at '{path}'"
        ))),
    }
}

fn created_or_replaced(created: bool) -> Response {
    if created {
        StatusCode::CREATED.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

fn store_error(error: StoreError) -> TransformServerError {
    match error {
        StoreError::NotAContainer(_) | StoreError::NotAProgram(_) => {
            TransformServerError::BadRequest(error.to_string())
        }
        error => TransformServerError::Internal(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_format() {
        assert_eq!(description_format("text/turtle"), Some(RdfFormat::Turtle));
        assert_eq!(
            description_format("application/n-triples; charset=utf-8"),
            Some(RdfFormat::NTriples)
        );
        assert_eq!(description_format("text/plain"), None);
        assert_eq!(description_format("Text/Plain; charset=utf-8"), None);
        assert_eq!(description_format("image/png"), None);
    }
}
