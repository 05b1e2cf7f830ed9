use crate::error::TransformServerError;
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use headers::HeaderMapExt;
use headers_accept::Accept;
use mediatype::names::{APPLICATION, CSV, JSON, N3, N_TRIPLES, TEXT, TURTLE, XML};
use mediatype::{MediaType, Name};
use oxrdfio::RdfFormat;
use rdf_transform_sparql::QueryResultsFormat;

/// Handles the content-negotiation for responses that contain an RDF graph.
impl FromRequestParts<AppState> for RdfFormat {
    type Rejection = TransformServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        static MEDIA_TYPES: [MediaType<'_>; 4] = [
            MediaType::new(TEXT, TURTLE),
            MediaType::new(APPLICATION, N_TRIPLES),
            MediaType::new(APPLICATION, Name::new_unchecked("rdf+xml")),
            MediaType::new(TEXT, N3),
        ];
        static DEFAULT_MEDIA_TYPE: MediaType<'_> = MediaType::new(TEXT, TURTLE);

        let accept = parts.headers.typed_get::<Accept>();
        let media_type = content_negotiation(
            accept,
            &MEDIA_TYPES,
            &DEFAULT_MEDIA_TYPE,
            "text/turtle or application/n-triples",
        )?;

        RdfFormat::from_media_type(media_type.to_string().as_str()).ok_or_else(|| {
            TransformServerError::BadRequest(format!(
                "Could not convert negotiated media type '{media_type}' to internal representation."
            ))
        })
    }
}

/// Handles the content-negotiation for responses that contain solutions or a boolean.
impl FromRequestParts<AppState> for QueryResultsFormat {
    type Rejection = TransformServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        static MEDIA_TYPES: [MediaType<'_>; 6] = [
            MediaType::new(APPLICATION, Name::new_unchecked("sparql-results+json")),
            MediaType::new(APPLICATION, JSON),
            MediaType::new(APPLICATION, Name::new_unchecked("sparql-results+xml")),
            MediaType::new(APPLICATION, XML),
            MediaType::new(TEXT, CSV),
            MediaType::new(TEXT, Name::new_unchecked("tab-separated-values")),
        ];
        static DEFAULT_MEDIA_TYPE: MediaType<'_> =
            MediaType::new(APPLICATION, Name::new_unchecked("sparql-results+json"));

        let accept = parts.headers.typed_get::<Accept>();
        let media_type = content_negotiation(
            accept,
            &MEDIA_TYPES,
            &DEFAULT_MEDIA_TYPE,
            "application/sparql-results+json or text/tab-separated-values",
        )?;

        QueryResultsFormat::from_media_type(media_type.to_string().as_str()).ok_or_else(|| {
            TransformServerError::BadRequest(format!(
                "Could not convert negotiated media type '{media_type}' to internal representation."
            ))
        })
    }
}

/// The declared `Content-Type` of a request body.
pub struct RequestContentType(pub Option<String>);

impl FromRequestParts<AppState> for RequestContentType {
    type Rejection = TransformServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(CONTENT_TYPE) else {
            return Ok(Self(None));
        };
        let value = value.to_str().map_err(|_| {
            TransformServerError::BadRequest("The Content-Type header is not valid ASCII".to_owned())
        })?;
        Ok(Self(Some(value.to_owned())))
    }
}

fn content_negotiation<'media>(
    accept: Option<Accept>,
    available: &'media [MediaType<'media>],
    default: &'media MediaType<'media>,
    example: &str,
) -> Result<MediaType<'media>, TransformServerError> {
    let Some(accept) = accept else {
        return Ok(default.clone());
    };

    match accept.negotiate(available) {
        None => Err(TransformServerError::ContentNegotiation(format!(
            "The accept header does not provide any accepted format like {example}."
        ))),
        Some(result) => Ok(result.clone()),
    }
}
