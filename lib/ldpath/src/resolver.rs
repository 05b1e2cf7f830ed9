use rdf_transform_model::{NamedNodeRef, Triple};
use std::error::Error;
use thiserror::Error;

/// Fetches the description of a resource that is not part of the local triples.
///
/// Path queries may navigate from the topic to resources described elsewhere. Whenever a step
/// needs the outgoing triples of such a resource, the evaluator asks the resolver once per
/// evaluation and merges the returned triples into its working graph.
pub trait LinkedDataResolver: Send + Sync {
    /// Returns the triples describing `iri`. An empty result means "nothing known".
    fn dereference(&self, iri: NamedNodeRef<'_>) -> Result<Vec<Triple>, FetchError>;
}

/// A resolver that never leaves the local triples.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLinkedData;

impl LinkedDataResolver for NoLinkedData {
    fn dereference(&self, _iri: NamedNodeRef<'_>) -> Result<Vec<Triple>, FetchError> {
        Ok(Vec::new())
    }
}

/// An error raised while dereferencing a linked-data resource.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The request could not be sent or its body could not be read.
    #[error("Could not fetch <{iri}>: {source}")]
    Request {
        iri: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The server answered with an unexpected status code.
    #[error("Fetching <{iri}> returned status {status}")]
    Status { iri: String, status: u16 },
    /// The server answered with a content type that is not an RDF serialization.
    #[error("Fetching <{iri}> returned the unsupported content type '{content_type}'")]
    UnsupportedContentType { iri: String, content_type: String },
    /// The returned document is not valid RDF.
    #[error("Could not parse the description of <{iri}>: {source}")]
    Parse {
        iri: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}
