//! Linked-data resolvers used by path queries to fetch resources outside the local triples.

use crate::config::{LinkedDataConfig, LinkedDataEndpoint};
use dashmap::DashMap;
use oxrdfio::{RdfFormat, RdfParser};
use rdf_transform_ldpath::{FetchError, LinkedDataResolver, NoLinkedData};
use rdf_transform_model::{NamedNode, NamedNodeRef, Triple};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The `Accept` header sent when dereferencing resources.
///
/// Only formats that [RdfParser] reads are offered, so JSON-LD is not.
pub const ACCEPTED_RDF_TYPES: &str =
    "text/turtle;q=1.0, application/rdf+xml;q=0.8, text/n3;q=0.8, application/n-triples;q=0.5";

/// Builds the resolver described by `config`.
pub fn linked_data_resolver(config: &LinkedDataConfig) -> Arc<dyn LinkedDataResolver> {
    if !config.enabled {
        return Arc::new(NoLinkedData);
    }
    let http = HttpLinkedDataResolver::new(config.endpoints.clone(), config.timeout);
    match config.cache_ttl {
        Some(ttl) => Arc::new(CachingLinkedDataResolver::new(http, Some(ttl))),
        None => Arc::new(http),
    }
}

/// Dereferences IRIs over HTTP with RDF content negotiation.
///
/// The blocking client is created on first use, so the resolver can be built inside an async
/// runtime as long as it is only called from blocking threads.
#[derive(Debug)]
pub struct HttpLinkedDataResolver {
    endpoints: Vec<LinkedDataEndpoint>,
    timeout: Duration,
    client: OnceLock<Client>,
}

impl HttpLinkedDataResolver {
    pub fn new(endpoints: Vec<LinkedDataEndpoint>, timeout: Duration) -> Self {
        Self {
            endpoints,
            timeout,
            client: OnceLock::new(),
        }
    }

    fn client(&self, iri: &str) -> Result<&Client, FetchError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|error| FetchError::Request {
                iri: iri.to_owned(),
                source: Box::new(error),
            })?;
        Ok(self.client.get_or_init(|| client))
    }

    fn endpoint_for(&self, iri: &str) -> Option<&LinkedDataEndpoint> {
        self.endpoints.iter().find(|endpoint| endpoint.matches(iri))
    }
}

impl LinkedDataResolver for HttpLinkedDataResolver {
    fn dereference(&self, iri: NamedNodeRef<'_>) -> Result<Vec<Triple>, FetchError> {
        let iri = iri.as_str();
        if !iri.starts_with("http://") && !iri.starts_with("https://") {
            debug!(iri, "Not dereferencing a non-HTTP IRI");
            return Ok(Vec::new());
        }

        let request_error = |error: reqwest::Error| FetchError::Request {
            iri: iri.to_owned(),
            source: Box::new(error),
        };

        let mut request = self.client(iri)?.get(iri).header(ACCEPT, ACCEPTED_RDF_TYPES);
        if let Some(credentials) = self
            .endpoint_for(iri)
            .and_then(|endpoint| endpoint.credentials.as_ref())
        {
            request = request.basic_auth(&credentials.username, credentials.password.as_ref());
        }

        debug!(iri, "Dereferencing linked-data resource");
        let response = request.send().map_err(request_error)?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                iri: iri.to_owned(),
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let Some(format) = RdfFormat::from_media_type(&content_type) else {
            return Err(FetchError::UnsupportedContentType {
                iri: iri.to_owned(),
                content_type,
            });
        };

        let body = response.bytes().map_err(request_error)?;
        parse_description(iri, format, &body)
    }
}

/// Parses a fetched document, resolving relative IRIs against `iri`.
fn parse_description(iri: &str, format: RdfFormat, body: &[u8]) -> Result<Vec<Triple>, FetchError> {
    let parse_error = |error: Box<dyn std::error::Error + Send + Sync>| FetchError::Parse {
        iri: iri.to_owned(),
        source: error,
    };

    RdfParser::from_format(format)
        .with_base_iri(iri)
        .map_err(|error| parse_error(Box::new(error)))?
        .for_reader(body)
        .map(|quad| quad.map(Triple::from).map_err(|error| parse_error(Box::new(error))))
        .collect()
}

/// Caches the descriptions returned by another resolver.
///
/// Entries expire after the time-to-live, if one is configured. Failed fetches are not cached,
/// so a failing resource is requested again by the next evaluation.
pub struct CachingLinkedDataResolver<R> {
    inner: R,
    ttl: Option<Duration>,
    entries: DashMap<NamedNode, CacheEntry>,
}

struct CacheEntry {
    fetched_at: Instant,
    triples: Arc<[Triple]>,
}

impl<R: LinkedDataResolver> CachingLinkedDataResolver<R> {
    pub fn new(inner: R, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cached(&self, iri: NamedNodeRef<'_>) -> Option<Arc<[Triple]>> {
        let entry = self.entries.get(&iri.into_owned())?;
        let expired = self
            .ttl
            .is_some_and(|ttl| entry.fetched_at.elapsed() >= ttl);
        (!expired).then(|| Arc::clone(&entry.triples))
    }
}

impl<R: LinkedDataResolver> LinkedDataResolver for CachingLinkedDataResolver<R> {
    fn dereference(&self, iri: NamedNodeRef<'_>) -> Result<Vec<Triple>, FetchError> {
        if let Some(triples) = self.cached(iri) {
            debug!(iri = iri.as_str(), "Serving linked-data resource from the cache");
            return Ok(triples.to_vec());
        }

        let triples = match self.inner.dereference(iri) {
            Ok(triples) => triples,
            Err(error) => {
                warn!(%error, "Fetching linked-data resource failed, the failure is not cached");
                return Err(error);
            }
        };
        self.entries.insert(
            iri.into_owned(),
            CacheEntry {
                fetched_at: Instant::now(),
                triples: triples.as_slice().into(),
            },
        );
        Ok(triples)
    }
}
