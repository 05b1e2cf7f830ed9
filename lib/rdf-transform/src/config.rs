use rdf_transform_model::ResourcePath;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// The container below which the programs of every key are stored.
pub const DEFAULT_CONFIGURATION_ROOT: &str = "/fedora:system/fedora:transform/fedora:ldpath/";
/// The type name of the program installed for every default key.
pub const DEFAULT_TRANSFORM_RESOURCE: &str = "fedora:Resource";
pub const LINKED_DATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Holds the configuration of the transform pipeline.
#[derive(Clone, Debug)]
pub struct TransformConfig {
    /// The container below which programs are looked up.
    pub configuration_root: ResourcePath,
    /// How resources outside the local triples are fetched.
    pub linked_data: LinkedDataConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            configuration_root: ResourcePath::new(DEFAULT_CONFIGURATION_ROOT),
            linked_data: LinkedDataConfig::default(),
        }
    }
}

/// Holds the configuration of the linked-data resolver used by path queries.
#[derive(Clone, Debug)]
pub struct LinkedDataConfig {
    /// Whether resources outside the local triples are fetched at all.
    pub enabled: bool,
    /// Endpoints with special settings. IRIs that match no endpoint are fetched anonymously.
    pub endpoints: Vec<LinkedDataEndpoint>,
    pub timeout: Duration,
    /// How long fetched descriptions are cached. `None` disables the cache.
    pub cache_ttl: Option<Duration>,
}

impl Default for LinkedDataConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoints: Vec::new(),
            timeout: LINKED_DATA_TIMEOUT,
            cache_ttl: None,
        }
    }
}

/// A server whose resources are fetched with specific settings, e.g. the repository itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkedDataEndpoint {
    /// The IRI prefix the endpoint is responsible for.
    pub prefix: String,
    pub credentials: Option<Credentials>,
}

impl LinkedDataEndpoint {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            credentials: None,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn matches(&self, iri: &str) -> bool {
        iri.starts_with(&self.prefix)
    }
}

/// Basic authentication credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
