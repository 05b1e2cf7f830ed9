use rdf_transform::TransformConfig;
use rdf_transform_model::NamespaceTable;

/// The largest request body (resource description or program) that is accepted.
pub const MAX_BODY_SIZE: usize = 1024 * 1024 * 16; // 16MB

/// Holds the configuration for a transform web server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// The IP address or DNS name that the socket binds to.
    pub bind: String,
    /// Whether CORS is enabled.
    pub cors: bool,
    /// The IRI prefix of repository resources. The topic of `/a/b` is `<base_url>/a/b`.
    ///
    /// Defaults to `http://<bind>`.
    pub base_url: Option<String>,
    /// Where programs are looked up and how linked data is fetched.
    pub transform: TransformConfig,
    /// The namespaces used to shorten resource types.
    pub namespaces: NamespaceTable,
}

impl ServerConfig {
    pub fn new(bind: impl Into<String>) -> Self {
        Self {
            bind: bind.into(),
            cors: false,
            base_url: None,
            transform: TransformConfig::default(),
            namespaces: NamespaceTable::repository_defaults(),
        }
    }

    /// The IRI prefix of repository resources, without a trailing slash.
    pub fn base_url(&self) -> String {
        let base_url = match &self.base_url {
            Some(base_url) => base_url.clone(),
            None => format!("http://{}", self.bind),
        };
        base_url.trim_end_matches('/').to_owned()
    }
}
