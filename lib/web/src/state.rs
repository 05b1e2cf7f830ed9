use crate::config::ServerConfig;
use crate::repository::ResourceRepository;
use rdf_transform::linked_data::linked_data_resolver;
use rdf_transform::{ensure_defaults, MemProgramStore, StoreError, TransformDispatcher};
use rdf_transform_model::{IriParseError, NamedNode, ResourcePath};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: TransformDispatcher,
    pub programs: Arc<MemProgramStore>,
    pub resources: Arc<ResourceRepository>,
    pub base_url: Arc<str>,
}

impl AppState {
    /// Builds the state of a server and installs the default programs.
    pub fn new(config: &ServerConfig) -> Result<Self, StoreError> {
        let programs = Arc::new(MemProgramStore::new());
        ensure_defaults(programs.as_ref(), &config.transform.configuration_root)?;

        let dispatcher = TransformDispatcher::new(
            &config.transform,
            Arc::<MemProgramStore>::clone(&programs),
            Arc::new(config.namespaces.clone()),
            linked_data_resolver(&config.transform.linked_data),
        );
        Ok(Self {
            dispatcher,
            programs,
            resources: Arc::new(ResourceRepository::new()),
            base_url: config.base_url().into(),
        })
    }

    pub fn configuration_root(&self) -> &ResourcePath {
        self.dispatcher.resolver().configuration_root()
    }

    /// Whether `path` addresses a program rather than a resource.
    pub fn is_program_path(&self, path: &ResourcePath) -> bool {
        let root = self.configuration_root().as_str();
        path.as_str()
            .strip_prefix(root)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// The IRI of the resource at `path`.
    pub fn topic(&self, path: &ResourcePath) -> Result<NamedNode, IriParseError> {
        if path.is_root() {
            return NamedNode::new(format!("{}/", self.base_url));
        }
        NamedNode::new(format!("{}{}", self.base_url, path.as_str()))
    }
}
