use crate::config::TransformConfig;
use crate::error::TransformError;
use crate::evaluator::{TransformEvaluator, TransformResult};
use crate::normalize::normalize_types;
use crate::resolve::ProgramResolver;
use crate::store::ProgramStore;
use rdf_transform_ldpath::LinkedDataResolver;
use rdf_transform_model::{
    ContentKind, NamedNode, NamespaceProvider, ProgramKey, ResourcePath, TransformProgram,
    TripleStream,
};
use std::sync::Arc;
use tracing::info;

/// A repository resource a transform is applied to.
#[derive(Debug)]
pub struct TransformTarget {
    pub path: ResourcePath,
    /// The RDF types of the resource, in the order the repository reports them.
    pub types: Vec<NamedNode>,
    /// The description of the resource. Its topic is the resource itself.
    pub triples: TripleStream,
}

/// Which program to apply.
#[derive(Clone, Debug)]
pub enum TransformRequest {
    /// The stored program of `key` that matches the types of the resource.
    Stored { key: ProgramKey },
    /// A program supplied by the caller, written in the language named by `content_type`.
    Inline {
        program: Arc<[u8]>,
        content_type: String,
    },
}

/// The entry point of the transform pipeline.
///
/// Dispatching is synchronous and holds no state between calls. Cloning is cheap.
#[derive(Clone)]
pub struct TransformDispatcher {
    resolver: ProgramResolver,
    namespaces: Arc<dyn NamespaceProvider>,
    linked_data: Arc<dyn LinkedDataResolver>,
}

impl TransformDispatcher {
    pub fn new(
        config: &TransformConfig,
        store: Arc<dyn ProgramStore>,
        namespaces: Arc<dyn NamespaceProvider>,
        linked_data: Arc<dyn LinkedDataResolver>,
    ) -> Self {
        Self {
            resolver: ProgramResolver::new(config.configuration_root.clone(), store),
            namespaces,
            linked_data,
        }
    }

    pub fn resolver(&self) -> &ProgramResolver {
        &self.resolver
    }

    /// Applies the requested program to `target`.
    ///
    /// Stored programs are always path queries. Inline programs are evaluated by the evaluator of
    /// their content type; an unknown content type fails before the triples are read.
    pub fn dispatch(
        &self,
        target: TransformTarget,
        request: TransformRequest,
    ) -> Result<TransformResult, TransformError> {
        match request {
            TransformRequest::Stored { key } => {
                info!(key = key.as_str(), path = target.path.as_str(), "GET transform");
                let types = normalize_types(&target.types, self.namespaces.as_ref());
                let program = self.resolver.resolve(&target.path, &key, &types)?;
                self.evaluate(target.triples, &program)
            }
            TransformRequest::Inline {
                program,
                content_type,
            } => {
                info!(
                    content_type = content_type.as_str(),
                    path = target.path.as_str(),
                    "POST transform"
                );
                let kind = ContentKind::from_media_type(&content_type).ok_or(
                    TransformError::UnsupportedTransformKind {
                        declared: content_type,
                    },
                )?;
                self.evaluate(target.triples, &TransformProgram::new(kind, program))
            }
        }
    }

    fn evaluate(
        &self,
        triples: TripleStream,
        program: &TransformProgram,
    ) -> Result<TransformResult, TransformError> {
        TransformEvaluator::for_kind(program.kind(), Arc::clone(&self.linked_data))
            .evaluate(triples, program)
    }
}
