#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Transforms the RDF description of a repository resource into structured output.
//!
//! A transform is either looked up in a [ProgramStore] by its key and the RDF types of the
//! resource, or supplied inline together with its content type. Path-query programs produce a
//! [FieldMap](rdf_transform_model::FieldMap), structured queries produce
//! [QueryResults](rdf_transform_sparql::QueryResults).
//!
//! ```
//! use rdf_transform::{
//!     ensure_defaults, MemProgramStore, TransformConfig, TransformDispatcher, TransformRequest,
//!     TransformResult, TransformTarget,
//! };
//! use rdf_transform_ldpath::NoLinkedData;
//! use rdf_transform_model::vocab::{dc, fedora};
//! use rdf_transform_model::{
//!     Literal, NamedNode, NamespaceTable, ProgramKey, ResourcePath, Triple, TripleStream,
//! };
//! use std::sync::Arc;
//!
//! let config = TransformConfig::default();
//! let store = Arc::new(MemProgramStore::new());
//! ensure_defaults(store.as_ref(), &config.configuration_root)?;
//!
//! let dispatcher = TransformDispatcher::new(
//!     &config,
//!     store,
//!     Arc::new(NamespaceTable::repository_defaults()),
//!     Arc::new(NoLinkedData),
//! );
//! let topic = NamedNode::new("http://localhost/rest/a")?;
//! let title = Triple::new(topic.clone(), dc::TITLE, Literal::new_simple_literal("A title"));
//! let target = TransformTarget {
//!     path: ResourcePath::new("/a"),
//!     types: vec![fedora::RESOURCE.into_owned()],
//!     triples: TripleStream::new(topic, [title]),
//! };
//! let result = dispatcher.dispatch(
//!     target,
//!     TransformRequest::Stored { key: ProgramKey::new(ProgramKey::DEFAULT)? },
//! )?;
//! let TransformResult::Fields(fields) = result else {
//!     unreachable!("stored programs are path queries");
//! };
//! assert_eq!(serde_json::to_string(&fields)?, r#"{"id":["http://localhost/rest/a"],"title":["A title"]}"#);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod bootstrap;
pub mod config;
mod dispatch;
mod error;
mod evaluator;
pub mod linked_data;
mod normalize;
mod resolve;
mod store;

pub use bootstrap::{ensure_defaults, DEFAULT_PROGRAMS};
pub use config::TransformConfig;
pub use dispatch::{TransformDispatcher, TransformRequest, TransformTarget};
pub use error::{EvaluationCause, TransformError};
pub use evaluator::{TransformEvaluator, TransformResult};
pub use normalize::normalize_types;
pub use resolve::ProgramResolver;
pub use store::{
    MemProgramStore, ProgramStore, StoreError, StoreNode, StoredProgram, WritableProgramStore,
};
