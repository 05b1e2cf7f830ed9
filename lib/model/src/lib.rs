//! The data model shared by all RDF Transform crates.
//!
//! Besides re-exporting the RDF terms of [oxrdf], this crate defines the vocabulary of the
//! transform pipeline: namespace tables, program keys and bodies, resource paths, the
//! single-pass [TripleStream] that describes a topic resource, and the values produced by path
//! queries.

mod error;
mod namespace;
mod program;
mod resource;
mod triples;
mod value;
pub mod vocab;

pub use error::*;
pub use namespace::*;
pub use program::*;
pub use resource::*;
pub use triples::*;
pub use value::*;

// Re-export some oxrdf types.
pub use oxiri::Iri;
pub use oxrdf::{
    BlankNode, BlankNodeRef, Graph, IriParseError, Literal, LiteralRef, NamedNode, NamedNodeRef,
    NamedOrBlankNode, Subject, SubjectRef, Term, TermRef, Triple, TripleRef, Variable,
    VariableRef,
};
