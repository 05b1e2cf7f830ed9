//! A path language for selecting values from the RDF description of a resource.
//!
//! A program is a list of fields. Each field names a path selector, evaluated from the topic
//! resource, and an optional datatype that its values are converted to:
//!
//! ```text
//! @prefix ex : <http://example.com/> ;
//! title    = rdfs:label[@en] :: xsd:string ;
//! authors  = dc:creator / foaf:name ;
//! parts    = (ex:hasPart)+ :: xsd:anyURI ;
//! count    = fn:count(dc:subject) :: xsd:int ;
//! ```
//!
//! Evaluation produces a [FieldMap](rdf_transform_model::FieldMap). Resources that the program
//! navigates to but that are not described by the local triples can be fetched through a
//! [LinkedDataResolver].

pub mod ast;
mod convert;
mod error;
mod eval;
mod evaluator;
mod graph;
mod parser;
mod resolver;

pub use error::*;
pub use evaluator::PathQueryEvaluator;
pub use parser::{parse_program, BUILTIN_PREFIXES};
pub use resolver::*;
