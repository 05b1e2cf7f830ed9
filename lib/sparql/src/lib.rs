//! In-memory [SPARQL 1.1](https://www.w3.org/TR/sparql11-query/) evaluation over the triples
//! that describe a single resource.
//!
//! Queries see a single default graph built from a [TripleStream](rdf_transform_model::TripleStream).
//! The topic of the stream is the base IRI of the query:
//!
//! ```
//! use rdf_transform_model::{Literal, NamedNode, Triple, TripleStream};
//! use rdf_transform_model::vocab::rdfs;
//! use rdf_transform_sparql::{QueryResults, StructuredQueryEvaluator};
//!
//! let topic = NamedNode::new("http://example.com/topic")?;
//! let label = Triple::new(topic.clone(), rdfs::LABEL, Literal::new_simple_literal("Topic"));
//! let results = StructuredQueryEvaluator::new().evaluate(
//!     TripleStream::new(topic, vec![label]),
//!     "ASK { <> <http://www.w3.org/2000/01/rdf-schema#label> \"Topic\" }",
//! )?;
//! assert!(matches!(results, QueryResults::Boolean(true)));
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod aggregate;
mod binding;
mod error;
mod eval;
mod evaluator;
mod functions;
mod numeric;
mod path;
mod results;
mod supported;
mod value;

pub use error::QueryEvaluationError;
pub use evaluator::StructuredQueryEvaluator;
pub use results::{QueryResults, QuerySolution, QuerySolutions};
pub use sparesults::QueryResultsFormat;
pub use spargebra::{Query, SparqlSyntaxError};
