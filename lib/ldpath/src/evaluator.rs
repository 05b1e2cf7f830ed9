use crate::ast::Program;
use crate::convert::convert;
use crate::graph::WorkingGraph;
use crate::parser::parse_program;
use crate::resolver::{LinkedDataResolver, NoLinkedData};
use crate::LdPathError;
use rdf_transform_model::{FieldMap, Term, TripleStream};
use std::sync::Arc;
use tracing::debug;

/// Evaluates path-query programs against the triples describing a topic.
///
/// Each evaluation starts from the local triples of its stream. Resources reached by the program
/// that are not described locally are fetched through the [LinkedDataResolver].
#[derive(Clone)]
pub struct PathQueryEvaluator {
    resolver: Arc<dyn LinkedDataResolver>,
}

impl PathQueryEvaluator {
    pub fn new(resolver: Arc<dyn LinkedDataResolver>) -> Self {
        Self { resolver }
    }

    /// Parses `program` and evaluates it against `triples`.
    ///
    /// The program is parsed before the stream is read, so a syntax error leaves the stream
    /// untouched.
    pub fn evaluate(&self, triples: TripleStream, program: &str) -> Result<FieldMap, LdPathError> {
        let program = parse_program(program)?;
        self.evaluate_program(triples, &program)
    }

    /// Evaluates an already parsed program against `triples`.
    pub fn evaluate_program(
        &self,
        triples: TripleStream,
        program: &Program,
    ) -> Result<FieldMap, LdPathError> {
        let (topic, index) = triples.into_index();
        debug!(topic = topic.as_str(), triples = index.len(), "Evaluating path query");
        let topic = Term::from(topic);
        let mut graph = WorkingGraph::new(index, self.resolver.as_ref());

        let mut fields = FieldMap::new();
        if let Some(filter) = &program.filter {
            if !graph.test(filter, &topic)? {
                debug!("The topic does not pass the program filter");
                return Ok(fields);
            }
        }

        for field in &program.fields {
            let mut values = Vec::new();
            for node in graph.select(&field.selector, &topic)? {
                match convert(&node, field.field_type.as_ref()) {
                    Some(value) => values.push(value),
                    None => debug!(
                        field = field.name.as_str(),
                        %node,
                        "Skipping a value that cannot be converted to the field type"
                    ),
                }
            }
            fields.insert(field.name.clone(), values);
        }
        Ok(fields)
    }
}

impl Default for PathQueryEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(NoLinkedData))
    }
}
