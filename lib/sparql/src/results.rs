use crate::error::QueryEvaluationError;
use oxrdf::{Graph, TermRef, Variable, VariableRef};
use oxrdfio::{RdfFormat, RdfSerializer};
use sparesults::{QueryResultsFormat, QueryResultsSerializer};
use std::io::Write;
use std::sync::Arc;

pub use sparesults::QuerySolution;

/// Results of a [SPARQL query](https://www.w3.org/TR/sparql11-query/).
#[derive(Debug)]
pub enum QueryResults {
    /// Results of a [SELECT](https://www.w3.org/TR/sparql11-query/#select) query.
    Solutions(QuerySolutions),
    /// Result of a [ASK](https://www.w3.org/TR/sparql11-query/#ask) query.
    Boolean(bool),
    /// Results of a [CONSTRUCT](https://www.w3.org/TR/sparql11-query/#construct) or [DESCRIBE](https://www.w3.org/TR/sparql11-query/#describe) query.
    Graph(Graph),
}

impl QueryResults {
    /// Writes the query results (solutions or boolean).
    ///
    /// Graph results are written as solutions binding `subject`, `predicate` and `object`.
    pub fn write<W: Write>(
        self,
        writer: W,
        format: QueryResultsFormat,
    ) -> Result<W, QueryEvaluationError> {
        let serializer = QueryResultsSerializer::from_format(format);
        match self {
            Self::Boolean(value) => serializer.serialize_boolean_to_writer(writer, value),
            Self::Solutions(solutions) => {
                let mut serializer = serializer
                    .serialize_solutions_to_writer(writer, solutions.variables().to_vec())
                    .map_err(QueryEvaluationError::ResultsSerialization)?;
                for solution in solutions.iter() {
                    serializer
                        .serialize(solution)
                        .map_err(QueryEvaluationError::ResultsSerialization)?;
                }
                serializer.finish()
            }
            Self::Graph(graph) => {
                let s = VariableRef::new_unchecked("subject");
                let p = VariableRef::new_unchecked("predicate");
                let o = VariableRef::new_unchecked("object");
                let mut serializer = serializer
                    .serialize_solutions_to_writer(
                        writer,
                        vec![s.into_owned(), p.into_owned(), o.into_owned()],
                    )
                    .map_err(QueryEvaluationError::ResultsSerialization)?;
                for triple in &graph {
                    serializer
                        .serialize([
                            (s, TermRef::from(triple.subject)),
                            (p, TermRef::from(triple.predicate)),
                            (o, triple.object),
                        ])
                        .map_err(QueryEvaluationError::ResultsSerialization)?;
                }
                serializer.finish()
            }
        }
        .map_err(QueryEvaluationError::ResultsSerialization)
    }

    /// Writes the graph query results.
    ///
    /// This method fails with [QueryEvaluationError::NotAGraph] if it is called on solutions or
    /// a boolean.
    pub fn write_graph<W: Write>(
        self,
        writer: W,
        format: impl Into<RdfFormat>,
    ) -> Result<W, QueryEvaluationError> {
        let Self::Graph(graph) = self else {
            return Err(QueryEvaluationError::NotAGraph);
        };
        let mut serializer = RdfSerializer::from_format(format.into()).for_writer(writer);
        for triple in &graph {
            serializer
                .serialize_triple(triple)
                .map_err(QueryEvaluationError::ResultsSerialization)?;
        }
        serializer
            .finish()
            .map_err(QueryEvaluationError::ResultsSerialization)
    }

    pub fn is_graph(&self) -> bool {
        matches!(self, Self::Graph(_))
    }
}

/// The solutions of a SELECT query, in evaluation order.
#[derive(Debug)]
pub struct QuerySolutions {
    variables: Arc<[Variable]>,
    solutions: Vec<QuerySolution>,
}

impl QuerySolutions {
    pub fn new(variables: Arc<[Variable]>, solutions: Vec<QuerySolution>) -> Self {
        Self {
            variables,
            solutions,
        }
    }

    /// The projected variables.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuerySolution> {
        self.solutions.iter()
    }
}

impl IntoIterator for QuerySolutions {
    type Item = QuerySolution;
    type IntoIter = std::vec::IntoIter<QuerySolution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

impl<'a> IntoIterator for &'a QuerySolutions {
    type Item = &'a QuerySolution;
    type IntoIter = std::slice::Iter<'a, QuerySolution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}
