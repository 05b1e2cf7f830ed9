use crate::binding::Binding;
use crate::error::QueryEvaluationError;
use crate::eval::{term_to_subject, SolutionEvaluator};
use crate::results::{QueryResults, QuerySolution, QuerySolutions};
use crate::supported::check_query;
use oxrdf::{BlankNode, Graph, NamedNode, Subject, Term, Triple, Variable};
use rdf_transform_model::{TripleIndex, TripleStream};
use rustc_hash::{FxHashMap, FxHashSet};
use spargebra::algebra::GraphPattern;
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
use spargebra::Query;
use std::sync::Arc;
use tracing::debug;

/// Evaluates SPARQL queries against the triples that describe a single resource.
///
/// The query is parsed with the topic of the triple stream as its base IRI, so `<>` refers to the
/// topic. Only the default graph is available: `GRAPH`, `SERVICE`, `FROM` clauses as well as
/// custom functions and aggregates fail with [QueryEvaluationError::NotImplemented].
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuredQueryEvaluator;

impl StructuredQueryEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Parses `query` and evaluates it against `triples`.
    ///
    /// Parsing and the feature check happen before the stream is read.
    pub fn evaluate(
        &self,
        triples: TripleStream,
        query: &str,
    ) -> Result<QueryResults, QueryEvaluationError> {
        let query = Query::parse(query, Some(triples.topic().as_str()))?;
        self.evaluate_query(triples, &query)
    }

    /// Evaluates an already parsed `query` against `triples`.
    pub fn evaluate_query(
        &self,
        triples: TripleStream,
        query: &Query,
    ) -> Result<QueryResults, QueryEvaluationError> {
        check_query(query)?;

        let (topic, index) = triples.into_index();
        debug!(topic = topic.as_str(), triples = index.len(), "Evaluating structured query");

        match query {
            Query::Select {
                pattern, base_iri, ..
            } => {
                let solutions = SolutionEvaluator::new(&index, base_iri.clone()).evaluate(pattern)?;
                let variables: Arc<[Variable]> = in_scope_variables(pattern).into();
                let solutions = solutions
                    .iter()
                    .map(|solution| {
                        QuerySolution::from((Arc::clone(&variables), solution.values_of(&variables)))
                    })
                    .collect();
                Ok(QueryResults::Solutions(QuerySolutions::new(variables, solutions)))
            }
            Query::Ask {
                pattern, base_iri, ..
            } => {
                let solutions = SolutionEvaluator::new(&index, base_iri.clone()).evaluate(pattern)?;
                Ok(QueryResults::Boolean(!solutions.is_empty()))
            }
            Query::Construct {
                template,
                pattern,
                base_iri,
                ..
            } => {
                let solutions = SolutionEvaluator::new(&index, base_iri.clone()).evaluate(pattern)?;
                Ok(QueryResults::Graph(construct(template, &solutions)))
            }
            Query::Describe {
                pattern, base_iri, ..
            } => {
                let solutions = SolutionEvaluator::new(&index, base_iri.clone()).evaluate(pattern)?;
                Ok(QueryResults::Graph(describe(&index, pattern, &solutions)))
            }
        }
    }
}

fn in_scope_variables(pattern: &GraphPattern) -> Vec<Variable> {
    let mut variables = Vec::new();
    pattern.on_in_scope_variable(|variable| {
        if !variables.contains(variable) {
            variables.push(variable.clone());
        }
    });
    variables
}

/// Instantiates `template` once per solution.
///
/// Every solution gets fresh blank nodes. Triples with an unbound variable or an invalid term
/// position (e.g. a literal subject) are skipped.
fn construct(template: &[TriplePattern], solutions: &[Binding]) -> Graph {
    let mut graph = Graph::new();
    for solution in solutions {
        let mut blank_nodes = FxHashMap::default();
        for pattern in template {
            let Some(subject) = instantiate(&pattern.subject, solution, &mut blank_nodes)
                .and_then(term_to_subject)
            else {
                continue;
            };
            let predicate: NamedNode = match &pattern.predicate {
                NamedNodePattern::NamedNode(node) => node.clone(),
                NamedNodePattern::Variable(variable) => match solution.get(variable) {
                    Some(Term::NamedNode(node)) => node.clone(),
                    _ => continue,
                },
            };
            let Some(object) = instantiate(&pattern.object, solution, &mut blank_nodes) else {
                continue;
            };
            graph.insert(&Triple::new(subject, predicate, object));
        }
    }
    graph
}

fn instantiate(
    pattern: &TermPattern,
    solution: &Binding,
    blank_nodes: &mut FxHashMap<BlankNode, BlankNode>,
) -> Option<Term> {
    match pattern {
        TermPattern::NamedNode(node) => Some(node.clone().into()),
        TermPattern::Literal(literal) => Some(literal.clone().into()),
        TermPattern::BlankNode(node) => {
            Some(blank_nodes.entry(node.clone()).or_default().clone().into())
        }
        TermPattern::Variable(variable) => solution.get(variable).cloned(),
    }
}

/// Collects the triples of every resource bound by the in-scope variables.
///
/// Blank node objects are described as well, so their properties are not lost.
fn describe(index: &TripleIndex, pattern: &GraphPattern, solutions: &[Binding]) -> Graph {
    let variables = in_scope_variables(pattern);
    let mut queue: Vec<Subject> = solutions
        .iter()
        .flat_map(|solution| variables.iter().filter_map(|v| solution.get(v).cloned()))
        .filter_map(term_to_subject)
        .collect();
    queue.reverse();

    let mut graph = Graph::new();
    let mut described = FxHashSet::default();
    while let Some(subject) = queue.pop() {
        if !described.insert(subject.clone()) {
            continue;
        }
        for triple in index.triples_for_subject(&subject) {
            graph.insert(triple);
            if let Term::BlankNode(node) = &triple.object {
                queue.push(node.clone().into());
            }
        }
    }
    graph
}
