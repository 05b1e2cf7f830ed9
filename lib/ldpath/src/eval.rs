use crate::ast::{Function, NodeTest, Selector};
use crate::convert::lexical_form;
use crate::graph::WorkingGraph;
use crate::resolver::FetchError;
use rdf_transform_model::vocab::rdf;
use rdf_transform_model::{Literal, Term};
use rustc_hash::FxHashSet;

impl WorkingGraph<'_> {
    /// Evaluates `selector` starting from `context`.
    ///
    /// Steps keep duplicates. Unions, intersections and recursive steps return distinct nodes.
    pub(crate) fn select(
        &mut self,
        selector: &Selector,
        context: &Term,
    ) -> Result<Vec<Term>, FetchError> {
        let nodes = match selector {
            Selector::SelfNode => vec![context.clone()],
            Selector::Wildcard => self.objects(context, None)?,
            Selector::Property(predicate) => self.objects(context, Some(predicate.as_ref()))?,
            Selector::ReverseProperty(predicate) => {
                self.subjects(context, Some(predicate.as_ref()))
            }
            Selector::ReverseWildcard => self.subjects(context, None),
            Selector::Path(first, second) => {
                let mut nodes = Vec::new();
                for node in self.select(first, context)? {
                    nodes.extend(self.select(second, &node)?);
                }
                nodes
            }
            Selector::Union(left, right) => {
                let mut nodes = self.select(left, context)?;
                nodes.extend(self.select(right, context)?);
                distinct(nodes)
            }
            Selector::Intersection(left, right) => {
                let left = self.select(left, context)?;
                let right = self.select(right, context)?.into_iter().collect::<FxHashSet<_>>();
                distinct(left.into_iter().filter(|node| right.contains(node)).collect())
            }
            Selector::Recursive { inner, min } => self.select_recursive(inner, *min, context)?,
            Selector::Tested(inner, test) => {
                let mut nodes = Vec::new();
                for node in self.select(inner, context)? {
                    if self.test(test, &node)? {
                        nodes.push(node);
                    }
                }
                nodes
            }
            Selector::Literal(literal) => vec![literal.clone().into()],
            Selector::Function(function, arguments) => {
                self.call(*function, arguments, context)?
            }
        };
        Ok(nodes)
    }

    /// Breadth-first closure of `inner`. With `min == 0` the context itself is included.
    fn select_recursive(
        &mut self,
        inner: &Selector,
        min: usize,
        context: &Term,
    ) -> Result<Vec<Term>, FetchError> {
        let mut visited = FxHashSet::default();
        let mut nodes = Vec::new();
        if min == 0 {
            visited.insert(context.clone());
            nodes.push(context.clone());
        }

        let mut frontier = vec![context.clone()];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for node in &frontier {
                for reached in self.select(inner, node)? {
                    if visited.insert(reached.clone()) {
                        nodes.push(reached.clone());
                        next.push(reached);
                    }
                }
            }
            frontier = next;
        }
        Ok(nodes)
    }

    pub(crate) fn test(&mut self, test: &NodeTest, node: &Term) -> Result<bool, FetchError> {
        let result = match test {
            NodeTest::Not(inner) => !self.test(inner, node)?,
            NodeTest::And(left, right) => self.test(left, node)? && self.test(right, node)?,
            NodeTest::Or(left, right) => self.test(left, node)? || self.test(right, node)?,
            NodeTest::Language(expected) => match node {
                Term::Literal(literal) => match (literal.language(), expected) {
                    (Some(actual), Some(expected)) => actual.eq_ignore_ascii_case(expected),
                    (None, None) => true,
                    _ => false,
                },
                _ => false,
            },
            NodeTest::Datatype(datatype) => {
                matches!(node, Term::Literal(literal) if literal.datatype() == datatype.as_ref())
            }
            NodeTest::IsA(class) => self.objects(node, Some(rdf::TYPE))?.contains(class),
            NodeTest::PathValue(selector, value) => self.select(selector, node)?.contains(value),
            NodeTest::PathExists(selector) => !self.select(selector, node)?.is_empty(),
        };
        Ok(result)
    }

    fn call(
        &mut self,
        function: Function,
        arguments: &[Selector],
        context: &Term,
    ) -> Result<Vec<Term>, FetchError> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.select(argument, context)?);
        }

        let result = match function {
            Function::Concat => {
                if values.iter().all(Vec::is_empty) {
                    Vec::new()
                } else {
                    let text = values.iter().flatten().map(lexical_form).collect::<String>();
                    vec![Literal::new_simple_literal(text).into()]
                }
            }
            Function::First => values.into_iter().flatten().take(1).collect(),
            Function::Last => values.into_iter().flatten().last().into_iter().collect(),
            // One count per argument.
            Function::Count => values
                .iter()
                .map(|nodes| Literal::from(i64::try_from(nodes.len()).unwrap_or(i64::MAX)).into())
                .collect(),
            Function::Str => values
                .into_iter()
                .flatten()
                .map(|node| Literal::new_simple_literal(lexical_form(&node)).into())
                .collect(),
        };
        Ok(result)
    }
}

fn distinct(nodes: Vec<Term>) -> Vec<Term> {
    let mut seen = FxHashSet::default();
    nodes
        .into_iter()
        .filter(|node| seen.insert(node.clone()))
        .collect()
}
