use crate::resolver::{FetchError, LinkedDataResolver};
use rdf_transform_model::{NamedNode, NamedNodeRef, Subject, Term, TripleIndex};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

/// The triples visible to one evaluation: the local triples plus everything dereferenced so far.
pub(crate) struct WorkingGraph<'r> {
    index: TripleIndex,
    resolver: &'r dyn LinkedDataResolver,
    dereferenced: FxHashSet<NamedNode>,
}

impl<'r> WorkingGraph<'r> {
    pub(crate) fn new(index: TripleIndex, resolver: &'r dyn LinkedDataResolver) -> Self {
        Self {
            index,
            resolver,
            dereferenced: FxHashSet::default(),
        }
    }

    /// The objects of the outgoing triples of `node`, optionally restricted to one predicate.
    ///
    /// Named nodes without local description are dereferenced first.
    pub(crate) fn objects(
        &mut self,
        node: &Term,
        predicate: Option<NamedNodeRef<'_>>,
    ) -> Result<Vec<Term>, FetchError> {
        let subject = match node {
            Term::NamedNode(node) => Subject::NamedNode(node.clone()),
            Term::BlankNode(node) => Subject::BlankNode(node.clone()),
            Term::Literal(_) => return Ok(Vec::new()),
        };
        self.ensure_described(&subject)?;

        Ok(self
            .index
            .triples_for_subject(&subject)
            .filter(|t| predicate.map_or(true, |p| t.predicate.as_ref() == p))
            .map(|t| t.object.clone())
            .collect())
    }

    /// The subjects of the incoming triples of `node`, optionally restricted to one predicate.
    ///
    /// Only triples that are already known are considered.
    pub(crate) fn subjects(&self, node: &Term, predicate: Option<NamedNodeRef<'_>>) -> Vec<Term> {
        self.index
            .triples_for_object(node)
            .filter(|t| predicate.map_or(true, |p| t.predicate.as_ref() == p))
            .map(|t| t.subject.clone().into())
            .collect()
    }

    fn ensure_described(&mut self, subject: &Subject) -> Result<(), FetchError> {
        let Subject::NamedNode(iri) = subject else {
            return Ok(());
        };
        if self.index.has_subject(subject) || !self.dereferenced.insert(iri.clone()) {
            return Ok(());
        }

        debug!(iri = iri.as_str(), "Dereferencing resource");
        let triples = self.resolver.dereference(iri.as_ref()).inspect_err(|error| {
            warn!(iri = iri.as_str(), %error, "Failed to dereference resource");
        })?;
        debug!(iri = iri.as_str(), count = triples.len(), "Merged dereferenced triples");
        self.index.extend(triples);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_transform_model::vocab::rdfs;
    use rdf_transform_model::{Literal, Triple};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl LinkedDataResolver for CountingResolver {
        fn dereference(&self, iri: NamedNodeRef<'_>) -> Result<Vec<Triple>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Triple::new(
                iri,
                rdfs::LABEL,
                Literal::new_simple_literal("remote"),
            )])
        }
    }

    #[test]
    fn test_dereferences_once_per_resource() {
        let resolver = CountingResolver::default();
        let mut graph = WorkingGraph::new(TripleIndex::new(), &resolver);
        let node = Term::from(NamedNode::new_unchecked("http://example.com/remote"));

        assert_eq!(graph.objects(&node, Some(rdfs::LABEL)).unwrap().len(), 1);
        assert_eq!(graph.objects(&node, None).unwrap().len(), 1);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_local_description_is_not_dereferenced() {
        let resolver = CountingResolver::default();
        let node = NamedNode::new_unchecked("http://example.com/local");
        let index = [Triple::new(
            node.clone(),
            rdfs::LABEL,
            Literal::new_simple_literal("local"),
        )]
        .into_iter()
        .collect();
        let mut graph = WorkingGraph::new(index, &resolver);

        let labels = graph.objects(&node.into(), Some(rdfs::LABEL)).unwrap();
        assert_eq!(labels, vec![Term::from(Literal::new_simple_literal("local"))]);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }
}
