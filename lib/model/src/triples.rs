use oxrdf::{NamedNode, NamedNodeRef, Subject, Term, Triple};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::{Debug, Formatter};

/// A single-pass stream of triples describing one *topic* resource.
///
/// The stream is consumed by value, so a stream can only ever be evaluated once.
pub struct TripleStream {
    topic: NamedNode,
    triples: Box<dyn Iterator<Item = Triple> + Send>,
}

impl TripleStream {
    pub fn new<I>(topic: NamedNode, triples: I) -> Self
    where
        I: IntoIterator<Item = Triple>,
        I::IntoIter: Send + 'static,
    {
        Self {
            topic,
            triples: Box::new(triples.into_iter()),
        }
    }

    /// Creates a stream that describes `topic` without any triples.
    pub fn empty(topic: NamedNode) -> Self {
        Self::new(topic, Vec::new())
    }

    /// The resource this stream describes.
    pub fn topic(&self) -> &NamedNode {
        &self.topic
    }

    /// Drains the stream into an in-memory index.
    pub fn into_index(self) -> (NamedNode, TripleIndex) {
        let mut index = TripleIndex::new();
        index.extend(self.triples);
        (self.topic, index)
    }
}

impl Iterator for TripleStream {
    type Item = Triple;

    fn next(&mut self) -> Option<Self::Item> {
        self.triples.next()
    }
}

impl Debug for TripleStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripleStream")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

/// An in-memory set of triples that remembers insertion order.
///
/// Triples are indexed by subject and by object. Lookups return triples in the order in which
/// they were first inserted, which keeps path evaluation deterministic.
#[derive(Clone, Default)]
pub struct TripleIndex {
    triples: Vec<Triple>,
    known: FxHashSet<Triple>,
    by_subject: FxHashMap<Subject, Vec<usize>>,
    by_object: FxHashMap<Term, Vec<usize>>,
}

impl TripleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `triple`. Returns `false` if the triple was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if !self.known.insert(triple.clone()) {
            return false;
        }

        let position = self.triples.len();
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(position);
        self.by_object
            .entry(triple.object.clone())
            .or_default()
            .push(position);
        self.triples.push(triple);
        true
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.known.contains(triple)
    }

    /// Iterates over all triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Returns whether `subject` has at least one outgoing triple.
    pub fn has_subject(&self, subject: &Subject) -> bool {
        self.by_subject.contains_key(subject)
    }

    pub fn triples_for_subject<'a>(
        &'a self,
        subject: &Subject,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.positions(self.by_subject.get(subject))
    }

    pub fn triples_for_object<'a>(&'a self, object: &Term) -> impl Iterator<Item = &'a Triple> + 'a {
        self.positions(self.by_object.get(object))
    }

    pub fn objects_for_subject_predicate<'a>(
        &'a self,
        subject: &Subject,
        predicate: NamedNodeRef<'a>,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples_for_subject(subject)
            .filter(move |t| t.predicate.as_ref() == predicate)
            .map(|t| &t.object)
    }

    pub fn subjects_for_predicate_object<'a>(
        &'a self,
        predicate: NamedNodeRef<'a>,
        object: &Term,
    ) -> impl Iterator<Item = &'a Subject> + 'a {
        self.triples_for_object(object)
            .filter(move |t| t.predicate.as_ref() == predicate)
            .map(|t| &t.subject)
    }

    /// Returns every distinct subject and object, in order of first appearance.
    pub fn nodes(&self) -> Vec<Term> {
        let mut seen = FxHashSet::default();
        let mut nodes = Vec::new();
        for triple in &self.triples {
            let subject = Term::from(triple.subject.clone());
            if seen.insert(subject.clone()) {
                nodes.push(subject);
            }
            if seen.insert(triple.object.clone()) {
                nodes.push(triple.object.clone());
            }
        }
        nodes
    }

    fn positions<'a>(&'a self, positions: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a Triple> + 'a {
        positions
            .into_iter()
            .flatten()
            .map(|position| &self.triples[*position])
    }
}

impl Extend<Triple> for TripleIndex {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl FromIterator<Triple> for TripleIndex {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl Debug for TripleIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.triples.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{dc, rdfs};
    use oxrdf::Literal;

    fn topic() -> NamedNode {
        NamedNode::new_unchecked("http://example.com/topic")
    }

    #[test]
    fn test_insert_deduplicates() {
        let triple = Triple::new(topic(), rdfs::LABEL, Literal::new_simple_literal("a"));
        let mut index = TripleIndex::new();
        assert!(index.insert(triple.clone()));
        assert!(!index.insert(triple));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_lookup_keeps_insertion_order() {
        let index: TripleIndex = ["b", "a", "c"]
            .into_iter()
            .map(|v| Triple::new(topic(), dc::TITLE, Literal::new_simple_literal(v)))
            .collect();

        let values = index
            .objects_for_subject_predicate(&topic().into(), dc::TITLE)
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(values, vec!["\"b\"", "\"a\"", "\"c\""]);
    }

    #[test]
    fn test_reverse_lookup() {
        let other = NamedNode::new_unchecked("http://example.com/other");
        let index: TripleIndex = [Triple::new(other.clone(), dc::SUBJECT, topic())]
            .into_iter()
            .collect();

        let subjects = index
            .subjects_for_predicate_object(dc::SUBJECT, &topic().into())
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(subjects, vec![Subject::from(other)]);
    }

    #[test]
    fn test_stream_into_index() {
        let stream = TripleStream::new(
            topic(),
            vec![Triple::new(topic(), rdfs::LABEL, Literal::new_simple_literal("x"))],
        );
        let (topic, index) = stream.into_index();
        assert_eq!(topic.as_str(), "http://example.com/topic");
        assert!(index.has_subject(&topic.into()));
    }
}
