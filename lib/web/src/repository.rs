//! The in-memory repository of resource descriptions served by the web layer.

use dashmap::DashMap;
use rdf_transform_model::vocab::{fedora, rdf};
use rdf_transform_model::{NamedNode, ResourcePath, Subject, Term, Triple, TripleStream};
use std::sync::Arc;

/// The description of a repository resource.
#[derive(Clone, Debug)]
pub struct StoredResource {
    pub topic: NamedNode,
    pub triples: Arc<[Triple]>,
}

impl StoredResource {
    /// The `rdf:type`s of the topic in the order of the description, followed by
    /// `fedora:Resource` if the description does not state it.
    pub fn types(&self) -> Vec<NamedNode> {
        let mut types = self
            .triples
            .iter()
            .filter(|triple| {
                triple.predicate == rdf::TYPE
                    && matches!(&triple.subject, Subject::NamedNode(s) if *s == self.topic)
            })
            .filter_map(|triple| match &triple.object {
                Term::NamedNode(rdf_type) => Some(rdf_type.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        if !types.iter().any(|rdf_type| *rdf_type == fedora::RESOURCE) {
            types.push(fedora::RESOURCE.into_owned());
        }
        types
    }

    pub fn stream(&self) -> TripleStream {
        TripleStream::new(self.topic.clone(), self.triples.to_vec())
    }
}

/// Maps resource paths to their latest description.
#[derive(Debug, Default)]
pub struct ResourceRepository {
    resources: DashMap<ResourcePath, StoredResource>,
}

impl ResourceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &ResourcePath) -> Option<StoredResource> {
        self.resources.get(path).map(|entry| entry.value().clone())
    }

    /// Stores the description of `path`. Returns whether the resource is new.
    pub fn put(&self, path: ResourcePath, resource: StoredResource) -> bool {
        self.resources.insert(path, resource).is_none()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_transform_model::vocab::ldp;

    #[test]
    fn test_types_keep_description_order() {
        let topic = NamedNode::new_unchecked("http://localhost/a");
        let other = NamedNode::new_unchecked("http://localhost/b");
        let container = NamedNode::new_unchecked("http://www.w3.org/ns/ldp#Container");
        let resource = StoredResource {
            topic: topic.clone(),
            triples: vec![
                Triple::new(topic.clone(), rdf::TYPE, container.clone()),
                Triple::new(other, rdf::TYPE, NamedNode::new_unchecked("http://localhost/T")),
                Triple::new(topic, ldp::CONTAINS, container.clone()),
            ]
            .into(),
        };

        assert_eq!(
            resource.types(),
            vec![container, fedora::RESOURCE.into_owned()]
        );
    }
}
