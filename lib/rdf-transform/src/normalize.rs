use rdf_transform_model::{NamedNode, NamespaceProvider, PrefixedType};
use tracing::debug;

/// Shortens RDF type IRIs to `prefix:localname` using the namespaces of `namespaces`.
///
/// For each type, the namespaces are scanned in the order reported by the provider and the first
/// non-empty namespace the IRI starts with is used. Types without a matching namespace are
/// returned unchanged, and so are all types if the provider fails. The result has the order and
/// the length of `types`.
pub fn normalize_types<'a>(
    types: impl IntoIterator<Item = &'a NamedNode>,
    namespaces: &dyn NamespaceProvider,
) -> Vec<PrefixedType> {
    let namespace_uris = match namespaces.namespace_uris() {
        Ok(uris) => uris,
        Err(error) => {
            debug!(%error, "Could not list the namespaces, types are not normalized");
            Vec::new()
        }
    };

    types
        .into_iter()
        .map(|rdf_type| normalize_type(rdf_type.as_str(), &namespace_uris, namespaces))
        .collect()
}

fn normalize_type(
    iri: &str,
    namespace_uris: &[String],
    namespaces: &dyn NamespaceProvider,
) -> PrefixedType {
    let Some(namespace) = namespace_uris
        .iter()
        .find(|namespace| !namespace.is_empty() && iri.starts_with(namespace.as_str()))
    else {
        return PrefixedType::new(iri);
    };

    match namespaces.prefix_for(namespace) {
        Ok(prefix) => PrefixedType::new(format!("{prefix}:{}", &iri[namespace.len()..])),
        Err(error) => {
            debug!(%error, iri, "Could not look up the prefix of a namespace");
            PrefixedType::new(iri)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_transform_model::{NamespaceError, NamespaceTable};

    fn types(iris: &[&str]) -> Vec<NamedNode> {
        iris.iter().map(|iri| NamedNode::new_unchecked(*iri)).collect()
    }

    fn normalized(iris: &[&str], namespaces: &dyn NamespaceProvider) -> Vec<String> {
        normalize_types(&types(iris), namespaces)
            .iter()
            .map(|t| t.as_str().to_owned())
            .collect()
    }

    #[test]
    fn test_contributor_is_prefixed() {
        let table =
            NamespaceTable::try_from_pairs([("http://purl.org/dc/elements/1.1/", "dc")]).unwrap();
        assert_eq!(
            normalized(&["http://purl.org/dc/elements/1.1/contributor"], &table),
            vec!["dc:contributor"]
        );
    }

    #[test]
    fn test_unmatched_types_are_unchanged() {
        let table = NamespaceTable::repository_defaults();
        assert_eq!(
            normalized(&["urn:example:Thing", "http://example.com/Type"], &table),
            vec!["urn:example:Thing", "http://example.com/Type"]
        );
    }

    #[test]
    fn test_first_namespace_wins() {
        let table = NamespaceTable::try_from_pairs([
            ("http://example.com/", "ex"),
            ("http://example.com/vocab#", "vocab"),
        ])
        .unwrap();
        assert_eq!(
            normalized(&["http://example.com/vocab#Type"], &table),
            vec!["ex:vocab#Type"]
        );
    }

    #[test]
    fn test_order_and_duplicates_are_kept() {
        let table = NamespaceTable::repository_defaults();
        assert_eq!(
            normalized(
                &[
                    "http://fedora.info/definitions/v4/repository#Resource",
                    "http://www.w3.org/ns/ldp#Container",
                    "http://fedora.info/definitions/v4/repository#Resource",
                ],
                &table
            ),
            vec!["fedora:Resource", "ldp:Container", "fedora:Resource"]
        );
    }

    struct BrokenRegistry;

    impl NamespaceProvider for BrokenRegistry {
        fn namespace_uris(&self) -> Result<Vec<String>, NamespaceError> {
            Ok(vec!["http://purl.org/dc/elements/1.1/".to_owned()])
        }

        fn prefix_for(&self, uri: &str) -> Result<String, NamespaceError> {
            Err(NamespaceError::UnknownNamespace(uri.to_owned()))
        }
    }

    #[test]
    fn test_failed_prefix_lookup_keeps_iri() {
        assert_eq!(
            normalized(&["http://purl.org/dc/elements/1.1/title"], &BrokenRegistry),
            vec!["http://purl.org/dc/elements/1.1/title"]
        );
    }
}
