use crate::vocab;
use crate::NamespaceError;

/// Read access to a namespace registry that maps namespace IRIs to short prefixes.
///
/// The order of [NamespaceProvider::namespace_uris] is significant: consumers that look for a
/// matching namespace take the first one in this order.
pub trait NamespaceProvider: Send + Sync {
    /// Lists the registered namespace IRIs in resolution order.
    fn namespace_uris(&self) -> Result<Vec<String>, NamespaceError>;

    /// Returns the prefix bound to `uri`.
    ///
    /// # Errors
    ///
    /// Fails with [NamespaceError::UnknownNamespace] if `uri` is not registered.
    fn prefix_for(&self, uri: &str) -> Result<String, NamespaceError>;
}

/// An ordered namespace IRI → prefix table.
///
/// No two distinct namespace IRIs share a prefix. Entries are kept in insertion order, which is
/// the order in which [NamespaceProvider::namespace_uris] reports them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    entries: Vec<(String, String)>,
}

impl NamespaceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with the namespaces every repository knows about.
    pub fn repository_defaults() -> Self {
        let mut table = Self::new();
        for (prefix, namespace) in vocab::REPOSITORY_NAMESPACES {
            // The defaults are distinct and non-empty.
            let _ = table.insert(*namespace, *prefix);
        }
        table
    }

    /// Binds `prefix` to `namespace`.
    ///
    /// Re-binding a namespace that is already present to the same prefix is a no-op. Returns
    /// whether a new entry was added.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<bool, NamespaceError> {
        let namespace = namespace.into();
        let prefix = prefix.into();
        if namespace.is_empty() {
            return Err(NamespaceError::EmptyNamespace(prefix));
        }

        if let Some((existing, _)) = self.entries.iter().find(|(_, p)| *p == prefix) {
            if *existing == namespace {
                return Ok(false);
            }
            return Err(NamespaceError::DuplicatePrefix {
                prefix,
                existing: existing.clone(),
                namespace,
            });
        }

        self.entries.push((namespace, prefix));
        Ok(true)
    }

    /// Builds a table from `(namespace, prefix)` pairs, keeping their order.
    pub fn try_from_pairs<N, P>(
        pairs: impl IntoIterator<Item = (N, P)>,
    ) -> Result<Self, NamespaceError>
    where
        N: Into<String>,
        P: Into<String>,
    {
        let mut table = Self::new();
        for (namespace, prefix) in pairs {
            table.insert(namespace, prefix)?;
        }
        Ok(table)
    }

    /// Returns the namespace bound to `prefix`.
    pub fn namespace_for(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, p)| p == prefix)
            .map(|(namespace, _)| namespace.as_str())
    }

    /// Iterates over the `(namespace, prefix)` entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(namespace, prefix)| (namespace.as_str(), prefix.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NamespaceProvider for NamespaceTable {
    fn namespace_uris(&self) -> Result<Vec<String>, NamespaceError> {
        Ok(self
            .entries
            .iter()
            .map(|(namespace, _)| namespace.clone())
            .collect())
    }

    fn prefix_for(&self, uri: &str) -> Result<String, NamespaceError> {
        self.entries
            .iter()
            .find(|(namespace, _)| namespace == uri)
            .map(|(_, prefix)| prefix.clone())
            .ok_or_else(|| NamespaceError::UnknownNamespace(uri.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order() {
        let table = NamespaceTable::try_from_pairs([
            ("http://example.com/b#", "b"),
            ("http://example.com/a#", "a"),
        ])
        .unwrap();

        assert_eq!(
            table.namespace_uris().unwrap(),
            vec!["http://example.com/b#", "http://example.com/a#"]
        );
    }

    #[test]
    fn test_duplicate_prefix_is_rejected() {
        let result = NamespaceTable::try_from_pairs([
            ("http://example.com/a#", "ex"),
            ("http://example.com/b#", "ex"),
        ]);

        assert!(matches!(
            result,
            Err(NamespaceError::DuplicatePrefix { prefix, .. }) if prefix == "ex"
        ));
    }

    #[test]
    fn test_rebinding_same_pair_is_noop() {
        let mut table = NamespaceTable::new();
        assert_eq!(table.insert("http://example.com/a#", "ex"), Ok(true));
        assert_eq!(table.insert("http://example.com/a#", "ex"), Ok(false));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_namespace_is_rejected() {
        let mut table = NamespaceTable::new();
        assert_eq!(
            table.insert("", "empty"),
            Err(NamespaceError::EmptyNamespace("empty".to_owned()))
        );
    }

    #[test]
    fn test_prefix_for_unknown_namespace() {
        let table = NamespaceTable::repository_defaults();
        assert_eq!(
            table.prefix_for("http://unknown.example/"),
            Err(NamespaceError::UnknownNamespace(
                "http://unknown.example/".to_owned()
            ))
        );
        assert_eq!(table.prefix_for(vocab::dc::NAMESPACE).unwrap(), "dc");
    }
}
