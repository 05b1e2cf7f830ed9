use crate::error::TransformError;
use crate::store::{ProgramStore, StoredProgram};
use rdf_transform_model::{PrefixedType, ProgramKey, ResourcePath, TransformProgram};
use std::sync::Arc;
use tracing::debug;

/// Locates the stored program of a key that applies to a resource.
#[derive(Clone)]
pub struct ProgramResolver {
    configuration_root: ResourcePath,
    store: Arc<dyn ProgramStore>,
}

impl ProgramResolver {
    pub fn new(configuration_root: ResourcePath, store: Arc<dyn ProgramStore>) -> Self {
        Self {
            configuration_root,
            store,
        }
    }

    pub fn configuration_root(&self) -> &ResourcePath {
        &self.configuration_root
    }

    /// The container that holds the programs of `key`.
    pub fn key_container(&self, key: &ProgramKey) -> ResourcePath {
        self.configuration_root.child(key.as_str())
    }

    /// Returns the program of `key` for a resource with the given (normalized) types.
    ///
    /// The children of the key container are checked in store order and the first one whose path
    /// equals `<key container>/<type>` for any of the types, ignoring case, is returned. Exactly
    /// one program is returned; programs of several matching types are never merged.
    ///
    /// # Errors
    ///
    /// Fails with [TransformError::TransformNotFound] if the key container does not exist or if
    /// no child matches.
    pub fn resolve(
        &self,
        resource_path: &ResourcePath,
        key: &ProgramKey,
        types: &[PrefixedType],
    ) -> Result<TransformProgram, TransformError> {
        let not_found = || TransformError::TransformNotFound {
            resource_path: resource_path.clone(),
            key: key.clone(),
        };

        let container = self.key_container(key);
        if self.store.find(&container)?.is_none() {
            debug!(container = container.as_str(), "Transform container does not exist");
            return Err(not_found());
        }
        debug!(container = container.as_str(), "Found transform container");

        let candidates = types
            .iter()
            .map(|rdf_type| container.child(rdf_type.as_str()).as_str().to_lowercase())
            .collect::<Vec<_>>();
        debug!(types = ?types, "Discovered rdf types");

        let program = self
            .store
            .find_children(&container)?
            .into_iter()
            .find(|child| is_candidate(child, &candidates))
            .ok_or_else(not_found)?;
        debug!(program = program.path.as_str(), "Selected transform program");

        Ok(TransformProgram::path_query(program.content))
    }
}

fn is_candidate(child: &StoredProgram, candidates: &[String]) -> bool {
    let path = child.path.as_str().to_lowercase();
    candidates.iter().any(|candidate| *candidate == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemProgramStore, WritableProgramStore};

    const ROOT: &str = "/fedora:system/fedora:transform/fedora:ldpath/";

    fn resolver(store: MemProgramStore) -> ProgramResolver {
        ProgramResolver::new(ResourcePath::new(ROOT), Arc::new(store))
    }

    fn key(value: &str) -> ProgramKey {
        ProgramKey::new(value).unwrap()
    }

    fn types(values: &[&str]) -> Vec<PrefixedType> {
        values.iter().map(|v| PrefixedType::new(*v)).collect()
    }

    fn put(store: &MemProgramStore, path: &str, body: &str) {
        store
            .put_program(&ResourcePath::new(path), Arc::from(body.as_bytes()))
            .unwrap();
    }

    #[test]
    fn test_resolves_matching_type() {
        let store = MemProgramStore::new();
        put(&store, &format!("{ROOT}some-program/custom:type"), "x = . ;");

        let program = resolver(store)
            .resolve(
                &ResourcePath::new("/a"),
                &key("some-program"),
                &types(&["custom:type"]),
            )
            .unwrap();
        assert_eq!(program.body(), b"x = . ;");
    }

    #[test]
    fn test_match_ignores_case() {
        let store = MemProgramStore::new();
        put(&store, &format!("{ROOT}default/Fedora:Resource"), "x = . ;");

        let program = resolver(store).resolve(
            &ResourcePath::new("/a"),
            &key("default"),
            &types(&["fedora:resource"]),
        );
        assert!(program.is_ok());
    }

    #[test]
    fn test_first_child_in_store_order_wins() {
        let store = MemProgramStore::new();
        put(&store, &format!("{ROOT}default/ldp:Container"), "container");
        put(&store, &format!("{ROOT}default/fedora:Resource"), "resource");

        let resolver = resolver(store);
        for _ in 0..3 {
            let program = resolver
                .resolve(
                    &ResourcePath::new("/a"),
                    &key("default"),
                    &types(&["fedora:Resource", "ldp:Container"]),
                )
                .unwrap();
            assert_eq!(program.body(), b"container");
        }
    }

    #[test]
    fn test_empty_container_is_not_found() {
        let store = MemProgramStore::new();
        store
            .find_or_create_container(&ResourcePath::new(format!("{ROOT}some-program")))
            .unwrap();

        let result = resolver(store).resolve(
            &ResourcePath::new("/a"),
            &key("some-program"),
            &types(&["custom:type"]),
        );
        assert!(matches!(
            result,
            Err(TransformError::TransformNotFound { resource_path, key })
                if resource_path.as_str() == "/a" && key.as_str() == "some-program"
        ));
    }

    #[test]
    fn test_missing_container_is_not_found() {
        let result = resolver(MemProgramStore::new()).resolve(
            &ResourcePath::new("/a"),
            &key("missing"),
            &types(&["fedora:Resource"]),
        );
        assert!(matches!(result, Err(TransformError::TransformNotFound { .. })));
    }
}
