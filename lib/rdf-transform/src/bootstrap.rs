use crate::config::DEFAULT_TRANSFORM_RESOURCE;
use crate::store::{StoreError, WritableProgramStore};
use rdf_transform_model::ResourcePath;
use std::sync::Arc;
use tracing::debug;

/// The program keys installed at startup, with the body of their `fedora:Resource` program.
pub const DEFAULT_PROGRAMS: &[(&str, &str)] = &[
    ("default", include_str!("../programs/default.ldpath")),
    ("deluxe", include_str!("../programs/deluxe.ldpath")),
];

/// Installs the default program keys below `configuration_root`.
///
/// Creates the container of every default key and uploads its program for `fedora:Resource`
/// unless a program with that name (ignoring case) already exists. Programs that were changed or
/// added by users are left untouched, so running this more than once has no further effect.
pub fn ensure_defaults(
    store: &dyn WritableProgramStore,
    configuration_root: &ResourcePath,
) -> Result<(), StoreError> {
    for (key, program) in DEFAULT_PROGRAMS {
        let container = configuration_root.child(key);
        store.find_or_create_container(&container)?;
        debug!(container = container.as_str(), "Transformation default resource");

        let upload_path = container.child(DEFAULT_TRANSFORM_RESOURCE);
        let exists = store.find_children(&container)?.iter().any(|child| {
            child
                .path
                .as_str()
                .eq_ignore_ascii_case(upload_path.as_str())
        });
        if !exists {
            debug!(path = upload_path.as_str(), "Uploading default program");
            store.put_program(&upload_path, Arc::from(program.as_bytes()))?;
        }
    }
    Ok(())
}
