//! Storage of transform programs.
//!
//! Programs live in a tree of containers. The programs of one key are the direct children of
//! `<configuration root>/<key>` and are named after the (prefixed) RDF type they apply to.

use rdf_transform_model::ResourcePath;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// An error raised by a [ProgramStore].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// A container was expected at a path that holds a program.
    #[error("'{0}' is a program, not a container")]
    NotAContainer(ResourcePath),
    /// A program was expected at a path that holds a container.
    #[error("'{0}' is a container, not a program")]
    NotAProgram(ResourcePath),
    /// The store cannot be accessed.
    #[error("The program store is unavailable: {0}")]
    Unavailable(String),
}

/// A program stored at a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredProgram {
    pub path: ResourcePath,
    pub content: Arc<[u8]>,
}

/// A node of the program tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreNode {
    Container(ResourcePath),
    Program(StoredProgram),
}

impl StoreNode {
    pub fn path(&self) -> &ResourcePath {
        match self {
            Self::Container(path) => path,
            Self::Program(program) => &program.path,
        }
    }
}

/// Read access to stored programs.
pub trait ProgramStore: Send + Sync {
    /// Looks up the node at `path`.
    fn find(&self, path: &ResourcePath) -> Result<Option<StoreNode>, StoreError>;

    /// Lists the programs directly below `path`, in store order.
    ///
    /// The order is part of the contract: the resolver takes the first matching program.
    fn find_children(&self, path: &ResourcePath) -> Result<Vec<StoredProgram>, StoreError>;
}

/// A [ProgramStore] that can be written to.
pub trait WritableProgramStore: ProgramStore {
    /// Makes sure that a container exists at `path`, creating missing ancestors.
    fn find_or_create_container(&self, path: &ResourcePath) -> Result<(), StoreError>;

    /// Stores `content` at `path`, replacing an existing program. Missing ancestors are created.
    fn put_program(&self, path: &ResourcePath, content: Arc<[u8]>) -> Result<(), StoreError>;
}

/// An in-memory [WritableProgramStore].
///
/// Children are listed in the order in which they were first created.
#[derive(Debug, Default)]
pub struct MemProgramStore {
    nodes: RwLock<Vec<StoreNode>>,
}

impl MemProgramStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<StoreNode>>, StoreError> {
        self.nodes
            .read()
            .map_err(|_| StoreError::Unavailable("the store lock is poisoned".to_owned()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<StoreNode>>, StoreError> {
        self.nodes
            .write()
            .map_err(|_| StoreError::Unavailable("the store lock is poisoned".to_owned()))
    }
}

fn ensure_container(nodes: &mut Vec<StoreNode>, path: &ResourcePath) -> Result<(), StoreError> {
    if path.is_root() {
        return Ok(());
    }
    match nodes.iter().find(|node| node.path() == path) {
        Some(StoreNode::Container(_)) => Ok(()),
        Some(StoreNode::Program(_)) => Err(StoreError::NotAContainer(path.clone())),
        None => {
            if let Some(parent) = path.parent() {
                ensure_container(nodes, &parent)?;
            }
            nodes.push(StoreNode::Container(path.clone()));
            Ok(())
        }
    }
}

impl ProgramStore for MemProgramStore {
    fn find(&self, path: &ResourcePath) -> Result<Option<StoreNode>, StoreError> {
        Ok(self
            .read()?
            .iter()
            .find(|node| node.path() == path)
            .cloned())
    }

    fn find_children(&self, path: &ResourcePath) -> Result<Vec<StoredProgram>, StoreError> {
        Ok(self
            .read()?
            .iter()
            .filter_map(|node| match node {
                StoreNode::Program(program) if program.path.parent().as_ref() == Some(path) => {
                    Some(program.clone())
                }
                _ => None,
            })
            .collect())
    }
}

impl WritableProgramStore for MemProgramStore {
    fn find_or_create_container(&self, path: &ResourcePath) -> Result<(), StoreError> {
        ensure_container(&mut self.write()?, path)
    }

    fn put_program(&self, path: &ResourcePath, content: Arc<[u8]>) -> Result<(), StoreError> {
        let mut nodes = self.write()?;
        if let Some(parent) = path.parent() {
            ensure_container(&mut nodes, &parent)?;
        }
        let program = StoredProgram {
            path: path.clone(),
            content,
        };
        match nodes.iter_mut().find(|node| node.path() == path) {
            Some(StoreNode::Container(_)) => return Err(StoreError::NotAProgram(path.clone())),
            Some(node) => *node = StoreNode::Program(program),
            None => nodes.push(StoreNode::Program(program)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(value: &str) -> ResourcePath {
        ResourcePath::new(value)
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let store = MemProgramStore::new();
        store.put_program(&path("/root/key/b:B"), Arc::from(*b"b")).unwrap();
        store.put_program(&path("/root/key/a:A"), Arc::from(*b"a")).unwrap();
        store.put_program(&path("/root/other/c:C"), Arc::from(*b"c")).unwrap();

        let children = store.find_children(&path("/root/key")).unwrap();
        let paths = children
            .iter()
            .map(|child| child.path.as_str())
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["/root/key/b:B", "/root/key/a:A"]);
    }

    #[test]
    fn test_put_creates_ancestors() {
        let store = MemProgramStore::new();
        store.put_program(&path("/a/b/c"), Arc::from(*b"x")).unwrap();
        assert_eq!(
            store.find(&path("/a/b")).unwrap(),
            Some(StoreNode::Container(path("/a/b")))
        );
        assert_eq!(
            store.find(&path("a")).unwrap(),
            Some(StoreNode::Container(path("/a")))
        );
    }

    #[test]
    fn test_replacing_a_program_keeps_its_position() {
        let store = MemProgramStore::new();
        store.put_program(&path("/k/first"), Arc::from(*b"1")).unwrap();
        store.put_program(&path("/k/second"), Arc::from(*b"2")).unwrap();
        store.put_program(&path("/k/first"), Arc::from(*b"3")).unwrap();

        let children = store.find_children(&path("/k")).unwrap();
        assert_eq!(children[0].content.as_ref(), b"3");
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_container_and_program_conflicts() {
        let store = MemProgramStore::new();
        store.find_or_create_container(&path("/a/b")).unwrap();
        assert_eq!(
            store.put_program(&path("/a/b"), Arc::from(*b"x")),
            Err(StoreError::NotAProgram(path("/a/b")))
        );

        store.put_program(&path("/p"), Arc::from(*b"x")).unwrap();
        assert_eq!(
            store.find_or_create_container(&path("/p/q")),
            Err(StoreError::NotAContainer(path("/p")))
        );
    }
}
