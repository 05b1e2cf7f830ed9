use std::fmt::{Display, Formatter};

/// The path of a repository resource, e.g. `/collections/books/1`.
///
/// Paths are normalized on construction: they always start with a single `/` and never end with
/// one (except for the root itself).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath(String);

impl ResourcePath {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(normalize_path(path.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether this is the repository root (`/`).
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<ResourcePath> {
        if self.is_root() {
            return None;
        }
        let (parent, _) = self.0.rsplit_once('/')?;
        Some(Self::new(parent))
    }

    /// Appends a child segment.
    pub fn child(&self, segment: &str) -> ResourcePath {
        Self::new(format!("{}/{}", self.0, segment))
    }
}

impl Display for ResourcePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourcePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourcePath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Collapses repeated slashes, adds a leading slash and strips the trailing one.
pub fn normalize_path(path: &str) -> String {
    let segments = path.split('/').filter(|s| !s.is_empty());
    let mut result = String::with_capacity(path.len() + 1);
    for segment in segments {
        result.push('/');
        result.push_str(segment);
    }
    if result.is_empty() {
        result.push('/');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(ResourcePath::new("a/b/").as_str(), "/a/b");
        assert_eq!(ResourcePath::new("//a//b").as_str(), "/a/b");
        assert_eq!(ResourcePath::new("").as_str(), "/");
    }

    #[test]
    fn test_parent_and_child() {
        let path = ResourcePath::new("/fedora:system/fedora:transform");
        assert_eq!(path.parent(), Some(ResourcePath::new("/fedora:system")));
        assert_eq!(
            path.child("fedora:ldpath").as_str(),
            "/fedora:system/fedora:transform/fedora:ldpath"
        );
        assert_eq!(ResourcePath::new("/").parent(), None);
        assert_eq!(ResourcePath::new("/a").parent(), Some(ResourcePath::new("/")));
    }
}
