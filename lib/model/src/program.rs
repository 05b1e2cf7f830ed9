use crate::InvalidProgramKey;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// The media type of path-query programs.
pub const PATH_QUERY_MEDIA_TYPE: &str = "application/rdf+ldpath";
/// The media type of structured (SPARQL) query programs.
pub const STRUCTURED_QUERY_MEDIA_TYPE: &str = "application/sparql-query";

/// Identifies a family of stored transform programs, e.g. `default` or `deluxe`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramKey(String);

impl ProgramKey {
    /// The key of the program family installed by default.
    pub const DEFAULT: &'static str = "default";

    pub fn new(key: impl Into<String>) -> Result<Self, InvalidProgramKey> {
        let key = key.into();
        if key.is_empty() || key.contains('/') {
            return Err(InvalidProgramKey(key));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProgramKey {
    type Err = InvalidProgramKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for ProgramKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An RDF type written as `prefix:localname`, or the full IRI if no namespace matched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrefixedType(String);

impl PrefixedType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the type was shortened with a namespace prefix.
    pub fn is_prefixed(&self) -> bool {
        !self.0.contains("://") && self.0.contains(':')
    }
}

impl Display for PrefixedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The language a transform program is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// A field-oriented path query producing named collections of values.
    PathQuery,
    /// A SPARQL query producing solutions, a boolean or a graph.
    StructuredQuery,
}

impl ContentKind {
    /// Maps a declared media type to a content kind.
    ///
    /// Media type parameters (`; charset=...`) and letter case are ignored.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PATH_QUERY_MEDIA_TYPE => Some(Self::PathQuery),
            STRUCTURED_QUERY_MEDIA_TYPE => Some(Self::StructuredQuery),
            _ => None,
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::PathQuery => PATH_QUERY_MEDIA_TYPE,
            Self::StructuredQuery => STRUCTURED_QUERY_MEDIA_TYPE,
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.media_type())
    }
}

/// A transform program body together with the language it is written in.
///
/// Two programs are equal iff their bodies are byte-wise equal; the kind does not take part in
/// the comparison.
#[derive(Clone, Debug)]
pub struct TransformProgram {
    kind: ContentKind,
    body: Arc<[u8]>,
}

impl TransformProgram {
    pub fn new(kind: ContentKind, body: impl Into<Arc<[u8]>>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }

    pub fn path_query(body: impl Into<Arc<[u8]>>) -> Self {
        Self::new(ContentKind::PathQuery, body)
    }

    pub fn structured_query(body: impl Into<Arc<[u8]>>) -> Self {
        Self::new(ContentKind::StructuredQuery, body)
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body as UTF-8 text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

impl PartialEq for TransformProgram {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl Eq for TransformProgram {}

impl Hash for TransformProgram {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.body.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_key_validation() {
        assert!(ProgramKey::new("default").is_ok());
        assert_eq!(
            ProgramKey::new("a/b"),
            Err(InvalidProgramKey("a/b".to_owned()))
        );
        assert!(ProgramKey::new("").is_err());
    }

    #[test]
    fn test_content_kind_from_media_type() {
        assert_eq!(
            ContentKind::from_media_type("application/rdf+ldpath"),
            Some(ContentKind::PathQuery)
        );
        assert_eq!(
            ContentKind::from_media_type("Application/SPARQL-Query; charset=utf-8"),
            Some(ContentKind::StructuredQuery)
        );
        assert_eq!(ContentKind::from_media_type("text/plain"), None);
    }

    #[test]
    fn test_program_equality_ignores_kind() {
        let a = TransformProgram::path_query(b"title = rdfs:label ;".as_slice());
        let b = TransformProgram::structured_query(b"title = rdfs:label ;".as_slice());
        let c = TransformProgram::path_query(b"label = rdfs:label ;".as_slice());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_prefixed_type() {
        assert!(PrefixedType::new("dc:contributor").is_prefixed());
        assert!(!PrefixedType::new("http://example.com/Type").is_prefixed());
    }
}
