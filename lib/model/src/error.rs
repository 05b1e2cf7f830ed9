use thiserror::Error;

/// An error raised by a namespace registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum NamespaceError {
    /// The namespace IRI is not registered.
    #[error("The namespace <{0}> is not registered")]
    UnknownNamespace(String),
    /// The prefix is already bound to another namespace IRI.
    #[error("The prefix '{prefix}' is already bound to <{existing}>, cannot bind it to <{namespace}>")]
    DuplicatePrefix {
        /// The contested prefix.
        prefix: String,
        /// The namespace IRI the prefix is already bound to.
        existing: String,
        /// The namespace IRI that was rejected.
        namespace: String,
    },
    /// Namespace IRIs must not be empty.
    #[error("A namespace IRI must not be empty (prefix '{0}')")]
    EmptyNamespace(String),
    /// The registry itself could not be read.
    #[error("The namespace registry is unavailable: {0}")]
    Unavailable(String),
}

/// An error raised when a string is not a valid [ProgramKey](crate::ProgramKey).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{0}' is not a valid program key; keys must be non-empty and must not contain '/'")]
pub struct InvalidProgramKey(pub String);
