use crate::store::StoreError;
use rdf_transform_ldpath::LdPathError;
use rdf_transform_model::{InvalidProgramKey, NamespaceError, ProgramKey, ResourcePath};
use rdf_transform_sparql::QueryEvaluationError;
use std::str::Utf8Error;
use thiserror::Error;

/// An error raised while resolving or applying a transform program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransformError {
    /// No stored program matches any type of the resource under the given key.
    #[error("Couldn't find a transformation for '{resource_path}' and transformation key '{key}'")]
    TransformNotFound {
        resource_path: ResourcePath,
        key: ProgramKey,
    },
    /// The declared content type does not name a known program language.
    #[error("No transform type exists for media type '{declared}'")]
    UnsupportedTransformKind { declared: String },
    /// The program could not be parsed or its evaluation failed.
    #[error("The transform program could not be evaluated: {cause}")]
    EvaluationFailed {
        #[source]
        cause: EvaluationCause,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    InvalidProgramKey(#[from] InvalidProgramKey),
    #[error(transparent)]
    Namespace(#[from] NamespaceError),
}

impl TransformError {
    /// Returns whether the caller is responsible for the error.
    ///
    /// Unknown programs, unsupported content types and syntax errors in the program are client
    /// errors. Failing stores, failing fetches and evaluator faults are not.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::TransformNotFound { .. }
            | Self::UnsupportedTransformKind { .. }
            | Self::InvalidProgramKey(_) => true,
            Self::EvaluationFailed { cause } => cause.is_syntax_error(),
            Self::Store(_) | Self::Namespace(_) => false,
        }
    }
}

/// Why the evaluation of a program failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvaluationCause {
    #[error(transparent)]
    PathQuery(#[from] LdPathError),
    #[error(transparent)]
    StructuredQuery(#[from] QueryEvaluationError),
    #[error("The program body is not valid UTF-8: {0}")]
    ProgramEncoding(#[from] Utf8Error),
}

impl EvaluationCause {
    /// Returns whether the program text itself is at fault.
    pub fn is_syntax_error(&self) -> bool {
        match self {
            Self::PathQuery(error) => error.is_syntax_error(),
            Self::StructuredQuery(error) => error.is_syntax_error(),
            Self::ProgramEncoding(_) => true,
        }
    }
}

impl From<EvaluationCause> for TransformError {
    fn from(cause: EvaluationCause) -> Self {
        Self::EvaluationFailed { cause }
    }
}

macro_rules! evaluation_failure {
    ($t:ty) => {
        impl From<$t> for TransformError {
            fn from(error: $t) -> Self {
                EvaluationCause::from(error).into()
            }
        }
    };
}

evaluation_failure!(LdPathError);
evaluation_failure!(QueryEvaluationError);
evaluation_failure!(Utf8Error);
