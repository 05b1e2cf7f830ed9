use spargebra::SparqlSyntaxError;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::io;
use thiserror::Error;

/// A SPARQL evaluation error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryEvaluationError {
    /// An error in SPARQL parsing.
    #[error(transparent)]
    Parsing(#[from] SparqlSyntaxError),
    /// An error returned during results serialization.
    #[error(transparent)]
    ResultsSerialization(io::Error),
    /// The results are not a RDF graph
    #[error("The query results are not a RDF graph")]
    NotAGraph,
    /// The results are a RDF graph
    #[error("The query results are a RDF graph, not solutions or a boolean")]
    NotSolutions,
    #[error("A feature is not supported by the in-memory evaluator: {0}")]
    NotImplemented(String),
    #[error("An internal error that likely indicates towards a bug: {0}")]
    InternalError(String),
}

impl QueryEvaluationError {
    pub fn not_implemented<T>(feature: impl Into<String>) -> Result<T, Self> {
        Err(Self::NotImplemented(feature.into()))
    }

    /// Returns whether the error is caused by the query text.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::Parsing(_))
    }
}

impl From<Infallible> for QueryEvaluationError {
    #[inline]
    fn from(error: Infallible) -> Self {
        match error {}
    }
}

/// A light-weight result for expression evaluation.
pub(crate) type ThinResult<T> = Result<T, ThinError>;

/// An *expected* failure without any reason.
///
/// Many SPARQL operations fail as part of regular evaluation, for example because an argument has
/// the wrong datatype or a variable is unbound. All of these errors are treated the same way (the
/// expression has no value), so no reason is stored.
#[derive(Clone, Copy, Debug, Default, Error, PartialEq, Eq)]
pub(crate) struct ThinError {}

impl ThinError {
    pub(crate) fn expected<T>() -> ThinResult<T> {
        Err(ThinError::default())
    }
}

impl Display for ThinError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("An expected error occurred.")
    }
}

macro_rules! implement_from {
    ($t:ty) => {
        impl From<$t> for ThinError {
            fn from(_: $t) -> Self {
                ThinError::default()
            }
        }
    };
}

implement_from!(oxsdatatypes::ParseDecimalError);
implement_from!(oxsdatatypes::ParseDateTimeError);
implement_from!(oxsdatatypes::TooLargeForDecimalError);
implement_from!(std::num::ParseIntError);
implement_from!(std::num::ParseFloatError);
implement_from!(std::num::TryFromIntError);
implement_from!(std::string::FromUtf8Error);
implement_from!(oxiri::IriParseError);
implement_from!(oxrdf::LanguageTagParseError);
