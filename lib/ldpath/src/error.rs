use crate::resolver::FetchError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// An error raised while parsing or evaluating a path-query program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LdPathError {
    #[error(transparent)]
    Syntax(#[from] LdPathSyntaxError),
    /// Dereferencing a linked-data resource failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl LdPathError {
    /// Returns whether the error is caused by the program text rather than by the environment.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }
}

/// A syntax error in a path-query program, with the (1-based) position where it was detected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct LdPathSyntaxError {
    line: usize,
    column: usize,
    message: String,
}

impl LdPathSyntaxError {
    pub(crate) fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for LdPathSyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Path query syntax error at line {} column {}: {}",
            self.line, self.column, self.message
        )
    }
}
