//! Error types for the description-language parser.
//!
//! This module provides a unified error type [`ScmError`]. Every variant
//! belongs to one of two kinds (see [`ErrorKind`]): malformed description
//! text, or a failure resolving an external resource referenced by the text.

use thiserror::Error;

/// Result type alias using [`ScmError`].
pub type Result<T> = std::result::Result<T, ScmError>;

/// The two error kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed, ambiguous, duplicate or unknown text in a description line.
    DescriptionFile,
    /// A script or function referenced by a description line could not be resolved.
    ExternalResource,
}

/// Unified error type for all parsing operations.
#[derive(Error, Debug)]
pub enum ScmError {
    // ============ Description File Errors ============
    /// Vocabulary name that cannot be used in equations
    #[error("Invalid variable name '{name}': {message}")]
    InvalidVocabulary { name: String, message: String },

    /// Term that violates the term grammar
    #[error("Invalid term '{term}': {message}")]
    MalformedTerm { term: String, message: String },

    /// Character sequence that matches no grammar rule or known variable
    #[error("Unknown symbol '{symbol}' at column {column} in '{input}'")]
    UnknownSymbol {
        input: String,
        symbol: String,
        column: usize,
    },

    /// Two terms of one equation reference the same parents
    #[error("Duplicate term for parents {{{parents}}} in equation '{equation}'")]
    DuplicateTerm { equation: String, parents: String },

    /// Equation string with no terms
    #[error("Empty equation")]
    EmptyEquation,

    /// Node line that violates the node grammar
    #[error("Invalid node line '{line}': {message}")]
    InvalidNode { line: String, message: String },

    /// Node line with an unrecognized leading keyword
    #[error("Unknown node type '{keyword}'")]
    UnknownKeyword { keyword: String },

    /// Distribution keyword that is not supported
    #[error("Unknown distribution '{name}'")]
    UnknownDistribution { name: String },

    /// Parameter names do not match the distribution's required set
    #[error("Distribution '{distribution}' requires parameters [{expected}], got [{found}]")]
    ParameterMismatch {
        distribution: String,
        expected: String,
        found: String,
    },

    /// Malformed correction block
    #[error("Invalid correction for '{distribution}': {message}")]
    InvalidCorrection {
        distribution: String,
        message: String,
    },

    /// Node kind that cannot have structural parents was given some
    #[error("Node '{line}' cannot have parents (got {count})")]
    ParentsNotAllowed { line: String, count: usize },

    // ============ External Resource Errors ============
    /// Script file could not be read
    #[error("Failed to load script '{path}': {source}")]
    ScriptNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Script exists but defines no function with the given name
    #[error("Function '{name}' not found in script '{path}'")]
    FunctionNotFound { path: String, name: String },

    /// Error reading a description file.
    ///
    /// Only raised by the file entry point used by the command-line tool.
    /// The parsers themselves work on text and never read files, so this is
    /// grouped with the other I/O failures as an external-resource error.
    #[error("Failed to read description file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScmError {
    /// Create a malformed term error
    pub fn term(term: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedTerm {
            term: term.into(),
            message: message.into(),
        }
    }

    /// Create an unknown symbol error
    pub fn unknown_symbol(
        input: impl Into<String>,
        symbol: impl Into<String>,
        column: usize,
    ) -> Self {
        Self::UnknownSymbol {
            input: input.into(),
            symbol: symbol.into(),
            column,
        }
    }

    /// Create an invalid node error
    pub fn node(line: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidNode {
            line: line.into(),
            message: message.into(),
        }
    }

    /// Create an invalid correction error
    pub fn correction(distribution: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCorrection {
            distribution: distribution.into(),
            message: message.into(),
        }
    }

    /// Which of the two error kinds this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ScriptNotFound { .. }
            | Self::FunctionNotFound { .. }
            | Self::FileReadError { .. } => ErrorKind::ExternalResource,
            _ => ErrorKind::DescriptionFile,
        }
    }

    /// True for malformed description text.
    pub fn is_description_error(&self) -> bool {
        self.kind() == ErrorKind::DescriptionFile
    }

    /// True for script/function resolution failures.
    pub fn is_external_error(&self) -> bool {
        self.kind() == ErrorKind::ExternalResource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(ScmError::term("AA", "repeated").is_description_error());
        assert!(ScmError::EmptyEquation.is_description_error());
        assert!(ScmError::FunctionNotFound {
            path: "f.py".into(),
            name: "g".into(),
        }
        .is_external_error());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ScmError::ScriptNotFound {
            path: "f.py".into(),
            source: io,
        };
        assert_eq!(err.kind(), ErrorKind::ExternalResource);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ScmError::FileReadError {
            path: "nodes.txt".into(),
            source: io,
        };
        assert!(err.is_external_error());
    }

    #[test]
    fn test_error_messages() {
        let err = ScmError::DuplicateTerm {
            equation: "2A+3A".into(),
            parents: "A".into(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate term for parents {A} in equation '2A+3A'"
        );

        let err = ScmError::unknown_symbol("A*B", "*", 2);
        assert_eq!(err.to_string(), "Unknown symbol '*' at column 2 in 'A*B'");
    }
}
