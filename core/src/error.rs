//! Error types for fragfile loading and message matching.

use std::path::PathBuf;

/// Errors raised while building a record from `#DEFINE` values.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The define kind name is not one of the known record kinds.
    #[error("define kind \"{0}\" not understood")]
    UnknownDirective(String),

    /// A required field has no value.
    #[error("required field \"{field}\" not set for {directive}: {values:?}")]
    MissingRequiredField {
        field: &'static str,
        directive: String,
        values: Vec<String>,
    },

    /// A required field's value is a comment.
    #[error("required field \"{field}\" of {directive} can not be set with a comment")]
    RequiredFieldIsComment {
        field: &'static str,
        directive: String,
    },
}

/// Errors raised while loading a fragfile or matching messages.
#[derive(Debug, thiserror::Error)]
pub enum FragfileError {
    /// A `#DEFINE` line could not be turned into a record.
    #[error("line {line}: {source}")]
    Define { line: usize, source: SchemaError },

    /// The first token of a line is not a known directive.
    #[error("line {line}: unknown token \"{token}\"")]
    UnrecognizedDirective { line: usize, token: String },

    /// A directive is missing its arguments.
    #[error("line {line}: {directive} is missing arguments")]
    MissingArgument { line: usize, directive: String },

    /// A template pattern failed to compile.
    #[error("failed to compile pattern {pattern:?}: {source}")]
    PatternCompilation {
        pattern: String,
        source: regex::Error,
    },

    /// The fragfile could not be read.
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FragfileError {
    /// Source line the error was raised on, if it came from a line
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Define { line, .. }
            | Self::UnrecognizedDirective { line, .. }
            | Self::MissingArgument { line, .. } => Some(*line),
            Self::PatternCompilation { .. } | Self::Io { .. } => None,
        }
    }

    /// Whether this error came from building a `#DEFINE` record
    pub fn is_define_error(&self) -> bool {
        matches!(self, Self::Define { .. })
    }
}
