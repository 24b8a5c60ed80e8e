//! CLI error types.

use std::fmt;

use alertgen_core::AlertGenError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Loading the configuration or generating the documents failed.
    Generate(AlertGenError),
    /// Output formatting error.
    Format(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate(e) => write!(f, "{e}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Generate(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Format(_) => None,
        }
    }
}

impl From<AlertGenError> for CliError {
    fn from(err: AlertGenError) -> Self {
        Self::Generate(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
