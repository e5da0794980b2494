//! Script parsing and matching error types.

use thiserror::Error;

use crate::bolt::BoltVersion;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("{location}: {message}")]
    Parse { location: String, message: String },

    #[error("{location}: message {name:?} is not defined for protocol version {version}")]
    UnknownForVersion {
        location: String,
        name: String,
        version: BoltVersion,
    },

    #[error("script mismatch at {location}: expected {expected}, received {received}")]
    Mismatch {
        location: String,
        expected: String,
        received: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScriptResult<T> = Result<T, ScriptError>;

impl ScriptError {
    pub fn parse(file: &str, line_no: usize, message: impl Into<String>) -> Self {
        ScriptError::Parse {
            location: format!("{file}:{line_no}"),
            message: message.into(),
        }
    }

    pub fn unknown_for_version(
        file: &str,
        line_no: usize,
        name: impl Into<String>,
        version: BoltVersion,
    ) -> Self {
        ScriptError::UnknownForVersion {
            location: format!("{file}:{line_no}"),
            name: name.into(),
            version,
        }
    }

    pub fn mismatch(
        file: &str,
        line_no: usize,
        expected: impl Into<String>,
        received: impl Into<String>,
    ) -> Self {
        ScriptError::Mismatch {
            location: format!("{file}:{line_no}"),
            expected: expected.into(),
            received: received.into(),
        }
    }
}
