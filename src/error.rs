use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while converting, rendering or compiling physics files.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("vertex on line {line} appears before any object header")]
    UnexpectedVertex { line: usize },

    #[error("unrecognized line {line}: {text:?}")]
    UnrecognizedLine { line: usize, text: String },

    #[error("no collision proxies found, nothing to export")]
    NoCollisionProxies,

    #[error("compiler invocation failed: {message}")]
    CompilerInvocation { message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
