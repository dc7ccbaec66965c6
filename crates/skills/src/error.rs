use std::path::PathBuf;

use crate::agent::AgentType;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no skill adapter registered for agent '{agent}'")]
    UnsupportedAgent { agent: AgentType },
    #[error("skill '{skill}' not found (no skill.yaml)")]
    NotFound { skill: String },
    #[error("malformed skill metadata in {}: {reason}", path.display())]
    MalformedMetadata { path: PathBuf, reason: String },
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to update host file {}: {source}", path.display())]
    InjectionFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            path: path.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach a path-bearing error variant to an `io::Result`.
pub(crate) trait IoResultExt<T> {
    fn write_context(self, path: impl Into<PathBuf>) -> Result<T>;
    fn injection_context(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn write_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::write_failure(path, source))
    }

    fn injection_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::InjectionFailure {
            path: path.into(),
            source,
        })
    }
}
