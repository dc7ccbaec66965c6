//! Agent identifiers, install scope, and target-directory resolution.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A coding assistant that skills can be installed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AgentType {
    ClaudeCode,
    Cursor,
    Aider,
    /// Any other identifier. Has no built-in adapter and uses the generic host file.
    Unknown(String),
}

impl AgentType {
    /// Known agents in detection priority order.
    pub const KNOWN: [AgentType; 3] = [Self::ClaudeCode, Self::Cursor, Self::Aider];

    pub fn as_str(&self) -> &str {
        match self {
            Self::ClaudeCode => "claude-code",
            Self::Cursor => "cursor",
            Self::Aider => "aider",
            Self::Unknown(id) => id,
        }
    }

    /// Name of the per-agent dot directory (`.claude`, `.cursor`, ...).
    fn dot_dir(&self) -> &'static str {
        match self {
            Self::ClaudeCode => ".claude",
            Self::Cursor => ".cursor",
            Self::Aider => ".aider",
            Self::Unknown(_) => ".agents",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for AgentType {
    fn from(id: &str) -> Self {
        match id {
            "claude-code" => Self::ClaudeCode,
            "cursor" => Self::Cursor,
            "aider" => Self::Aider,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for AgentType {
    fn from(id: String) -> Self {
        Self::from(id.as_str())
    }
}

impl From<AgentType> for String {
    fn from(agent: AgentType) -> Self {
        agent.as_str().to_string()
    }
}

impl FromStr for AgentType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Where skills are installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The user's home directory; no host file is touched.
    Global,
    /// The current project; the agent's host file is updated afterwards.
    #[default]
    Local,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Filesystem roots used to resolve install targets.
#[derive(Debug, Clone)]
pub struct InstallPaths {
    pub home_dir: PathBuf,
    pub project_root: PathBuf,
}

impl InstallPaths {
    pub fn new(home_dir: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            project_root: project_root.into(),
        }
    }

    /// Resolve from the real home directory and the current working directory.
    pub fn from_env() -> Result<Self> {
        let home_dir = dirs_next::home_dir()
            .ok_or_else(|| Error::message("cannot determine the home directory"))?;
        let project_root = std::env::current_dir()?;
        Ok(Self {
            home_dir,
            project_root,
        })
    }

    /// Skills directory for `agent` under `scope`.
    ///
    /// Global installs go to `~/<dot dir>/skills`, local installs to
    /// `<project>/<dot dir>/skills`.
    pub fn skills_dir(&self, agent: &AgentType, scope: Scope) -> PathBuf {
        let base: &Path = match scope {
            Scope::Global => &self.home_dir,
            Scope::Local => &self.project_root,
        };
        base.join(agent.dot_dir()).join("skills")
    }
}
