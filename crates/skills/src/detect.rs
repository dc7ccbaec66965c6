//! Detection of locally installed coding assistants.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::agent::AgentType;

/// Environment queries used by detection. Tests substitute a fake.
pub trait EnvironmentProbe {
    /// Whether an executable named `name` is on `PATH`.
    fn command_exists(&self, name: &str) -> bool;

    /// Whether `path` exists.
    fn path_exists(&self, path: &Path) -> bool;
}

/// Probe backed by the real `PATH` and filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl EnvironmentProbe for SystemProbe {
    fn command_exists(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Cursor installs that do not put a `cursor` shim on `PATH`.
fn cursor_install_paths(home: &Path) -> [PathBuf; 3] {
    [
        home.join(".cursor"),
        home.join("Library/Application Support/Cursor"),
        home.join(".config/Cursor"),
    ]
}

/// Whether `agent` appears to be installed.
pub fn is_installed(probe: &dyn EnvironmentProbe, home: &Path, agent: &AgentType) -> bool {
    match agent {
        AgentType::ClaudeCode => probe.command_exists("claude"),
        AgentType::Cursor => {
            probe.command_exists("cursor")
                || cursor_install_paths(home)
                    .iter()
                    .any(|p| probe.path_exists(p))
        },
        AgentType::Aider => probe.command_exists("aider"),
        AgentType::Unknown(_) => false,
    }
}

/// First installed agent in priority order: claude-code, cursor, aider.
pub fn detect_agent(probe: &dyn EnvironmentProbe, home: &Path) -> Option<AgentType> {
    let found = AgentType::KNOWN
        .into_iter()
        .find(|agent| is_installed(probe, home, agent));
    debug!(agent = ?found, "agent detection finished");
    found
}

/// Every installed agent, in priority order.
pub fn detect_all(probe: &dyn EnvironmentProbe, home: &Path) -> Vec<AgentType> {
    AgentType::KNOWN
        .into_iter()
        .filter(|agent| is_installed(probe, home, agent))
        .collect()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, std::collections::HashSet};

    #[derive(Default)]
    struct FakeProbe {
        commands: HashSet<&'static str>,
        paths: HashSet<PathBuf>,
    }

    impl EnvironmentProbe for FakeProbe {
        fn command_exists(&self, name: &str) -> bool {
            self.commands.contains(name)
        }

        fn path_exists(&self, path: &Path) -> bool {
            self.paths.contains(path)
        }
    }

    fn probe(commands: &[&'static str]) -> FakeProbe {
        FakeProbe {
            commands: commands.iter().copied().collect(),
            ..Default::default()
        }
    }

    const HOME: &str = "/home/dev";

    #[test]
    fn nothing_installed() {
        assert_eq!(detect_agent(&FakeProbe::default(), Path::new(HOME)), None);
        assert!(detect_all(&FakeProbe::default(), Path::new(HOME)).is_empty());
    }

    #[test]
    fn claude_code_wins_priority() {
        let p = probe(&["aider", "cursor", "claude"]);
        assert_eq!(
            detect_agent(&p, Path::new(HOME)),
            Some(AgentType::ClaudeCode)
        );
        assert_eq!(detect_all(&p, Path::new(HOME)), AgentType::KNOWN.to_vec());
    }

    #[test]
    fn cursor_before_aider() {
        let p = probe(&["aider", "cursor"]);
        assert_eq!(detect_agent(&p, Path::new(HOME)), Some(AgentType::Cursor));
    }

    #[test]
    fn cursor_detected_from_config_dir() {
        let mut p = probe(&["aider"]);
        p.paths.insert(PathBuf::from(HOME).join(".config/Cursor"));
        assert_eq!(detect_agent(&p, Path::new(HOME)), Some(AgentType::Cursor));
    }

    #[test]
    fn aider_alone() {
        let p = probe(&["aider"]);
        assert_eq!(detect_agent(&p, Path::new(HOME)), Some(AgentType::Aider));
    }

    #[test]
    fn unknown_agent_never_installed() {
        let p = probe(&["claude", "cursor", "aider"]);
        assert!(!is_installed(
            &p,
            Path::new(HOME),
            &AgentType::Unknown("claude".into())
        ));
    }
}
