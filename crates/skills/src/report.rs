//! Install report: per-skill outcomes of one install run.

use std::path::PathBuf;

use serde::Serialize;

use crate::{
    agent::{AgentType, Scope},
    types::InstalledSkill,
};

/// Overall outcome of an install run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStatus {
    /// Every attempted skill installed.
    Success,
    /// Some skills installed, some failed.
    Partial,
    /// Skills were attempted and none installed.
    Failed,
    /// Nothing to install.
    Empty,
}

/// A skill that could not be installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillFailure {
    /// Identifier the skill was requested by.
    pub skill: String,
    pub error: String,
}

/// Result of [`Installer::install`](crate::install::Installer::install).
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub agent: AgentType,
    pub scope: Scope,
    pub target_dir: PathBuf,
    pub attempted: usize,
    /// Installed skills, in request order.
    pub installed: Vec<InstalledSkill>,
    pub failures: Vec<SkillFailure>,
    /// Host file updated with the skill block (local installs only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_file: Option<PathBuf>,
    /// Problems that did not affect the outcome, such as a failed host-file
    /// update.
    pub warnings: Vec<String>,
}

impl InstallReport {
    pub fn new(agent: AgentType, scope: Scope, target_dir: PathBuf) -> Self {
        Self {
            agent,
            scope,
            target_dir,
            attempted: 0,
            installed: Vec::new(),
            failures: Vec::new(),
            host_file: None,
            warnings: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.installed.len()
    }

    pub fn status(&self) -> InstallStatus {
        match (self.attempted, self.succeeded(), self.failures.len()) {
            (0, ..) => InstallStatus::Empty,
            (_, 0, _) => InstallStatus::Failed,
            (_, _, 0) => InstallStatus::Success,
            _ => InstallStatus::Partial,
        }
    }

    pub fn add_failure(&mut self, skill: impl Into<String>, error: impl ToString) {
        self.failures.push(SkillFailure {
            skill: skill.into(),
            error: error.to_string(),
        });
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn report(succeeded: usize, failed: usize) -> InstallReport {
        let mut r = InstallReport::new(AgentType::ClaudeCode, Scope::Local, "/t".into());
        r.attempted = succeeded + failed;
        for i in 0..succeeded {
            r.installed.push(InstalledSkill {
                name: format!("ok-{i}"),
                description: "d".into(),
                triggers: Vec::new(),
                completion_check: None,
            });
        }
        for i in 0..failed {
            r.add_failure(format!("bad-{i}"), "boom");
        }
        r
    }

    #[test]
    fn status_reflects_outcomes() {
        assert_eq!(report(0, 0).status(), InstallStatus::Empty);
        assert_eq!(report(2, 0).status(), InstallStatus::Success);
        assert_eq!(report(2, 1).status(), InstallStatus::Partial);
        assert_eq!(report(0, 3).status(), InstallStatus::Failed);
    }

    #[test]
    fn warnings_do_not_change_status() {
        let mut r = report(1, 0);
        r.add_warning("host file is read-only");
        assert_eq!(r.status(), InstallStatus::Success);
        assert_eq!(r.warnings.len(), 1);
    }
}
