//! Install orchestration: load skills from a repository, convert them with the
//! agent's adapter, then refresh the agent's host file.

use std::{path::PathBuf, sync::Arc};

use {
    futures::future::join_all,
    tracing::{debug, info, warn},
};

use crate::{
    adapters::{AdapterRegistry, SkillAdapter},
    agent::{AgentType, InstallPaths, Scope},
    error::Result,
    inject,
    report::InstallReport,
    repository::SkillRepository,
    types::InstalledSkill,
};

/// Which skills to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillSelector {
    /// Every valid skill in the repository.
    All,
    /// A single skill by identifier.
    Named(String),
}

#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub agent: AgentType,
    pub selector: SkillSelector,
    pub scope: Scope,
}

pub struct Installer {
    repository: Arc<dyn SkillRepository>,
    adapters: AdapterRegistry,
    paths: InstallPaths,
}

impl Installer {
    pub fn new(
        repository: Arc<dyn SkillRepository>,
        adapters: AdapterRegistry,
        paths: InstallPaths,
    ) -> Self {
        Self {
            repository,
            adapters,
            paths,
        }
    }

    /// Install the selected skills for `request.agent`.
    ///
    /// Only an unsupported agent or a failure to enumerate the repository is
    /// returned as an error. Per-skill problems land in the report, as does a
    /// failed host-file update.
    pub async fn install(&self, request: &InstallRequest) -> Result<InstallReport> {
        let adapter = self.adapters.get(&request.agent)?;

        let ids = self.resolve_skills(&request.selector).await?;
        let target_dir = self.paths.skills_dir(&request.agent, request.scope);
        info!(
            agent = %request.agent,
            scope = %request.scope,
            target = %target_dir.display(),
            count = ids.len(),
            "installing skills"
        );

        let outcomes = join_all(
            ids.iter()
                .map(|id| self.install_one(adapter, id, target_dir.join(id))),
        )
        .await;

        let mut report = InstallReport::new(request.agent.clone(), request.scope, target_dir);
        report.attempted = ids.len();
        for (id, outcome) in ids.iter().zip(outcomes) {
            match outcome {
                Ok(installed) => report.installed.push(installed),
                Err(e) => {
                    warn!(skill = %id, error = %e, "skill install failed");
                    report.add_failure(id.as_str(), e);
                },
            }
        }

        if request.scope == Scope::Local {
            match inject::inject(&self.paths.project_root, &request.agent, &report.installed).await
            {
                Ok(path) => report.host_file = Some(path),
                Err(e) => {
                    warn!(error = %e, "failed to update host file");
                    report.add_warning(e.to_string());
                },
            }
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failures.len(),
            status = ?report.status(),
            "install finished"
        );
        Ok(report)
    }

    async fn resolve_skills(&self, selector: &SkillSelector) -> Result<Vec<String>> {
        match selector {
            SkillSelector::Named(id) => Ok(vec![id.clone()]),
            SkillSelector::All => {
                let mut ids = Vec::new();
                for id in self.repository.list().await? {
                    if self.repository.is_valid_skill_dir(&id).await {
                        ids.push(id);
                    } else {
                        debug!(skill = %id, "incomplete skill directory, skipping");
                    }
                }
                Ok(ids)
            },
        }
    }

    async fn install_one(
        &self,
        adapter: &dyn SkillAdapter,
        id: &str,
        target: PathBuf,
    ) -> Result<InstalledSkill> {
        let skill = self.repository.load(id).await?;
        adapter.convert(&skill, &target).await?;
        Ok(InstalledSkill::from(&skill))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            error::Error,
            inject::START_MARKER,
            report::InstallStatus,
            repository::FsSkillRepository,
            types::UniversalSkill,
        },
        async_trait::async_trait,
        std::{
            path::Path,
            sync::atomic::{AtomicUsize, Ordering},
        },
    };

    struct Fixture {
        _tmp: tempfile::TempDir,
        source: PathBuf,
        home: PathBuf,
        project: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let source = tmp.path().join("source");
            let home = tmp.path().join("home");
            let project = tmp.path().join("project");
            for dir in [&source, &home, &project] {
                std::fs::create_dir_all(dir).unwrap();
            }
            Self {
                _tmp: tmp,
                source,
                home,
                project,
            }
        }

        fn skill(&self, id: &str, manifest: &str) {
            let dir = self.source.join(id);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("skill.yaml"), manifest).unwrap();
            std::fs::write(dir.join("SKILL.md"), format!("# {id}\n")).unwrap();
        }

        fn valid_skill(&self, id: &str) {
            self.skill(
                id,
                &format!(
                    "name: {id}\ndescription: Skill {id}.\ntriggers:\n  - pattern: use {id}\ncompletion_check: Did I run {id}?\n"
                ),
            );
        }

        fn installer(&self, adapters: AdapterRegistry) -> Installer {
            Installer::new(
                Arc::new(FsSkillRepository::new(&self.source)),
                adapters,
                InstallPaths::new(&self.home, &self.project),
            )
        }
    }

    fn request(agent: AgentType, selector: SkillSelector, scope: Scope) -> InstallRequest {
        InstallRequest {
            agent,
            selector,
            scope,
        }
    }

    #[tokio::test]
    async fn test_install_all_local_updates_host_file() {
        let fx = Fixture::new();
        fx.valid_skill("alpha");
        fx.valid_skill("beta");

        let report = fx
            .installer(AdapterRegistry::with_defaults())
            .install(&request(AgentType::ClaudeCode, SkillSelector::All, Scope::Local))
            .await
            .unwrap();

        assert_eq!(report.status(), InstallStatus::Success);
        assert_eq!(report.attempted, 2);
        assert_eq!(report.target_dir, fx.project.join(".claude/skills"));
        assert!(fx.project.join(".claude/skills/alpha/SKILL.md").is_file());
        assert!(fx.project.join(".claude/skills/beta/SKILL.md").is_file());

        let host = report.host_file.unwrap();
        assert_eq!(host, fx.project.join("CLAUDE.md"));
        let content = std::fs::read_to_string(host).unwrap();
        assert!(content.contains("#### alpha"));
        assert!(content.contains("- [ ] Did I run beta? (beta)"));
    }

    #[tokio::test]
    async fn test_install_global_skips_host_file() {
        let fx = Fixture::new();
        fx.valid_skill("alpha");

        let report = fx
            .installer(AdapterRegistry::with_defaults())
            .install(&request(AgentType::Cursor, SkillSelector::All, Scope::Global))
            .await
            .unwrap();

        assert_eq!(report.status(), InstallStatus::Success);
        assert!(fx.home.join(".cursor/skills/alpha/RULE.md").is_file());
        assert!(report.host_file.is_none());
        assert!(!fx.project.join(".cursorrules").exists());
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_excluded_from_block() {
        let fx = Fixture::new();
        fx.valid_skill("alpha");
        fx.skill("broken", "name: broken\ndescription: [unterminated\n");
        fx.valid_skill("gamma");

        let report = fx
            .installer(AdapterRegistry::with_defaults())
            .install(&request(AgentType::Aider, SkillSelector::All, Scope::Local))
            .await
            .unwrap();

        assert_eq!(report.status(), InstallStatus::Partial);
        assert_eq!(report.attempted, 3);
        let names: Vec<_> = report.installed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["alpha", "gamma"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].skill, "broken");

        let content = std::fs::read_to_string(fx.project.join(".aider.md")).unwrap();
        assert!(content.contains("#### gamma"));
        assert!(!content.contains("broken"));
    }

    #[tokio::test]
    async fn test_named_missing_skill_fails() {
        let fx = Fixture::new();
        fx.valid_skill("alpha");

        let report = fx
            .installer(AdapterRegistry::with_defaults())
            .install(&request(
                AgentType::ClaudeCode,
                SkillSelector::Named("nope".into()),
                Scope::Global,
            ))
            .await
            .unwrap();

        assert_eq!(report.status(), InstallStatus::Failed);
        assert_eq!(report.failures[0].skill, "nope");
        assert!(report.failures[0].error.contains("not found"));
    }

    #[tokio::test]
    async fn test_all_skips_incomplete_directories() {
        let fx = Fixture::new();
        fx.valid_skill("alpha");
        let bare = fx.source.join("bare");
        std::fs::create_dir_all(&bare).unwrap();
        std::fs::write(bare.join("skill.yaml"), "name: bare\n").unwrap();

        let report = fx
            .installer(AdapterRegistry::with_defaults())
            .install(&request(AgentType::ClaudeCode, SkillSelector::All, Scope::Global))
            .await
            .unwrap();

        assert_eq!(report.attempted, 1);
        assert_eq!(report.status(), InstallStatus::Success);
    }

    #[tokio::test]
    async fn test_empty_source_still_writes_block() {
        let fx = Fixture::new();

        let report = fx
            .installer(AdapterRegistry::with_defaults())
            .install(&request(AgentType::ClaudeCode, SkillSelector::All, Scope::Local))
            .await
            .unwrap();

        assert_eq!(report.status(), InstallStatus::Empty);
        let content = std::fs::read_to_string(fx.project.join("CLAUDE.md")).unwrap();
        assert!(content.contains("No skills installed yet"));
    }

    #[tokio::test]
    async fn test_unsupported_agent_is_fatal_before_any_work() {
        let fx = Fixture::new();
        fx.valid_skill("alpha");

        let err = fx
            .installer(AdapterRegistry::with_defaults())
            .install(&request(
                AgentType::Unknown("windsurf".into()),
                SkillSelector::All,
                Scope::Local,
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedAgent { .. }));
        assert!(!fx.project.join("AGENTS.md").exists());
        assert!(!fx.project.join(".agents").exists());
    }

    #[tokio::test]
    async fn test_registered_adapter_for_unknown_agent_routes_to_agents_md() {
        struct Counting(Arc<AtomicUsize>);

        #[async_trait]
        impl SkillAdapter for Counting {
            async fn convert(&self, _skill: &UniversalSkill, _target: &Path) -> Result<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let fx = Fixture::new();
        fx.valid_skill("alpha");
        fx.valid_skill("beta");

        let calls = Arc::new(AtomicUsize::new(0));
        let agent = AgentType::Unknown("zed".into());
        let mut adapters = AdapterRegistry::empty();
        adapters.register(agent.clone(), Counting(Arc::clone(&calls)));

        let report = fx
            .installer(adapters)
            .install(&request(agent, SkillSelector::All, Scope::Local))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.target_dir, fx.project.join(".agents/skills"));
        let content = std::fs::read_to_string(fx.project.join("AGENTS.md")).unwrap();
        assert!(content.starts_with("# Agent Instructions"));
    }

    #[tokio::test]
    async fn test_injection_failure_is_a_warning() {
        let fx = Fixture::new();
        fx.valid_skill("alpha");
        std::fs::create_dir(fx.project.join("CLAUDE.md")).unwrap();

        let report = fx
            .installer(AdapterRegistry::with_defaults())
            .install(&request(AgentType::ClaudeCode, SkillSelector::All, Scope::Local))
            .await
            .unwrap();

        assert_eq!(report.status(), InstallStatus::Success);
        assert!(report.host_file.is_none());
        assert_eq!(report.warnings.len(), 1);
        assert!(fx.project.join(".claude/skills/alpha/SKILL.md").is_file());
    }

    #[tokio::test]
    async fn test_reinstall_keeps_single_block() {
        let fx = Fixture::new();
        fx.valid_skill("alpha");
        std::fs::write(fx.project.join("CLAUDE.md"), "# Project\n\nkeep\n").unwrap();

        let installer = fx.installer(AdapterRegistry::with_defaults());
        let req = request(AgentType::ClaudeCode, SkillSelector::All, Scope::Local);
        installer.install(&req).await.unwrap();
        let first = std::fs::read_to_string(fx.project.join("CLAUDE.md")).unwrap();
        installer.install(&req).await.unwrap();
        let second = std::fs::read_to_string(fx.project.join("CLAUDE.md")).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.matches(START_MARKER).count(), 1);
        assert!(second.starts_with("# Project\n\nkeep\n"));
    }
}
