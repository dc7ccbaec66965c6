//! Per-agent skill adapters and the dispatch table that selects them.
//!
//! Every supported coding assistant expects skills in its own directory with
//! its own main file name. An adapter turns a [`UniversalSkill`] into that
//! layout; the [`AdapterRegistry`] maps an [`AgentType`] to its adapter.

use std::{collections::HashMap, path::Path};

use {async_trait::async_trait, tracing::info};

use crate::{
    agent::AgentType,
    error::{Error, IoResultExt, Result},
    repository::TEMPLATES_DIR,
    types::UniversalSkill,
};

// ── Adapter trait ────────────────────────────────────────────────────────────

/// Writes one skill into an agent-specific on-disk layout.
#[async_trait]
pub trait SkillAdapter: Send + Sync {
    /// Materialize `skill` inside `target_dir`, creating it if needed.
    /// Existing files at the same paths are overwritten.
    async fn convert(&self, skill: &UniversalSkill, target_dir: &Path) -> Result<()>;
}

// ── Layout adapter ───────────────────────────────────────────────────────────

/// Adapter for agents whose skills are a main markdown file plus an optional
/// `templates/` directory.
#[derive(Debug, Clone, Copy)]
pub struct LayoutAdapter {
    main_file: &'static str,
}

impl LayoutAdapter {
    pub const fn new(main_file: &'static str) -> Self {
        Self { main_file }
    }

    /// Claude Code: `~/.claude/skills/<skill>/SKILL.md`.
    pub const fn claude_code() -> Self {
        Self::new("SKILL.md")
    }

    /// Cursor: `.cursor/skills/<skill>/RULE.md`.
    pub const fn cursor() -> Self {
        Self::new("RULE.md")
    }

    /// Aider: `.aider/skills/<skill>/CONVENTIONS.md`, the file name aider
    /// uses for convention files.
    pub const fn aider() -> Self {
        Self::new("CONVENTIONS.md")
    }

}

#[async_trait]
impl SkillAdapter for LayoutAdapter {
    async fn convert(&self, skill: &UniversalSkill, target_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(target_dir)
            .await
            .write_context(target_dir)?;

        let main_path = target_dir.join(self.main_file);
        tokio::fs::write(&main_path, &skill.instructions)
            .await
            .write_context(&main_path)?;

        if let Some(ref templates) = skill.templates {
            let templates_dir = target_dir.join(TEMPLATES_DIR);
            tokio::fs::create_dir_all(&templates_dir)
                .await
                .write_context(&templates_dir)?;

            for (filename, content) in templates {
                let path = templates_dir.join(filename);
                tokio::fs::write(&path, content)
                    .await
                    .write_context(&path)?;
            }
        }

        info!(
            skill = %skill.name,
            version = %skill.version,
            target = %target_dir.display(),
            "installed skill"
        );
        Ok(())
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// Explicit dispatch table from agent to adapter.
pub struct AdapterRegistry {
    adapters: HashMap<AgentType, Box<dyn SkillAdapter>>,
}

impl AdapterRegistry {
    /// Registry with no adapters.
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registry with the built-in adapter for every known agent.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(AgentType::ClaudeCode, LayoutAdapter::claude_code());
        registry.register(AgentType::Cursor, LayoutAdapter::cursor());
        registry.register(AgentType::Aider, LayoutAdapter::aider());
        registry
    }

    /// Add or replace the adapter for `agent`.
    pub fn register(&mut self, agent: AgentType, adapter: impl SkillAdapter + 'static) {
        self.adapters.insert(agent, Box::new(adapter));
    }

    /// Adapter for `agent`, or [`Error::UnsupportedAgent`].
    pub fn get(&self, agent: &AgentType) -> Result<&dyn SkillAdapter> {
        self.adapters
            .get(agent)
            .map(|a| a.as_ref())
            .ok_or_else(|| Error::UnsupportedAgent {
                agent: agent.clone(),
            })
    }

    pub fn supports(&self, agent: &AgentType) -> bool {
        self.adapters.contains_key(agent)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
