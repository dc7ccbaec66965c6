//! Skill installation for coding assistants.
//!
//! Universal skills live in a source directory as `skill.yaml` plus
//! `SKILL.md`. They are converted into each agent's own layout, and for local
//! installs a generated block listing the installed skills is kept up to date
//! in the agent's host file.

pub mod adapters;
pub mod agent;
pub mod detect;
pub mod error;
pub mod inject;
pub mod install;
pub mod parse;
pub mod report;
pub mod repository;
pub mod types;

pub use {
    adapters::{AdapterRegistry, LayoutAdapter, SkillAdapter},
    agent::{AgentType, InstallPaths, Scope},
    error::{Error, Result},
    install::{InstallRequest, Installer, SkillSelector},
    report::{InstallReport, InstallStatus, SkillFailure},
    repository::{FsSkillRepository, SkillRepository},
    types::{InstalledSkill, SkillManifest, Trigger, UniversalSkill},
};
