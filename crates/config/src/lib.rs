//! Configuration loading and env substitution for agent-evolver.
//!
//! Config files: `agent-evolver.toml`, `agent-evolver.yaml`, or
//! `agent-evolver.json`, searched in `./` then `~/.config/agent-evolver/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config, set_config_dir},
    schema::{DefaultScope, EvolverConfig, InstallConfig, SkillsConfig},
};
