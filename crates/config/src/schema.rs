/// Config schema types (skill sources and install defaults).
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Skills bundled with the workspace, resolved at compile time.
const BUNDLED_SKILLS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../skills");

/// Root config object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolverConfig {
    pub skills: SkillsConfig,
    pub install: InstallConfig,
}

/// Where universal skills are read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    pub source_dir: Option<PathBuf>,
}

/// Defaults for the `install` command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Agent identifier used when `--agent` is not given (skips detection).
    pub agent: Option<String>,
    pub scope: DefaultScope,
}

/// Install scope used when `--global` is not passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultScope {
    #[default]
    Local,
    Global,
}

impl EvolverConfig {
    /// Resolve the skill source directory.
    ///
    /// Priority:
    /// 1. `explicit` (CLI flag or `AGENT_EVOLVER_SKILLS_DIR`)
    /// 2. `skills.source_dir` from the config file
    /// 3. the bundled `skills/` directory, if present
    /// 4. `./skills`
    pub fn skills_source_dir(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(dir) = explicit {
            return dir.to_path_buf();
        }
        if let Some(ref dir) = self.skills.source_dir {
            return dir.clone();
        }
        let bundled = Path::new(BUNDLED_SKILLS_DIR);
        if bundled.is_dir() {
            return bundled.to_path_buf();
        }
        PathBuf::from("skills")
    }
}
