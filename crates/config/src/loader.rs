use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::EvolverConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "agent-evolver.toml",
    "agent-evolver.yaml",
    "agent-evolver.yml",
    "agent-evolver.json",
];

static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Use `dir` instead of the platform config directory.
pub fn set_config_dir(dir: PathBuf) {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.lock() {
        *guard = Some(dir);
    }
}

/// Returns the user-global config directory (`~/.config/agent-evolver/`),
/// honoring [`set_config_dir`].
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(guard) = CONFIG_DIR_OVERRIDE.lock()
        && let Some(ref dir) = *guard
    {
        return Some(dir.clone());
    }
    directories::ProjectDirs::from("", "", "agent-evolver").map(|d| d.config_dir().to_path_buf())
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<EvolverConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./agent-evolver.{toml,yaml,yml,json}` (project-local)
/// 2. `<config dir>/agent-evolver.{toml,yaml,yml,json}` (user-global)
///
/// Returns `EvolverConfig::default()` if no config file is found or the file
/// cannot be parsed.
pub fn discover_and_load() -> EvolverConfig {
    let Some(path) = find_config_file(Path::new("."), config_dir().as_deref()) else {
        debug!("no config file found, using defaults");
        return EvolverConfig::default();
    };

    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            EvolverConfig::default()
        },
    }
}

/// Find the first config file in `project_dir`, then in `user_dir`.
fn find_config_file(project_dir: &Path, user_dir: Option<&Path>) -> Option<PathBuf> {
    std::iter::once(project_dir)
        .chain(user_dir)
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.is_file())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<EvolverConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::schema::DefaultScope};

    #[test]
    fn loads_yaml_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("agent-evolver.yaml");
        std::fs::write(
            &path,
            "skills:\n  source_dir: /srv/skills\ninstall:\n  agent: cursor\n  scope: global\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.skills.source_dir, Some(PathBuf::from("/srv/skills")));
        assert_eq!(cfg.install.agent.as_deref(), Some("cursor"));
        assert_eq!(cfg.install.scope, DefaultScope::Global);
    }

    #[test]
    fn project_file_shadows_user_file() {
        let project = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        std::fs::write(user.path().join("agent-evolver.toml"), "").unwrap();
        assert_eq!(
            find_config_file(project.path(), Some(user.path())),
            Some(user.path().join("agent-evolver.toml"))
        );

        std::fs::write(project.path().join("agent-evolver.json"), "{}").unwrap();
        assert_eq!(
            find_config_file(project.path(), Some(user.path())),
            Some(project.path().join("agent-evolver.json"))
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = parse_config("", Path::new("agent-evolver.ini")).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
