//! Skill source repository: enumerates and loads universal skills.
//!
//! A skill directory looks like:
//!
//! ```text
//! <root>/<id>/skill.yaml      metadata (required)
//! <root>/<id>/SKILL.md        instructions
//! <root>/<id>/templates/*     optional files copied verbatim
//! ```

use std::{
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
};

use {async_trait::async_trait, tracing::debug};

use crate::{
    error::{Error, Result},
    parse,
    types::UniversalSkill,
};

pub const MANIFEST_FILE: &str = "skill.yaml";
pub const INSTRUCTIONS_FILE: &str = "SKILL.md";
pub const TEMPLATES_DIR: &str = "templates";

/// Source of universal skill definitions.
#[async_trait]
pub trait SkillRepository: Send + Sync {
    /// Identifiers of every entry that looks like a skill. Entries that do not
    /// are skipped, never reported as errors.
    async fn list(&self) -> Result<Vec<String>>;

    /// Stricter check used before installing: the skill directory must hold
    /// both its manifest and its instructions.
    async fn is_valid_skill_dir(&self, id: &str) -> bool;

    /// Load one skill by identifier.
    async fn load(&self, id: &str) -> Result<UniversalSkill>;
}

/// Filesystem-backed repository rooted at a directory of skill directories.
pub struct FsSkillRepository {
    root: PathBuf,
}

impl FsSkillRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `id`, or `None` if `id` is not a single plain path
    /// component (so `../x` can never escape the root).
    fn skill_dir(&self, id: &str) -> Option<PathBuf> {
        let mut components = Path::new(id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.root.join(id)),
            _ => None,
        }
    }
}

#[async_trait]
impl SkillRepository for FsSkillRepository {
    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(root = %self.root.display(), "skills source directory does not exist");
                return Ok(Vec::new());
            },
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_dir(&path).await || !is_file(&path.join(MANIFEST_FILE)).await {
                debug!(path = %path.display(), "no skill.yaml, skipping");
                continue;
            }
            match entry.file_name().into_string() {
                Ok(id) => ids.push(id),
                Err(name) => debug!(?name, "non UTF-8 skill directory name, skipping"),
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn is_valid_skill_dir(&self, id: &str) -> bool {
        let Some(dir) = self.skill_dir(id) else {
            return false;
        };
        is_dir(&dir).await
            && is_file(&dir.join(MANIFEST_FILE)).await
            && is_file(&dir.join(INSTRUCTIONS_FILE)).await
    }

    async fn load(&self, id: &str) -> Result<UniversalSkill> {
        let not_found = || Error::NotFound {
            skill: id.to_string(),
        };
        let dir = self.skill_dir(id).ok_or_else(not_found)?;

        let manifest_path = dir.join(MANIFEST_FILE);
        let raw = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        let manifest = parse::parse_manifest(&raw, &manifest_path)?;

        let instructions = tokio::fs::read_to_string(dir.join(INSTRUCTIONS_FILE)).await?;
        let templates = read_templates(&dir.join(TEMPLATES_DIR)).await?;

        debug!(
            id,
            name = %manifest.name,
            templates = templates.len(),
            "loaded skill"
        );
        Ok(UniversalSkill::new(manifest, instructions, templates))
    }
}

/// Read every regular file directly inside `dir` as raw bytes. A missing
/// directory yields an empty map; subdirectories are ignored.
async fn read_templates(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut templates = BTreeMap::new();
    if !is_dir(dir).await {
        return Ok(templates);
    }

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_file(&path).await {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            debug!(path = %path.display(), "non UTF-8 template name, skipping");
            continue;
        };
        templates.insert(name, tokio::fs::read(&path).await?);
    }

    Ok(templates)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
