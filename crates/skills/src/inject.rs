//! Prompt injection: keeps a generated skills block inside the agent's host
//! file (`CLAUDE.md`, `.cursorrules`, ...) up to date.
//!
//! The block is delimited by [`START_MARKER`] and [`END_MARKER`]. Everything
//! outside the markers belongs to the user and is preserved byte for byte.
//! A file with a stray marker (one without its partner) is treated as having
//! no block: a fresh block is appended and the stray marker is left alone.

use std::{
    borrow::Cow,
    fmt::Write as _,
    ops::Range,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    agent::AgentType,
    error::{Error, IoResultExt, Result},
    types::InstalledSkill,
};

pub const START_MARKER: &str = "###AGENT-EVOLVER-START###";
pub const END_MARKER: &str = "###AGENT-EVOLVER-END###";

// ── Host files ───────────────────────────────────────────────────────────────

/// Host file name for `agent`, relative to the project root.
pub fn host_file_name(agent: &AgentType) -> &'static str {
    match agent {
        AgentType::ClaudeCode => "CLAUDE.md",
        AgentType::Cursor => ".cursorrules",
        AgentType::Aider => ".aider.md",
        AgentType::Unknown(_) => "AGENTS.md",
    }
}

/// Header written when the host file does not exist yet.
pub fn host_file_header(agent: &AgentType) -> &'static str {
    match agent {
        AgentType::ClaudeCode => {
            "# CLAUDE.md\n\nThis file provides guidance to Claude Code when working with code in this repository.\n"
        },
        AgentType::Cursor => {
            "# Cursor Rules\n\nProject rules and skills for the Cursor AI assistant.\n"
        },
        AgentType::Aider => "# Aider Conventions\n\nConventions and skills for aider in this project.\n",
        AgentType::Unknown(_) => {
            "# Agent Instructions\n\nThis file provides instructions and context for AI coding agents working on this project.\n"
        },
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Render the marker-delimited skills block.
///
/// Output depends only on `skills`, so rendering the same set twice yields
/// identical text.
pub fn render_block(skills: &[InstalledSkill]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{START_MARKER}");
    out.push_str("## Agent Evolver Skills\n\n");
    out.push_str(
        "Skills are reusable instructions for recurring tasks. Invoke a skill when one of its \
         triggers applies, even if the user has not asked for it.\n\n",
    );

    out.push_str("### Installed Skills\n\n");
    if skills.is_empty() {
        out.push_str("_No skills installed yet._\n\n");
    }
    for skill in skills {
        render_skill(&mut out, skill);
    }

    out.push_str("### Completion Checklist\n\n");
    out.push_str("Before considering a task finished, verify:\n\n");
    let mut any_check = false;
    for skill in skills {
        if let Some(ref check) = skill.completion_check {
            let _ = writeln!(
                out,
                "- [ ] {} ({})",
                defuse_markers(check),
                defuse_markers(&skill.name)
            );
            any_check = true;
        }
    }
    if !any_check {
        out.push_str("- _No completion checks defined._\n");
    }
    out.push('\n');

    out.push_str("### Autonomy Checkpoint\n\n");
    out.push_str(
        "Before asking user for approval, check the `autonomy-preferences` recorded for this \
         project. If the user has already granted approval for this kind of change, proceed \
         without asking.\n\n",
    );

    out.push_str("---\n");
    out.push_str(
        "**Note:** This section is managed by agent-evolver. Manual edits will be overwritten on \
         the next install.\n",
    );
    out.push_str(END_MARKER);
    out
}

/// Strip the `###` fences from marker text embedded in skill metadata so the
/// rendered block never contains a second start or end marker.
fn defuse_markers(text: &str) -> Cow<'_, str> {
    if !text.contains(START_MARKER) && !text.contains(END_MARKER) {
        return Cow::Borrowed(text);
    }
    let mut text = text.to_owned();
    // Surrounding `#`s can re-form a marker after one pass; each pass shrinks
    // the text, so this terminates.
    while text.contains(START_MARKER) || text.contains(END_MARKER) {
        text = text
            .replace(START_MARKER, START_MARKER.trim_matches('#'))
            .replace(END_MARKER, END_MARKER.trim_matches('#'));
    }
    Cow::Owned(text)
}

fn render_skill(out: &mut String, skill: &InstalledSkill) {
    let _ = writeln!(out, "#### {}\n", defuse_markers(&skill.name));
    let _ = writeln!(out, "{}\n", defuse_markers(skill.description.trim()));

    let phrases: Vec<Cow<'_, str>> = skill.phrase_triggers().map(defuse_markers).collect();
    let actions: Vec<Cow<'_, str>> = skill.action_triggers().map(defuse_markers).collect();

    if phrases.is_empty() && actions.is_empty() {
        out.push_str("_No triggers defined. Invoke this skill manually._\n\n");
        return;
    }

    if !phrases.is_empty() {
        out.push_str("**Phrase triggers** (invoke when the conversation contains):\n");
        for phrase in &phrases {
            let _ = writeln!(out, "- \"{phrase}\"");
        }
        out.push('\n');
    }

    if !actions.is_empty() {
        out.push_str("**Action triggers** (invoke silently when you are):\n");
        for action in &actions {
            let _ = writeln!(out, "- {action}");
        }
        out.push('\n');
    }
}

// ── Block detection ──────────────────────────────────────────────────────────

/// Where the injection block sits in a host file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSpan {
    /// No marker present.
    NoBlock,
    /// Byte range from the start marker through the end marker.
    WellFormed(Range<usize>),
    /// Markers present, but no start marker is directly followed by an end
    /// marker.
    Malformed,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Marker {
    Start,
    End,
}

/// Classify host file content.
///
/// The block is the first start marker whose next marker (in file order) is
/// an end marker. Picking the adjacent pair means a stray marker before an
/// appended block never widens the replaced span.
pub fn classify(content: &str) -> BlockSpan {
    let mut markers: Vec<(usize, Marker)> = content
        .match_indices(START_MARKER)
        .map(|(i, _)| (i, Marker::Start))
        .chain(
            content
                .match_indices(END_MARKER)
                .map(|(i, _)| (i, Marker::End)),
        )
        .collect();

    if markers.is_empty() {
        return BlockSpan::NoBlock;
    }
    markers.sort_by_key(|(i, _)| *i);

    markers
        .windows(2)
        .find_map(|pair| match pair {
            [(start, Marker::Start), (end, Marker::End)] => {
                Some(BlockSpan::WellFormed(*start..*end + END_MARKER.len()))
            },
            _ => None,
        })
        .unwrap_or(BlockSpan::Malformed)
}

// ── Merge ────────────────────────────────────────────────────────────────────

/// Combine the existing host content (if any) with a freshly rendered block.
pub fn merge(existing: Option<&str>, agent: &AgentType, block: &str) -> String {
    let Some(content) = existing else {
        return format!("{}\n{block}\n", host_file_header(agent));
    };

    match classify(content) {
        BlockSpan::WellFormed(span) => {
            let mut merged = String::with_capacity(content.len() + block.len());
            merged.push_str(&content[..span.start]);
            merged.push_str(block);
            merged.push_str(&content[span.end..]);
            merged
        },
        BlockSpan::NoBlock | BlockSpan::Malformed => {
            let separator = if content.is_empty() {
                ""
            } else if content.ends_with('\n') {
                "\n"
            } else {
                "\n\n"
            };
            format!("{content}{separator}{block}\n")
        },
    }
}

// ── Injection ────────────────────────────────────────────────────────────────

/// Render the block for `skills` and merge it into the host file for `agent`
/// under `project_root`. Returns the path written.
pub async fn inject(
    project_root: &Path,
    agent: &AgentType,
    skills: &[InstalledSkill],
) -> Result<PathBuf> {
    let path = project_root.join(host_file_name(agent));

    let existing = match tokio::fs::read_to_string(&path).await {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => return Err(Error::InjectionFailure { path, source }),
    };
    debug!(
        path = %path.display(),
        exists = existing.is_some(),
        block = ?existing.as_deref().map(classify),
        "merging skills block"
    );

    let merged = merge(existing.as_deref(), agent, &render_block(skills));
    write_atomic(&path, &merged).await.injection_context(&path)?;

    info!(path = %path.display(), skills = skills.len(), "updated skills block");
    Ok(path)
}

/// Write via a temp file and rename so readers never see a partial file.
///
/// A symlinked host file is resolved first, so the link survives and its
/// target receives the content. Existing permissions carry over.
async fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let target = match tokio::fs::canonicalize(path).await {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
        Err(e) => return Err(e),
    };
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp_name = target.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = target.with_file_name(tmp_name);

    tokio::fs::write(&tmp, content).await?;
    if let Ok(meta) = tokio::fs::metadata(&target).await {
        tokio::fs::set_permissions(&tmp, meta.permissions()).await?;
    }
    tokio::fs::rename(&tmp, &target).await
}
