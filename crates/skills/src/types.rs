use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

// ── Skill manifest ───────────────────────────────────────────────────────────

/// Parsed `skill.yaml`.
///
/// Recognized fields are typed; every other key is preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillManifest {
    pub name: String,
    #[serde(default = "default_version", deserialize_with = "version_string")]
    pub version: String,
    pub description: String,
    pub triggers: Vec<Trigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_check: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn default_version() -> String {
    "0.0.0".into()
}

/// Accept `version: 1.0` as well as `version: "1.0.0"`.
fn version_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a version string, found {other:?}"
        ))),
    }
}

/// Condition under which an agent should invoke a skill unprompted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTrigger", into = "RawTrigger")]
pub enum Trigger {
    /// A literal phrase detected in conversation.
    Phrase(String),
    /// An activity the agent is performing without being asked.
    Action(String),
}

/// YAML shape of a trigger: `{pattern: ...}` or `{action: ...}`. A mapping
/// carrying both keys matches neither shape.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawTrigger {
    Phrase(PhraseTrigger),
    Action(ActionTrigger),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PhraseTrigger {
    pattern: String,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ActionTrigger {
    action: String,
}

impl From<RawTrigger> for Trigger {
    fn from(raw: RawTrigger) -> Self {
        match raw {
            RawTrigger::Phrase(PhraseTrigger { pattern }) => Self::Phrase(pattern),
            RawTrigger::Action(ActionTrigger { action }) => Self::Action(action),
        }
    }
}

impl From<Trigger> for RawTrigger {
    fn from(trigger: Trigger) -> Self {
        match trigger {
            Trigger::Phrase(pattern) => Self::Phrase(PhraseTrigger { pattern }),
            Trigger::Action(action) => Self::Action(ActionTrigger { action }),
        }
    }
}

// ── Skills ───────────────────────────────────────────────────────────────────

/// Source-agnostic skill, as loaded from a skill directory.
#[derive(Debug, Clone)]
pub struct UniversalSkill {
    pub name: String,
    pub version: String,
    pub description: String,
    pub metadata: SkillManifest,
    /// Contents of `SKILL.md`.
    pub instructions: String,
    /// Template filename → raw bytes, copied verbatim. `None` when the skill
    /// ships no templates.
    pub templates: Option<BTreeMap<String, Vec<u8>>>,
}

impl UniversalSkill {
    pub fn new(
        metadata: SkillManifest,
        instructions: String,
        templates: BTreeMap<String, Vec<u8>>,
    ) -> Self {
        Self {
            name: metadata.name.clone(),
            version: metadata.version.clone(),
            description: metadata.description.clone(),
            metadata,
            instructions,
            templates: (!templates.is_empty()).then_some(templates),
        }
    }
}

/// What the prompt injector needs to know about an installed skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledSkill {
    pub name: String,
    pub description: String,
    pub triggers: Vec<Trigger>,
    pub completion_check: Option<String>,
}

impl From<&UniversalSkill> for InstalledSkill {
    fn from(skill: &UniversalSkill) -> Self {
        Self {
            name: skill.name.clone(),
            description: skill.description.clone(),
            triggers: skill.metadata.triggers.clone(),
            completion_check: skill.metadata.completion_check.clone(),
        }
    }
}

impl InstalledSkill {
    pub fn phrase_triggers(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().filter_map(|t| match t {
            Trigger::Phrase(p) => Some(p.as_str()),
            Trigger::Action(_) => None,
        })
    }

    pub fn action_triggers(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().filter_map(|t| match t {
            Trigger::Action(a) => Some(a.as_str()),
            Trigger::Phrase(_) => None,
        })
    }
}
