mod catalog;
mod manifest;

pub use catalog::{discover_skills, DiscoveredSkill};
pub use manifest::{parse_manifest, SkillManifest};

use crate::shared::validate_identifier_value;
use serde::Serialize;

pub const SKILL_MANIFEST_FILE: &str = "SKILL.md";
pub const AUTHORING_NOTES_FILE: &str = "AUTHORING.md";

#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("invalid skill identifier `{raw}`: {reason}")]
    InvalidIdentifier { raw: String, reason: String },
    #[error("skill manifest has no front-matter block")]
    MissingFrontMatter,
    #[error("skill manifest front-matter is invalid: {0}")]
    FrontMatter(#[source] serde_yaml::Error),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A stable `category/name` pair identifying one skill package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SkillId {
    category: String,
    name: String,
}

impl SkillId {
    pub fn parse(raw: &str) -> Result<Self, SkillError> {
        let invalid = |reason: String| SkillError::InvalidIdentifier {
            raw: raw.to_string(),
            reason,
        };
        let (category, name) = raw
            .split_once('/')
            .ok_or_else(|| invalid("expected `category/name`".to_string()))?;
        if name.contains('/') {
            return Err(invalid("expected exactly one `/` separator".to_string()));
        }
        validate_identifier_value("skill category", category).map_err(invalid)?;
        validate_identifier_value("skill name", name).map_err(invalid)?;
        Ok(Self {
            category: category.to_string(),
            name: name.to_string(),
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// The segment the skill is visible under in `/skills/{shortName}`.
    pub fn short_name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}
