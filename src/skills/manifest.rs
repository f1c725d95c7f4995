use crate::skills::SkillError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SkillManifest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub version: String,
}

/// Extracts the YAML front-matter between the leading `---` fences of a
/// SKILL.md document.
pub fn parse_manifest(text: &str) -> Result<SkillManifest, SkillError> {
    let rest = text
        .strip_prefix("---")
        .ok_or(SkillError::MissingFrontMatter)?;
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let end = rest
        .find("\n---")
        .ok_or(SkillError::MissingFrontMatter)?;
    serde_yaml::from_str(&rest[..end]).map_err(SkillError::FrontMatter)
}
