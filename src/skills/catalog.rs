use crate::shared::append_event_log;
use crate::skills::{parse_manifest, SkillError, SkillId, SkillManifest, SKILL_MANIFEST_FILE};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSkill {
    pub id: SkillId,
    pub manifest: SkillManifest,
}

/// Walks `<skills_root>/<category>/<name>/SKILL.md` and returns the
/// manifests used for the pre-load discovery listing. Entries whose
/// manifest is missing or unparsable are logged and skipped rather than
/// failing the whole listing.
pub fn discover_skills(skills_root: &Path, state_root: &Path) -> Result<Vec<DiscoveredSkill>, SkillError> {
    let mut discovered = Vec::new();
    if !skills_root.is_dir() {
        return Ok(discovered);
    }

    for category_entry in read_dir(skills_root)? {
        let category_path = category_entry.path();
        if !category_path.is_dir() {
            continue;
        }
        for skill_entry in read_dir(&category_path)? {
            let skill_path = skill_entry.path();
            if !skill_path.is_dir() {
                continue;
            }
            let raw_id = format!(
                "{}/{}",
                category_entry.file_name().to_string_lossy(),
                skill_entry.file_name().to_string_lossy()
            );
            let Ok(id) = SkillId::parse(&raw_id) else {
                append_event_log(
                    state_root,
                    "warn",
                    "skill.discover.skipped",
                    &format!("directory `{raw_id}` is not a valid skill identifier"),
                );
                continue;
            };

            let manifest_path = skill_path.join(SKILL_MANIFEST_FILE);
            let manifest = fs::read_to_string(&manifest_path)
                .map_err(|err| err.to_string())
                .and_then(|text| parse_manifest(&text).map_err(|err| err.to_string()));
            match manifest {
                Ok(manifest) => discovered.push(DiscoveredSkill { id, manifest }),
                Err(reason) => {
                    append_event_log(
                        state_root,
                        "warn",
                        "skill.discover.skipped",
                        &format!("skill `{id}` has no readable manifest: {reason}"),
                    );
                }
            }
        }
    }

    discovered.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(discovered)
}

fn read_dir(path: &Path) -> Result<Vec<fs::DirEntry>, SkillError> {
    let entries = fs::read_dir(path).map_err(|source| SkillError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut collected: Vec<fs::DirEntry> = entries.filter_map(|entry| entry.ok()).collect();
    collected.sort_by_key(|entry| entry.file_name());
    Ok(collected)
}
