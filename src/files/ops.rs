use crate::files::{dir_visible, file_visible, FileEntry, FileOpError};
use crate::mounts::{MountKind, MountMode, SKILLS_PREFIX};
use crate::shared::atomic_write_file;
use crate::skills::AUTHORING_NOTES_FILE;
use crate::vfs::{LoadedSkills, PathResolver, ResolvedPath, VfsError};
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

pub fn list(
    resolver: &PathResolver,
    gate: &LoadedSkills,
    virtual_path: &str,
) -> Result<Vec<FileEntry>, FileOpError> {
    if is_skills_mount_root(virtual_path) {
        return Ok(list_loaded_skill_roots(resolver, gate));
    }

    let resolved = resolver.to_physical(gate, virtual_path)?;
    let dir = fs::read_dir(&resolved.physical).map_err(|source| map_io(&resolved, source))?;

    let mut entries = Vec::new();
    for dir_entry in dir.filter_map(|entry| entry.ok()) {
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        let Ok(metadata) = dir_entry.metadata() else {
            continue;
        };
        let visible = if metadata.is_dir() {
            dir_visible(&name)
        } else {
            file_visible(resolved.kind, &name)
        };
        if !visible {
            continue;
        }
        entries.push(FileEntry {
            virtual_path: format!("{}/{}", resolved.virtual_path, name),
            is_directory: metadata.is_dir(),
            size: metadata.len(),
            modified_at: modified_secs(&metadata),
        });
    }
    entries.sort_by(|a, b| a.virtual_path.cmp(&b.virtual_path));
    Ok(entries)
}

pub fn read(
    resolver: &PathResolver,
    gate: &LoadedSkills,
    virtual_path: &str,
    offset: Option<usize>,
    limit: Option<usize>,
) -> Result<String, FileOpError> {
    let resolved = resolver.to_physical(gate, virtual_path)?;
    if is_authoring_artifact(&resolved) {
        return Err(not_found_for(&resolved));
    }

    let bytes = fs::read(&resolved.physical).map_err(|source| map_io(&resolved, source))?;
    let text = String::from_utf8(bytes).map_err(|_| FileOpError::BinaryContentRejected {
        path: resolved.virtual_path.clone(),
    })?;

    if offset.is_none() && limit.is_none() {
        return Ok(text);
    }
    let skip = offset.unwrap_or(0);
    let take = limit.unwrap_or(usize::MAX);
    let mut sliced: String = text
        .lines()
        .skip(skip)
        .take(take)
        .collect::<Vec<&str>>()
        .join("\n");
    if !sliced.is_empty() {
        sliced.push('\n');
    }
    Ok(sliced)
}

pub fn write(
    resolver: &PathResolver,
    gate: &LoadedSkills,
    virtual_path: &str,
    content: &str,
) -> Result<(), FileOpError> {
    let resolved = resolve_writable(resolver, gate, virtual_path)?;
    if let Some(parent) = resolved.physical.parent() {
        fs::create_dir_all(parent).map_err(|source| map_io(&resolved, source))?;
    }
    atomic_write_file(&resolved.physical, content.as_bytes())
        .map_err(|source| map_io(&resolved, source))
}

pub fn edit(
    resolver: &PathResolver,
    gate: &LoadedSkills,
    virtual_path: &str,
    old: &str,
    new: &str,
    replace_all: bool,
) -> Result<(), FileOpError> {
    let resolved = resolve_writable(resolver, gate, virtual_path)?;
    let bytes = fs::read(&resolved.physical).map_err(|source| map_io(&resolved, source))?;
    let text = String::from_utf8(bytes).map_err(|_| FileOpError::BinaryContentRejected {
        path: resolved.virtual_path.clone(),
    })?;

    let count = text.matches(old).count();
    if count == 0 {
        return Err(FileOpError::EditTargetNotFound {
            path: resolved.virtual_path.clone(),
        });
    }
    if count > 1 && !replace_all {
        return Err(FileOpError::AmbiguousEdit {
            path: resolved.virtual_path.clone(),
            count,
        });
    }

    let updated = if replace_all {
        text.replace(old, new)
    } else {
        text.replacen(old, new, 1)
    };
    atomic_write_file(&resolved.physical, updated.as_bytes())
        .map_err(|source| map_io(&resolved, source))
}

fn resolve_writable(
    resolver: &PathResolver,
    gate: &LoadedSkills,
    virtual_path: &str,
) -> Result<ResolvedPath, FileOpError> {
    let resolved = resolver.to_physical(gate, virtual_path)?;
    if resolved.mode == MountMode::ReadOnly {
        return Err(FileOpError::ReadOnlyViolation {
            path: resolved.virtual_path,
        });
    }
    Ok(resolved)
}

fn list_loaded_skill_roots(resolver: &PathResolver, gate: &LoadedSkills) -> Vec<FileEntry> {
    let mut entries = Vec::new();
    for id in gate.list_loaded() {
        let physical = resolver
            .binding(MountKind::Skills)
            .map(|binding| binding.physical_root().join(id.category()).join(id.short_name()));
        let metadata = physical.as_deref().and_then(|path| fs::metadata(path).ok());
        entries.push(FileEntry {
            virtual_path: format!("{SKILLS_PREFIX}/{}", id.short_name()),
            is_directory: true,
            size: 0,
            modified_at: metadata.as_ref().map(modified_secs).unwrap_or(0),
        });
    }
    entries.sort_by(|a, b| a.virtual_path.cmp(&b.virtual_path));
    entries
}

fn is_skills_mount_root(virtual_path: &str) -> bool {
    matches!(
        crate::vfs::normalize_virtual_path(virtual_path),
        Ok(normalized) if normalized == SKILLS_PREFIX
    )
}

pub(crate) fn is_authoring_artifact(resolved: &ResolvedPath) -> bool {
    resolved.kind == MountKind::Skills
        && resolved
            .physical
            .file_name()
            .is_some_and(|name| name == AUTHORING_NOTES_FILE)
}

pub(crate) fn not_found_for(resolved: &ResolvedPath) -> FileOpError {
    FileOpError::Path(VfsError::NotFound {
        path: resolved.virtual_path.clone(),
    })
}

pub(crate) fn map_io(resolved: &ResolvedPath, source: std::io::Error) -> FileOpError {
    if source.kind() == std::io::ErrorKind::NotFound {
        return not_found_for(resolved);
    }
    FileOpError::Io {
        path: resolved.virtual_path.clone(),
        source,
    }
}

pub(crate) fn modified_secs(metadata: &fs::Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or(0)
}

pub(crate) fn entry_for(
    resolved_virtual: &str,
    physical: &Path,
) -> Option<FileEntry> {
    let metadata = fs::metadata(physical).ok()?;
    Some(FileEntry {
        virtual_path: resolved_virtual.to_string(),
        is_directory: metadata.is_dir(),
        size: metadata.len(),
        modified_at: modified_secs(&metadata),
    })
}
