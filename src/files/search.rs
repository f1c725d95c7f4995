use crate::files::ops::{entry_for, map_io};
use crate::files::{dir_visible, file_visible, FileEntry, FileOpError};
use crate::mounts::{SKILLS_PREFIX, WORKSPACE_PREFIX};
use crate::vfs::{LoadedSkills, PathResolver, ResolvedPath};
use globset::{Glob, GlobMatcher};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub virtual_path: String,
    pub line_number: usize,
    pub line: String,
}

/// Recursive text search over the scoped subtree. The default scope is
/// the workspace mount; scoping to `/skills` fans out over every
/// currently loaded skill.
pub fn search(
    resolver: &PathResolver,
    gate: &LoadedSkills,
    pattern: &str,
    scope: Option<&str>,
    name_glob: Option<&str>,
) -> Result<Vec<SearchMatch>, FileOpError> {
    let regex = Regex::new(pattern).map_err(|err| FileOpError::Pattern(err.to_string()))?;
    let matcher = name_glob.map(compile_glob).transpose()?;

    let mut matches = Vec::new();
    for root in resolve_scopes(resolver, gate, scope.unwrap_or(WORKSPACE_PREFIX))? {
        let mut files = Vec::new();
        collect_files(&root, &root.virtual_path, &root.physical, &mut files)?;
        for (virtual_path, physical) in files {
            if let Some(matcher) = &matcher {
                if !glob_applies(matcher, &root.virtual_path, &virtual_path) {
                    continue;
                }
            }
            let Ok(bytes) = fs::read(&physical) else {
                continue;
            };
            let Ok(text) = String::from_utf8(bytes) else {
                continue;
            };
            for (index, line) in text.lines().enumerate() {
                if regex.is_match(line) {
                    matches.push(SearchMatch {
                        virtual_path: virtual_path.clone(),
                        line_number: index + 1,
                        line: line.to_string(),
                    });
                }
            }
        }
    }
    Ok(matches)
}

/// Recursive filename match over the scoped subtree, in virtual form.
pub fn glob(
    resolver: &PathResolver,
    gate: &LoadedSkills,
    pattern: &str,
    scope: &str,
) -> Result<Vec<FileEntry>, FileOpError> {
    let matcher = compile_glob(pattern)?;

    let mut entries = Vec::new();
    for root in resolve_scopes(resolver, gate, scope)? {
        let mut files = Vec::new();
        collect_files(&root, &root.virtual_path, &root.physical, &mut files)?;
        for (virtual_path, physical) in files {
            if !glob_applies(&matcher, &root.virtual_path, &virtual_path) {
                continue;
            }
            if let Some(entry) = entry_for(&virtual_path, &physical) {
                entries.push(entry);
            }
        }
    }
    entries.sort_by(|a, b| a.virtual_path.cmp(&b.virtual_path));
    Ok(entries)
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher, FileOpError> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|err| FileOpError::Glob(err.to_string()))
}

fn glob_applies(matcher: &GlobMatcher, scope_virtual: &str, virtual_path: &str) -> bool {
    let relative = virtual_path
        .strip_prefix(scope_virtual)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(virtual_path);
    matcher.is_match(relative)
}

fn resolve_scopes(
    resolver: &PathResolver,
    gate: &LoadedSkills,
    scope: &str,
) -> Result<Vec<ResolvedPath>, FileOpError> {
    let normalized = crate::vfs::normalize_virtual_path(scope)?;
    if normalized == SKILLS_PREFIX {
        let mut roots = Vec::new();
        for id in gate.list_loaded() {
            let skill_scope = format!("{SKILLS_PREFIX}/{}", id.short_name());
            roots.push(resolver.to_physical(gate, &skill_scope)?);
        }
        return Ok(roots);
    }
    Ok(vec![resolver.to_physical(gate, &normalized)?])
}

fn collect_files(
    root: &ResolvedPath,
    virtual_path: &str,
    physical: &Path,
    out: &mut Vec<(String, std::path::PathBuf)>,
) -> Result<(), FileOpError> {
    let metadata = fs::metadata(physical).map_err(|source| map_io(root, source))?;
    if metadata.is_file() {
        let name = physical
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if file_visible(root.kind, &name) {
            out.push((virtual_path.to_string(), physical.to_path_buf()));
        }
        return Ok(());
    }

    let dir = fs::read_dir(physical).map_err(|source| map_io(root, source))?;
    let mut children: Vec<fs::DirEntry> = dir.filter_map(|entry| entry.ok()).collect();
    children.sort_by_key(|entry| entry.file_name());
    for child in children {
        let name = child.file_name().to_string_lossy().into_owned();
        let child_physical = child.path();
        let child_virtual = format!("{virtual_path}/{name}");
        let Ok(child_metadata) = child.metadata() else {
            continue;
        };
        if child_metadata.is_dir() {
            if dir_visible(&name) {
                collect_files(root, &child_virtual, &child_physical, out)?;
            }
        } else if file_visible(root.kind, &name) {
            out.push((child_virtual, child_physical));
        }
    }
    Ok(())
}
