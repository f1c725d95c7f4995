use crate::mounts::{MountBinding, MountKind, MountMode};
use crate::vfs::{LoadedSkills, VfsError};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub virtual_path: String,
    pub kind: MountKind,
    pub mode: MountMode,
    pub physical: PathBuf,
}

/// Bidirectional virtual↔physical mapping over the three canonical
/// mounts. Dispatch is an ordered longest-prefix-first binding list;
/// the skills binding holds the shared skills root, with the loaded
/// skill's `category/name` substituted per lookup.
#[derive(Debug, Clone)]
pub struct PathResolver {
    bindings: Vec<MountBinding>,
}

impl PathResolver {
    pub fn new(
        workspace_root: PathBuf,
        ticket_root: Option<PathBuf>,
        skills_root: PathBuf,
    ) -> Self {
        let mut bindings = vec![MountBinding::new(MountKind::Workspace, workspace_root)];
        if let Some(ticket_root) = ticket_root {
            bindings.push(MountBinding::new(MountKind::Ticket, ticket_root));
        }
        bindings.push(MountBinding::new(MountKind::Skills, skills_root));
        bindings.sort_by_key(|binding| std::cmp::Reverse(binding.virtual_prefix().len()));
        Self { bindings }
    }

    pub fn binding(&self, kind: MountKind) -> Option<&MountBinding> {
        self.bindings.iter().find(|binding| binding.kind == kind)
    }

    pub fn to_physical(
        &self,
        gate: &LoadedSkills,
        virtual_path: &str,
    ) -> Result<ResolvedPath, VfsError> {
        let normalized = normalize_virtual_path(virtual_path)?;
        let not_found = || VfsError::NotFound {
            path: normalized.clone(),
        };

        let binding = self
            .bindings
            .iter()
            .find(|binding| prefix_matches(&normalized, binding.virtual_prefix()))
            .ok_or_else(not_found)?;

        let remainder = remainder_segments(&normalized, binding.virtual_prefix());
        let (root, virtual_prefix, segments) = match binding.kind {
            MountKind::Workspace | MountKind::Ticket => (
                binding.physical_root().to_path_buf(),
                binding.virtual_prefix().to_string(),
                remainder,
            ),
            MountKind::Skills => {
                // The bare mount root is only addressable through the
                // gate-backed listing, not as a physical location.
                let (short_name, rest) = remainder.split_first().ok_or_else(not_found)?;
                if *short_name == ".." {
                    return Err(VfsError::Escape {
                        path: normalized.clone(),
                    });
                }
                // An unloaded skill resolves exactly like a nonexistent
                // one so that load state is never observable.
                let id = gate.loaded(short_name).ok_or_else(not_found)?;
                let root = binding
                    .physical_root()
                    .join(id.category())
                    .join(id.short_name());
                let prefix = format!("{}/{}", binding.virtual_prefix(), short_name);
                (root, prefix, rest.to_vec())
            }
        };

        let relative = resolve_relative(&segments).ok_or(VfsError::Escape {
            path: normalized.clone(),
        })?;
        let mut canonical = virtual_prefix;
        let mut physical = root;
        for segment in relative {
            canonical.push('/');
            canonical.push_str(segment);
            physical.push(segment);
        }

        Ok(ResolvedPath {
            virtual_path: canonical,
            kind: binding.kind,
            mode: binding.mode(),
            physical,
        })
    }

    pub fn to_virtual(&self, gate: &LoadedSkills, physical: &Path) -> Result<String, VfsError> {
        for binding in &self.bindings {
            match binding.kind {
                MountKind::Workspace | MountKind::Ticket => {
                    if let Ok(rel) = physical.strip_prefix(binding.physical_root()) {
                        return Ok(join_virtual(binding.virtual_prefix(), rel));
                    }
                }
                MountKind::Skills => {
                    for id in gate.list_loaded() {
                        let skill_root = binding
                            .physical_root()
                            .join(id.category())
                            .join(id.short_name());
                        if let Ok(rel) = physical.strip_prefix(&skill_root) {
                            let prefix = format!("{}/{}", binding.virtual_prefix(), id.short_name());
                            return Ok(join_virtual(&prefix, rel));
                        }
                    }
                }
            }
        }
        Err(VfsError::OutsideMount)
    }
}

/// Collapses repeated separators, drops `.` segments, and strips any
/// trailing slash. Parent-directory segments are preserved here; escape
/// checking happens against the resolved mount prefix.
pub fn normalize_virtual_path(raw: &str) -> Result<String, VfsError> {
    if !raw.starts_with('/') {
        return Err(VfsError::NotFound {
            path: raw.to_string(),
        });
    }
    let segments: Vec<&str> = raw
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    if segments.is_empty() {
        // Bare "/" is not independently addressable.
        return Err(VfsError::NotFound {
            path: "/".to_string(),
        });
    }
    Ok(format!("/{}", segments.join("/")))
}

fn prefix_matches(normalized: &str, prefix: &str) -> bool {
    normalized == prefix
        || normalized
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn remainder_segments<'a>(normalized: &'a str, prefix: &str) -> Vec<&'a str> {
    normalized[prefix.len()..]
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Applies parent-directory segments against the mount-relative stack.
/// Returns None when a `..` would climb past the mount root.
fn resolve_relative<'a>(segments: &[&'a str]) -> Option<Vec<&'a str>> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in segments {
        if *segment == ".." {
            stack.pop()?;
        } else {
            stack.push(segment);
        }
    }
    Some(stack)
}

fn join_virtual(prefix: &str, rel: &Path) -> String {
    let rel = rel.to_string_lossy();
    if rel.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}/{rel}")
    }
}
