mod ops;
mod search;

pub use ops::{edit, list, read, write};
pub use search::{glob, search, SearchMatch};

use crate::mounts::MountKind;
use crate::skills::AUTHORING_NOTES_FILE;
use crate::vfs::VfsError;
use serde::Serialize;

/// File types surfaced by workspace and ticket listings. The skills
/// mount carries arbitrary resource types instead.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "md", "txt", "csv", "json", "yaml", "yml", "docx", "xlsx", "pdf", "html",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub virtual_path: String,
    pub is_directory: bool,
    pub size: u64,
    pub modified_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum FileOpError {
    #[error(transparent)]
    Path(#[from] VfsError),
    #[error("mount is read-only: {path}")]
    ReadOnlyViolation { path: String },
    #[error("binary content rejected: {path}")]
    BinaryContentRejected { path: String },
    #[error("edit target not found in {path}")]
    EditTargetNotFound { path: String },
    #[error("edit target occurs {count} times in {path}; pass replace_all to replace every occurrence")]
    AmbiguousEdit { path: String, count: usize },
    #[error("invalid search pattern: {0}")]
    Pattern(String),
    #[error("invalid glob pattern: {0}")]
    Glob(String),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FileOpError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Path(VfsError::NotFound { .. }))
    }
}

/// Visibility policy applied to listings, search, and glob. Dot-named
/// entries stay internal on every mount.
pub(crate) fn file_visible(kind: MountKind, name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    match kind {
        MountKind::Workspace | MountKind::Ticket => has_document_extension(name),
        MountKind::Skills => name != AUTHORING_NOTES_FILE,
    }
}

pub(crate) fn dir_visible(name: &str) -> bool {
    !name.starts_with('.')
}

fn has_document_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            DOCUMENT_EXTENSIONS.iter().any(|allowed| *allowed == ext)
        })
        .unwrap_or(false)
}
