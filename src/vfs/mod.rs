mod resolver;
mod skill_gate;

pub use resolver::{normalize_virtual_path, PathResolver, ResolvedPath};
pub use skill_gate::LoadedSkills;

/// Path-level errors. Messages carry virtual paths only; the physical
/// side of the mapping never leaks through error values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VfsError {
    #[error("path not found: {path}")]
    NotFound { path: String },
    #[error("path `{path}` escapes its mount")]
    Escape { path: String },
    #[error("physical path is outside every mount")]
    OutsideMount,
}
