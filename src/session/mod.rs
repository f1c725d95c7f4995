mod turn;
mod workspace;

pub use turn::TurnContext;
pub use workspace::Workspace;

use crate::mounts::MountError;
use crate::skills::SkillError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Mount(#[from] MountError),
    #[error(transparent)]
    Skill(#[from] SkillError),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
