use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const WORKSPACE_PREFIX: &str = "/workspace";
pub const TICKET_PREFIX: &str = "/ticket";
pub const SKILLS_PREFIX: &str = "/skills";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MountMode {
    Writable,
    ReadOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MountKind {
    Workspace,
    Ticket,
    Skills,
}

impl MountKind {
    pub fn virtual_prefix(self) -> &'static str {
        match self {
            Self::Workspace => WORKSPACE_PREFIX,
            Self::Ticket => TICKET_PREFIX,
            Self::Skills => SKILLS_PREFIX,
        }
    }

    pub fn mode(self) -> MountMode {
        match self {
            Self::Workspace => MountMode::Writable,
            Self::Ticket | Self::Skills => MountMode::ReadOnly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountBinding {
    pub kind: MountKind,
    pub physical_root: PathBuf,
}

impl MountBinding {
    pub fn new(kind: MountKind, physical_root: PathBuf) -> Self {
        Self {
            kind,
            physical_root,
        }
    }

    pub fn virtual_prefix(&self) -> &'static str {
        self.kind.virtual_prefix()
    }

    pub fn mode(&self) -> MountMode {
        self.kind.mode()
    }

    pub fn physical_root(&self) -> &Path {
        &self.physical_root
    }
}
