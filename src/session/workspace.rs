use crate::config::Settings;
use crate::exec::Executor;
use crate::mounts::{ensure_ready, MountBinding, MountError, MountKind, ReadinessOutcome};
use crate::session::{SessionError, TurnContext};
use crate::shared::{append_event_log, OwnerId, ThreadId, TicketId};
use crate::skills::{discover_skills, DiscoveredSkill};
use crate::vfs::PathResolver;
use std::fs;
use std::path::{Path, PathBuf};

/// One conversation thread's private filesystem context. Constructed
/// once at conversation start and immutable for the thread's lifetime.
#[derive(Debug)]
pub struct Workspace {
    owner: OwnerId,
    thread: ThreadId,
    ticket: Option<TicketId>,
    resolver: PathResolver,
    executor: Executor,
    state_root: PathBuf,
}

impl Workspace {
    pub fn provision(
        settings: &Settings,
        owner: OwnerId,
        thread: ThreadId,
        ticket: Option<TicketId>,
    ) -> Result<Self, SessionError> {
        let workspace_root = settings
            .workspaces_path
            .join(owner.as_str())
            .join(thread.as_str());
        let state_root = settings
            .workspaces_path
            .join(".state")
            .join(owner.as_str())
            .join(thread.as_str());
        create_dir(&workspace_root)?;
        create_dir(&state_root)?;

        // The workspace binding is the session; failing it is fatal.
        let workspace_binding = MountBinding::new(MountKind::Workspace, workspace_root.clone());
        if let ReadinessOutcome::TimedOut { attempts, reason } =
            ensure_ready(&workspace_binding, &settings.readiness, &state_root)
        {
            return Err(MountError::NotReady {
                virtual_prefix: workspace_binding.virtual_prefix().to_string(),
                attempts,
                reason,
            }
            .into());
        }

        let ticket_root = match (&ticket, &settings.tickets_path) {
            (Some(ticket_id), Some(tickets_path)) => {
                let root = tickets_path.join(ticket_id.as_str());
                let binding = MountBinding::new(MountKind::Ticket, root.clone());
                Some(ready_or_degraded(
                    &binding,
                    settings,
                    &state_root,
                    root,
                    "ticket",
                )?)
            }
            _ => None,
        };

        let skills_binding = MountBinding::new(MountKind::Skills, settings.skills_path.clone());
        let skills_root = ready_or_degraded(
            &skills_binding,
            settings,
            &state_root,
            settings.skills_path.clone(),
            "skills",
        )?;

        let resolver = PathResolver::new(workspace_root.clone(), ticket_root, skills_root);
        let executor = Executor::new(workspace_root, state_root.clone(), settings.executor.clone());
        Ok(Self {
            owner,
            thread,
            ticket,
            resolver,
            executor,
            state_root,
        })
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn thread(&self) -> &ThreadId {
        &self.thread
    }

    pub fn ticket(&self) -> Option<&TicketId> {
        self.ticket.as_ref()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn state_root(&self) -> &Path {
        &self.state_root
    }

    /// Pre-load discovery listing of every skill available for loading.
    pub fn discover_skills(&self) -> Result<Vec<DiscoveredSkill>, SessionError> {
        let skills_root = self
            .resolver
            .binding(MountKind::Skills)
            .map(|binding| binding.physical_root().to_path_buf())
            .unwrap_or_default();
        Ok(discover_skills(&skills_root, &self.state_root)?)
    }

    pub fn begin_turn(&self) -> TurnContext<'_> {
        TurnContext::begin(self)
    }
}

/// Ticket and skills bindings degrade to an empty substitute directory
/// when their storage never comes up, so later lookups fail closed as
/// NotFound instead of aborting the session.
fn ready_or_degraded(
    binding: &MountBinding,
    settings: &Settings,
    state_root: &Path,
    root: PathBuf,
    name: &str,
) -> Result<PathBuf, SessionError> {
    match ensure_ready(binding, &settings.readiness, state_root) {
        ReadinessOutcome::Ready => Ok(root),
        ReadinessOutcome::TimedOut { .. } => {
            let substitute = state_root.join("unavailable").join(name);
            create_dir(&substitute)?;
            append_event_log(
                state_root,
                "warn",
                "mount.degraded",
                &format!("{} degraded to empty directory", binding.virtual_prefix()),
            );
            Ok(substitute)
        }
    }
}

fn create_dir(path: &Path) -> Result<(), SessionError> {
    fs::create_dir_all(path).map_err(|source| SessionError::Io {
        path: path.display().to_string(),
        source,
    })
}
