use crate::exec::{ExecError, ExecutionResult};
use crate::files::{self, FileEntry, FileOpError, SearchMatch};
use crate::session::{SessionError, Workspace};
use crate::skills::SkillId;
use crate::vfs::LoadedSkills;
use std::time::Duration;

/// Per-turn request context. Owns the loaded-skill state so skill
/// visibility is never a free-floating global; consuming `finish`
/// guarantees the reset runs exactly once at the turn's natural end.
#[derive(Debug)]
pub struct TurnContext<'a> {
    workspace: &'a Workspace,
    skills: LoadedSkills,
}

impl<'a> TurnContext<'a> {
    pub(crate) fn begin(workspace: &'a Workspace) -> Self {
        Self {
            workspace,
            skills: LoadedSkills::new(),
        }
    }

    /// The agent-facing "load skill" call. Maps directly onto the gate;
    /// an identifier that names no real skill fails closed later, at
    /// resolution time, exactly like a nonexistent path.
    pub fn load_skill(&mut self, identifier: &str) -> Result<(), SessionError> {
        let id = SkillId::parse(identifier)?;
        self.skills.load(id);
        Ok(())
    }

    pub fn loaded_skills(&self) -> &LoadedSkills {
        &self.skills
    }

    pub fn list(&self, virtual_path: &str) -> Result<Vec<FileEntry>, FileOpError> {
        files::list(self.workspace.resolver(), &self.skills, virtual_path)
    }

    pub fn read(
        &self,
        virtual_path: &str,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Result<String, FileOpError> {
        files::read(
            self.workspace.resolver(),
            &self.skills,
            virtual_path,
            offset,
            limit,
        )
    }

    pub fn write(&self, virtual_path: &str, content: &str) -> Result<(), FileOpError> {
        files::write(self.workspace.resolver(), &self.skills, virtual_path, content)
    }

    pub fn edit(
        &self,
        virtual_path: &str,
        old: &str,
        new: &str,
        replace_all: bool,
    ) -> Result<(), FileOpError> {
        files::edit(
            self.workspace.resolver(),
            &self.skills,
            virtual_path,
            old,
            new,
            replace_all,
        )
    }

    pub fn search(
        &self,
        pattern: &str,
        scope: Option<&str>,
        name_glob: Option<&str>,
    ) -> Result<Vec<SearchMatch>, FileOpError> {
        files::search(
            self.workspace.resolver(),
            &self.skills,
            pattern,
            scope,
            name_glob,
        )
    }

    pub fn glob(&self, pattern: &str, scope: &str) -> Result<Vec<FileEntry>, FileOpError> {
        files::glob(self.workspace.resolver(), &self.skills, pattern, scope)
    }

    pub fn run(
        &self,
        command: &str,
        timeout: Option<Duration>,
    ) -> Result<ExecutionResult, ExecError> {
        let executor = self.workspace.executor();
        executor.run(command, timeout.unwrap_or_else(|| executor.default_timeout()))
    }

    /// Ends the turn: the whole loaded set is cleared so the next turn
    /// starts from a deterministic empty state.
    pub fn finish(mut self) {
        self.skills.reset();
    }
}
