use crate::exec::venv_activation;
use crate::mounts::WORKSPACE_PREFIX;
use std::path::{Path, PathBuf};

pub const SANDBOX_BINARY: &str = "bwrap";

/// Host locations exposed read-only inside every sandbox so an
/// interpreter/toolchain runtime is available. Nothing else from the
/// host is visible.
const HOST_TOOLCHAIN_RO_BINDS: &[&str] = &[
    "/usr",
    "/bin",
    "/lib",
    "/lib64",
    "/etc/alternatives",
    "/etc/ssl",
    "/etc/resolv.conf",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl SandboxSpec {
    pub fn command_form(&self) -> String {
        format!("{} {}", self.program.display(), self.args.join(" "))
    }
}

/// Builds the launcher invocation for one command: the workspace's
/// physical root becomes the logical `/workspace`, host toolchain
/// directories are read-only, scratch space is a fresh tmpfs discarded
/// with the process, and the command runs in its own PID namespace.
pub fn build_sandbox_invocation(
    workspace_root: &Path,
    command: &str,
    extra_read_only_binds: &[PathBuf],
) -> SandboxSpec {
    let mut args: Vec<String> = vec![
        "--die-with-parent".to_string(),
        "--unshare-pid".to_string(),
        "--dev".to_string(),
        "/dev".to_string(),
        "--proc".to_string(),
        "/proc".to_string(),
        "--tmpfs".to_string(),
        "/tmp".to_string(),
        "--bind".to_string(),
        workspace_root.display().to_string(),
        WORKSPACE_PREFIX.to_string(),
    ];

    for host_path in HOST_TOOLCHAIN_RO_BINDS {
        if Path::new(host_path).exists() {
            args.push("--ro-bind".to_string());
            args.push((*host_path).to_string());
            args.push((*host_path).to_string());
        }
    }
    for host_path in extra_read_only_binds {
        args.push("--ro-bind".to_string());
        args.push(host_path.display().to_string());
        args.push(host_path.display().to_string());
    }

    args.push("--chdir".to_string());
    args.push(WORKSPACE_PREFIX.to_string());
    args.push("/bin/sh".to_string());
    args.push("-c".to_string());
    args.push(wrap_command(workspace_root, command));

    SandboxSpec {
        program: PathBuf::from(SANDBOX_BINARY),
        args,
    }
}

fn wrap_command(workspace_root: &Path, command: &str) -> String {
    match venv_activation(workspace_root) {
        Some(activation) => format!("{activation} && {command}"),
        None => command.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn binds_workspace_at_logical_root() {
        let temp = tempdir().expect("tempdir");
        let spec = build_sandbox_invocation(temp.path(), "ls -la", &[]);

        assert_eq!(spec.program, PathBuf::from(SANDBOX_BINARY));
        let bind_at = spec
            .args
            .iter()
            .position(|arg| arg == "--bind")
            .expect("bind flag");
        assert_eq!(spec.args[bind_at + 1], temp.path().display().to_string());
        assert_eq!(spec.args[bind_at + 2], WORKSPACE_PREFIX);
        assert!(spec.args.contains(&"--unshare-pid".to_string()));
        assert!(spec.args.contains(&"--die-with-parent".to_string()));
    }

    #[test]
    fn scratch_is_tmpfs_and_cwd_is_workspace() {
        let temp = tempdir().expect("tempdir");
        let spec = build_sandbox_invocation(temp.path(), "pwd", &[]);

        let tmpfs_at = spec
            .args
            .iter()
            .position(|arg| arg == "--tmpfs")
            .expect("tmpfs flag");
        assert_eq!(spec.args[tmpfs_at + 1], "/tmp");

        let chdir_at = spec
            .args
            .iter()
            .position(|arg| arg == "--chdir")
            .expect("chdir flag");
        assert_eq!(spec.args[chdir_at + 1], WORKSPACE_PREFIX);
        assert_eq!(spec.args.last().expect("command"), "pwd");
    }

    #[test]
    fn extra_read_only_binds_are_appended() {
        let temp = tempdir().expect("tempdir");
        let extra = vec![PathBuf::from("/opt/toolchain")];
        let spec = build_sandbox_invocation(temp.path(), "true", &extra);

        let position = spec
            .args
            .iter()
            .position(|arg| arg == "/opt/toolchain")
            .expect("extra bind");
        assert_eq!(spec.args[position - 1], "--ro-bind");
        assert_eq!(spec.args[position + 1], "/opt/toolchain");
    }

    #[test]
    fn venv_activation_prefixes_the_command() {
        let temp = tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join(".venv/bin")).expect("mkdir");
        fs::write(temp.path().join(".venv/bin/activate"), "# venv").expect("write");

        let spec = build_sandbox_invocation(temp.path(), "python run.py", &[]);
        assert_eq!(
            spec.args.last().expect("command"),
            ". /workspace/.venv/bin/activate && python run.py"
        );
    }

    #[test]
    fn host_ro_binds_never_target_the_workspace() {
        let temp = tempdir().expect("tempdir");
        let spec = build_sandbox_invocation(temp.path(), "true", &[]);

        let mut iter = spec.args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--ro-bind" {
                let target = iter.nth(1).expect("ro-bind target");
                assert_ne!(target, WORKSPACE_PREFIX);
            }
        }
    }
}
