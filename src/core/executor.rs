//! Shell command launching for plugin button actions.
//!
//! Commands are fired and forgotten: the child is spawned through the
//! platform shell and the caller never blocks on it. A detached thread waits
//! on each child so finished commands do not linger as zombies.

use std::path::PathBuf;
use std::process::{Child, Command as ProcessCommand, Stdio};

/// Launches shell commands without waiting for them.
#[derive(Debug, Default, Clone)]
pub struct ShellLauncher {
    /// Working directory for spawned commands
    pub working_dir: Option<PathBuf>,

    /// Whether the child inherits the host's stdio (vs. null)
    pub inherit_stdio: bool,
}

impl ShellLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set whether to inherit stdio.
    #[must_use]
    pub fn inherit_stdio(mut self, inherit: bool) -> Self {
        self.inherit_stdio = inherit;
        self
    }

    /// Spawn `cmd` through the shell and return the child's pid.
    pub fn spawn(&self, cmd: &str) -> std::io::Result<u32> {
        let (shell, shell_arg) = get_shell();

        let mut process = ProcessCommand::new(shell);
        process.arg(shell_arg).arg(cmd);

        if let Some(ref dir) = self.working_dir {
            process.current_dir(dir);
        }

        if !self.inherit_stdio {
            process.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = process.spawn()?;
        let pid = child.id();
        tracing::debug!(pid, command = cmd, "Spawned shell command");
        reap_in_background(child);
        Ok(pid)
    }
}

fn reap_in_background(mut child: Child) {
    let pid = child.id();
    let spawned = std::thread::Builder::new().name(format!("reap-{pid}")).spawn(move || {
        match child.wait() {
            Ok(status) => tracing::debug!(pid, %status, "Shell command exited"),
            Err(e) => tracing::warn!(pid, error = %e, "Failed to wait on shell command"),
        }
    });

    if let Err(e) = spawned {
        tracing::warn!(pid, error = %e, "Could not start reaper thread");
    }
}

/// Get the shell and argument for the current platform.
fn get_shell() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}
