/*!
 * Privileged shell collaborator
 *
 * Everything that needs a shell goes through [`ShellExecutor`] so the
 * parsing side can be tested with canned output.
 */

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Result of one shell invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub success: bool,
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
}

impl ShellOutput {
    fn from_process(output: &std::process::Output) -> Self {
        let to_lines = |bytes: &[u8]| -> Vec<String> {
            String::from_utf8_lossy(bytes)
                .lines()
                .map(str::to_string)
                .collect()
        };
        Self {
            success: output.status.success(),
            stdout_lines: to_lines(&output.stdout),
            stderr_lines: to_lines(&output.stderr),
        }
    }
}

/// A binary invocation with optional working directory and library path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub library_path: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            library_path: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run from `dir` with `LD_LIBRARY_PATH=dir`, for bundled binaries
    pub fn in_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.working_dir = Some(dir.clone());
        self.library_path = Some(dir);
        self
    }

    /// Render as a single `sh` line, e.g.
    /// `cd /data && export LD_LIBRARY_PATH=/data && ./iw dev wlan0 scan dump`
    pub fn to_shell_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(dir) = &self.working_dir {
            parts.push(format!("cd {}", dir.display()));
        }
        if let Some(lib) = &self.library_path {
            parts.push(format!("export LD_LIBRARY_PATH={}", lib.display()));
        }

        let program = if self.working_dir.is_some() && !self.program.contains('/') {
            format!("./{}", self.program)
        } else {
            self.program.clone()
        };
        let mut invocation = vec![program];
        invocation.extend(self.args.iter().cloned());
        parts.push(invocation.join(" "));

        parts.join(" && ")
    }
}

/// Runs shell commands, typically with elevated privileges
#[async_trait]
pub trait ShellExecutor: Send + Sync {
    async fn execute(&self, command: &ShellCommand) -> Result<ShellOutput>;
}

/// [`ShellExecutor`] backed by `tokio::process`
///
/// Without a prefix the binary is spawned directly. With a prefix such as
/// `["su", "-c"]` the rendered shell line is passed as the last argument.
#[derive(Debug, Clone, Default)]
pub struct CommandShell {
    privilege_prefix: Vec<String>,
}

impl CommandShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_privilege_prefix<I, S>(prefix: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            privilege_prefix: prefix.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ShellExecutor for CommandShell {
    async fn execute(&self, command: &ShellCommand) -> Result<ShellOutput> {
        let mut process = match self.privilege_prefix.split_first() {
            Some((wrapper, wrapper_args)) => {
                let mut process = tokio::process::Command::new(wrapper);
                process.args(wrapper_args).arg(command.to_shell_line());
                process
            }
            None => {
                if command.program.is_empty() {
                    bail!("Empty command");
                }
                let mut process = tokio::process::Command::new(&command.program);
                process.args(&command.args);
                if let Some(dir) = &command.working_dir {
                    process.current_dir(dir);
                }
                if let Some(lib) = &command.library_path {
                    process.env("LD_LIBRARY_PATH", lib);
                }
                process
            }
        };

        debug!(command = %command.to_shell_line(), "executing");
        let output = process
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", command.program))?;

        Ok(ShellOutput::from_process(&output))
    }
}
