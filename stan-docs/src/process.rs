//! Running external renderers.
//!
//! Only one external process runs at a time, so the interface is a single
//! blocking call that captures everything the operator may need to see.

use anyhow::{bail, Result};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A program invocation, independent of how it is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: &str, dir: &Path) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            dir: dir.to_path_buf(),
            env: Vec::new(),
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

    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) || arg.contains('"') {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Exit code and captured streams of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `-1` when the process was terminated by a signal.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Executes commands. Tests substitute a recording fake.
pub trait Shell {
    fn run(&self, cmd: &CommandSpec) -> io::Result<CommandOutput>;
}

/// Runs commands as child processes of this one.
pub struct SystemShell;

impl Shell for SystemShell {
    fn run(&self, cmd: &CommandSpec) -> io::Result<CommandOutput> {
        let output = Command::new(&cmd.program)
            .args(&cmd.args)
            .current_dir(&cmd.dir)
            .envs(cmd.env.iter().map(|(k, v)| (k, v)))
            .output()?;
        Ok(CommandOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a command and fail with its stderr when it exits non-zero.
pub fn run_checked(shell: &dyn Shell, cmd: &CommandSpec) -> Result<CommandOutput> {
    info!("+ {}", cmd);
    let output = match shell.run(cmd) {
        Ok(output) => output,
        Err(e) => bail!("failed to start `{}`: {}", cmd.program, e),
    };
    if !output.stdout.trim().is_empty() {
        debug!("{}", output.stdout.trim_end());
    }
    if !output.success() {
        bail!(
            "command `{}` failed with exit code {}\n{}",
            cmd,
            output.code,
            output.stderr.trim_end()
        );
    }
    Ok(output)
}
