// ============================================================================
// bitcount-core/src/external/runner.rs
// ============================================================================
//
// PROCESS RUNNER: Blocking Execution of External Tools
//
// Every stage of a trial shells out to a third-party program and, depending
// on the stage, discards its output or captures stdout or stderr as text.
// The runner does not judge exit codes: a failing encoder simply produces
// text without a summary, which the caller notices when parsing. Only a
// launch failure is an error here.
//
// KEY COMPONENTS:
// - ToolCommand: program, arguments and working directory
// - Capture: which stream (if any) to collect
// - ProcessRunner: trait seam used by the pipeline and by tests
// - SystemRunner: std::process implementation
//
// AI-ASSISTANT-INFO: External process invocation abstraction

// ---- Internal crate imports ----
use crate::error::{CoreResult, command_start_error};

// ---- External crate imports ----
use log::{debug, error, warn};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Which output stream of a child process to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Discard both streams.
    Nothing,
    Stdout,
    Stderr,
}

/// A fully specified external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
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

    /// Runs the tool inside `dir`; relative file arguments resolve there.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Short tool name for log and error messages.
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Shell-like rendering of the command line.
    pub fn display(&self) -> String {
        let mut rendered = self.program.display().to_string();
        for arg in &self.args {
            rendered.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                rendered.push('"');
                rendered.push_str(arg);
                rendered.push('"');
            } else {
                rendered.push_str(arg);
            }
        }
        rendered
    }
}

/// Result of running a tool to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Captured stream decoded as (lossy) UTF-8; empty for `Capture::Nothing`.
    pub text: String,
}

impl CommandOutput {
    pub fn lines(&self) -> std::str::Lines<'_> {
        self.text.lines()
    }
}

/// Runs external tools. Implemented by [`SystemRunner`] and by test doubles.
pub trait ProcessRunner {
    /// Runs `command` to completion, collecting the requested stream.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::CommandStart` when the process cannot be launched.
    fn run(&self, command: &ToolCommand, capture: Capture) -> CoreResult<CommandOutput>;
}

/// Runs tools as real child processes and blocks until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &ToolCommand, capture: Capture) -> CoreResult<CommandOutput> {
        debug!("Executing command: {}", command.display());

        let (stdout, stderr) = match capture {
            Capture::Nothing => (Stdio::null(), Stdio::null()),
            Capture::Stdout => (Stdio::piped(), Stdio::null()),
            Capture::Stderr => (Stdio::null(), Stdio::piped()),
        };

        let mut cmd = Command::new(command.program());
        cmd.args(command.get_args())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr);
        if let Some(dir) = command.working_dir() {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| {
            error!("Failed to execute {}: {}", command.tool_name(), e);
            command_start_error(command.tool_name(), e)
        })?;

        if !output.status.success() {
            warn!(
                "{} exited with status {}",
                command.tool_name(),
                output
                    .status
                    .code()
                    .map_or_else(|| "unknown".to_string(), |code| code.to_string())
            );
        }

        let raw: &[u8] = match capture {
            Capture::Nothing => &[],
            Capture::Stdout => &output.stdout,
            Capture::Stderr => &output.stderr,
        };

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            text: String::from_utf8_lossy(raw).into_owned(),
        })
    }
}
