//! External tool invocations.
//!
//! The pipeline never calls [`std::process::Command`] directly. It builds an
//! [`Invocation`] for each step and hands it to a [`ProcessRunner`], which
//! blocks until the tool exits and reports its status:
//!
//! - [`SystemRunner`] - spawns the real tool with inherited stdio
//! - [`DryRunner`] - prints the command line and reports success
//!
//! The invocation builders below produce the exact argument lists for the
//! build tool, the test runner and the packaging tool.

use crate::types::{BuildTarget, PackError, PackLayout};
use crate::version::Version;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// A fully specified external command: program, arguments, working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Returns `true` if `arg` appears verbatim in the argument list.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Converts to a [`Command`] ready to spawn.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

/// Exit status of a finished tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolExit {
    code: Option<i32>,
}

impl ToolExit {
    /// A normal exit with `code`.
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Termination without an exit code (e.g. killed by a signal).
    pub fn terminated() -> Self {
        Self { code: None }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<ExitStatus> for ToolExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Runs invocations to completion.
///
/// Implementations block until the tool exits. An `Err` means the tool could
/// not be run at all; a tool that ran and failed is an `Ok` with a
/// non-success [`ToolExit`].
pub trait ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolExit, PackError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, invocation: &Invocation) -> Result<ToolExit, PackError> {
        (**self).run(invocation)
    }
}

/// Spawns real processes. Tool output streams straight to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolExit, PackError> {
        tracing::debug!(command = %invocation, cwd = %invocation.cwd.display(), "spawning tool");
        let status = invocation
            .to_command()
            .status()
            .map_err(|source| PackError::Spawn {
                tool: invocation.program.clone(),
                source,
            })?;
        let exit = ToolExit::from(status);
        tracing::debug!(program = %invocation.program, code = ?exit.code(), "tool exited");
        Ok(exit)
    }
}

/// Prints each invocation instead of running it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunner;

impl ProcessRunner for DryRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolExit, PackError> {
        println!("  [dry-run] {}", invocation);
        Ok(ToolExit::from_code(0))
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Build tool invocation for `target`.
///
/// `signing_key` adds the key file and the sign-assembly switch.
pub fn build_invocation(
    layout: &PackLayout,
    target: &BuildTarget,
    signing_key: Option<&Path>,
) -> Invocation {
    let mut invocation = Invocation::new(&layout.tools.build, &layout.root)
        .arg(&target.solution)
        .arg(format!("/p:Configuration={}", layout.configuration))
        .arg(format!("/p:Platform={}", layout.platform));

    if let Some(key) = signing_key {
        invocation = invocation
            .arg(format!("/p:AssemblyOriginatorKeyFile={}", path_arg(key)))
            .arg("/p:SignAssembly=true");
    }
    invocation
}

/// Test runner invocation against the compiled test assembly.
pub fn test_invocation(layout: &PackLayout) -> Invocation {
    Invocation::new(&layout.tools.test, &layout.root)
        .arg(path_arg(&layout.test_assembly))
        .arg("/nologo")
        .arg("/noresult")
}

/// Packaging tool invocation for `version`.
pub fn package_invocation(layout: &PackLayout, version: &Version) -> Invocation {
    Invocation::new(&layout.tools.package, &layout.root)
        .arg("pack")
        .arg(path_arg(&layout.manifest))
        .arg("-Version")
        .arg(version.to_string())
}
