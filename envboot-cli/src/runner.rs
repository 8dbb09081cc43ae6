//! Subprocess seam.
//!
//! Everything envboot does to the host goes through [`CommandRunner`], so the
//! bootstrap procedure can be exercised against a recording fake in tests.

use crate::error::{CommandFailedSnafu, Result, SpawnSnafu};
use snafu::{ResultExt, ensure};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// A program invocation with its environment changes and working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    program: OsString,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    env_removes: Vec<OsString>,
    dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        let key = key.into();
        self.env_removes.retain(|k| *k != key);
        self.envs.retain(|(k, _)| *k != key);
        self.envs.push((key, value.into()));
        self
    }

    #[must_use]
    pub fn env_remove(mut self, key: impl Into<OsString>) -> Self {
        let key = key.into();
        self.envs.retain(|(k, _)| *k != key);
        self.env_removes.push(key);
        self
    }

    #[must_use]
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Value this command will see for `key`, if envboot sets it explicitly.
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    pub fn removes_env(&self, key: &str) -> bool {
        self.env_removes.iter().any(|k| k == key)
    }

    fn expression(&self) -> duct::Expression {
        let mut expr = duct::cmd(&self.program, &self.args);
        for (key, value) in &self.envs {
            expr = expr.env(key, value);
        }
        for key in &self.env_removes {
            expr = expr.env_remove(key);
        }
        if let Some(dir) = &self.dir {
            expr = expr.dir(dir);
        }
        expr
    }

    /// Build a `std::process::Command` for callers that need to `exec`.
    pub fn to_command(&self) -> std::process::Command {
        let mut command = std::process::Command::new(&self.program);
        command.args(&self.args);
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        for key in &self.env_removes {
            command.env_remove(key);
        }
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

pub trait CommandRunner {
    /// Run with inherited stdio; a nonzero exit is an error.
    fn run(&self, cmd: &CommandSpec) -> Result<()>;

    /// Capture trimmed stdout. `None` when the program is missing or fails.
    fn read(&self, cmd: &CommandSpec) -> Option<String>;

    /// Locate a program on PATH.
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        self.read(&CommandSpec::new("which").arg(name))
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }
}

/// Runs commands on the real host through `duct`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<()> {
        tracing::debug!(command = %cmd, "running");
        let output = cmd
            .expression()
            .unchecked()
            .run()
            .context(SpawnSnafu {
                command: cmd.to_string(),
            })?;

        ensure!(
            output.status.success(),
            CommandFailedSnafu {
                command: cmd.to_string(),
                code: output.status.code(),
            }
        );
        Ok(())
    }

    fn read(&self, cmd: &CommandSpec) -> Option<String> {
        tracing::debug!(command = %cmd, "capturing");
        cmd.expression()
            .stderr_null()
            .read()
            .map_err(|e| tracing::debug!(command = %cmd, error = %e, "capture failed"))
            .ok()
            .map(|s| s.trim().to_string())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Recording runner used by the unit tests.

    use super::{CommandRunner, CommandSpec};
    use crate::error::{CommandFailedSnafu, Result};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Debug, Default)]
    pub(crate) struct FakeRunner {
        pub(crate) calls: RefCell<Vec<CommandSpec>>,
        pub(crate) programs: Vec<String>,
        pub(crate) outputs: HashMap<String, String>,
        pub(crate) failures: HashMap<String, i32>,
    }

    impl FakeRunner {
        pub(crate) fn with_programs(programs: &[&str]) -> Self {
            Self {
                programs: programs.iter().map(ToString::to_string).collect(),
                ..Self::default()
            }
        }

        pub(crate) fn output(mut self, command: &str, stdout: &str) -> Self {
            self.outputs.insert(command.to_string(), stdout.to_string());
            self
        }

        pub(crate) fn fail(mut self, command: &str, code: i32) -> Self {
            self.failures.insert(command.to_string(), code);
            self
        }

        pub(crate) fn command_lines(&self) -> Vec<String> {
            self.calls.borrow().iter().map(ToString::to_string).collect()
        }

        pub(crate) fn ran(&self, command: &str) -> bool {
            self.command_lines().iter().any(|c| c == command)
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, cmd: &CommandSpec) -> Result<()> {
            self.calls.borrow_mut().push(cmd.clone());
            match self.failures.get(&cmd.to_string()) {
                Some(code) => CommandFailedSnafu {
                    command: cmd.to_string(),
                    code: Some(*code),
                }
                .fail(),
                None => Ok(()),
            }
        }

        fn read(&self, cmd: &CommandSpec) -> Option<String> {
            self.calls.borrow_mut().push(cmd.clone());
            self.outputs.get(&cmd.to_string()).cloned()
        }

        fn find_program(&self, name: &str) -> Option<PathBuf> {
            self.programs
                .iter()
                .any(|p| p == name)
                .then(|| PathBuf::from("/data/data/com.termux/files/usr/bin").join(name))
        }
    }
}
