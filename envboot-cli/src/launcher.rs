//! Launcher for the application entry point.
//!
//! Checks that setup has produced a runtime environment, fills in a few
//! environment defaults and replaces the current process with the entry
//! point. The child's exit status becomes ours.

use crate::bootstrap::venv::RuntimeEnv;
use crate::config::{EnvSnapshot, Project, vars};
use crate::error::{Result, RuntimeEnvMissingSnafu, SpawnSnafu};
use crate::runner::CommandSpec;
use snafu::{ResultExt, ensure};
use std::ffi::{OsStr, OsString};

pub const DEFAULT_WORKERS: &str = "1";
pub const DEFAULT_LOG_FILE_ENABLED: &str = "false";
pub const DATA_SUBDIR: &str = "data";

/// Fully resolved invocation of the entry point.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    command: CommandSpec,
    defaults_applied: Vec<&'static str>,
}

impl LaunchPlan {
    /// Resolve the launch against an environment snapshot.
    ///
    /// Variables already set to a non-empty value are inherited untouched.
    pub fn resolve(project: &Project, env: &EnvSnapshot, args: &[OsString]) -> Result<Self> {
        let runtime = RuntimeEnv::new(&project.venv_dir);
        ensure!(
            runtime.exists(),
            RuntimeEnvMissingSnafu {
                path: runtime.dir()
            }
        );

        let activation = runtime.activate(env.get("PATH"));
        let entry_point = project.config.bootstrap.entry_point.as_os_str();
        let mut command = activation
            .python_command(std::iter::once(entry_point).chain(args.iter().map(OsString::as_os_str)))
            .dir(&project.root);

        let data_dir = project.root.join(DATA_SUBDIR);
        let defaults: [(&'static str, &OsStr); 3] = [
            (vars::SERVER_WORKERS, OsStr::new(DEFAULT_WORKERS)),
            (vars::LOG_FILE_ENABLED, OsStr::new(DEFAULT_LOG_FILE_ENABLED)),
            (vars::DATA_DIR, data_dir.as_os_str()),
        ];

        let mut defaults_applied = Vec::new();
        for (key, value) in defaults {
            if env.non_empty(key).is_none() {
                command = command.env(key, value);
                defaults_applied.push(key);
            }
        }
        tracing::debug!(command = %command, ?defaults_applied, "resolved launch");

        Ok(Self {
            command,
            defaults_applied,
        })
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    pub fn defaults_applied(&self) -> &[&'static str] {
        &self.defaults_applied
    }

    /// Replace the current process with the entry point.
    ///
    /// Only returns if the program could not be started.
    #[cfg(unix)]
    pub fn exec(&self) -> Result<i32> {
        use std::os::unix::process::CommandExt;

        let source = self.command.to_command().exec();
        Err(source).context(SpawnSnafu {
            command: self.command.to_string(),
        })
    }

    /// Run the entry point to completion and return its exit code.
    #[cfg(not(unix))]
    pub fn exec(&self) -> Result<i32> {
        let status = self
            .command
            .to_command()
            .status()
            .context(SpawnSnafu {
                command: self.command.to_string(),
            })?;
        Ok(status.code().unwrap_or(1))
    }
}
