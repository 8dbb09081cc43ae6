//! Runtime environment (Python venv) handling
//!
//! Activation is modelled as an explicit [`Activation`] value applied to each
//! command, instead of sourcing `bin/activate` into the current process.

use crate::error::Result;
use crate::runner::{CommandRunner, CommandSpec};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEnv {
    dir: PathBuf,
}

impl RuntimeEnv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.dir.join("Scripts")
        } else {
            self.dir.join("bin")
        }
    }

    pub fn python(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir().join("python.exe")
        } else {
            self.bin_dir().join("python")
        }
    }

    /// `python -m venv <dir>` with the host interpreter.
    ///
    /// Re-running over an existing venv is safe; the venv module keeps
    /// installed packages and only refreshes the interpreter links.
    pub fn create(&self, runner: &dyn CommandRunner, host_python: &str) -> Result<()> {
        if self.exists() {
            tracing::info!(dir = %self.dir.display(), "runtime environment exists, refreshing");
        }
        runner.run(
            &CommandSpec::new(host_python)
                .args(["-m", "venv"])
                .arg(self.dir.as_os_str()),
        )
    }

    /// Environment changes equivalent to `source <dir>/bin/activate`.
    ///
    /// `base_path` is the caller's `PATH`, if any.
    pub fn activate(&self, base_path: Option<&OsStr>) -> Activation {
        let mut paths = vec![self.bin_dir()];
        if let Some(base) = base_path {
            paths.extend(std::env::split_paths(base));
        }
        // join_paths only fails on entries containing the separator, which
        // split_paths never yields; fall back to the bin dir alone.
        let path = std::env::join_paths(&paths)
            .unwrap_or_else(|_| self.bin_dir().into_os_string());

        Activation {
            virtual_env: self.dir.clone(),
            path,
            python: self.python(),
        }
    }
}

/// An activated runtime environment, applied explicitly to commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    virtual_env: PathBuf,
    path: OsString,
    python: PathBuf,
}

impl Activation {
    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn path(&self) -> &OsStr {
        &self.path
    }

    /// Apply `VIRTUAL_ENV`, the prefixed `PATH` and drop `PYTHONHOME`.
    pub fn apply(&self, cmd: CommandSpec) -> CommandSpec {
        cmd.env("VIRTUAL_ENV", self.virtual_env.as_os_str())
            .env("PATH", &self.path)
            .env_remove("PYTHONHOME")
    }

    /// `<venv python> <args…>` with this activation applied.
    pub fn python_command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.apply(CommandSpec::new(self.python.as_os_str()).args(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;

    #[cfg(unix)]
    #[test]
    fn test_activation_prefixes_path() {
        let env = RuntimeEnv::new("/srv/app/.venv");
        let act = env.activate(Some(OsStr::new("/usr/bin:/bin")));

        assert_eq!(act.path(), OsStr::new("/srv/app/.venv/bin:/usr/bin:/bin"));
        assert_eq!(act.python(), Path::new("/srv/app/.venv/bin/python"));

        let cmd = act.python_command(["-V"]);
        assert_eq!(cmd.to_string(), "/srv/app/.venv/bin/python -V");
        assert_eq!(cmd.env_value("VIRTUAL_ENV"), Some(OsStr::new("/srv/app/.venv")));
        assert!(cmd.removes_env("PYTHONHOME"));
    }

    #[cfg(unix)]
    #[test]
    fn test_activation_without_base_path() {
        let act = RuntimeEnv::new("/v").activate(None);
        assert_eq!(act.path(), OsStr::new("/v/bin"));
    }

    #[test]
    fn test_create_uses_host_python() {
        let runner = FakeRunner::default();
        let env = RuntimeEnv::new("venv-dir");
        env.create(&runner, "python").unwrap();
        assert_eq!(runner.command_lines(), vec!["python -m venv venv-dir"]);
    }

    #[test]
    fn test_exists_tracks_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RuntimeEnv::new(dir.path()).exists());
        assert!(!RuntimeEnv::new(dir.path().join("missing")).exists());
    }
}
