//! Command-line surface.

pub mod check;
pub mod setup;
pub mod start;

use crate::config::{Project, vars};
use crate::error::{IoSnafu, Result};
use clap::{Args, Parser, Subcommand};
use snafu::ResultExt;
use std::ffi::OsString;
use std::path::PathBuf;

pub const ROOT_ENV: &str = "ENVBOOT_ROOT";

#[derive(Debug, Parser)]
#[command(
    name = "envboot",
    version,
    about = "Set up and launch a Python service inside an isolated venv on Termux"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Project root (default: current directory)
    #[arg(long, global = true, env = ROOT_ENV)]
    pub root: Option<PathBuf>,

    /// Runtime environment directory (default: <root>/.venv)
    #[arg(long, global = true, env = vars::VENV_DIR)]
    pub venv_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Same settings, read straight from the environment for the flag-free binaries.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| {
            std::env::var_os(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            root: non_empty(ROOT_ENV),
            venv_dir: non_empty(vars::VENV_DIR),
        }
    }

    /// Resolve the project. The root is made absolute here because the
    /// launcher runs the entry point from inside it.
    pub fn project(&self) -> Result<Project> {
        let root = match self.root.as_ref().filter(|r| !r.as_os_str().is_empty()) {
            Some(root) => std::path::absolute(root).context(IoSnafu { path: root })?,
            None => std::env::current_dir().context(IoSnafu { path: "." })?,
        };
        Project::discover(root, self.venv_dir.clone())
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Install packages, create the runtime environment and write .env defaults
    #[command(alias = "bootstrap", alias = "init")]
    Setup,

    /// Start the application inside the runtime environment
    #[command(alias = "run")]
    Start {
        /// Arguments passed through to the entry point
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },

    /// Report package manager, toolchain, runtime environment and .env state
    #[command(alias = "doctor")]
    Check {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run one command and return the process exit code.
pub fn dispatch(global: &GlobalArgs, command: Commands) -> Result<i32> {
    let project = global.project()?;
    tracing::debug!(root = %project.root.display(), venv = %project.venv_dir.display(), "resolved project");

    match command {
        Commands::Setup => setup::handle_setup(&project),
        Commands::Start { args } => start::handle_start(&project, &args),
        Commands::Check { json } => check::handle_check(&project, json),
    }
}

/// Dispatch, report any error and exit with the matching code.
pub fn run_and_exit(global: &GlobalArgs, command: Commands) -> ! {
    let code = match dispatch(global, command) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("❌ {e}");
            e.exit_code()
        }
    };
    std::process::exit(code)
}
