//! envboot: one-time setup and per-run launch of a Python service inside an
//! isolated runtime environment on a Termux host.
//!
//! - [`bootstrap`] installs packages, creates the venv and writes `.env`
//! - [`launcher`] validates the venv and hands off to the entry point
//! - [`commands`] is the clap surface shared by the binaries

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod error;
pub mod launcher;
pub mod runner;

pub use config::{EnvSnapshot, Project, ProjectConfig};
pub use error::{Error, Result};
pub use launcher::LaunchPlan;
pub use runner::{CommandRunner, CommandSpec, SystemRunner};

/// Log filter variable, e.g. `ENVBOOT_LOG=debug`.
pub const LOG_ENV: &str = "ENVBOOT_LOG";

/// Route `tracing` diagnostics through `env_logger` to stderr.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn"))
        .format_timestamp(None)
        .init();
}
