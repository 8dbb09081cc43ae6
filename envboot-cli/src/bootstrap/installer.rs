//! Package installation
//!
//! Native toolchain through the host package manager, Python dependencies
//! through pip inside the activated runtime environment.

use crate::bootstrap::venv::Activation;
use crate::error::Result;
use crate::runner::{CommandRunner, CommandSpec};
use std::path::Path;

/// Packaging tools upgraded before the manifest is installed.
pub const PIP_TOOLING: [&str; 3] = ["pip", "setuptools", "wheel"];

/// `pkg update -y` then `pkg install -y <packages…>`.
pub fn install_system_packages(
    runner: &dyn CommandRunner,
    package_manager: &str,
    packages: &[String],
) -> Result<()> {
    println!("🔄 Updating package index...");
    runner.run(&CommandSpec::new(package_manager).args(["update", "-y"]))?;

    if packages.is_empty() {
        tracing::info!("no system packages configured");
        return Ok(());
    }

    println!("🔧 Installing {}...", packages.join(", "));
    runner.run(
        &CommandSpec::new(package_manager)
            .args(["install", "-y"])
            .args(packages),
    )
}

/// Upgrade pip tooling, then `pip install -r <manifest>`.
///
/// `extra_env` is exported into both pip invocations.
pub fn install_python_dependencies(
    runner: &dyn CommandRunner,
    activation: &Activation,
    manifest: &Path,
    extra_env: &[(&str, String)],
) -> Result<()> {
    let with_env = |mut cmd: CommandSpec| {
        for (key, value) in extra_env {
            cmd = cmd.env(*key, value);
        }
        cmd
    };

    println!("📦 Upgrading {}...", PIP_TOOLING.join(", "));
    runner.run(&with_env(activation.python_command(
        ["-m", "pip", "install", "--upgrade"]
            .into_iter()
            .chain(PIP_TOOLING),
    )))?;

    println!("📦 Installing dependencies from {}...", manifest.display());
    runner.run(&with_env(activation.python_command(
        ["-m", "pip", "install", "-r"]
            .into_iter()
            .map(std::ffi::OsString::from)
            .chain(std::iter::once(manifest.as_os_str().to_os_string())),
    )))
}
