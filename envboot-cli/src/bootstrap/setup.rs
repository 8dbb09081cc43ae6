//! The setup procedure.
//!
//! Steps run strictly in order and the first failure aborts the run. Each
//! step is safe to repeat, so re-running `envboot setup` is the recovery path.

use crate::bootstrap::api_level::ApiLevel;
use crate::bootstrap::descriptor::ensure_descriptor;
use crate::bootstrap::installer::{install_python_dependencies, install_system_packages};
use crate::bootstrap::prereq::require_package_manager;
use crate::bootstrap::report::BootstrapReport;
use crate::bootstrap::venv::RuntimeEnv;
use crate::config::{EnvSnapshot, Project, vars};
use crate::error::Result;
use crate::runner::CommandRunner;
use chrono::Utc;

/// Interpreter used to create the venv, installed by the `python` package.
pub const HOST_PYTHON: &str = "python";

pub fn run_setup(
    project: &Project,
    runner: &dyn CommandRunner,
    env: &EnvSnapshot,
) -> Result<BootstrapReport> {
    let section = &project.config.bootstrap;

    println!("📋 Checking for {}...", section.package_manager);
    let package_manager = require_package_manager(runner, &section.package_manager)?;

    install_system_packages(runner, &section.package_manager, &section.packages)?;

    let runtime = RuntimeEnv::new(&project.venv_dir);
    let venv_reused = runtime.exists();
    println!("🐍 Creating runtime environment at {}...", runtime.dir().display());
    runtime.create(runner, HOST_PYTHON)?;
    let activation = runtime.activate(env.get("PATH"));

    let override_value = env.get(vars::ANDROID_API_LEVEL).map(|v| v.to_string_lossy());
    let api_level = ApiLevel::resolve(
        override_value.as_deref(),
        runner,
        section.api_level_fallback,
    )?;
    tracing::info!(api_level = api_level.level, source = %api_level.source, "resolved API level");
    println!("📱 ANDROID_API_LEVEL={}", api_level.level);

    let manifest = project.manifest_path();
    install_python_dependencies(
        runner,
        &activation,
        &manifest,
        &[(vars::ANDROID_API_LEVEL, api_level.level.to_string())],
    )?;

    let descriptor = project.descriptor_path();
    let descriptor_outcome = ensure_descriptor(&descriptor)?;

    Ok(BootstrapReport {
        timestamp: Utc::now().to_rfc3339(),
        package_manager,
        packages: section.packages.clone(),
        venv_dir: runtime.dir().to_path_buf(),
        venv_reused,
        api_level,
        manifest,
        descriptor,
        descriptor_outcome,
    })
}
