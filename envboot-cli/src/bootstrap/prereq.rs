//! Prerequisite checks for envboot
//!
//! Verifies the host package manager before anything is installed, and
//! validates toolchain binaries against the versions in `envboot.toml`.

use crate::config::{BinarySpec, BootstrapSection};
use crate::error::{PackageManagerMissingSnafu, Result};
use crate::runner::{CommandRunner, CommandSpec};
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"v?(\d+)\.(\d+)(?:\.(\d+))?").expect("version regex is valid")
});

/// Result of prerequisite check for a single binary
#[derive(Debug, Clone, Serialize)]
pub struct BinaryCheck {
    pub name: String,
    pub found: bool,
    pub installed_version: Option<String>,
    pub required_version: String,
    pub meets_requirement: bool,
    pub path: Option<PathBuf>,
    pub install_hint: Option<String>,
}

/// Overall prerequisite check result
#[derive(Debug, Clone, Serialize)]
pub struct PrereqResult {
    pub package_manager: Option<PathBuf>,
    pub required: Vec<BinaryCheck>,
    pub optional: Vec<BinaryCheck>,
    pub all_required_met: bool,
}

impl PrereqResult {
    /// Get list of missing required binaries
    pub fn missing_required(&self) -> Vec<&BinaryCheck> {
        self.required
            .iter()
            .filter(|b| !b.found || !b.meets_requirement)
            .collect()
    }

    /// Get list of missing optional binaries
    pub fn missing_optional(&self) -> Vec<&BinaryCheck> {
        self.optional
            .iter()
            .filter(|b| !b.found || !b.meets_requirement)
            .collect()
    }
}

/// Fail unless the host package manager is on PATH.
pub fn require_package_manager(runner: &dyn CommandRunner, name: &str) -> Result<PathBuf> {
    match runner.find_program(name) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "found package manager");
            Ok(path)
        }
        None => PackageManagerMissingSnafu { name }.fail(),
    }
}

/// Get version of binary by running `<binary> --version`
fn get_version(runner: &dyn CommandRunner, name: &str) -> Option<String> {
    let output = runner.read(&CommandSpec::new(name).arg("--version"))?;
    extract_version(&output)
}

/// Extract semantic version from version output
/// Handles various formats:
///   "git version 2.34.1" -> "2.34.1"
///   "Python 3.11.6" -> "3.11.6"
///   "GNU Make 4.4" -> "4.4.0"
fn extract_version(output: &str) -> Option<String> {
    let cap = VERSION_RE.captures(output)?;
    let patch = cap.get(3).map_or("0", |m| m.as_str());
    Some(format!("{}.{}.{}", &cap[1], &cap[2], patch))
}

/// Check if installed version meets requirement
/// Parses requirement like ">=1.0.0" and compares versions
fn version_meets_requirement(installed: &str, requirement: &str) -> anyhow::Result<bool> {
    let requirement = requirement.trim();

    let (op, required_ver_str) = [">=", "<=", ">", "<", "="]
        .into_iter()
        .find_map(|op| requirement.strip_prefix(op).map(|rest| (op, rest)))
        .unwrap_or(("=", requirement));

    let installed_ver = semver::Version::parse(installed.trim())
        .with_context(|| format!("Failed to parse installed version: {installed}"))?;

    let required_ver = semver::Version::parse(required_ver_str.trim())
        .with_context(|| format!("Failed to parse required version: {required_ver_str}"))?;

    Ok(match op {
        ">=" => installed_ver >= required_ver,
        "<=" => installed_ver <= required_ver,
        ">" => installed_ver > required_ver,
        "<" => installed_ver < required_ver,
        _ => installed_ver == required_ver,
    })
}

/// Check a single binary against its specification
fn check_binary(runner: &dyn CommandRunner, name: &str, spec: &BinarySpec) -> BinaryCheck {
    let path = runner.find_program(name);
    let found = path.is_some();

    let (installed_version, meets_requirement) = if found {
        if let Some(version) = get_version(runner, name) {
            let meets = version_meets_requirement(&version, &spec.version)
                .map_err(|e| tracing::warn!(binary = name, error = %e, "unparseable version"))
                .unwrap_or(false);
            (Some(version), meets)
        } else {
            // Binary found but version unknown - assume OK
            (Some("unknown".to_string()), true)
        }
    } else {
        (None, false)
    };

    BinaryCheck {
        name: name.to_string(),
        found,
        installed_version,
        required_version: spec.version.clone(),
        meets_requirement,
        path,
        install_hint: spec.install_hint.clone(),
    }
}

/// Check package manager and every configured binary.
pub fn check_prerequisites(runner: &dyn CommandRunner, section: &BootstrapSection) -> PrereqResult {
    let package_manager = runner.find_program(&section.package_manager);

    let required: Vec<BinaryCheck> = section
        .required_bins
        .iter()
        .map(|(name, spec)| check_binary(runner, name, spec))
        .collect();

    let optional = section
        .optional_bins
        .iter()
        .map(|(name, spec)| check_binary(runner, name, spec))
        .collect();

    let all_required_met = package_manager.is_some()
        && required
            .iter()
            .all(|check| check.found && check.meets_requirement);

    PrereqResult {
        package_manager,
        required,
        optional,
        all_required_met,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_version("git version 2.34.1"),
            Some("2.34.1".to_string())
        );
        assert_eq!(extract_version("Python 3.11.6"), Some("3.11.6".to_string()));
        assert_eq!(
            extract_version("rustc 1.75.0 (82e1608df 2023-12-21)"),
            Some("1.75.0".to_string())
        );
        assert_eq!(extract_version("GNU Make 4.4"), Some("4.4.0".to_string()));
        assert_eq!(extract_version("v3.2.1"), Some("3.2.1".to_string()));
        assert_eq!(extract_version("no digits here"), None);
    }

    #[test]
    fn test_version_comparison() {
        assert!(version_meets_requirement("2.34.1", ">=2.30.0").unwrap());
        assert!(!version_meets_requirement("2.29.0", ">=2.30.0").unwrap());
        assert!(version_meets_requirement("1.0.0", "=1.0.0").unwrap());
        assert!(!version_meets_requirement("1.0.1", "=1.0.0").unwrap());
        assert!(version_meets_requirement("1.0.0", "1.0.0").unwrap());
        assert!(version_meets_requirement("3.7.0", "<3.8.0").unwrap());
        assert!(version_meets_requirement("x", ">=1.0.0").is_err());
    }

    #[test]
    fn test_missing_package_manager_is_precondition_failure() {
        let runner = FakeRunner::default();
        let err = require_package_manager(&runner, "pkg").unwrap_err();
        assert!(matches!(err, crate::Error::PackageManagerMissing { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_check_prerequisites() {
        let runner = FakeRunner::with_programs(&["pkg", "python", "git"])
            .output("python --version", "Python 3.7.3")
            .output("git --version", "git version 2.43.0");
        let section = BootstrapSection::default();

        let result = check_prerequisites(&runner, &section);

        assert!(result.package_manager.is_some());
        assert!(!result.all_required_met);

        let missing: Vec<&str> = result
            .missing_required()
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(missing, vec!["clang", "make", "python", "rustc"]);

        let git = result.required.iter().find(|b| b.name == "git").unwrap();
        assert!(git.meets_requirement);
        assert_eq!(git.installed_version.as_deref(), Some("2.43.0"));
    }

    #[test]
    fn test_found_without_version_is_accepted() {
        let runner = FakeRunner::with_programs(&["pkg", "python", "git", "clang", "rustc", "make"]);
        let result = check_prerequisites(&runner, &BootstrapSection::default());
        assert!(result.all_required_met);
        assert!(result.missing_optional().is_empty());
    }
}
