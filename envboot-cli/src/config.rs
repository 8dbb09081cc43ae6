//! Project configuration.
//!
//! Reads the optional `envboot.toml` at the project root. Every field has a
//! default, so the file is never required.

use crate::error::{ConfigParseSnafu, IoSnafu, Result};
use serde::Deserialize;
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "envboot.toml";

/// Environment variables consulted by envboot itself.
pub mod vars {
    pub const VENV_DIR: &str = "VENV_DIR";
    pub const ANDROID_API_LEVEL: &str = "ANDROID_API_LEVEL";
    pub const SERVER_WORKERS: &str = "SERVER_WORKERS";
    pub const LOG_FILE_ENABLED: &str = "LOG_FILE_ENABLED";
    pub const DATA_DIR: &str = "DATA_DIR";
}

/// Snapshot of the caller's environment, read once per run.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<OsString, OsString>,
}

impl EnvSnapshot {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    /// Value of `key` unless it is unset or empty, like `${KEY:-…}`.
    pub fn non_empty(&self, key: &str) -> Option<&OsStr> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub bootstrap: BootstrapSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapSection {
    pub package_manager: String,
    pub packages: Vec<String>,
    pub manifest: PathBuf,
    pub descriptor: PathBuf,
    pub entry_point: PathBuf,
    pub venv_dir: PathBuf,
    pub api_level_fallback: u32,
    pub required_bins: BTreeMap<String, BinarySpec>,
    pub optional_bins: BTreeMap<String, BinarySpec>,
}

impl Default for BootstrapSection {
    fn default() -> Self {
        Self {
            package_manager: "pkg".to_string(),
            packages: [
                "python", "git", "clang", "rust", "make", "binutils", "libffi", "openssl",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            manifest: PathBuf::from("requirements.txt"),
            descriptor: PathBuf::from(".env"),
            entry_point: PathBuf::from("main.py"),
            venv_dir: PathBuf::from(".venv"),
            api_level_fallback: 24,
            required_bins: default_required_bins(),
            optional_bins: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinarySpec {
    pub version: String, // Format: ">=1.0.0"
    #[serde(default)]
    pub install_hint: Option<String>,
}

fn default_required_bins() -> BTreeMap<String, BinarySpec> {
    [
        ("python", ">=3.8.0", "pkg install python"),
        ("git", ">=2.0.0", "pkg install git"),
        ("clang", ">=10.0.0", "pkg install clang"),
        ("rustc", ">=1.70.0", "pkg install rust"),
        ("make", ">=4.0.0", "pkg install make"),
    ]
    .into_iter()
    .map(|(name, version, hint)| {
        (
            name.to_string(),
            BinarySpec {
                version: version.to_string(),
                install_hint: Some(hint.to_string()),
            },
        )
    })
    .collect()
}

impl ProjectConfig {
    /// Load `envboot.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no project config, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).context(IoSnafu { path: path.clone() })?;
        toml::from_str(&content).context(ConfigParseSnafu { path })
    }
}

/// Expand `~` and anchor relative paths at `root`.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let expanded = PathBuf::from(expanded);
    if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    }
}

/// Resolved locations for one project, shared by every command.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub venv_dir: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    /// Resolve a project. `venv_override` is the `VENV_DIR` value, if any;
    /// an empty override counts as unset.
    pub fn new(root: PathBuf, venv_override: Option<PathBuf>, config: ProjectConfig) -> Self {
        let venv = venv_override
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| config.bootstrap.venv_dir.clone());
        let venv_dir = resolve_path(&root, &venv);
        Self {
            root,
            venv_dir,
            config,
        }
    }

    /// Load `envboot.toml` from `root` and resolve against it.
    pub fn discover(root: PathBuf, venv_override: Option<PathBuf>) -> Result<Self> {
        let config = ProjectConfig::load(&root)?;
        Ok(Self::new(root, venv_override, config))
    }

    pub fn manifest_path(&self) -> PathBuf {
        resolve_path(&self.root, &self.config.bootstrap.manifest)
    }

    pub fn descriptor_path(&self) -> PathBuf {
        resolve_path(&self.root, &self.config.bootstrap.descriptor)
    }

    pub fn entry_point(&self) -> PathBuf {
        resolve_path(&self.root, &self.config.bootstrap.entry_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::discover(dir.path().to_path_buf(), None).unwrap();

        assert_eq!(project.venv_dir, dir.path().join(".venv"));
        assert_eq!(project.descriptor_path(), dir.path().join(".env"));
        assert_eq!(project.manifest_path(), dir.path().join("requirements.txt"));
        assert_eq!(project.config.bootstrap.package_manager, "pkg");
        assert_eq!(project.config.bootstrap.api_level_fallback, 24);
        assert!(project.config.bootstrap.packages.contains(&"rust".to_string()));
    }

    #[test]
    fn test_venv_override_wins() {
        let root = PathBuf::from("/srv/app");
        let project = Project::new(
            root.clone(),
            Some(PathBuf::from("/opt/venv")),
            ProjectConfig::default(),
        );
        assert_eq!(project.venv_dir, PathBuf::from("/opt/venv"));

        let project = Project::new(root.clone(), Some(PathBuf::from("env")), ProjectConfig::default());
        assert_eq!(project.venv_dir, root.join("env"));

        let project = Project::new(root.clone(), Some(PathBuf::new()), ProjectConfig::default());
        assert_eq!(project.venv_dir, root.join(".venv"));
    }

    #[test]
    fn test_snapshot_treats_empty_as_unset() {
        let env: EnvSnapshot = [("SERVER_WORKERS", ""), ("DATA_DIR", "/d")]
            .into_iter()
            .collect();

        assert_eq!(env.get("SERVER_WORKERS"), Some(OsStr::new("")));
        assert_eq!(env.non_empty("SERVER_WORKERS"), None);
        assert_eq!(env.non_empty("DATA_DIR"), Some(OsStr::new("/d")));
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
[bootstrap]
packages = ["python", "git"]
entry_point = "server.py"

[bootstrap.required_bins.python]
version = ">=3.11.0"
"#,
        )
        .unwrap();

        let project = Project::discover(dir.path().to_path_buf(), None).unwrap();
        assert_eq!(project.config.bootstrap.packages, vec!["python", "git"]);
        assert_eq!(project.entry_point(), dir.path().join("server.py"));
        assert_eq!(project.config.bootstrap.manifest, PathBuf::from("requirements.txt"));
        assert_eq!(project.config.bootstrap.required_bins.len(), 1);
        assert_eq!(
            project.config.bootstrap.required_bins["python"].version,
            ">=3.11.0"
        );
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[bootstrap\n").unwrap();

        let err = Project::discover(dir.path().to_path_buf(), None).unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
