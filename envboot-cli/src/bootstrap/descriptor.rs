//! Environment descriptor (`.env`) handling
//!
//! The descriptor is written once with fixed defaults and never touched
//! again, so operators can edit it freely after the first setup.

use crate::error::{DescriptorParseSnafu, IoSnafu, Result};
use serde::Serialize;
use snafu::{ResultExt, ensure};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Default keys in the order they are written.
pub const DEFAULTS: [(&str, &str); 8] = [
    ("LOG_LEVEL", "INFO"),
    ("LOG_FILE_ENABLED", "false"),
    ("DATA_DIR", "./data"),
    ("SERVER_HOST", "0.0.0.0"),
    ("SERVER_PORT", "8000"),
    ("SERVER_WORKERS", "1"),
    ("SERVER_STORAGE_TYPE", "local"),
    ("SERVER_STORAGE_URL", ""),
];

/// Ordered `KEY=VALUE` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvDescriptor {
    entries: Vec<(String, String)>,
}

impl EnvDescriptor {
    pub fn defaults() -> Self {
        Self {
            entries: DEFAULTS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Parse descriptor text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut entries: Vec<(String, String)> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                return DescriptorParseSnafu {
                    path,
                    line: idx + 1,
                }
                .fail();
            };
            let key = key.trim();
            ensure!(
                !key.is_empty(),
                DescriptorParseSnafu {
                    path,
                    line: idx + 1
                }
            );

            let value = unquote(value.trim()).to_string();
            entries.retain(|(k, _)| k != key);
            entries.push((key.to_string(), value));
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File body, one `KEY=VALUE` per line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorOutcome {
    Created,
    AlreadyExisted,
}

/// Write the default descriptor unless a file is already there.
pub fn ensure_descriptor(path: &Path) -> Result<DescriptorOutcome> {
    let body = EnvDescriptor::defaults().render();
    write_new(path, |file| file.write_all(body.as_bytes()))
}

/// Fill a temp file next to `path`, then move it into place without
/// replacing anything. A failed write never leaves a partial file behind.
fn write_new<F>(path: &Path, fill: F) -> Result<DescriptorOutcome>
where
    F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
{
    if path.is_dir() {
        return Err(io::Error::other("path exists but is a directory")).context(IoSnafu { path });
    }
    if path.exists() {
        tracing::info!(path = %path.display(), "descriptor already present, leaving it untouched");
        return Ok(DescriptorOutcome::AlreadyExisted);
    }

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    fs::create_dir_all(parent).context(IoSnafu { path: parent })?;

    let mut tmp = NamedTempFile::new_in(parent).context(IoSnafu { path: parent })?;
    fill(&mut tmp).context(IoSnafu { path })?;
    tmp.as_file().sync_all().context(IoSnafu { path })?;

    // noclobber keeps a file that appeared since the check above
    match tmp.persist_noclobber(path) {
        Ok(_) => {
            tracing::info!(path = %path.display(), "wrote default descriptor");
            Ok(DescriptorOutcome::Created)
        }
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            tracing::info!(path = %path.display(), "descriptor already present, leaving it untouched");
            Ok(DescriptorOutcome::AlreadyExisted)
        }
        Err(e) => Err(e.error).context(IoSnafu { path }),
    }
}

pub fn read_descriptor(path: &Path) -> Result<EnvDescriptor> {
    let text = fs::read_to_string(path).context(IoSnafu { path })?;
    EnvDescriptor::parse(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: &str = "LOG_LEVEL=INFO
LOG_FILE_ENABLED=false
DATA_DIR=./data
SERVER_HOST=0.0.0.0
SERVER_PORT=8000
SERVER_WORKERS=1
SERVER_STORAGE_TYPE=local
SERVER_STORAGE_URL=
";

    #[test]
    fn test_defaults_render_verbatim() {
        assert_eq!(EnvDescriptor::defaults().render(), EXPECTED);
    }

    #[test]
    fn test_ensure_creates_then_keeps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        assert_eq!(ensure_descriptor(&path).unwrap(), DescriptorOutcome::Created);
        let first = fs::read_to_string(&path).unwrap();
        assert_eq!(first, EXPECTED);

        assert_eq!(
            ensure_descriptor(&path).unwrap(),
            DescriptorOutcome::AlreadyExisted
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_ensure_never_overwrites_custom_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "SERVER_PORT=9999\n# mine\n").unwrap();

        assert_eq!(
            ensure_descriptor(&path).unwrap(),
            DescriptorOutcome::AlreadyExisted
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "SERVER_PORT=9999\n# mine\n");
    }

    #[test]
    fn test_ensure_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_descriptor(dir.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Io { .. }));
    }

    #[test]
    fn test_failed_write_leaves_no_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        let err = write_new(&path, |file| {
            file.write_all(b"LOG_LEVEL=IN")?;
            Err(io::Error::other("disk full"))
        })
        .unwrap_err();

        assert!(matches!(err, crate::Error::Io { .. }));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        assert_eq!(ensure_descriptor(&path).unwrap(), DescriptorOutcome::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), EXPECTED);
    }

    #[test]
    fn test_parse_shell_style_lines() {
        let text = "# comment\n\nexport SERVER_PORT=\"9000\"\nLOG_LEVEL='DEBUG'\nSERVER_STORAGE_URL=\nSERVER_PORT=9001\n";
        let desc = EnvDescriptor::parse(text, Path::new(".env")).unwrap();

        assert_eq!(desc.len(), 3);
        assert_eq!(desc.get("SERVER_PORT"), Some("9001"));
        assert_eq!(desc.get("LOG_LEVEL"), Some("DEBUG"));
        assert_eq!(desc.get("SERVER_STORAGE_URL"), Some(""));
        assert_eq!(desc.get("MISSING"), None);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = EnvDescriptor::parse("LOG_LEVEL=INFO\nnot a pair\n", Path::new(".env"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::DescriptorParse { line: 2, .. }));
    }

    #[test]
    fn test_defaults_parse_back() {
        let desc = EnvDescriptor::parse(EXPECTED, Path::new(".env")).unwrap();
        assert_eq!(desc, EnvDescriptor::defaults());
    }
}
