//! Error type shared by the bootstrapper, launcher and doctor.
//!
//! Every variant maps to a process exit code through [`Error::exit_code`], so
//! the binaries can stay thin and fail fast like the scripts they replace.

use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "required package manager `{name}` was not found on PATH\n\
         envboot only runs on a Termux host; install Termux from F-Droid and retry"
    ))]
    PackageManagerMissing { name: String },

    #[snafu(display(
        "runtime environment not found at {}\nRun `envboot setup` first",
        path.display()
    ))]
    RuntimeEnvMissing { path: PathBuf },

    #[snafu(display("command failed ({}): {command}", describe_code(*code)))]
    CommandFailed { command: String, code: Option<i32> },

    #[snafu(display("failed to execute {command}: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("{}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[snafu(display("{}:{line}: expected KEY=VALUE", path.display()))]
    DescriptorParse { path: PathBuf, line: usize },

    #[snafu(display("ANDROID_API_LEVEL must be a positive integer, got `{value}`"))]
    InvalidApiLevel { value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Exit status the binaries report for this error.
    ///
    /// A failed subprocess hands its own code through; a program that could
    /// not be found reports 127 like a shell would.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandFailed { code: Some(code), .. } => *code,
            Error::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound => 127,
            _ => 1,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
