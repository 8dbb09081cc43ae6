//! Android API level resolution
//!
//! Native wheels built under Termux (maturin, cffi) need `ANDROID_API_LEVEL`.
//! Sources, in order: caller override, `getprop`, fixed fallback.

use crate::error::{InvalidApiLevelSnafu, Result};
use crate::runner::{CommandRunner, CommandSpec};
use serde::Serialize;
use std::fmt;

pub const SDK_PROPERTY: &str = "ro.build.version.sdk";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiLevelSource {
    Override,
    SystemProperty,
    Fallback,
}

impl fmt::Display for ApiLevelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApiLevelSource::Override => "ANDROID_API_LEVEL",
            ApiLevelSource::SystemProperty => SDK_PROPERTY,
            ApiLevelSource::Fallback => "fallback",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiLevel {
    pub level: u32,
    pub source: ApiLevelSource,
}

impl ApiLevel {
    /// Resolve the API level. The property is only queried when `override_value`
    /// is unset or empty; any other override is used verbatim.
    pub fn resolve(
        override_value: Option<&str>,
        runner: &dyn CommandRunner,
        fallback: u32,
    ) -> Result<Self> {
        if let Some(value) = override_value.filter(|v| !v.is_empty()) {
            let level = parse_level(value).ok_or_else(|| {
                InvalidApiLevelSnafu {
                    value: value.to_string(),
                }
                .build()
            })?;
            return Ok(Self {
                level,
                source: ApiLevelSource::Override,
            });
        }

        let queried = runner.read(&CommandSpec::new("getprop").arg(SDK_PROPERTY));
        match queried.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => match parse_level(value) {
                Some(level) => Ok(Self {
                    level,
                    source: ApiLevelSource::SystemProperty,
                }),
                None => {
                    tracing::warn!(value, "unexpected {SDK_PROPERTY} value, using fallback");
                    Ok(Self::fallback(fallback))
                }
            },
            None => Ok(Self::fallback(fallback)),
        }
    }

    fn fallback(level: u32) -> Self {
        Self {
            level,
            source: ApiLevelSource::Fallback,
        }
    }
}

fn parse_level(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|level| *level > 0)
}
