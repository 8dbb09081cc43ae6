//! `envboot start`

use crate::config::{EnvSnapshot, Project};
use crate::error::Result;
use crate::launcher::LaunchPlan;
use std::ffi::OsString;

pub fn handle_start(project: &Project, args: &[OsString]) -> Result<i32> {
    let plan = LaunchPlan::resolve(project, &EnvSnapshot::from_process(), args)?;
    tracing::info!(command = %plan.command(), "starting entry point");
    plan.exec()
}
