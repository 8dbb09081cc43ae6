//! `envboot check`

use crate::bootstrap::report::DescriptorStatus;
use crate::bootstrap::{
    DoctorReport, RuntimeEnv, check_prerequisites, print_doctor_report, read_descriptor,
};
use crate::config::Project;
use crate::error::Result;
use crate::runner::{CommandRunner, SystemRunner};
use chrono::Utc;

/// Gather the doctor report for `project`.
pub fn inspect(project: &Project, runner: &dyn CommandRunner) -> DoctorReport {
    let prereq = check_prerequisites(runner, &project.config.bootstrap);
    let runtime = RuntimeEnv::new(&project.venv_dir);
    let descriptor = project.descriptor_path();

    let descriptor_status = if descriptor.is_file() {
        match read_descriptor(&descriptor) {
            Ok(parsed) => DescriptorStatus::Valid { keys: parsed.len() },
            Err(e) => DescriptorStatus::Invalid {
                error: e.to_string(),
            },
        }
    } else {
        DescriptorStatus::Missing
    };

    DoctorReport {
        timestamp: Utc::now().to_rfc3339(),
        root: project.root.clone(),
        prereq,
        venv_dir: runtime.dir().to_path_buf(),
        venv_exists: runtime.exists(),
        descriptor,
        descriptor_status,
    }
}

pub fn handle_check(project: &Project, json: bool) -> Result<i32> {
    let report = inspect(project, &SystemRunner);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("❌ failed to encode report: {e}");
                return Ok(1);
            }
        }
    } else {
        print_doctor_report(&report);
    }

    Ok(if report.is_healthy() { 0 } else { 1 })
}
