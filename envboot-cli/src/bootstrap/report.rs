//! Bootstrap and doctor reports
//!
//! Printed for operators after `setup` and `check`; `check --json` emits the
//! same data through serde.

use crate::bootstrap::api_level::ApiLevel;
use crate::bootstrap::descriptor::DescriptorOutcome;
use crate::bootstrap::prereq::PrereqResult;
use serde::Serialize;
use std::path::PathBuf;

/// What a completed bootstrap did.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub timestamp: String,
    pub package_manager: PathBuf,
    pub packages: Vec<String>,
    pub venv_dir: PathBuf,
    pub venv_reused: bool,
    pub api_level: ApiLevel,
    pub manifest: PathBuf,
    pub descriptor: PathBuf,
    pub descriptor_outcome: DescriptorOutcome,
}

/// State of an installation, as seen by `envboot check`.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub timestamp: String,
    pub root: PathBuf,
    pub prereq: PrereqResult,
    pub venv_dir: PathBuf,
    pub venv_exists: bool,
    pub descriptor: PathBuf,
    pub descriptor_status: DescriptorStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DescriptorStatus {
    Missing,
    Valid { keys: usize },
    Invalid { error: String },
}

impl DoctorReport {
    pub fn is_healthy(&self) -> bool {
        self.prereq.all_required_met
    }
}

pub fn print_bootstrap_report(report: &BootstrapReport) {
    println!("🥾 envboot Setup Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Generated: {}", report.timestamp);
    println!();
    println!("📦 Packages: {}", report.packages.join(", "));
    println!("   via {}", report.package_manager.display());

    let venv_state = if report.venv_reused {
        "reused"
    } else {
        "created"
    };
    println!("🐍 Runtime env: {} ({venv_state})", report.venv_dir.display());
    println!(
        "📱 ANDROID_API_LEVEL={} (from {})",
        report.api_level.level, report.api_level.source
    );
    println!("📄 Dependencies: {}", report.manifest.display());

    match report.descriptor_outcome {
        DescriptorOutcome::Created => {
            println!("  ✨ Created: {}", report.descriptor.display());
        }
        DescriptorOutcome::AlreadyExisted => {
            println!("  ✅ Exists:  {} (left untouched)", report.descriptor.display());
        }
    }
}

pub fn print_doctor_report(report: &DoctorReport) {
    println!("🥾 envboot Check Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Generated: {}", report.timestamp);
    println!("Root:      {}", report.root.display());
    println!();

    match &report.prereq.package_manager {
        Some(path) => println!("✅ Package manager: {}", path.display()),
        None => println!("❌ Package manager not found (Termux required)"),
    }

    // Required binaries
    println!();
    println!("📦 Required Binaries:");
    for bin in &report.prereq.required {
        let status = if bin.found && bin.meets_requirement {
            "✅"
        } else if bin.found {
            "⚠️"
        } else {
            "❌"
        };

        print!("  {} {} ", status, bin.name);

        if let Some(ref installed) = bin.installed_version {
            if bin.meets_requirement {
                println!("(installed: {installed}, OK)");
            } else {
                println!("(installed: {installed}, requires: {}) ⚠️", bin.required_version);
            }
        } else if let Some(ref hint) = bin.install_hint {
            println!("(not installed) - {hint}");
        } else {
            println!("(not installed) - requires: {}", bin.required_version);
        }
    }

    if !report.prereq.optional.is_empty() {
        println!();
        println!("🔧 Optional Binaries:");
        for bin in &report.prereq.optional {
            let status = if bin.found && bin.meets_requirement {
                "✅"
            } else {
                "  "
            };
            print!("  {} {} ", status, bin.name);

            match (&bin.installed_version, &bin.install_hint) {
                (Some(installed), _) => println!("({installed})"),
                (None, Some(hint)) => println!("- {hint}"),
                (None, None) => println!("(not installed)"),
            }
        }
    }

    println!();
    if report.venv_exists {
        println!("🐍 Runtime env: {}", report.venv_dir.display());
    } else {
        println!(
            "❌ Runtime env missing: {} (run `envboot setup`)",
            report.venv_dir.display()
        );
    }

    match &report.descriptor_status {
        DescriptorStatus::Missing => {
            println!("📄 Descriptor missing: {}", report.descriptor.display());
        }
        DescriptorStatus::Valid { keys } => {
            println!("📄 Descriptor: {} ({keys} keys)", report.descriptor.display());
        }
        DescriptorStatus::Invalid { error } => {
            println!("⚠️  Descriptor unreadable: {error}");
        }
    }

    println!();
    if report.is_healthy() {
        println!("✅ All required prerequisites met!");
    } else {
        println!("⚠️  Some required prerequisites are missing");
    }
}
