//! Bootstrap module for envboot
//!
//! Everything `envboot setup` and `envboot check` need:
//! - Package manager check and toolchain version checks
//! - System package and pip installation
//! - Runtime environment (venv) creation and activation
//! - Android API level resolution
//! - Environment descriptor (`.env`) creation
//! - Operator-facing reports

pub mod api_level;
pub mod descriptor;
pub mod installer;
pub mod prereq;
pub mod report;
pub mod setup;
pub mod venv;

pub use api_level::{ApiLevel, ApiLevelSource};
pub use descriptor::{DescriptorOutcome, EnvDescriptor, ensure_descriptor, read_descriptor};
pub use prereq::check_prerequisites;
pub use report::{BootstrapReport, DoctorReport, print_bootstrap_report, print_doctor_report};
pub use setup::run_setup;
pub use venv::{Activation, RuntimeEnv};
