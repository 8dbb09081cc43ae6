//! `envboot setup`

use crate::bootstrap::{print_bootstrap_report, run_setup};
use crate::config::{EnvSnapshot, Project};
use crate::error::Result;
use crate::runner::SystemRunner;

pub fn handle_setup(project: &Project) -> Result<i32> {
    println!("🥾 envboot setup");
    println!();

    let report = run_setup(project, &SystemRunner, &EnvSnapshot::from_process())?;

    println!();
    print_bootstrap_report(&report);
    println!();
    println!("✅ Setup complete! Start the app with `envboot start`");
    Ok(0)
}
