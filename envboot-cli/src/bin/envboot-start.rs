//! Flag-free launch entry point.
//!
//! Equivalent to `envboot start -- <args>`: every argument is handed to the
//! entry point untouched.

use envboot_cli::commands::{Commands, GlobalArgs, run_and_exit};

fn main() {
    envboot_cli::init_logging();
    let args = std::env::args_os().skip(1).collect();
    run_and_exit(&GlobalArgs::from_env(), Commands::Start { args })
}
