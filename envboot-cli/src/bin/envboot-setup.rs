//! Flag-free setup entry point.
//!
//! Equivalent to `envboot setup`; honours `ENVBOOT_ROOT` and `VENV_DIR`.

use envboot_cli::commands::{Commands, GlobalArgs, run_and_exit};

fn main() {
    envboot_cli::init_logging();
    run_and_exit(&GlobalArgs::from_env(), Commands::Setup)
}
