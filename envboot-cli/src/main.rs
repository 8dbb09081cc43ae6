use clap::Parser;
use envboot_cli::commands::{Cli, run_and_exit};

fn main() {
    envboot_cli::init_logging();
    let cli = Cli::parse();
    run_and_exit(&cli.global, cli.command)
}
