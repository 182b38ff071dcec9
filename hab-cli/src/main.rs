//! HAB CLI - Command line tool for stream habitat trend reports.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "hab-cli",
    version,
    about = "Stream habitat survey trend toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: hab_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    hab_cmd::run(cli.command)
}
