use anyhow::Result;
use clap::Parser;

use dotlink_cli::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let log = logging::Logger::new(args.verbose);

    match args.command {
        cli::Command::Link(opts) => commands::link::run(&args.global, &opts, &log),
        cli::Command::Unlink => commands::unlink::run(&args.global, &log),
        cli::Command::Status => commands::status::run(&args.global, &log),
        cli::Command::Rollback => commands::rollback::run(&args.global, &log),
        cli::Command::Backup { action } => commands::backup::run(&args.global, &action, &log),
        cli::Command::Version => {
            let version = option_env!("DOTLINK_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("dotlink {version}");
            Ok(())
        }
    }
}
