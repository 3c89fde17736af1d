//! Command-line entry point.

use clap::Parser;
use layoutweb_app::{Cli, Command, export, inspect};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Export(args) => export(&args).map(|summary| {
            log::info!(
                "wrote {} file(s) to {}",
                summary.files.len(),
                args.out.display()
            );
        }),
        Command::Inspect { project } => inspect(&project).map(|report| print!("{report}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
