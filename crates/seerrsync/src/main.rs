mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use seerrsync_core::RunMode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    // First interrupt requests a graceful stop between pipeline
    // stages; a second one aborts the process the usual way.
    let cancel = CancellationToken::new();
    let ctrl_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current stage");
            ctrl_cancel.cancel();
        }
    });

    if let Err(err) = run(cli, cancel).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    match cli.command {
        Command::Plan => commands::reconcile::handle(RunMode::Plan, &cli.global, cancel).await,
        Command::Apply => commands::reconcile::handle(RunMode::Apply, &cli.global, cancel).await,
        Command::DumpConfig(args) => commands::dump::handle(&args, &cli.global).await,
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "seerrsync", &mut std::io::stdout());
            Ok(())
        }
    }
}
