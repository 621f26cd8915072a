//! CallCoach CLI entry point.
//!
//! Binary name: `callcoach`
//!
//! Parses CLI arguments, initializes storage and services, then dispatches to
//! the command handler.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use callcoach_types::error::CoachError;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = log_filter(cli.verbose, cli.quiet);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    if let Err(err) = run(cli).await {
        report_error(&err, json);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;

    match cli.command {
        Commands::Coach { call_id, model } => {
            cli::coach::coach_call(&state, &call_id, model.as_deref(), cli.json, cli.quiet).await?;
        }
        Commands::History { call_id } => {
            cli::coach::show_history(&state, &call_id, cli.json).await?;
        }
        Commands::Import { file } => {
            cli::call::import_call(&state, &file, cli.json).await?;
        }
        Commands::Calls => {
            cli::call::list_calls(&state, cli.json).await?;
        }
        Commands::Call { call_id } => {
            cli::call::show_call(&state, &call_id, cli.json).await?;
        }
        Commands::Reps => {
            cli::rep::list_reps(&state, cli.json).await?;
        }
        Commands::Rep { rep_id } => {
            cli::rep::show_rep(&state, &rep_id, cli.json).await?;
        }
        Commands::Models => {
            cli::model::list_models(&state.config.default_model, cli.json)?;
        }
    }

    Ok(())
}

/// Map an error to the machine-readable kind reported in `--json` mode.
fn error_kind(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<CoachError>()
        .map(CoachError::kind)
        .unwrap_or("internal")
}

fn report_error(err: &anyhow::Error, json: bool) {
    if json {
        let body = serde_json::json!({
            "error": err.to_string(),
            "kind": error_kind(err),
        });
        println!("{body}");
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
}

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info",
        _ => "trace",
    }
}
