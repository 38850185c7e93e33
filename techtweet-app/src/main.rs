use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use techtweet_common::TriggerMode;
use techtweet_common::observability::init_logging;
use techtweet_config::{TechtweetConfig, TechtweetConfigLoader, discover_config_file};
use techtweet_pipeline::clock_day_now;

mod scheduler;
mod server;
#[cfg(test)]
mod testing;
mod wiring;

/// Posts one AI-written technology tweet per day.
#[derive(Debug, Parser)]
#[command(name = "techtweet", version, about)]
struct Cli {
    /// YAML config file. Defaults to ./techtweet.yaml or the user config dir.
    #[arg(short, long, env = "TECHTWEET_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Post on the configured cron schedule until the challenge is complete.
    Schedule,
    /// Serve `GET|POST /api/tweet` and `GET /health`.
    Serve {
        /// Overrides `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run the pipeline once and print the outcome as JSON.
    RunOnce {
        /// Day number to use instead of the clock day.
        #[arg(long)]
        day: Option<u32>,
    },
    /// Print the merged configuration with secrets redacted.
    PrintConfig,
}

fn load_config(path: Option<PathBuf>) -> Result<TechtweetConfig> {
    let loader = TechtweetConfigLoader::new().with_defaults();
    let loader = match path.or_else(discover_config_file) {
        Some(p) => loader.with_file(p),
        None => loader,
    };
    loader.load().context("loading configuration")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg = load_config(cli.config)?;

    if let Command::PrintConfig = cli.command {
        print!("{}", cfg.to_redacted_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    // 2) Logging
    let log_path = init_logging(wiring::log_config(&cfg.logging))?;
    tracing::debug!(path = %log_path.display(), "logging.ready");

    // 3) Clients + pipeline
    let pipeline = wiring::build_pipeline(&cfg)?;

    match cli.command {
        Command::Schedule => scheduler::run_schedule(pipeline, &cfg.schedule).await,
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
            server::serve(pipeline, &bind).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::RunOnce { day } => {
            let day = day.unwrap_or_else(|| clock_day_now(cfg.pipeline.cycle_days));
            let outcome = pipeline.run_to_outcome(day, TriggerMode::Manual).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::PrintConfig => Ok(ExitCode::SUCCESS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_once_with_day() {
        let cli = Cli::try_parse_from(["techtweet", "--config", "x.yaml", "run-once", "--day", "4"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.yaml")));
        assert!(matches!(cli.command, Command::RunOnce { day: Some(4) }));
    }

    #[test]
    fn serve_bind_override_is_optional() {
        let cli = Cli::try_parse_from(["techtweet", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { bind: None }));
    }
}
