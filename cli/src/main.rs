//! `dao`: replay governance scenarios from the command line.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dao_cli::{DaoConfig, Runner, Script};
use dao_utils::{format_duration, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "dao", version, about = "Token-weighted DAO governance runner")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Overrides the config file; `RUST_LOG` overrides both.
    #[arg(long, global = true, env = "DAO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "DAO_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. Built-in defaults apply otherwise.
    #[arg(long, global = true, env = "DAO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Execute a scenario script.
    Run {
        /// Path to the script TOML.
        script: PathBuf,

        /// Print one JSON object per step, then a summary object.
        #[arg(long)]
        json: bool,

        /// Virtual start time in Unix seconds; overrides the config file.
        #[arg(long)]
        start_time: Option<u64>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DaoConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DaoConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Run {
            script,
            json,
            start_time,
        } => {
            if start_time.is_some() {
                config.start_time = start_time;
            }
            let steps = Script::from_toml_file(&script)
                .with_context(|| format!("loading script {}", script.display()))?;
            tracing::info!(
                script = %script.display(),
                steps = steps.steps.len(),
                quorum_percentage = config.governance.quorum_percentage,
                debating_period = %format_duration(config.governance.debating_period_secs),
                "running scenario"
            );
            let mut runner = Runner::from_config(&config).context("setting up governance")?;
            let stdout = std::io::stdout();
            let report = runner.run(&steps, &mut stdout.lock(), json)?;
            tracing::info!(steps = report.steps, failed = report.failed, "scenario complete");
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
