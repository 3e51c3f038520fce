mod cli;
mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use wifiscope_config::{Config, ConfigError};

use crate::cli::{Cli, Command, ConfigCommand, GlobalOpts};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(wifiscope_config::config_path);
    let loaded = wifiscope_config::load_config_from(&config_path);

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_tracing(&cli.global, loaded.as_ref().ok());

    if let Err(err) = run(cli, loaded, config_path).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(global: &GlobalOpts, config: Option<&Config>) -> Option<WorkerGuard> {
    let level = match global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let file = global
        .log_to_file
        .then(|| config.and_then(|cfg| cfg.log_file().map(|path| (path, cfg.log.level.clone()))))
        .flatten();

    let Some((path, file_level)) = file else {
        tracing_subscriber::registry().with(stderr_layer).init();
        return None;
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    let name = path
        .file_name()
        .map_or_else(|| "wifiscope.log".into(), ToOwned::to_owned);
    let appender = tracing_appender::rolling::never(dir, name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_filter(EnvFilter::new(file_level)),
        )
        .init();

    Some(guard)
}

async fn run(
    cli: Cli,
    loaded: Result<Config, ConfigError>,
    config_path: PathBuf,
) -> Result<(), CliError> {
    match cli.command {
        // A malformed file must not block `config init --force` or `config path`
        Command::Config(args) => {
            let config = if matches!(args.command, ConfigCommand::Show) {
                loaded?
            } else {
                loaded.unwrap_or_default()
            };
            let ctx = Context::new(&cli.global, config, config_path);
            commands::config_cmd::handle(args, &ctx)
        }

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wifiscope", &mut std::io::stdout());
            Ok(())
        }

        Command::Replay(args) => {
            let ctx = Context::new(&cli.global, loaded?, config_path);
            tracing::debug!(log = %args.log.display(), "dispatching replay");
            commands::replay::handle(args, &ctx).await
        }
    }
}
