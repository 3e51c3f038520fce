//! Config subcommand handlers.

use wifiscope_config::{Config, save_config_to};

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

pub fn handle(args: ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&ctx.config_path.display().to_string(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let text = toml::to_string_pretty(&ctx.config)?;
            let out = output::render_single(
                ctx.output,
                &ctx.config,
                |_| text.trim_end().to_owned(),
                |_| ctx.config_path.display().to_string(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = &ctx.config_path;
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            save_config_to(&Config::default(), path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            output::print_output(&format!("Wrote {}", path.display()), ctx.quiet);
            Ok(())
        }
    }
}
