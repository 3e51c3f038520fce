//! Command handlers and the context they share.

pub mod config_cmd;
pub mod replay;

use std::path::PathBuf;

use clap::ValueEnum;
use wifiscope_config::Config;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::output;

/// Resolved global settings: CLI flags first, then the config file.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Context {
    pub fn new(global: &GlobalOpts, config: Config, config_path: PathBuf) -> Self {
        let output = global
            .output
            .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color_mode = global
            .color
            .or_else(|| ColorMode::from_str(&config.defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);
        Self {
            output,
            color: output::should_color(color_mode),
            quiet: global.quiet,
            config,
            config_path,
        }
    }
}
