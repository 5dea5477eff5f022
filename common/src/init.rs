use std::{
    fs::{self, File},
    path::Path,
};

use anyhow::{Context, Result};
use colored::Colorize;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode,
    WriteLogger,
};

pub struct CloudInit;

impl CloudInit {
    pub fn init_logging(debug: bool, log_file: &Path) -> Result<()> {
        if let Some(parent) = log_file.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create logs directory {}", parent.display())
                })?;
            }
        }

        let file = File::create(log_file)
            .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
        Self::init_logging_with_writeable(debug, file)
    }

    pub fn init_logging_with_writeable(debug: bool, log_file: File) -> Result<()> {
        let level = if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        let mut config = ConfigBuilder::new();
        if debug {
            config.set_location_level(LevelFilter::Error);
        }
        let config = config.build();

        CombinedLogger::init(vec![
            TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            ),
            WriteLogger::new(level, config, log_file),
        ])
        .context("Failed to init logging crate")
    }

    pub fn print_ascii_art(application: &str, version: &str, authors: &[&str]) {
        println!("{}", r"       _".blue());
        println!("{}", r"__   _| |__  _   _ _ __ ___  _ __".blue());
        println!("{}", r"\ \ / / '_ \| | | | '_ ` _ \| '_ \".blue());
        println!("{}", r" \ V /| |_) | |_| | | | | | | |_) |".cyan());
        println!("{}", r"  \_/ |_.__/ \__,_|_| |_| |_| .__/".cyan());
        println!("{}", r"                            |_|".cyan());
        println!();
        println!(
            "«{}» {} | {} by {}",
            "*".blue(),
            application.blue(),
            format!("v{}", version).blue(),
            authors.join(", ").blue()
        );
        println!();
    }
}
