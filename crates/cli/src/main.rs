use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use cli::Cli;
use config::{Config, APP_PREFIX};
use simplelog::{LevelFilter, WriteLogger};
use std::fs::File;
use xdg::BaseDirectories;

mod app;
mod cli;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let log_path = BaseDirectories::with_prefix(APP_PREFIX)?.place_cache_file("course-catalog.log")?;
    WriteLogger::init(
        match args.verbose {
            true => LevelFilter::Debug,
            false => LevelFilter::Info,
        },
        simplelog::Config::default(),
        File::create(log_path).context("error creating log file")?,
    )?;

    let mut config = Config::load()?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    App::new(config)?.run(args.command).await
}
