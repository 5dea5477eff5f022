use std::{process::exit, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use common::{error::FancyError, init::CloudInit};
use simplelog::info;
use tokio::sync::watch::{channel, Receiver};
use vbump::{
    args::Args,
    config::Config,
    metrics::BumpMetrics,
    network::{NetworkStack, Shared},
    storage::{FileStorage, Storage},
};

pub const AUTHORS: [&str; 1] = ["vbump contributors"];
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(error) = CloudInit::init_logging(args.debug, &Storage::latest_log_file()) {
        eprintln!("Failed to initialize logging: {:?}", error);
        exit(1);
    }
    CloudInit::print_ascii_art("vbump", VERSION, &AUTHORS);

    if let Err(error) = run(args).await {
        FancyError::print_fancy(&error, true);
        exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();
    info!("Starting vbump version {}...", VERSION);
    info!("Loading configuration...");

    let config = Config::parse(&args)?;
    config.check_data_directory()?;

    let mut signal = setup_handlers()?;
    let storage = FileStorage::new(config.data_directory());
    info!("Storing versions in {}", storage.base().display());

    let metrics = Arc::new(BumpMetrics::default());
    let shared = Arc::new(Shared::new(storage, metrics));
    let network = NetworkStack::start(&config, shared).await?;
    info!("Loaded vbump in {:.2?}", start_time.elapsed());

    signal.changed().await.ok();

    network.shutdown().await?;
    info!("Shutdown complete. Bye :)");
    Ok(())
}

fn setup_handlers() -> Result<Receiver<bool>> {
    let (sender, receiver) = channel(false);
    ctrlc::set_handler(move || {
        info!("Received termination signal, shutting down...");
        let _ = sender.send(true);
    })
    .context("Failed to set termination signal handler")?;
    Ok(receiver)
}
