use std::sync::Arc;

use clap::Parser;
use fleet_scaleup_core::config::{self, Config};
use fleet_scaleup_persistence::{in_memory::InMemoryClusterRepository, ClusterRepositoryImplementation};
use main_error::MainError;
use scaleup::manager::ScaleUpManager;
use snafu::{ResultExt, Snafu};

use crate::args::Args;

mod args;
mod scaleup;
mod tracing;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to set up tracing"))]
    SetUpTracing { source: tracing::Error },

    #[snafu(display("Failed to read configuration"))]
    ReadConfig { source: config::Error },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let args = Args::parse();

    tracing::init().context(SetUpTracingSnafu)?;

    let config = Config::read_from_file(&args.config_file).context(ReadConfigSnafu)?;

    let repository: Arc<ClusterRepositoryImplementation> =
        Arc::new(InMemoryClusterRepository::new().into());

    let manager = Arc::new(ScaleUpManager::new(&config, repository, args.dry_run));
    Arc::clone(&manager).start().await;

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for the shutdown signal");

    manager.stop().await;

    Ok(())
}
