use std::path::PathBuf;

use clap::Parser;

/// Scale-up reconciler for a managed-streaming fleet's data-plane clusters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file that contains the fleet's providers, regions, instance
    /// type catalog, and reconcile settings.
    #[arg(short, long)]
    pub config_file: PathBuf,

    /// Evaluate every tick and log the decisions, but never persist a
    /// cluster-registration intent.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
