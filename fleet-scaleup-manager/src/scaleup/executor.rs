use std::sync::Arc;

use fleet_scaleup_core::{cluster::ClusterRegistrationIntent, locator::InstanceTypeLocator};
use fleet_scaleup_persistence::ClusterRepositoryImplementation;
use snafu::{ResultExt, Snafu};
use tracing::info;

use fleet_scaleup_persistence::ClusterRepository;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to register a cluster scale-up intent for {locator}"))]
    RegisterClusterJob {
        source: fleet_scaleup_persistence::Error,
        locator: InstanceTypeLocator,
    },
}

/// Enqueues one cluster-registration intent for a triple that the evaluator
/// decided needs a new data-plane cluster.
///
/// `multi_az` is derived from the instance type: `standard`-tier instances
/// require multi-AZ placement, `developer`-tier do not (see
/// [`ClusterRegistrationIntent::scale_up`]).
pub struct ScaleUpExecutor<'a> {
    locator: &'a InstanceTypeLocator,
    repository: Arc<ClusterRepositoryImplementation>,
    /// When set, `scale_up` is a no-op that reports success without ever
    /// calling the repository. Part of the construction record, not a
    /// separate executor type.
    dry_run: bool,
}

impl<'a> ScaleUpExecutor<'a> {
    pub fn new(
        locator: &'a InstanceTypeLocator,
        repository: Arc<ClusterRepositoryImplementation>,
        dry_run: bool,
    ) -> Self {
        Self {
            locator,
            repository,
            dry_run,
        }
    }

    /// Fire-and-forget from the caller's perspective: success means "intent
    /// persisted", not "cluster running".
    pub async fn scale_up(&self) -> Result<(), Error> {
        if self.dry_run {
            return Ok(());
        }

        let intent = ClusterRegistrationIntent::scale_up(self.locator);
        let id = self
            .repository
            .register_cluster_job(intent)
            .await
            .context(RegisterClusterJobSnafu {
                locator: self.locator.clone(),
            })?;

        info!(
            provider = self.locator.provider,
            region = self.locator.region,
            id = %id,
            "Auto-created cluster scale-up request"
        );

        Ok(())
    }
}
