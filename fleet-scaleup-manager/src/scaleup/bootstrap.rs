use std::sync::Arc;

use fleet_scaleup_core::{cluster::ClusterRegistrationIntent, config::ProvidersConfig};
use fleet_scaleup_persistence::{ClusterRepository, ClusterRepositoryImplementation, ClusterValidityFilter};
use snafu::{ResultExt, Snafu};
use tracing::info;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to list existing clusters grouped by provider and region"))]
    ListExistingClusters { source: fleet_scaleup_persistence::Error },

    #[snafu(display("Failed to register a bootstrap intent for {provider}/{region}"))]
    RegisterClusterJob {
        source: fleet_scaleup_persistence::Error,
        provider: String,
        region: String,
    },
}

/// Ensures every configured (provider, region) pair has at least one usable
/// cluster, independent of any specific instance type's consumption.
///
/// Runs ahead of the fine-grained, per-instance-type sweep every tick: a
/// region with zero clusters has no consumption listing to evaluate at all,
/// so it needs a first cluster before the triple-level evaluator has
/// anything to reason about.
pub struct RegionBootstrapper<'a> {
    providers: &'a ProvidersConfig,
    repository: Arc<ClusterRepositoryImplementation>,
    dry_run: bool,
}

impl<'a> RegionBootstrapper<'a> {
    pub fn new(
        providers: &'a ProvidersConfig,
        repository: Arc<ClusterRepositoryImplementation>,
        dry_run: bool,
    ) -> Self {
        Self {
            providers,
            repository,
            dry_run,
        }
    }

    /// Enqueues a bootstrap intent for every configured (provider, region)
    /// pair that has no existing valid cluster. Attempts are made in an
    /// unspecified order; on the first failed registration, no further
    /// pairs are attempted, but previously enqueued intents are not rolled
    /// back. Errors encountered are returned, not just the first.
    pub async fn bootstrap(&self) -> Result<(), Vec<Error>> {
        let provider_names: Vec<String> = self.providers.provider_names().cloned().collect();
        let pairs: Vec<(String, String)> = self
            .providers
            .provider_region_pairs()
            .map(|(provider, region)| (provider.clone(), region.clone()))
            .collect();
        let region_names: Vec<String> = pairs.iter().map(|(_, region)| region.clone()).collect();

        let existing = self
            .repository
            .list_group_by_provider_and_region(&provider_names, &region_names, ClusterValidityFilter::Valid)
            .await
            .context(ListExistingClustersSnafu)
            .map_err(|err| vec![err])?;

        let mut errors = Vec::new();

        for (provider, region) in pairs {
            if existing.contains(&(provider.clone(), region.clone())) {
                continue;
            }

            if self.dry_run {
                continue;
            }

            let intent = ClusterRegistrationIntent::bootstrap(provider.clone(), region.clone());
            match self.repository.register_cluster_job(intent).await {
                Ok(id) => {
                    info!(provider, region, id = %id, "Bootstrapped cluster for an empty region");
                }
                Err(source) => {
                    errors.push(Error::RegisterClusterJob {
                        source,
                        provider,
                        region,
                    });
                    break;
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
