use std::sync::Arc;

use fleet_scaleup_core::config::{Config, DataplaneClusterConfig, KafkaInstanceTypesConfig, ProvidersConfig};
use fleet_scaleup_persistence::{ClusterRepository, ClusterRepositoryImplementation};
use snafu::ResultExt;
use tokio::{sync::Mutex, task::JoinHandle, time};
use tracing::{error, info, instrument};

use super::{
    processor::{ScaleUpProcessor, ScaleUpProcessorImplementation, StandardProcessor},
    bootstrap::RegionBootstrapper, EvaluateSnafu, ExecuteSnafu, Error,
};

/// Periodically reconciles the fleet's data-plane cluster count against its
/// configured providers, regions, and instance types.
///
/// Every tick first bootstraps any (provider, region) pair with no usable
/// cluster at all, then — if the triple-level engine is enabled — loads the
/// cluster streaming unit consumption once and sweeps every configured
/// (provider, region, instance-type) triple against it. A failure in one
/// triple's evaluation or execution is logged and collected, and does not
/// stop the sweep over the remaining triples; every error observed during
/// the tick is returned to the caller from [`ScaleUpManager::reconcile`].
pub struct ScaleUpManager {
    dataplane_cluster: DataplaneClusterConfig,
    providers: ProvidersConfig,
    catalog: Arc<KafkaInstanceTypesConfig>,
    repository: Arc<ClusterRepositoryImplementation>,
    dry_run: bool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ScaleUpManager {
    pub fn new(config: &Config, repository: Arc<ClusterRepositoryImplementation>, dry_run: bool) -> Self {
        Self {
            dataplane_cluster: config.dataplane_cluster.clone(),
            providers: config.providers.clone(),
            catalog: Arc::new(config.kafka_instance_types.clone()),
            repository,
            dry_run,
            handle: Mutex::new(None),
        }
    }

    /// Spawns the periodic reconcile loop. The first tick fires immediately
    /// after the first interval elapses, not on subscription.
    pub async fn start(self: Arc<Self>) {
        let mut interval = time::interval(self.dataplane_cluster.reconcile_interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        let me = Arc::clone(&self);
        let handle = tokio::spawn(async move {
            loop {
                interval.tick().await;

                let errors = me.reconcile().await;
                if !errors.is_empty() {
                    error!(?errors, "Scale-up reconcile tick reported errors");
                }
            }
        });

        *self.handle.lock().await = Some(handle);
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.handle.lock().await.take() {
            handle.abort();
        }
    }

    /// Runs one reconcile tick and returns every [`Error`] observed along the
    /// way — an empty `Vec` means the tick succeeded outright. Mirrors the Go
    /// source's `Reconcile() []error`: one failing triple (or one failed
    /// region bootstrap) is logged and collected, never aborting the sweep
    /// over the rest, and the accumulated errors are handed back to the
    /// caller rather than only logged and discarded.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Vec<Error> {
        info!("running dynamic scale up reconcile event");

        let mut errors = Vec::new();

        if !self.dataplane_cluster.is_data_plane_auto_scaling_enabled() {
            info!("Data plane auto scaling is disabled, skipping tick");
            info!("dynamic scale up reconcile event finished");
            return errors;
        }

        if let Err(bootstrap_errors) =
            RegionBootstrapper::new(&self.providers, Arc::clone(&self.repository), self.dry_run)
                .bootstrap()
                .await
        {
            for source in bootstrap_errors {
                error!(?source, "Failed to bootstrap a region");
                errors.push(source.into());
            }
        }

        if !self
            .dataplane_cluster
            .is_new_dynamic_scale_up_processor_enabled()
        {
            info!("dynamic scale up reconcile event finished");
            return errors;
        }

        let consumption = match self
            .repository
            .find_streaming_unit_count_by_cluster_and_instance_type()
            .await
        {
            Ok(rows) => Arc::new(rows),
            Err(source) => {
                errors.push(source.into());
                info!("dynamic scale up reconcile event finished");
                return errors;
            }
        };

        for (locator, instance_type_config) in self.providers.triples() {
            let processor: ScaleUpProcessorImplementation = StandardProcessor::new(
                locator.clone(),
                instance_type_config,
                Arc::clone(&consumption),
                Arc::clone(&self.catalog),
                Arc::clone(&self.repository),
                self.dry_run,
            )
            .into();

            match processor.should_scale_up().context(EvaluateSnafu { locator: locator.clone() }) {
                Ok(true) => {
                    if let Err(error) = processor
                        .scale_up()
                        .await
                        .context(ExecuteSnafu { locator: locator.clone() })
                    {
                        error!(?error, %locator, "Failed to execute a scale-up");
                        errors.push(error);
                    }
                }
                Ok(false) => {}
                Err(error) => {
                    error!(?error, %locator, "Failed to evaluate whether a scale-up is needed");
                    errors.push(error);
                }
            }
        }

        info!("dynamic scale up reconcile event finished");
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_scaleup_core::config::{
        DataplaneClusterConfig, InstanceTypeConfig, KafkaInstanceSize, KafkaInstanceTypeCatalogEntry,
        ProviderConfig, ProvidersConfig, RegionConfig,
    };
    use fleet_scaleup_persistence::in_memory::InMemoryClusterRepository;
    use serde_yaml::from_str;
    use std::collections::HashMap;
    use std::time::Duration;

    fn dataplane_cluster_config(auto_scaling: bool, new_processor: bool) -> DataplaneClusterConfig {
        let yaml = format!(
            "isDataPlaneAutoScalingEnabled: {auto_scaling}\nisNewDynamicScaleUpProcessorEnabled: {new_processor}\nreconcileInterval: \"50ms\"\n"
        );
        from_str(&yaml).unwrap()
    }

    fn one_triple_providers() -> ProvidersConfig {
        let mut instance_types = HashMap::new();
        instance_types.insert(
            "standard".to_string(),
            InstanceTypeConfig {
                limit: Some(100),
                min_available_capacity_slack_streaming_units: 10,
            },
        );
        let mut regions = HashMap::new();
        regions.insert(
            "us-east-1".to_string(),
            RegionConfig {
                supported_instance_types: instance_types,
            },
        );
        let mut providers = HashMap::new();
        providers.insert("aws".to_string(), ProviderConfig { regions });
        ProvidersConfig { providers }
    }

    fn catalog() -> KafkaInstanceTypesConfig {
        let mut configuration = HashMap::new();
        configuration.insert(
            "standard".to_string(),
            KafkaInstanceTypeCatalogEntry {
                sizes: vec![KafkaInstanceSize {
                    id: "x1".to_string(),
                    capacity_consumed: 5,
                }],
            },
        );
        KafkaInstanceTypesConfig { configuration }
    }

    fn config(auto_scaling: bool, new_processor: bool) -> Config {
        Config {
            dataplane_cluster: dataplane_cluster_config(auto_scaling, new_processor),
            providers: one_triple_providers(),
            kafka_instance_types: catalog(),
        }
    }

    #[tokio::test]
    async fn disabled_auto_scaling_skips_the_tick_entirely() {
        let repository = Arc::new(ClusterRepositoryImplementation::InMemory(
            InMemoryClusterRepository::new(),
        ));
        let manager = ScaleUpManager::new(&config(false, true), Arc::clone(&repository), false);

        assert!(manager.reconcile().await.is_empty());

        let ClusterRepositoryImplementation::InMemory(in_memory) = repository.as_ref();
        assert_eq!(in_memory.len().await, 0);
    }

    #[tokio::test]
    async fn a_cold_region_is_bootstrapped_then_scaled_up_on_the_next_tick() {
        let repository = Arc::new(ClusterRepositoryImplementation::InMemory(
            InMemoryClusterRepository::new(),
        ));
        let manager = ScaleUpManager::new(&config(true, true), Arc::clone(&repository), false);

        assert!(manager.reconcile().await.is_empty());
        let ClusterRepositoryImplementation::InMemory(in_memory) = repository.as_ref();
        assert_eq!(in_memory.len().await, 1, "bootstrap intent registered");

        assert!(manager.reconcile().await.is_empty());
        assert_eq!(
            in_memory.len().await,
            2,
            "triple sweep scales up since the bootstrapped cluster contributes no streaming-unit capacity yet"
        );
    }

    #[tokio::test]
    async fn legacy_processor_disabled_skips_the_triple_sweep() {
        let repository = Arc::new(ClusterRepositoryImplementation::InMemory(
            InMemoryClusterRepository::new(),
        ));
        let manager = ScaleUpManager::new(&config(true, false), Arc::clone(&repository), false);

        assert!(manager.reconcile().await.is_empty());
        let ClusterRepositoryImplementation::InMemory(in_memory) = repository.as_ref();
        assert_eq!(in_memory.len().await, 1, "only the bootstrap intent is registered");
    }

    #[tokio::test]
    async fn a_triple_missing_from_the_catalog_is_collected_and_returned() {
        let repository = Arc::new(ClusterRepositoryImplementation::InMemory(
            InMemoryClusterRepository::new(),
        ));
        let mut config = config(true, true);
        config.kafka_instance_types = KafkaInstanceTypesConfig {
            configuration: HashMap::new(),
        };
        let manager = ScaleUpManager::new(&config, Arc::clone(&repository), false);

        let errors = manager.reconcile().await;

        assert_eq!(errors.len(), 1, "the triple's evaluate failure is reported, not swallowed");
        assert!(matches!(errors[0], Error::Evaluate { .. }));
    }

    #[tokio::test]
    async fn start_and_stop_do_not_panic() {
        let repository = Arc::new(ClusterRepositoryImplementation::InMemory(
            InMemoryClusterRepository::new(),
        ));
        let manager = Arc::new(ScaleUpManager::new(&config(true, true), repository, false));

        Arc::clone(&manager).start().await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        manager.stop().await;
    }
}
