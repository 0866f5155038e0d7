use std::sync::Arc;

use enum_dispatch::enum_dispatch;
use fleet_scaleup_core::{
    cluster::ClusterStreamingUnitCount,
    config::{InstanceTypeConfig, KafkaInstanceTypesConfig},
    locator::InstanceTypeLocator,
};
use fleet_scaleup_persistence::ClusterRepositoryImplementation;
use snafu::Snafu;

use super::{evaluator::ScaleUpEvaluator, executor, executor::ScaleUpExecutor, summary};

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to calculate the consumption summary"), context(false))]
    Summary { source: summary::Error },

    #[snafu(display("Failed to execute the scale-up"), context(false))]
    Executor { source: executor::Error },
}

/// Binds the summary calculator, evaluator, and executor for a single
/// (provider, region, instance-type) triple. Single-use per tick: a fresh
/// processor is constructed for every triple on every reconcile.
///
/// Re-modeled from the upstream interface-based
/// `dynamicScaleUpProcessor`/`noopDynamicScaleUpProcessor` split as a tagged
/// variant, so the "no real scale-up happens" composition is a value rather
/// than a second trait object.
#[enum_dispatch(ScaleUpProcessorImplementation)]
#[trait_variant::make(SendScaleUpProcessor: Send)]
pub trait ScaleUpProcessor {
    /// Pure decision, no I/O: folds the shared consumption listing into a
    /// summary and runs it through the evaluator.
    fn should_scale_up(&self) -> Result<bool, Error>;

    /// Enqueues a cluster-registration intent. Only meaningful to call after
    /// `should_scale_up` returned `true`.
    async fn scale_up(&self) -> Result<(), Error>;
}

#[enum_dispatch]
pub enum ScaleUpProcessorImplementation {
    Standard(StandardProcessor),
    NoOp(NoOpProcessor),
}

/// The default processor, used for every triple while dynamic scaling is
/// enabled.
pub struct StandardProcessor {
    locator: InstanceTypeLocator,
    instance_type_config: InstanceTypeConfig,
    /// Shared for the whole tick: every triple's processor reads the same
    /// snapshot, taken once per tick (see the manager's reconcile loop).
    consumption: Arc<Vec<ClusterStreamingUnitCount>>,
    catalog: Arc<KafkaInstanceTypesConfig>,
    repository: Arc<ClusterRepositoryImplementation>,
    dry_run: bool,
}

impl StandardProcessor {
    pub fn new(
        locator: InstanceTypeLocator,
        instance_type_config: InstanceTypeConfig,
        consumption: Arc<Vec<ClusterStreamingUnitCount>>,
        catalog: Arc<KafkaInstanceTypesConfig>,
        repository: Arc<ClusterRepositoryImplementation>,
        dry_run: bool,
    ) -> Self {
        Self {
            locator,
            instance_type_config,
            consumption,
            catalog,
            repository,
            dry_run,
        }
    }
}

impl ScaleUpProcessor for StandardProcessor {
    fn should_scale_up(&self) -> Result<bool, Error> {
        let summary = summary::SummaryCalculator::new(&self.locator, &self.consumption, &self.catalog)
            .calculate()?;

        Ok(ScaleUpEvaluator::new(&self.instance_type_config).should_scale_up(&summary))
    }

    async fn scale_up(&self) -> Result<(), Error> {
        ScaleUpExecutor::new(&self.locator, Arc::clone(&self.repository), self.dry_run)
            .scale_up()
            .await?;
        Ok(())
    }
}

/// A processor where scale-up is always a no-op and the evaluation always
/// reports "no scale-up needed". Used to compose the engine out entirely
/// (e.g. for a triple explicitly excluded from auto-scaling) without a
/// separate code path in the caller.
#[derive(Default)]
pub struct NoOpProcessor;

impl ScaleUpProcessor for NoOpProcessor {
    fn should_scale_up(&self) -> Result<bool, Error> {
        Ok(false)
    }

    async fn scale_up(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_scaleup_core::cluster::ClusterStatus;
    use fleet_scaleup_core::config::{KafkaInstanceSize, KafkaInstanceTypeCatalogEntry};
    use fleet_scaleup_persistence::in_memory::InMemoryClusterRepository;
    use std::collections::HashMap;

    fn catalog() -> Arc<KafkaInstanceTypesConfig> {
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
        Arc::new(KafkaInstanceTypesConfig { configuration })
    }

    #[tokio::test]
    async fn noop_processor_never_scales_up() {
        let processor = ScaleUpProcessorImplementation::NoOp(NoOpProcessor);
        assert_eq!(processor.should_scale_up().unwrap(), false);
        processor.scale_up().await.unwrap();
    }

    #[tokio::test]
    async fn standard_processor_evaluates_then_executes_for_a_cold_region() {
        let repository = Arc::new(ClusterRepositoryImplementation::InMemory(
            InMemoryClusterRepository::new(),
        ));
        let locator = InstanceTypeLocator::new("aws", "us-east-1", "standard");
        let instance_type_config = InstanceTypeConfig {
            limit: Some(100),
            min_available_capacity_slack_streaming_units: 10,
        };

        let processor = ScaleUpProcessorImplementation::Standard(StandardProcessor::new(
            locator,
            instance_type_config,
            Arc::new(vec![]),
            catalog(),
            Arc::clone(&repository),
            false,
        ));

        assert!(processor.should_scale_up().unwrap());
        processor.scale_up().await.unwrap();

        let ClusterRepositoryImplementation::InMemory(in_memory) = repository.as_ref();
        assert_eq!(in_memory.len().await, 1);
    }

    #[tokio::test]
    async fn standard_processor_suppresses_when_ongoing() {
        let repository = Arc::new(ClusterRepositoryImplementation::InMemory(
            InMemoryClusterRepository::new(),
        ));
        let locator = InstanceTypeLocator::new("aws", "us-east-1", "standard");
        let instance_type_config = InstanceTypeConfig {
            limit: Some(100),
            min_available_capacity_slack_streaming_units: 10,
        };
        let consumption = vec![ClusterStreamingUnitCount {
            cloud_provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            instance_type: "standard".to_string(),
            status: ClusterStatus::Accepted,
            count: 0,
            max_units: 50,
        }];

        let processor = ScaleUpProcessorImplementation::Standard(StandardProcessor::new(
            locator,
            instance_type_config,
            Arc::new(consumption),
            catalog(),
            Arc::clone(&repository),
            false,
        ));

        assert!(!processor.should_scale_up().unwrap());
    }
}
