use fleet_scaleup_core::{
    cluster::{ClusterStatus, ClusterStreamingUnitCount, ConsumptionSummary},
    config::KafkaInstanceTypesConfig,
    locator::InstanceTypeLocator,
};
use snafu::{OptionExt, Snafu};

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display(
        "Instance type {instance_type_name:?} is not present in the Kafka instance type catalog"
    ))]
    InstanceTypeNotInCatalog { instance_type_name: String },

    #[snafu(display(
        "Consumption listing contains a cluster with status \"failed\" for {locator}; failed clusters must be filtered out upstream of the summary calculator"
    ))]
    FailedClusterInConsumptionListing { locator: InstanceTypeLocator },
}

/// Sentinel used when an instance type's catalog entry has no sizes at all:
/// every cluster trivially has capacity for it, since there is nothing with a
/// positive footprint to allocate.
const NO_POSITIVE_FOOTPRINT_SENTINEL: i64 = -1;

/// Folds a per-cluster streaming-unit consumption listing into a
/// [`ConsumptionSummary`] for one (provider, region, instance-type) triple.
///
/// Clusters in `toward-deletion` states (`deprovisioning`, `cleanup`) still
/// contribute their currently consumed streaming units (they keep serving
/// existing load while draining) but are excluded from the max-capacity
/// figure (they will not host new instances), which biases the free-capacity
/// figure toward triggering scale-up as they drain out — the intended
/// behavior. Clusters in `toward-ready` states are included in max capacity
/// so the engine does not double-provision while they are still coming
/// online.
pub struct SummaryCalculator<'a> {
    locator: &'a InstanceTypeLocator,
    consumption: &'a [ClusterStreamingUnitCount],
    catalog: &'a KafkaInstanceTypesConfig,
}

impl<'a> SummaryCalculator<'a> {
    pub fn new(
        locator: &'a InstanceTypeLocator,
        consumption: &'a [ClusterStreamingUnitCount],
        catalog: &'a KafkaInstanceTypesConfig,
    ) -> Self {
        Self {
            locator,
            consumption,
            catalog,
        }
    }

    pub fn calculate(&self) -> Result<ConsumptionSummary, Error> {
        let biggest_capacity_consumed = self.biggest_capacity_consumed()?;

        let mut consumed_streaming_units = 0;
        let mut max_streaming_units = 0;
        let mut ongoing_scale_up_action = false;
        let mut biggest_instance_size_capacity_available = biggest_capacity_consumed
            == NO_POSITIVE_FOOTPRINT_SENTINEL;

        for row in self.matching_rows() {
            if row.status == ClusterStatus::Failed {
                return FailedClusterInConsumptionListingSnafu {
                    locator: self.locator.clone(),
                }
                .fail();
            }

            if row.status.is_toward_ready() {
                ongoing_scale_up_action = true;
            }

            if row.free_streaming_units() >= biggest_capacity_consumed {
                biggest_instance_size_capacity_available = true;
            }

            consumed_streaming_units += row.count;

            if !row.status.is_toward_deletion() {
                max_streaming_units += row.max_units;
            }
        }

        Ok(ConsumptionSummary {
            max_streaming_units,
            free_streaming_units: max_streaming_units - consumed_streaming_units,
            consumed_streaming_units,
            ongoing_scale_up_action,
            biggest_instance_size_capacity_available,
        })
    }

    fn matching_rows(&self) -> impl Iterator<Item = &ClusterStreamingUnitCount> {
        self.consumption.iter().filter(|row| {
            self.locator
                .matches(&row.cloud_provider, &row.region, &row.instance_type)
        })
    }

    fn biggest_capacity_consumed(&self) -> Result<i64, Error> {
        let catalog_entry = self
            .catalog
            .get(&self.locator.instance_type_name)
            .context(InstanceTypeNotInCatalogSnafu {
                instance_type_name: self.locator.instance_type_name.clone(),
            })?;

        Ok(catalog_entry
            .biggest_capacity_consumed_size()
            .map(|size| size.capacity_consumed)
            .unwrap_or(NO_POSITIVE_FOOTPRINT_SENTINEL))
    }
}
