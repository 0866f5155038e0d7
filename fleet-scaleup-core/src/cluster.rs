use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CloudProviderName, InstanceTypeName, RegionName};

/// Cluster lifecycle states the core reasons about. `Failed` clusters are
/// expected to have been filtered out by the repository adapter before a
/// [`crate::cluster::ClusterStreamingUnitCount`] listing reaches the core (see
/// [`ClusterStatus::is_valid`] and the `EvaluationPrecondition` error the
/// summary calculator raises if that assumption is violated anyway).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    Accepted,
    Provisioning,
    Provisioned,
    WaitingForKasFleetshardOperator,
    Deprovisioning,
    Cleanup,
    Ready,
    Failed,
}

impl ClusterStatus {
    /// A data plane cluster is being created for the instance types it will
    /// eventually support.
    pub fn is_toward_ready(self) -> bool {
        matches!(
            self,
            ClusterStatus::Accepted
                | ClusterStatus::Provisioning
                | ClusterStatus::Provisioned
                | ClusterStatus::WaitingForKasFleetshardOperator
        )
    }

    /// The cluster no longer accepts new streaming instances.
    pub fn is_toward_deletion(self) -> bool {
        matches!(self, ClusterStatus::Deprovisioning | ClusterStatus::Cleanup)
    }

    /// Registered and not failed; used by [`crate::config`]-driven bootstrap
    /// lookups to decide whether a region already has a usable cluster.
    pub fn is_valid(self) -> bool {
        !matches!(self, ClusterStatus::Failed)
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wire = match self {
            ClusterStatus::Accepted => "accepted",
            ClusterStatus::Provisioning => "provisioning",
            ClusterStatus::Provisioned => "provisioned",
            ClusterStatus::WaitingForKasFleetshardOperator => {
                "waiting_for_kas_fleetshard_operator"
            }
            ClusterStatus::Deprovisioning => "deprovisioning",
            ClusterStatus::Cleanup => "cleanup",
            ClusterStatus::Ready => "ready",
            ClusterStatus::Failed => "failed",
        };
        f.write_str(wire)
    }
}

/// Cloud provisioning backend a [`ClusterRegistrationIntent`] is registered
/// against. Modeled as an enum (rather than the Go source's string constant)
/// so a future second provider type is exhaustively handled at every match
/// site.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ProviderType {
    Ocm,
}

/// Identifier assigned by the repository when a [`ClusterRegistrationIntent`]
/// is persisted. Used only for the per-intent log line.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ClusterId(pub Uuid);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the per-cluster streaming-unit consumption listing the core
/// reads once per tick.
///
/// Precondition (caller-supplied, see [`ClusterStatus::is_valid`]): no row
/// has `status == ClusterStatus::Failed`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterStreamingUnitCount {
    pub cloud_provider: CloudProviderName,
    pub region: RegionName,
    pub instance_type: InstanceTypeName,
    pub status: ClusterStatus,
    /// Currently consumed streaming units.
    pub count: i64,
    /// Streaming-unit capacity ceiling of the cluster.
    pub max_units: i64,
}

impl ClusterStreamingUnitCount {
    /// `max_units - count`. May be negative; callers must tolerate that (see
    /// `ConsumptionSummary::free_streaming_units`).
    pub fn free_streaming_units(&self) -> i64 {
        self.max_units - self.count
    }
}

/// Immutable, per-(tick, triple) capacity aggregate produced by the summary
/// calculator. Never mutated once constructed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConsumptionSummary {
    pub max_streaming_units: i64,
    pub free_streaming_units: i64,
    pub consumed_streaming_units: i64,
    pub ongoing_scale_up_action: bool,
    pub biggest_instance_size_capacity_available: bool,
}

/// A persisted "please create this cluster" record. Ownership transfers to
/// the cluster repository on `register_cluster_job`; the core never mutates
/// or re-reads it directly afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterRegistrationIntent {
    pub cloud_provider: CloudProviderName,
    pub region: RegionName,
    pub supported_instance_type: InstanceTypeName,
    pub multi_az: bool,
    pub status: ClusterStatus,
    pub provider_type: ProviderType,
}

impl ClusterRegistrationIntent {
    /// The intent [`RegionBootstrapper`](crate) enqueues for a region with no
    /// usable cluster at all: multi-AZ, supporting every instance type.
    pub fn bootstrap(provider: CloudProviderName, region: RegionName) -> Self {
        Self {
            cloud_provider: provider,
            region,
            supported_instance_type: "all".to_string(),
            multi_az: true,
            status: ClusterStatus::Accepted,
            provider_type: ProviderType::Ocm,
        }
    }

    /// The intent a [`ScaleUpExecutor`](crate) enqueues for a specific
    /// instance type: multi-AZ only for the `standard` tier.
    pub fn scale_up(locator: &crate::locator::InstanceTypeLocator) -> Self {
        Self {
            cloud_provider: locator.provider.clone(),
            region: locator.region.clone(),
            supported_instance_type: locator.instance_type_name.clone(),
            multi_az: locator.instance_type_name == "standard",
            status: ClusterStatus::Accepted,
            provider_type: ProviderType::Ocm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::accepted(ClusterStatus::Accepted, true, false, true)]
    #[case::provisioning(ClusterStatus::Provisioning, true, false, true)]
    #[case::provisioned(ClusterStatus::Provisioned, true, false, true)]
    #[case::waiting_for_operator(ClusterStatus::WaitingForKasFleetshardOperator, true, false, true)]
    #[case::deprovisioning(ClusterStatus::Deprovisioning, false, true, true)]
    #[case::cleanup(ClusterStatus::Cleanup, false, true, true)]
    #[case::ready(ClusterStatus::Ready, false, false, true)]
    #[case::failed(ClusterStatus::Failed, false, false, false)]
    fn status_predicates(
        #[case] status: ClusterStatus,
        #[case] toward_ready: bool,
        #[case] toward_deletion: bool,
        #[case] valid: bool,
    ) {
        assert_eq!(status.is_toward_ready(), toward_ready);
        assert_eq!(status.is_toward_deletion(), toward_deletion);
        assert_eq!(status.is_valid(), valid);
    }

    #[test]
    fn toward_ready_states() {
        assert!(ClusterStatus::Accepted.is_toward_ready());
        assert!(ClusterStatus::Provisioning.is_toward_ready());
        assert!(ClusterStatus::Provisioned.is_toward_ready());
        assert!(ClusterStatus::WaitingForKasFleetshardOperator.is_toward_ready());
        assert!(!ClusterStatus::Ready.is_toward_ready());
        assert!(!ClusterStatus::Deprovisioning.is_toward_ready());
    }

    #[test]
    fn toward_deletion_states() {
        assert!(ClusterStatus::Deprovisioning.is_toward_deletion());
        assert!(ClusterStatus::Cleanup.is_toward_deletion());
        assert!(!ClusterStatus::Ready.is_toward_deletion());
    }

    #[test]
    fn only_failed_is_invalid() {
        assert!(!ClusterStatus::Failed.is_valid());
        for status in [
            ClusterStatus::Accepted,
            ClusterStatus::Provisioning,
            ClusterStatus::Provisioned,
            ClusterStatus::WaitingForKasFleetshardOperator,
            ClusterStatus::Deprovisioning,
            ClusterStatus::Cleanup,
            ClusterStatus::Ready,
        ] {
            assert!(status.is_valid());
        }
    }

    #[test]
    fn free_streaming_units_may_be_negative() {
        let row = ClusterStreamingUnitCount {
            cloud_provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            instance_type: "standard".to_string(),
            status: ClusterStatus::Ready,
            count: 120,
            max_units: 100,
        };
        assert_eq!(row.free_streaming_units(), -20);
    }

    #[test]
    fn scale_up_intent_is_multi_az_only_for_standard() {
        let standard = crate::locator::InstanceTypeLocator::new("aws", "us-east-1", "standard");
        let developer = crate::locator::InstanceTypeLocator::new("aws", "us-east-1", "developer");

        assert!(ClusterRegistrationIntent::scale_up(&standard).multi_az);
        assert!(!ClusterRegistrationIntent::scale_up(&developer).multi_az);
    }

    #[test]
    fn bootstrap_intent_supports_all_instance_types() {
        let intent = ClusterRegistrationIntent::bootstrap("aws".to_string(), "us-east-1".to_string());
        assert_eq!(intent.supported_instance_type, "all");
        assert!(intent.multi_az);
        assert_eq!(intent.status, ClusterStatus::Accepted);
    }
}
