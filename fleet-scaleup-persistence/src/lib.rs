use std::collections::HashSet;

use enum_dispatch::enum_dispatch;
use fleet_scaleup_core::cluster::{ClusterId, ClusterRegistrationIntent, ClusterStreamingUnitCount};
use snafu::Snafu;

pub mod in_memory;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("In-memory cluster repository error"), context(false))]
    InMemoryError { source: in_memory::Error },
}

/// The status filter `list_group_by_provider_and_region` groups by. Today the
/// core only ever asks for clusters in a "valid" (non-`failed`) status, but
/// this is modeled as an enum rather than a bare boolean so a future caller
/// asking for a different grouping is caught at the type level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClusterValidityFilter {
    Valid,
}

/// The contract the scale-up reconciler consumes from the surrounding fleet
/// manager. A real implementation talks to the fleet's cluster database; the
/// provisioning machinery downstream of `register_cluster_job` is an opaque
/// sink from this crate's perspective.
///
/// Implementations must treat every method as atomic enough to be safe to
/// call from multiple concurrently running reconcilers; the scale-up core
/// only relies on "once a towards-ready cluster is visible, a later read sees
/// it" — it does not require cross-instance locking.
#[enum_dispatch(ClusterRepositoryImplementation)]
#[trait_variant::make(SendClusterRepository: Send)]
pub trait ClusterRepository {
    /// Groups the repository's clusters in `providers`/`regions` by
    /// (provider, region), restricted to `status`, and returns the set of
    /// pairs that already have at least one such cluster.
    async fn list_group_by_provider_and_region(
        &self,
        providers: &[String],
        regions: &[String],
        status: ClusterValidityFilter,
    ) -> Result<HashSet<(String, String)>, Error>;

    /// Precondition the caller must uphold: no returned row has
    /// `status == ClusterStatus::Failed`.
    async fn find_streaming_unit_count_by_cluster_and_instance_type(
        &self,
    ) -> Result<Vec<ClusterStreamingUnitCount>, Error>;

    /// Fire-and-forget from the core's perspective: success means "intent
    /// persisted", not "cluster running".
    async fn register_cluster_job(&self, intent: ClusterRegistrationIntent) -> Result<ClusterId, Error>;
}

#[enum_dispatch]
pub enum ClusterRepositoryImplementation {
    InMemory(in_memory::InMemoryClusterRepository),
}
