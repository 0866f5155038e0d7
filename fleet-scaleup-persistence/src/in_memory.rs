use std::collections::{HashMap, HashSet};

use fleet_scaleup_core::cluster::{
    ClusterId, ClusterRegistrationIntent, ClusterStatus, ClusterStreamingUnitCount,
};
use snafu::Snafu;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::ClusterValidityFilter;

#[derive(Snafu, Debug)]
pub enum Error {}

#[derive(Clone, Debug, PartialEq)]
struct StoredCluster {
    cloud_provider: String,
    region: String,
    instance_type: String,
    status: ClusterStatus,
    count: i64,
    max_units: i64,
}

/// Reference [`crate::ClusterRepository`] implementation backed by an
/// in-process map. Intended for local runs and tests, not as a production
/// backend — a real deployment talks to the fleet's cluster database instead.
#[derive(Default)]
pub struct InMemoryClusterRepository {
    clusters: RwLock<HashMap<ClusterId, StoredCluster>>,
}

impl InMemoryClusterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/fixture helper: seed a cluster with an explicit consumption row,
    /// bypassing `register_cluster_job`'s intent-shaped construction.
    pub async fn seed_cluster(
        &self,
        cloud_provider: impl Into<String>,
        region: impl Into<String>,
        instance_type: impl Into<String>,
        status: ClusterStatus,
        count: i64,
        max_units: i64,
    ) -> ClusterId {
        let id = ClusterId(Uuid::new_v4());
        self.clusters.write().await.insert(
            id,
            StoredCluster {
                cloud_provider: cloud_provider.into(),
                region: region.into(),
                instance_type: instance_type.into(),
                status,
                count,
                max_units,
            },
        );
        id
    }

    /// Test helper: number of clusters currently stored.
    pub async fn len(&self) -> usize {
        self.clusters.read().await.len()
    }
}

impl crate::ClusterRepository for InMemoryClusterRepository {
    #[instrument(skip(self))]
    async fn list_group_by_provider_and_region(
        &self,
        providers: &[String],
        regions: &[String],
        status: ClusterValidityFilter,
    ) -> Result<HashSet<(String, String)>, crate::Error> {
        let ClusterValidityFilter::Valid = status;

        let clusters = self.clusters.read().await;
        Ok(clusters
            .values()
            .filter(|c| c.status.is_valid())
            .filter(|c| providers.iter().any(|p| p == &c.cloud_provider))
            .filter(|c| regions.iter().any(|r| r == &c.region))
            .map(|c| (c.cloud_provider.clone(), c.region.clone()))
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_streaming_unit_count_by_cluster_and_instance_type(
        &self,
    ) -> Result<Vec<ClusterStreamingUnitCount>, crate::Error> {
        let clusters = self.clusters.read().await;
        Ok(clusters
            .values()
            // Precondition of `ClusterRepository`: failed clusters are filtered out here, at the
            // adapter boundary, rather than trusted to already be absent.
            .filter(|c| c.status != ClusterStatus::Failed)
            .map(|c| ClusterStreamingUnitCount {
                cloud_provider: c.cloud_provider.clone(),
                region: c.region.clone(),
                instance_type: c.instance_type.clone(),
                status: c.status,
                count: c.count,
                max_units: c.max_units,
            })
            .collect())
    }

    #[instrument(skip(self, intent))]
    async fn register_cluster_job(
        &self,
        intent: ClusterRegistrationIntent,
    ) -> Result<ClusterId, crate::Error> {
        let id = ClusterId(Uuid::new_v4());

        self.clusters.write().await.insert(
            id,
            StoredCluster {
                cloud_provider: intent.cloud_provider.clone(),
                region: intent.region.clone(),
                instance_type: intent.supported_instance_type.clone(),
                status: intent.status,
                count: 0,
                max_units: 0,
            },
        );

        info!(
            provider = intent.cloud_provider,
            region = intent.region,
            id = %id,
            "Registered cluster request"
        );

        Ok(id)
    }
}
