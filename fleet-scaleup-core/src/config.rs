use std::{collections::HashMap, fs::File, path::Path, time::Duration};

use serde::Deserialize;
use snafu::{ResultExt, Snafu};

use crate::{
    locator::InstanceTypeLocator, CloudProviderName, InstanceTypeName, RegionName,
};

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to read configuration file at {config_file:?}"))]
    ReadConfigFile {
        source: std::io::Error,
        config_file: std::path::PathBuf,
    },

    #[snafu(display("Failed to parse configuration file at {config_file:?}"))]
    ParseConfigFile {
        source: serde_yaml::Error,
        config_file: std::path::PathBuf,
    },
}

/// Top-level configuration surface read once at process startup.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Config {
    pub dataplane_cluster: DataplaneClusterConfig,
    pub providers: ProvidersConfig,
    pub kafka_instance_types: KafkaInstanceTypesConfig,
}

impl Config {
    /// Using [`std::fs::File`] over an async reader: `serde_yaml` has no
    /// async variant and the config is only ever read once, at startup.
    pub fn read_from_file(config_file: &Path) -> Result<Self, Error> {
        let config_file_content =
            File::open(config_file).context(ReadConfigFileSnafu { config_file })?;

        serde_yaml::from_reader(config_file_content).context(ParseConfigFileSnafu { config_file })
    }
}

/// Feature flags and timing gating the scale-up reconcile loop.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DataplaneClusterConfig {
    #[serde(default)]
    is_data_plane_auto_scaling_enabled: bool,

    /// Models the `if false {}` rollout gate around the fine-grained
    /// processor sweep in the upstream Go source as an explicit, documented
    /// configuration value instead of dead code.
    #[serde(default = "default_new_processor_enabled")]
    is_new_dynamic_scale_up_processor_enabled: bool,

    #[serde(with = "humantime_serde", default = "default_reconcile_interval")]
    pub reconcile_interval: Duration,
}

fn default_new_processor_enabled() -> bool {
    true
}

fn default_reconcile_interval() -> Duration {
    Duration::from_secs(60)
}

impl DataplaneClusterConfig {
    pub fn is_data_plane_auto_scaling_enabled(&self) -> bool {
        self.is_data_plane_auto_scaling_enabled
    }

    pub fn is_new_dynamic_scale_up_processor_enabled(&self) -> bool {
        self.is_new_dynamic_scale_up_processor_enabled
    }
}

/// Per-instance-type policy for one (provider, region).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct InstanceTypeConfig {
    /// Region-wide streaming-unit cap for this instance type, if any.
    pub limit: Option<i64>,
    pub min_available_capacity_slack_streaming_units: i64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegionConfig {
    pub supported_instance_types: HashMap<InstanceTypeName, InstanceTypeConfig>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ProviderConfig {
    pub regions: HashMap<RegionName, RegionConfig>,
}

/// Enumerates the supported providers, each carrying the regions and, per
/// region, the supported instance types and their policy.
#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct ProvidersConfig {
    pub providers: HashMap<CloudProviderName, ProviderConfig>,
}

impl ProvidersConfig {
    /// All configured provider names.
    pub fn provider_names(&self) -> impl Iterator<Item = &CloudProviderName> {
        self.providers.keys()
    }

    /// All configured (provider, region) pairs across every provider.
    pub fn provider_region_pairs(&self) -> impl Iterator<Item = (&CloudProviderName, &RegionName)> {
        self.providers.iter().flat_map(|(provider, config)| {
            config.regions.keys().map(move |region| (provider, region))
        })
    }

    /// Every configured (provider, region, instance-type) triple paired with
    /// its policy, in the shape the scale-up sweep iterates over.
    pub fn triples(&self) -> impl Iterator<Item = (InstanceTypeLocator, InstanceTypeConfig)> + '_ {
        self.providers.iter().flat_map(|(provider, provider_config)| {
            provider_config.regions.iter().flat_map(move |(region, region_config)| {
                region_config
                    .supported_instance_types
                    .iter()
                    .map(move |(instance_type, config)| {
                        (
                            InstanceTypeLocator::new(provider.clone(), region.clone(), instance_type.clone()),
                            config.clone(),
                        )
                    })
            })
        })
    }
}

/// One supported instance *size* of a given instance type (e.g. `x1`, `x2`),
/// carrying the streaming-unit footprint of a single instance of that size.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct KafkaInstanceSize {
    pub id: String,
    pub capacity_consumed: i64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct KafkaInstanceTypeCatalogEntry {
    pub sizes: Vec<KafkaInstanceSize>,
}

impl KafkaInstanceTypeCatalogEntry {
    /// The size with the largest streaming-unit footprint, or [`None`] if
    /// this instance type has no configured sizes.
    pub fn biggest_capacity_consumed_size(&self) -> Option<&KafkaInstanceSize> {
        self.sizes.iter().max_by_key(|size| size.capacity_consumed)
    }
}

/// Lookup from instance-type name to its catalog of supported sizes.
#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct KafkaInstanceTypesConfig {
    pub configuration: HashMap<InstanceTypeName, KafkaInstanceTypeCatalogEntry>,
}

impl KafkaInstanceTypesConfig {
    pub fn get(&self, instance_type_name: &str) -> Option<&KafkaInstanceTypeCatalogEntry> {
        self.configuration.get(instance_type_name)
    }
}
