use std::fmt;

use crate::{CloudProviderName, InstanceTypeName, RegionName};

/// Identifies a (cloud provider, region, instance type) triple: the unit over
/// which the scale-up reconciler makes its decisions.
///
/// Equality is structural across all three fields, matching the Go source's
/// `supportedInstanceTypeLocator.Equal`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct InstanceTypeLocator {
    pub provider: CloudProviderName,
    pub region: RegionName,
    pub instance_type_name: InstanceTypeName,
}

impl InstanceTypeLocator {
    pub fn new(
        provider: impl Into<CloudProviderName>,
        region: impl Into<RegionName>,
        instance_type_name: impl Into<InstanceTypeName>,
    ) -> Self {
        Self {
            provider: provider.into(),
            region: region.into(),
            instance_type_name: instance_type_name.into(),
        }
    }

    /// Whether this locator identifies the same (provider, region, instance type)
    /// as a cluster consumption row.
    pub fn matches(
        &self,
        provider: &CloudProviderName,
        region: &RegionName,
        instance_type_name: &InstanceTypeName,
    ) -> bool {
        &self.provider == provider
            && &self.region == region
            && &self.instance_type_name == instance_type_name
    }
}

impl fmt::Display for InstanceTypeLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.provider, self.region, self.instance_type_name
        )
    }
}
