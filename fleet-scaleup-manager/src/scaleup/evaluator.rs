use fleet_scaleup_core::{cluster::ConsumptionSummary, config::InstanceTypeConfig};

/// Pure scale-up decision for one (provider, region, instance-type) triple,
/// given its [`ConsumptionSummary`] and policy. Holds no state of its own
/// beyond a borrow of the policy it was constructed with.
pub struct ScaleUpEvaluator<'a> {
    instance_type_config: &'a InstanceTypeConfig,
}

impl<'a> ScaleUpEvaluator<'a> {
    pub fn new(instance_type_config: &'a InstanceTypeConfig) -> Self {
        Self {
            instance_type_config,
        }
    }

    /// Decision tree, evaluated in order; the first matching rule wins:
    /// 1. regional SU limit reached → `false` (hard cap dominates)
    /// 2. a scale-up is already ongoing → `false` (do not pile on)
    /// 3. no cluster has room for the biggest instance size → `true`
    /// 4. free capacity is below the configured slack → `true`
    /// 5. otherwise → `false`
    pub fn should_scale_up(&self, summary: &ConsumptionSummary) -> bool {
        if self.region_limit_reached(summary) {
            return false;
        }

        if self.ongoing_scale_up_action(summary) {
            return false;
        }

        if !self.biggest_instance_size_has_capacity(summary) {
            return true;
        }

        if !self.enough_capacity_slack(summary) {
            return true;
        }

        false
    }

    fn region_limit_reached(&self, summary: &ConsumptionSummary) -> bool {
        match self.instance_type_config.limit {
            Some(limit) => summary.consumed_streaming_units >= limit,
            None => false,
        }
    }

    fn ongoing_scale_up_action(&self, summary: &ConsumptionSummary) -> bool {
        summary.ongoing_scale_up_action
    }

    fn biggest_instance_size_has_capacity(&self, summary: &ConsumptionSummary) -> bool {
        summary.biggest_instance_size_capacity_available
    }

    /// `minAvailableCapacitySlackStreamingUnits == 0` disables this rule: any
    /// non-negative-or-zero free capacity trivially satisfies `>= 0`.
    fn enough_capacity_slack(&self, summary: &ConsumptionSummary) -> bool {
        summary.free_streaming_units
            >= self
                .instance_type_config
                .min_available_capacity_slack_streaming_units
    }
}
