use fleet_scaleup_core::locator::InstanceTypeLocator;
use snafu::Snafu;

pub mod bootstrap;
pub mod evaluator;
pub mod executor;
pub mod manager;
pub mod processor;
pub mod summary;

/// One failure observed during a single reconcile tick. The manager never
/// panics and never lets one triple's failure abort the sweep over the
/// rest — instead `ScaleUpManager::reconcile` collects every `Error` it
/// encounters into a `Vec` and returns it to the caller, mirroring the Go
/// source's `Reconcile() []error`.
#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to list the cluster streaming unit consumption"), context(false))]
    ListConsumption { source: fleet_scaleup_persistence::Error },

    #[snafu(display("Failed to bootstrap a region"), context(false))]
    Bootstrap { source: bootstrap::Error },

    #[snafu(display("Failed to evaluate whether a scale-up is needed for {locator}"))]
    Evaluate {
        source: processor::Error,
        locator: InstanceTypeLocator,
    },

    #[snafu(display("Failed to execute a scale-up for {locator}"))]
    Execute {
        source: processor::Error,
        locator: InstanceTypeLocator,
    },
}
