use snafu::{ResultExt, Snafu};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to set global tracing subscriber"))]
    SetGlobalTracingSubscriber {
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}

/// Installs a console-only tracing subscriber. `RUST_LOG` overrides the
/// default `info` level, e.g. `RUST_LOG=fleet_scaleup_manager=debug`.
pub fn init() -> Result<(), Error> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter).finish();

    tracing::subscriber::set_global_default(subscriber).context(SetGlobalTracingSubscriberSnafu)
}
