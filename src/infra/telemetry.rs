use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::error::METRIC_REQUEST_FAILURE_TOTAL;
use crate::application::fetcher::{METRIC_LIST_FETCH_DISCARDED_TOTAL, METRIC_LIST_FETCH_TOTAL};
use crate::application::mutation::METRIC_MUTATION_TOTAL;
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber writing to stderr, so command output
/// on stdout stays machine-readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_LIST_FETCH_TOTAL,
            Unit::Count,
            "Total number of list fetches dispatched."
        );
        describe_counter!(
            METRIC_LIST_FETCH_DISCARDED_TOTAL,
            Unit::Count,
            "Total number of list responses dropped as stale or after teardown."
        );
        describe_counter!(
            METRIC_MUTATION_TOTAL,
            Unit::Count,
            "Total number of successful creates, updates and deletes."
        );
        describe_counter!(
            METRIC_REQUEST_FAILURE_TOTAL,
            Unit::Count,
            "Total number of API requests that failed."
        );
    });
}
