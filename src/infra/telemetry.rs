use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const CACHE_HITS_TOTAL: &str = "vitrine_cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "vitrine_cache_misses_total";
pub const CACHE_ERRORS_TOTAL: &str = "vitrine_cache_errors_total";
pub const CACHE_INVALIDATIONS_TOTAL: &str = "vitrine_cache_invalidations_total";
pub const CATALOG_MUTATIONS_TOTAL: &str = "vitrine_catalog_mutations_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
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

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            CACHE_HITS_TOTAL,
            Unit::Count,
            "Cache lookups answered from the cache, labelled by key namespace."
        );
        describe_counter!(
            CACHE_MISSES_TOTAL,
            Unit::Count,
            "Cache lookups that fell through to the product store."
        );
        describe_counter!(
            CACHE_ERRORS_TOTAL,
            Unit::Count,
            "Cache backend failures and timeouts absorbed as misses or no-ops."
        );
        describe_counter!(
            CACHE_INVALIDATIONS_TOTAL,
            Unit::Count,
            "Cache invalidation passes run after catalog mutations."
        );
        describe_counter!(
            CATALOG_MUTATIONS_TOTAL,
            Unit::Count,
            "Successful catalog writes, labelled by operation."
        );
    });
}
