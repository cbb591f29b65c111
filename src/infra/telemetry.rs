use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

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

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "sopforge_generate_total",
            Unit::Count,
            "Total number of SOP generation attempts, labeled by outcome."
        );
        describe_histogram!(
            "sopforge_generate_ms",
            Unit::Milliseconds,
            "Generative API call latency for SOP generation in milliseconds."
        );
        describe_counter!(
            "sopforge_export_total",
            Unit::Count,
            "Total number of SOP exports, labeled by format."
        );
        describe_counter!(
            "sopforge_chat_total",
            Unit::Count,
            "Total number of chat questions, labeled by outcome."
        );
        describe_counter!(
            "sopforge_incident_store_total",
            Unit::Count,
            "Total number of incident store requests acknowledged without persistence."
        );
    });
}
