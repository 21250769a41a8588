use miette::Context;
use miette::IntoDiagnostic;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

/// Log human-readable events to stderr, so stdout stays machine-readable.
pub fn install_tracing(filter_directives: &str) -> miette::Result<()> {
    let env_filter = EnvFilter::try_new(filter_directives)
        .into_diagnostic()
        .wrap_err_with(|| format!("Invalid log filter: {filter_directives:?}"))?;

    let human_layer = tracing_human_layer::HumanLayer::new()
        .with_output_writer(std::io::stderr())
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(human_layer)
        .try_init()
        .into_diagnostic()
        .wrap_err("Failed to install tracing subscriber")
}
