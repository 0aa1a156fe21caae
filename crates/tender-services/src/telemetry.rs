use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "tender=debug,sqlx=warn";

/// Initialize tracing. Production emits JSON lines, everything else a compact console format.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(production: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    if production {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        let console_fmt = tracing_subscriber::fmt::layer()
            .event_format(Format::default().compact().with_target(false));
        tracing_subscriber::registry()
            .with(filter)
            .with(console_fmt)
            .try_init()?;
    }

    tracing::info!(production, "Tracing initialized");
    Ok(())
}
