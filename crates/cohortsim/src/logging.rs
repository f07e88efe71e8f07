use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the log filter: `RUST_LOG` when set, otherwise `level` for this
/// crate and warnings only for the model library.
pub fn log_filter(level: &str) -> EnvFilter {
    let default_filter = format!("cohortsim={level},cohortsim_core=warn");
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter))
}

/// Initialize logging to stderr so stdout carries only results.
pub fn init_logging(level: &str) -> color_eyre::Result<()> {
    tracing_subscriber::registry()
        .with(log_filter(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    tracing::debug!(level, "cohortsim logging initialized");
    Ok(())
}
