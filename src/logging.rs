use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr. `level` takes the
/// `RUST_LOG` directive syntax; without it `RUST_LOG` is used, then `warn`.
pub fn init_tracing(level: Option<&str>) -> Result<(), String> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level.trim())
            .map_err(|e| format!("invalid log level {level:?}: {e}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
