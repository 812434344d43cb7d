use tracing::Level;

/// Map a `LOGGING_LEVEL` value to a tracing level.
/// Returns `None` for unset or unknown values, meaning no level filter.
pub fn parse_level(level: Option<&str>) -> Option<Level> {
    match level {
        Some("INFO") => Some(Level::INFO),
        Some("ERROR") => Some(Level::ERROR),
        Some("WARNING") => Some(Level::WARN),
        Some("DEBUG") => Some(Level::DEBUG),
        Some("CRITICAL") => Some(Level::ERROR),
        _ => None,
    }
}

/// Install the global fmt subscriber for a function.
pub fn init(level: Option<&str>) {
    let parsed = parse_level(level);

    tracing_subscriber::fmt()
        .with_max_level(parsed.unwrap_or(Level::TRACE))
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();

    if parsed.is_none() {
        tracing::error!(?level, "received unknown logging level, no level filter set");
    }
}
