//! Structured logging configuration.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// Log levels are configurable via `RUST_LOG`; sqlx and hyper are quieted by
/// default since settlement traffic would otherwise drown the log in query
/// chatter.
///
/// # Example
///
/// ```no_run
/// use wb_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a settlement call outcome with structured fields.
///
/// Domain outcomes (insufficient funds, duplicate transaction, already
/// settled) are expected business results and log at info; only internal
/// errors warrant warn.
pub fn log_settlement_call(operation: &str, outcome: &str, duration_ms: u64) {
    if outcome == "internal_error" {
        tracing::warn!(
            operation = operation,
            outcome = outcome,
            duration_ms = duration_ms,
            "Settlement call failed internally"
        );
    } else {
        tracing::info!(
            operation = operation,
            outcome = outcome,
            duration_ms = duration_ms,
            "Settlement call completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_settlement_call() {
        // Just ensure it doesn't panic
        log_settlement_call("debit", "applied", 12);
        log_settlement_call("credit", "internal_error", 250);
    }
}
