//! Observability collaborator for [`RepoController`](crate::RepoController).
//!
//! The controller never calls a logging macro directly; it talks to a
//! [`Reporter`]. The binary uses [`TracingReporter`], tests can plug in
//! anything that records messages.

/// Sink for human-readable status messages.
///
/// Messages are observability only; nothing in the functional contract
/// depends on them.
pub trait Reporter: Send {
    fn debug(&self, msg: &str);
    fn info(&self, msg: &str);
    /// An operation completed and changed something.
    fn success(&self, msg: &str);
    fn warn(&self, msg: &str);
}

/// [`Reporter`] that forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn debug(&self, msg: &str) {
        tracing::debug!("{}", msg);
    }

    fn info(&self, msg: &str) {
        tracing::info!("{}", msg);
    }

    fn success(&self, msg: &str) {
        tracing::info!(outcome = "success", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{}", msg);
    }
}

/// Install the global `tracing` subscriber used by the `bk` binary.
///
/// `BK_LOG` takes precedence over `default_level` (the `[log] level`
/// setting). Output goes to stderr so command results on stdout stay
/// pipeable.
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("BK_LOG")
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
