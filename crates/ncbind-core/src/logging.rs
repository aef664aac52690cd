#![forbid(unsafe_code)]

//! Logging for every ncbind crate.
//!
//! Call sites use `debug!`, `info!`, and `warn!` from the crate root. With the
//! `tracing` feature those are the `tracing` macros. Without it they expand to
//! nothing, arguments included, so a disabled build pays nothing for the
//! field formatting at discovery and boot.
//!
//! The `tracing-json` feature adds [`init_subscriber`], which installs a JSON
//! subscriber filtered by the `NCBIND_LOG` environment variable.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Environment variable holding the `EnvFilter` directives.
pub const ENV_LOG_FILTER: &str = "NCBIND_LOG";

// `#[macro_export]` puts these at the crate root, next to the re-exports
// above when the feature is on.
#[cfg(not(feature = "tracing"))]
mod noop_macros {
    // ── Events: arguments are dropped unexpanded ────────────────────────

    /// Candidate checks during discovery and registry builds.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Discovery results, locale selection, table resolution.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// Failed native releases and unloads.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    // ── Spans: evaluate to an inert `NoopSpan` ──────────────────────────

    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    macro_rules! info_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    macro_rules! warn_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    macro_rules! error_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Stand-in for `tracing::Span` in builds without tracing.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;

/// Install a global JSON subscriber filtered by `NCBIND_LOG`.
///
/// Falls back to `info` when the variable is unset or unparsable. Returns
/// `false` if another global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    #[test]
    #[allow(unused_variables)]
    fn call_site_syntax_compiles_either_way() {
        let library = "libncursesw.so.6";
        let size = 28usize;
        crate::debug!(library = %library, size, "checking candidate");
        crate::info!(config = "linux64-ncursesw6", "resolved");
        crate::warn!(error = ?Some(1), "release failed");
        let span = crate::info_span!("boot", layout = "chtype32-wchar32");
        let _guard = span.enter();
    }
}
