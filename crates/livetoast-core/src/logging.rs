#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported here
//! and at the crate root. Without it, the same macro names expand to nothing
//! so call sites never need their own `cfg` guards.
//!
//! The `tracing-json` feature adds [`init_json_logging`] for hosts that want
//! line-delimited JSON output without assembling a subscriber themselves.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, info, info_span, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op debug_span macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// No-op info macro when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op info_span macro when tracing is disabled.
    #[macro_export]
    macro_rules! info_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// Span stand-in used when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the span. The guard does nothing.
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan::enter`].
#[cfg(not(feature = "tracing"))]
pub struct NoopGuard;

/// Install a global JSON subscriber.
///
/// `RUST_LOG` takes precedence; `default_filter` (for example
/// `"livetoast=debug"`) applies when it is unset or unparsable. Fails if a
/// global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging(
    default_filter: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
}

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    #[test]
    fn noop_macros_accept_structured_fields() {
        let wrapper = "toasts-1";
        crate::debug!(wrapper, height = 80.0, "measured");
        crate::warn!(%wrapper, "skipped");
        let span = crate::debug_span!("process", wrappers = 3);
        let _guard = span.enter();
    }
}
