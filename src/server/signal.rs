// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use crate::error::StartupError;

/// Registered shutdown signal streams
///
/// Handlers are installed by [`ShutdownSignals::install`], before the server
/// starts accepting, so a signal that arrives early is not lost.
#[cfg(unix)]
pub struct ShutdownSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    /// Register SIGTERM and SIGINT handlers (must run inside the runtime)
    pub fn install() -> Result<Self, StartupError> {
        use tokio::signal::unix::{signal, SignalKind};

        let sigterm = signal(SignalKind::terminate()).map_err(StartupError::Signal)?;
        let sigint = signal(SignalKind::interrupt()).map_err(StartupError::Signal)?;
        tracing::debug!(
            "Signal handlers registered for process {}",
            std::process::id()
        );
        Ok(Self { sigterm, sigint })
    }

    /// Wait for the first shutdown signal and return its name
    pub async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    #[allow(clippy::unnecessary_wraps)]
    pub fn install() -> Result<Self, StartupError> {
        Ok(Self)
    }

    pub async fn recv(self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        "Ctrl+C"
    }
}
