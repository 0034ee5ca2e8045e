//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGTERM and SIGINT handlers
//! - Translate them into `TermSignal` events on the `Shutdown` channel
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are replaced by the defaults when the server is exec'd, so the
//!   server receives the platform's signals directly

use std::fmt;

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// A termination request from the container platform or an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSignal {
    /// SIGTERM
    Terminate,
    /// SIGINT
    Interrupt,
}

impl TermSignal {
    /// POSIX signal number.
    pub fn signo(self) -> i32 {
        match self {
            TermSignal::Terminate => 15,
            TermSignal::Interrupt => 2,
        }
    }

    /// Exit status of a process terminated by this signal.
    pub fn exit_code(self) -> i32 {
        128 + self.signo()
    }
}

impl fmt::Display for TermSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSignal::Terminate => f.write_str("SIGTERM"),
            TermSignal::Interrupt => f.write_str("SIGINT"),
        }
    }
}

/// Install signal handlers and relay every received signal to `shutdown`.
#[cfg(unix)]
pub fn listen(shutdown: Shutdown) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    Ok(tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = terminate.recv() => TermSignal::Terminate,
                Some(()) = interrupt.recv() => TermSignal::Interrupt,
                else => break,
            };
            tracing::info!(signal = %received, "Termination signal received");
            shutdown.trigger(received);
        }
    }))
}

/// Install a Ctrl-C handler and relay it to `shutdown`.
#[cfg(not(unix))]
pub fn listen(shutdown: Shutdown) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(signal = %TermSignal::Interrupt, "Termination signal received");
            shutdown.trigger(TermSignal::Interrupt);
        }
    }))
}
