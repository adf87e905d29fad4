// src/system/interrupt.rs

//! SIGINT/SIGTERM handling.
//!
//! Once goscript listens for a signal, the default action (terminating the process)
//! no longer applies, so work in progress can finish its cleanup. `InterruptWatch`
//! keeps that listener alive across synchronous steps like `go build`, turning a
//! signal into a flag the caller checks between them.

use crate::system::executor::ExecutionError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Runtime;

/// Set once the process has been asked to stop.
pub type CancellationToken = Arc<AtomicBool>;

/// Listens for SIGINT/SIGTERM from creation until it is dropped.
#[derive(Debug)]
pub struct InterruptWatch {
    token: CancellationToken,
    runtime: Option<Runtime>,
}

impl InterruptWatch {
    /// Installs the signal handlers before returning, so a signal arriving right after
    /// no longer terminates the process.
    pub fn start() -> Result<Self, ExecutionError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("goscript-signals")
            .enable_all()
            .build()?;
        let token = CancellationToken::default();

        let listener = {
            let _entered = runtime.enter();
            Listener::register()?
        };
        let flag = Arc::clone(&token);
        runtime.spawn(async move {
            listener.wait().await;
            log::debug!("Interrupt received, stopping after the current step.");
            flag.store(true, Ordering::SeqCst);
        });

        Ok(Self {
            token,
            runtime: Some(runtime),
        })
    }

    /// Whether a signal arrived since the watch started.
    pub fn fired(&self) -> bool {
        self.token.load(Ordering::SeqCst)
    }

    /// `Err(Interrupted)` once a signal arrived.
    pub fn check(&self) -> Result<(), ExecutionError> {
        if self.fired() {
            return Err(ExecutionError::Interrupted);
        }
        Ok(())
    }
}

impl Drop for InterruptWatch {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Signal streams registered eagerly, unlike `tokio::signal::ctrl_c()` which only
/// registers when first polled.
#[cfg(unix)]
struct Listener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Listener {
    fn register() -> Result<Self, ExecutionError> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn wait(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {}
            _ = self.terminate.recv() => {}
        }
    }
}

#[cfg(not(unix))]
struct Listener;

#[cfg(not(unix))]
impl Listener {
    fn register() -> Result<Self, ExecutionError> {
        Ok(Self)
    }

    async fn wait(self) {
        ctrl_c().await;
    }
}

/// Resolves when the process receives an interrupt or termination request.
#[cfg(unix)]
pub(crate) async fn interrupted() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                () = ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            log::warn!("Unable to listen for SIGTERM: {}", e);
            ctrl_c().await;
        }
    }
    log::debug!("Interrupt received, abandoning the child process.");
}

#[cfg(not(unix))]
pub(crate) async fn interrupted() {
    ctrl_c().await;
    log::debug!("Interrupt received, abandoning the child process.");
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Unable to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::testing::{serial, signal_self_after};
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_watch_turns_signals_into_a_flag() {
        let _serial = serial();
        let watch = InterruptWatch::start().unwrap();
        assert!(watch.check().is_ok());

        signal_self_after("TERM", Duration::from_millis(50)).join().unwrap();
        let mut waited = Duration::ZERO;
        while !watch.fired() && waited < Duration::from_secs(5) {
            std::thread::sleep(Duration::from_millis(10));
            waited += Duration::from_millis(10);
        }
        assert!(matches!(watch.check(), Err(ExecutionError::Interrupted)));
    }
}
