//! Provider readiness
//!
//! The backend may not be reachable right after startup. Readiness is a
//! one-way flag: it flips from not-ready to ready once and never back.
//! [`ProviderReadiness::poll`] drives the flag from a [`ProviderAvailability`]
//! probe on a fixed interval and stops for good once the probe succeeds.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::ProviderAvailability;

/// Write side of the readiness flag
#[derive(Debug, Clone)]
pub struct ReadinessSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadinessSignal {
    /// Mark the provider ready. Returns `true` only for the call that flipped it.
    pub fn mark_ready(&self) -> bool {
        self.tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        })
    }
}

/// Monotonic readiness flag, optionally backed by a polling task.
///
/// Dropping it cancels the polling task.
#[derive(Debug)]
pub struct ProviderReadiness {
    rx: watch::Receiver<bool>,
    poller: Option<JoinHandle<()>>,
}

impl ProviderReadiness {
    /// Poll `probe` every `interval` until it reports available.
    ///
    /// The first check happens one interval after the call. Must be called
    /// inside a tokio runtime.
    pub fn poll(probe: Arc<dyn ProviderAvailability>, interval: Duration) -> Self {
        let (signal, mut readiness) = Self::manual();

        let poller = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if probe.is_available().await {
                    signal.mark_ready();
                    tracing::info!("✅ AI provider is ready");
                    break;
                }
                tracing::trace!("AI provider not ready yet");
            }
        });

        readiness.poller = Some(poller);
        readiness
    }

    /// Not ready until the returned signal fires
    pub fn manual() -> (ReadinessSignal, Self) {
        let (tx, rx) = watch::channel(false);
        (
            ReadinessSignal { tx: Arc::new(tx) },
            Self { rx, poller: None },
        )
    }

    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Run `callback` once the provider becomes ready, immediately if it
    /// already is.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_ready() {
            callback();
            return;
        }

        let mut rx = self.rx.clone();
        tokio::spawn(async move {
            if rx.wait_for(|ready| *ready).await.is_ok() {
                callback();
            }
        });
    }

}

#[cfg(test)]
impl ProviderReadiness {
    /// Ready from the start
    pub fn ready() -> Self {
        let (signal, readiness) = Self::manual();
        signal.mark_ready();
        readiness
    }

    /// Whether a polling task is still running
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Resolves once ready. Never resolves if polling is cancelled first.
    pub async fn wait_ready(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|ready| *ready).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Drop for ProviderReadiness {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}
