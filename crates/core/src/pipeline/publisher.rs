//! Debounced delivery of the aggregate gallery status.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::debug;

use super::types::GalleryStatus;

/// Callback receiving aggregate status updates.
pub type StatusCallback = Arc<dyn Fn(GalleryStatus) + Send + Sync>;

/// Coalesces bursts of status changes into single notifications.
///
/// Each change restarts the quiet window; the latest status is delivered once
/// the window elapses without further changes. Consecutive identical statuses
/// are delivered once. After [`shutdown`](Self::shutdown) the pending window is
/// cancelled and the callback is never invoked again.
pub struct StatusPublisher {
    tx: watch::Sender<GalleryStatus>,
    shutdown_tx: broadcast::Sender<()>,
    closed: Arc<AtomicBool>,
}

impl StatusPublisher {
    /// Spawns the debounce task. Must be called within a Tokio runtime.
    pub fn spawn(window: Duration, callback: StatusCallback) -> Self {
        let (tx, rx) = watch::channel(GalleryStatus::default());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(run(rx, shutdown_rx, window, callback, Arc::clone(&closed)));

        Self {
            tx,
            shutdown_tx,
            closed,
        }
    }

    /// Records a new status and restarts the quiet window.
    pub fn notify(&self, status: GalleryStatus) {
        if self.is_closed() {
            return;
        }
        self.tx.send_replace(status);
    }

    /// Cancels any pending notification and stops the task.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for StatusPublisher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run(
    mut rx: watch::Receiver<GalleryStatus>,
    mut shutdown_rx: broadcast::Receiver<()>,
    window: Duration,
    callback: StatusCallback,
    closed: Arc<AtomicBool>,
) {
    let mut last_delivered: Option<GalleryStatus> = None;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        // Wait for the burst to settle; any change restarts the window.
        let settled = loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break false,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break true;
                    }
                }
                _ = tokio::time::sleep(window) => break true,
            }
        };
        if !settled || closed.load(Ordering::SeqCst) {
            break;
        }

        let status = rx.borrow_and_update().clone();
        if last_delivered.as_ref() == Some(&status) {
            continue;
        }
        callback(status.clone());
        last_delivered = Some(status);
    }

    debug!("Status publisher stopped");
}
