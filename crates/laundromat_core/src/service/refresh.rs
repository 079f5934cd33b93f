//! Periodic order status refresh timer.
//!
//! # Responsibility
//! - Emit a tick every interval while the owning view is alive.
//! - Keep all order state on the owner's thread; the timer thread only counts.
//!
//! # Invariants
//! - Dropping or stopping the ticker ends the timer thread.
//! - Ticks that were not drained yet are coalesced by the receiver.

use log::debug;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Interval between status re-evaluations while the order view is active.
pub const ORDER_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Recurring timer owned by an order view.
pub struct RefreshTicker {
    ticks: Receiver<()>,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl RefreshTicker {
    /// Starts a ticker with the default 30 second interval.
    pub fn start() -> std::io::Result<Self> {
        Self::with_interval(ORDER_REFRESH_INTERVAL)
    }

    /// Starts a ticker that fires every `interval`.
    ///
    /// # Errors
    /// - Returns an error when the timer thread cannot be spawned.
    pub fn with_interval(interval: Duration) -> std::io::Result<Self> {
        let (tick_tx, tick_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let worker = thread::Builder::new()
            .name("order-refresh".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tick_tx.send(()).is_err() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        debug!(
            "event=refresh_timer module=refresh status=start interval_ms={}",
            interval.as_millis()
        );
        Ok(Self {
            ticks: tick_rx,
            stop: Some(stop_tx),
            worker: Some(worker),
        })
    }

    /// Drains pending ticks and returns how many fired since the last call.
    pub fn take_ticks(&self) -> usize {
        self.ticks.try_iter().count()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stops the timer thread and waits for it to exit.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            debug!("event=refresh_timer module=refresh status=stop");
        }
    }
}

impl Drop for RefreshTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::RefreshTicker;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn ticker_fires_and_stops() {
        let mut ticker = RefreshTicker::with_interval(Duration::from_millis(5)).unwrap();
        thread::sleep(Duration::from_millis(60));
        assert!(ticker.take_ticks() >= 1);

        ticker.stop();
        assert!(!ticker.is_running());
        ticker.take_ticks();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticker.take_ticks(), 0);
    }

    #[test]
    fn no_ticks_before_first_interval() {
        let ticker = RefreshTicker::with_interval(Duration::from_secs(60)).unwrap();
        assert_eq!(ticker.take_ticks(), 0);
    }
}
