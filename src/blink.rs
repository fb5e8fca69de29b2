//! Cursor blink timer
//!
//! The blink timer is the only background activity around the event engine.
//! It owns a visibility flag and tells the render loop to repaint through a
//! one-way callback. It never touches the dispatcher.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Toggles cursor visibility at a fixed interval on its own thread
#[derive(Debug)]
pub struct CursorBlink {
    interval: Duration,
    visible: Arc<Mutex<bool>>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CursorBlink {
    /// Start blinking; `mark_dirty` runs after every toggle
    pub fn start<F>(interval: Duration, mark_dirty: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let visible = Arc::new(Mutex::new(true));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let flag = visible.clone();
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    match flag.lock() {
                        Ok(mut visible) => *visible = !*visible,
                        Err(e) => {
                            log::warn!("cursor visibility lock poisoned: {e}");
                            break;
                        }
                    }
                    mark_dirty();
                }
                // Stop requested or the owner is gone
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            interval,
            visible,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the cursor is currently drawn
    pub fn is_visible(&self) -> bool {
        self.visible.lock().map(|visible| *visible).unwrap_or(true)
    }

    /// Force the cursor visible, e.g. after a key press
    pub fn show(&self) {
        if let Ok(mut visible) = self.visible.lock() {
            *visible = true;
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the timer and wait for its thread to exit
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The thread may already have exited on a poisoned lock
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("cursor blink thread panicked");
            }
        }
    }
}

impl Drop for CursorBlink {
    fn drop(&mut self) {
        self.stop();
    }
}
