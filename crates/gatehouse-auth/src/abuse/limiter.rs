//! In-memory fixed-window request counter.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-key window state.
#[derive(Debug, Clone, Copy)]
struct Window {
    /// Requests counted in the current window.
    count: u32,
    /// When the current window opened.
    started: Instant,
}

/// Counts requests per key over a fixed window.
///
/// State lives in process memory only: counters reset on restart and
/// are not shared between instances. Windows are fixed, not sliding; a
/// key's window opens on its first request and resets wholesale once
/// the window length has elapsed.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    /// Window length.
    window: Duration,
    /// Maximum requests per key per window.
    max_requests: u32,
    /// Per-key counters.
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    /// Creates a limiter with the given window and per-window cap.
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records a request for `key` and reports whether it is within the
    /// cap. Expired entries for other keys are pruned opportunistically.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        windows.retain(|_, w| now.duration_since(w.started) < self.window);

        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        window.count += 1;
        window.count <= self.max_requests
    }

    /// Seconds until the key's current window resets. Zero when the key
    /// has no open window.
    pub fn retry_after_seconds(&self, key: &str) -> u64 {
        let windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        windows
            .get(key)
            .map(|w| {
                self.window
                    .saturating_sub(w.started.elapsed())
                    .as_secs()
            })
            .unwrap_or(0)
    }
}
