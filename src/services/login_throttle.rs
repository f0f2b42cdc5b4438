use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

// Opportunistic cleanup threshold: once the key map grows past this many
// entries, expired windows are swept on the next check.
const SWEEP_THRESHOLD: usize = 1024;

struct Window {
    started_at: Instant,
    attempts: u32,
}

/// Fixed-window rate limiter for the sign-in endpoint, keyed by client
/// identity. Each key gets `max_attempts` per `window`; the counter resets
/// when the window elapses. Keys never interfere with each other.
pub struct LoginThrottle {
    window: Duration,
    max_attempts: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl LoginThrottle {
    pub fn new(window: Duration, max_attempts: u32) -> Self {
        Self {
            window,
            max_attempts,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records an attempt for `key` and returns whether it is allowed.
    /// The first `max_attempts` calls in a window pass; the rest are denied
    /// until the window rolls over.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if windows.len() > SWEEP_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started_at) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            attempts: 0,
        });

        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.attempts = 0;
        }

        if entry.attempts >= self.max_attempts {
            return false;
        }

        entry.attempts += 1;
        true
    }
}
