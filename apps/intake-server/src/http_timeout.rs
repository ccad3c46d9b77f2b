use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const FALLBACK_HTTP_TIMEOUT_SECS: u64 = 20;

fn default_from_env() -> u64 {
    std::env::var("INTAKE_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(FALLBACK_HTTP_TIMEOUT_SECS)
}

fn global_handle() -> &'static Arc<AtomicU64> {
    static HANDLE: OnceCell<Arc<AtomicU64>> = OnceCell::new();
    HANDLE.get_or_init(|| Arc::new(AtomicU64::new(default_from_env())))
}

/// Seed the global timeout from the environment; returns the applied seconds.
pub fn init_from_env() -> u64 {
    let secs = default_from_env().max(1);
    global_handle().store(secs, Ordering::Relaxed);
    secs
}

pub fn get_secs() -> u64 {
    global_handle().load(Ordering::Relaxed)
}

/// Current timeout as a Duration (at least 1 second).
pub fn get_duration() -> Duration {
    Duration::from_secs(get_secs().max(1))
}
