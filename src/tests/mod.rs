// Tests module
// End-to-end migration runs over full-size state files


use std::sync::{Mutex, MutexGuard};

/// A full state is a few hundred MB in memory and on disk; run those tests
/// one at a time.
static FULL_STATE_LOCK: Mutex<()> = Mutex::new(());

pub fn full_state_guard() -> MutexGuard<'static, ()> {
    FULL_STATE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
