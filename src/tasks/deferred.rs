//! Deferred Work
//!
//! Queues a closure to run on the next scheduler tick of the current
//! `LocalSet`, after the calling code has returned.

use tokio::task::JoinHandle;

/// Spawns `task` as local follow-up work.
///
/// The closure runs on the same thread as the caller, never concurrently with
/// it. There is no cancellation: the task must re-read whatever state it
/// touches when it runs.
///
/// # Panics
/// Panics if called outside of a `LocalSet`.
pub fn defer<F>(task: F) -> JoinHandle<()>
where
    F: FnOnce() + 'static,
{
    tokio::task::spawn_local(async move { task() })
}
