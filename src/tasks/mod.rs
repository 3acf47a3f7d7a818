//! Background Tasks Module
//!
//! Deferred work for the cache, run cooperatively on the current `LocalSet`.
//!
//! # Tasks
//! - Deferred: one-shot follow-up work queued behind the current call
//! - Expiry timer: the single wake-up armed for the earliest expiry

mod deferred;
mod timer;

pub use deferred::defer;
pub use timer::ExpiryTimer;
