//! Runtime seam for running task bodies and deferred admission passes.

use std::future::Future;

/// Abstraction for spawning work on a runtime.
///
/// The queue never blocks on a spawned future; it only requires that the
/// future is eventually polled to completion.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
