//! Runtime - spawning local (non-`Send`) tasks on the host event loop

use std::future::Future;

/// Spawn a task on the browser event loop.
#[cfg(feature = "wasm")]
pub fn spawn_local<F>(task: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(task);
}

/// Spawn a task on the enclosing tokio `LocalSet`.
///
/// Panics outside a `LocalSet`, like `tokio::task::spawn_local`.
#[cfg(all(feature = "native", not(feature = "wasm")))]
pub fn spawn_local<F>(task: F)
where
    F: Future<Output = ()> + 'static,
{
    drop(tokio::task::spawn_local(task));
}
