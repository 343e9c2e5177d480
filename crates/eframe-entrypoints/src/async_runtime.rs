//! Cross-platform background tasks
//!
//! UI code never awaits. It spawns a detached future that reports back through
//! a channel the UI polls each frame.
//!
//! On native the future runs on the tokio runtime created by `run_native`. On
//! web it runs on the JavaScript event loop via `wasm-bindgen-futures`, which
//! does not require `Send`.

use std::future::Future;

/// Spawn a future whose output nobody waits for.
///
/// Returns `false` when no runtime is available and the future was dropped.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F) -> bool
where
    F: Future<Output = ()> + Send + 'static,
{
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        tracing::error!(
            task = std::any::type_name::<F>(),
            "No async runtime on this thread, task dropped"
        );
        return false;
    };

    #[cfg(feature = "profiling")]
    {
        handle.spawn(async move {
            profiling::scope!("async_runtime::spawn_detached");
            future.await
        });
    }
    #[cfg(not(feature = "profiling"))]
    {
        handle.spawn(future);
    }
    true
}

/// Spawn a future whose output nobody waits for.
///
/// Always succeeds on web since the browser event loop is always present.
#[cfg(target_arch = "wasm32")]
pub fn spawn_detached<F>(future: F) -> bool
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
    true
}

/// Check if we're running inside a tokio runtime context (native only).
#[cfg(not(target_arch = "wasm32"))]
pub fn in_runtime_context() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

/// On web tasks run on the JS event loop, so there is always a context.
#[cfg(target_arch = "wasm32")]
pub fn in_runtime_context() -> bool {
    true
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn test_spawn_without_runtime_is_rejected() {
        assert!(!in_runtime_context());
        assert!(!spawn_detached(async {}));
    }

    #[test]
    fn test_spawn_inside_runtime_runs() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let received = rt.block_on(async {
            assert!(in_runtime_context());
            let (tx, rx) = oneshot::channel();
            assert!(spawn_detached(async move {
                let _ = tx.send(42);
            }));
            rx.await.unwrap()
        });

        assert_eq!(received, 42);
    }
}
