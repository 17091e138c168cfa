use std::time::Duration;

/// Suspends the current task without blocking the event loop.
pub async fn pause(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    sleep(duration).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}
