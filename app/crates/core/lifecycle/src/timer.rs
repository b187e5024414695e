//! Sleeping between funding checks

use std::time::Duration;

use async_trait::async_trait;

/// Something that can wait for a while
#[async_trait(?Send)]
pub trait Sleep {
    /// Resolve after `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real timer: `setTimeout` in the browser, tokio elsewhere
///
/// Natively this needs a tokio runtime with the time driver enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timer;

#[async_trait(?Send)]
impl Sleep for Timer {
    async fn sleep(&self, duration: Duration) {
        #[cfg(target_arch = "wasm32")]
        gloo_timers::future::sleep(duration).await;
        #[cfg(not(target_arch = "wasm32"))]
        tokio::time::sleep(duration).await;
    }
}
