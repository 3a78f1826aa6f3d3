//! Exponential backoff shared by the HTTP providers

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::Result;

/// Run `operation` up to `max_retries + 1` times, sleeping 1s, 2s, 4s... between attempts
pub async fn retry_request<F, Fut, T>(max_retries: u32, what: &str, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_retries => {
                let delay = Duration::from_secs(2u64.pow(attempt));
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}, retrying in {:?}",
                    what,
                    attempt + 1,
                    max_retries + 1,
                    e,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
