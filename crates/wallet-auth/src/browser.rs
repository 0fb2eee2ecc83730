//! Launching the user's browser.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

/// Opens a URL for the user.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Uses the platform's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        open::that(url)
    }
}

/// Opens `url` on a blocking thread, giving up after `timeout`.
///
/// Returns `true` if the launcher reported success. Failure is never fatal:
/// the URL is logged so the user can open it by hand.
pub(crate) async fn launch(
    browser: Arc<dyn BrowserLauncher>,
    url: String,
    timeout: Duration,
) -> bool {
    let target = url.clone();
    let attempt = tokio::task::spawn_blocking(move || browser.open(&target));

    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(Ok(()))) => {
            info!(url = %url, "opened browser for wallet connection");
            true
        }
        Ok(Ok(Err(e))) => {
            warn!(error = %e, url = %url, "failed to open browser, open the URL manually");
            false
        }
        Ok(Err(e)) => {
            warn!(error = %e, url = %url, "browser launcher panicked, open the URL manually");
            false
        }
        Err(_) => {
            warn!(
                timeout_secs = timeout.as_secs(),
                url = %url,
                "browser launch timed out, open the URL manually"
            );
            false
        }
    }
}
