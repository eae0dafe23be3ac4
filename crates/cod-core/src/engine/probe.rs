//! Readiness probing: poll a freshly-started container until it answers.

use std::time::Duration;

use log::debug;

const PROBE_ATTEMPTS: u32 = 10;
const PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// Polls `http://endpoint/` until it answers with a `2xx`, matching the Go
/// source's `waitForAvailableViaHttp`: 10 attempts, 1 second apart,
/// connection errors and non-2xx both count as "not yet".
pub async fn wait_until_ready(client: &reqwest::Client, endpoint: &str) -> bool {
    let url = format!("http://{endpoint}/");
    for attempt in 1..=PROBE_ATTEMPTS {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => return true,
            Ok(resp) => debug!(
                "probe attempt {attempt}/{PROBE_ATTEMPTS} for {url} got status {}",
                resp.status()
            ),
            Err(e) => debug!("probe attempt {attempt}/{PROBE_ATTEMPTS} for {url} failed: {e}"),
        }
        if attempt < PROBE_ATTEMPTS {
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }
    false
}
