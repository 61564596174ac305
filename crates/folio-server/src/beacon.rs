use std::time::Duration;

use tracing::debug;
use url::Url;

use folio_core::beacon::{beacon_url, build_beacon_query};

const BEACON_TIMEOUT_SECONDS: u64 = 5;

/// Best-effort sender for tracking beacons.
///
/// [`Beacon::track`] never blocks the caller and never reports failure:
/// delivery runs on a spawned task, or on a detached thread when no tokio
/// runtime is available, and every error is logged at debug level and dropped.
#[derive(Clone)]
pub struct Beacon {
    client: reqwest::Client,
    endpoint: Url,
    page_url: Url,
}

impl Beacon {
    /// `endpoint` is the tracking route, `page_url` the page being reported on.
    pub fn new(endpoint: Url, page_url: Url) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(BEACON_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            page_url,
        }
    }

    /// Same endpoint and client, different page.
    pub fn for_page(&self, page_url: Url) -> Self {
        Self {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            page_url,
        }
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Fire one beacon for `event_type` on the current page.
    pub fn track(&self, event_type: &str, event_label: Option<&str>) {
        let params = build_beacon_query(&self.page_url, event_type, event_label);
        let url = beacon_url(&self.endpoint, &params);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            deliver_blocking(url);
            return;
        };
        let client = self.client.clone();
        runtime.spawn(async move {
            if let Err(e) = deliver(&client, url).await {
                debug!(error = %e, "Tracking beacon failed");
            }
        });
    }
}

async fn deliver(client: &reqwest::Client, url: Url) -> Result<(), reqwest::Error> {
    client.post(url).send().await?.error_for_status()?;
    Ok(())
}

/// Fallback for callers outside a runtime: one plain request on its own thread.
fn deliver_blocking(url: Url) {
    let spawned = std::thread::Builder::new()
        .name("folio-beacon".to_string())
        .spawn(move || {
            let agent = ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(BEACON_TIMEOUT_SECONDS))
                .build();
            if let Err(e) = agent.post(url.as_str()).call() {
                debug!(error = %e, "Tracking beacon fallback failed");
            }
        });
    if let Err(e) = spawned {
        debug!(error = %e, "Tracking beacon thread not started");
    }
}
