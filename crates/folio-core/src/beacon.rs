//! Query construction for the browser-side tracking beacon.
//!
//! The beacon reports an interaction on the page at `page_url` to the
//! tracking endpoint. Attribution on the page URL is forwarded, and a bare
//! marker such as `?linkedin` is rewritten to `utm_source=linkedin`.

use url::Url;

use crate::event::{extract_attribution, query_pairs};

/// Build the ordered query pairs for one beacon hit.
pub fn build_beacon_query(
    page_url: &Url,
    event_type: &str,
    event_label: Option<&str>,
) -> Vec<(String, String)> {
    let mut params = vec![("event".to_string(), event_type.to_string())];
    if let Some(label) = event_label.filter(|l| !l.is_empty()) {
        params.push(("event_label".to_string(), label.to_string()));
    }
    params.push(("path".to_string(), page_url.path().to_string()));

    let attribution = extract_attribution(&query_pairs(page_url));
    let fields = [
        ("utm_source", attribution.source),
        ("utm_medium", attribution.medium),
        ("utm_campaign", attribution.campaign),
        ("utm_term", attribution.term),
        ("utm_content", attribution.content),
    ];
    params.extend(
        fields
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), v))),
    );
    params
}

/// Absolute tracking URL: `endpoint` with the beacon query attached.
pub fn beacon_url(endpoint: &Url, params: &[(String, String)]) -> Url {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.query_pairs_mut().extend_pairs(params);
    url
}
