use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{error::CoreError, visitor::ClientIdPolicy};

pub const DEFAULT_EVENT_TYPE: &str = "page_view";

/// Query keys that steer the tracker itself and never count as attribution.
pub const CONTROL_KEYS: [&str; 3] = ["event", "event_label", "path"];

pub const UTM_KEYS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
];

/// UTM-style record describing how a visitor arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
}

/// One tracked interaction, built fresh per request and written to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    /// ISO-8601, millisecond precision, UTC.
    pub timestamp: String,
    pub event_type: String,
    pub event_label: Option<String>,
    pub path: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub client_identifier: String,
    pub attribution: Attribution,
}

/// Header-derived facts about the tracking request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Raw `X-Forwarded-For` value.
    pub forwarded_for: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

/// Rebuild the absolute URL of a tracking request from its `Host` header and
/// request target. Fails when the pair does not form a valid URL.
pub fn request_url(host: Option<&str>, path_and_query: &str) -> Result<Url, CoreError> {
    let host = host.unwrap_or("localhost");
    Ok(Url::parse(&format!("http://{host}{path_and_query}"))?)
}

/// Ordered, decoded query pairs. Bare keys (`?linkedin`) yield an empty value.
pub fn query_pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs().into_owned().collect()
}

/// Value of the first occurrence of `key`.
fn first<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn first_non_empty(query: &[(String, String)], key: &str) -> Option<String> {
    first(query, key)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read the five `utm_*` parameters, then fall back to the first bare marker
/// for `source` when no explicit `utm_source` was given.
pub fn extract_attribution(query: &[(String, String)]) -> Attribution {
    let mut attribution = Attribution {
        source: first_non_empty(query, "utm_source"),
        medium: first_non_empty(query, "utm_medium"),
        campaign: first_non_empty(query, "utm_campaign"),
        term: first_non_empty(query, "utm_term"),
        content: first_non_empty(query, "utm_content"),
    };
    if attribution.source.is_none() {
        attribution.source = bare_marker(query).map(str::to_string);
    }
    attribution
}

/// First key present with an empty value that is neither a control key nor a
/// `utm_*` parameter, e.g. `linkedin` in `?linkedin&event=page_view`.
pub fn bare_marker(query: &[(String, String)]) -> Option<&str> {
    query
        .iter()
        .find(|(k, v)| {
            v.is_empty()
                && !k.is_empty()
                && !CONTROL_KEYS.contains(&k.as_str())
                && !UTM_KEYS.contains(&k.as_str())
        })
        .map(|(k, _)| k.as_str())
}

/// Derive an [`AnalyticsEvent`] from a tracking request.
///
/// `request_path` is used when the caller did not send a `path` parameter.
pub fn tag_event(
    query: &[(String, String)],
    request_path: &str,
    ctx: &RequestContext,
    policy: ClientIdPolicy,
    now: DateTime<Utc>,
) -> AnalyticsEvent {
    let client_ip = crate::visitor::client_ip_from_forwarded_for(ctx.forwarded_for.as_deref());

    AnalyticsEvent {
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        event_type: first_non_empty(query, "event")
            .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
        event_label: first_non_empty(query, "event_label"),
        path: first_non_empty(query, "path").unwrap_or_else(|| request_path.to_string()),
        referrer: ctx.referrer.clone(),
        user_agent: ctx.user_agent.clone(),
        client_identifier: policy.apply(&client_ip),
        attribution: extract_attribution(query),
    }
}
