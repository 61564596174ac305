use sha2::{Digest, Sha256};

/// Sentinel recorded when no `X-Forwarded-For` header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// How the forwarded client address is recorded on an analytics event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientIdPolicy {
    /// Salted SHA-256 prefix of the address (see [`hash_client_ip`]).
    #[default]
    Hashed,
    /// The forwarded address verbatim.
    Raw,
}

impl ClientIdPolicy {
    /// Derive the recorded client identifier from a forwarded address.
    ///
    /// The [`UNKNOWN_CLIENT`] sentinel passes through untouched under either
    /// policy so "no header" stays distinguishable from a real address.
    pub fn apply(self, client_ip: &str) -> String {
        if client_ip == UNKNOWN_CLIENT {
            return UNKNOWN_CLIENT.to_string();
        }
        match self {
            ClientIdPolicy::Raw => client_ip.to_string(),
            ClientIdPolicy::Hashed => hash_client_ip(client_ip),
        }
    }
}

/// First comma-separated entry of an `X-Forwarded-For` value, trimmed.
///
/// Falls back to [`UNKNOWN_CLIENT`] when the header is absent or its first
/// entry is blank.
pub fn client_ip_from_forwarded_for(header: Option<&str>) -> String {
    header
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Compute an anonymised client identifier from an IP address.
///
/// Formula: sha256(salt_epoch + ip)[0..8] encoded as 16 hex chars.
///
/// The salt_epoch = floor(unix_utc_timestamp / 86400) rotates daily at midnight
/// UTC, so the same address maps to a stable identifier within one day only.
pub fn hash_client_ip(ip: &str) -> String {
    let salt_epoch = chrono::Utc::now().timestamp() / 86400;
    let input = format!("{}{}", salt_epoch, ip);
    let hash = Sha256::digest(input.as_bytes());
    // First 8 bytes → 16 hex characters.
    hex::encode(&hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_id_is_16_hex_chars() {
        let id = hash_client_ip("1.2.3.4");
        assert_eq!(id.len(), 16, "client ID must be exactly 16 hex characters");
        assert!(
            id.chars().all(|c| c.is_ascii_hexdigit()),
            "client ID must contain only hex digits"
        );
    }

    #[test]
    fn hashed_id_is_deterministic_within_same_day() {
        let id1 = hash_client_ip("1.2.3.4");
        let id2 = hash_client_ip("1.2.3.4");
        assert_eq!(id1, id2);
        assert_ne!(id1, hash_client_ip("5.6.7.8"));
    }

    #[test]
    fn forwarded_for_takes_first_entry_trimmed() {
        let ip = client_ip_from_forwarded_for(Some("  203.0.113.7 , 10.0.0.1, 10.0.0.2"));
        assert_eq!(ip, "203.0.113.7");
    }

    #[test]
    fn forwarded_for_missing_is_unknown() {
        assert_eq!(client_ip_from_forwarded_for(None), "unknown");
        assert_eq!(client_ip_from_forwarded_for(Some("")), "unknown");
    }

    #[test]
    fn raw_policy_keeps_address() {
        assert_eq!(ClientIdPolicy::Raw.apply("1.2.3.4"), "1.2.3.4");
    }

    #[test]
    fn unknown_sentinel_is_never_hashed() {
        assert_eq!(ClientIdPolicy::Hashed.apply(UNKNOWN_CLIENT), "unknown");
        assert_eq!(ClientIdPolicy::Raw.apply(UNKNOWN_CLIENT), "unknown");
    }

    #[test]
    fn hashed_policy_hides_address() {
        let id = ClientIdPolicy::Hashed.apply("1.2.3.4");
        assert_ne!(id, "1.2.3.4");
        assert_eq!(id, hash_client_ip("1.2.3.4"));
    }
}
