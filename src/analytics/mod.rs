//! Engagement tracking value types
//!
//! The event tags, per-entity stat names and the client context
//! extractor. The closed event set doubles as the persistence contract:
//! rows in `analytics_events` carry exactly these strings.

use actix_web::http::header::HeaderMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

use crate::utils::ip::extract_forwarded_ip;

/// One tracked interaction type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    PageView,
    ProductView,
    ProductLike,
    ProductShare,
    ProductContact,
    GalleryView,
    GalleryLike,
    GalleryShare,
    ReviewSubmit,
    ContactForm,
    WhatsappClick,
    StoreVisit,
    FirstVisit,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// Denormalized counters on a product row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductStat {
    Views,
    Likes,
    Contacts,
    Shares,
}

/// Denormalized counters on a gallery image row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GalleryStat {
    Views,
    Likes,
}

/// Derived client context attached to every tracked event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: String,
    pub ip_hash: String,
}

/// Optional fields for one event row
#[derive(Debug, Clone, Default)]
pub struct TrackOptions {
    pub product_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub user_agent: Option<String>,
    pub ip_hash: Option<String>,
}

/// Salted one-way hash of a client IP, hex, truncated to 16 chars.
/// The raw address never leaves this function.
pub fn hash_ip(ip: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..16].to_string()
}

/// Derive client context from request headers
///
/// Never fails: missing headers degrade to the placeholder "Unknown"
/// (which still hashes, so header-less clients share one bucket).
pub fn client_info(headers: &HeaderMap, salt: &str) -> ClientInfo {
    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("Unknown")
        .to_string();

    let ip = extract_forwarded_ip(headers).unwrap_or_else(|| "Unknown".to_string());

    ClientInfo {
        user_agent,
        ip_hash: hash_ip(&ip, salt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};
    use strum::IntoEnumIterator;

    #[test]
    fn test_event_kind_serde_round_trip() {
        for kind in EventKind::iter() {
            let json = serde_json::to_string(&kind).unwrap();
            let back: EventKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, back);
        }
    }

    #[test]
    fn test_event_kind_tags() {
        assert_eq!(EventKind::PageView.as_str(), "page_view");
        assert_eq!(EventKind::WhatsappClick.as_str(), "whatsapp_click");
        assert_eq!(EventKind::FirstVisit.as_str(), "first_visit");
    }

    #[test]
    fn test_unknown_event_rejected() {
        let result: Result<EventKind, _> = serde_json::from_str("\"page_scrolled\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_hash_ip_deterministic() {
        let a = hash_ip("203.0.113.7", "salt");
        let b = hash_ip("203.0.113.7", "salt");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, "203.0.113.7");
    }

    #[test]
    fn test_hash_ip_salt_changes_output() {
        assert_ne!(hash_ip("203.0.113.7", "a"), hash_ip("203.0.113.7", "b"));
    }

    #[test]
    fn test_client_info_defaults() {
        let info = client_info(&HeaderMap::new(), "salt");
        assert_eq!(info.user_agent, "Unknown");
        assert_eq!(info.ip_hash, hash_ip("Unknown", "salt"));
    }

    #[test]
    fn test_client_info_reads_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("user-agent"),
            HeaderValue::from_static("Mozilla/5.0"),
        );
        headers.insert(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let info = client_info(&headers, "salt");
        assert_eq!(info.user_agent, "Mozilla/5.0");
        assert_eq!(info.ip_hash, hash_ip("203.0.113.7", "salt"));
    }

    #[test]
    fn test_stat_names() {
        assert_eq!(ProductStat::Contacts.as_ref(), "contacts");
        assert_eq!(GalleryStat::Likes.as_ref(), "likes");
    }
}
