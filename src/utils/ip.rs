//! Client IP extraction
//!
//! The service is expected to sit behind a reverse proxy, so the
//! forwarded headers are the source of truth: first entry of
//! `X-Forwarded-For`, then `X-Real-IP`.

use actix_web::http::header::HeaderMap;

/// Extract the forwarded client IP from request headers
pub fn extract_forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let map = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1, 10.0.0.2")]);
        assert_eq!(extract_forwarded_ip(&map).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let map = headers(&[("x-real-ip", "198.51.100.4")]);
        assert_eq!(extract_forwarded_ip(&map).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_forwarded_for_preferred_over_real_ip() {
        let map = headers(&[
            ("x-forwarded-for", "203.0.113.7"),
            ("x-real-ip", "198.51.100.4"),
        ]);
        assert_eq!(extract_forwarded_ip(&map).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_no_headers() {
        assert_eq!(extract_forwarded_ip(&HeaderMap::new()), None);
    }
}
