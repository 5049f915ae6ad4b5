//! Turns raw login request data into a normalized [`LoginAttempt`].
//!
//! Classification is total: every missing or malformed input maps to a
//! documented fallback, so this module never fails and never panics.

use std::net::SocketAddr;

use axum::http::HeaderMap;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::{Browser, DeviceType, LoginAttempt, Os};

/// Raw, untrusted inputs of a single login event.
#[derive(Debug, Clone, Default)]
pub struct RawLogin {
    /// Username as submitted, unvalidated.
    pub username: Option<String>,
    /// Caller-supplied ISO-8601 timestamp string, if any.
    pub timestamp: Option<String>,
    /// IP the caller claims for itself, untrusted.
    pub client_ip: Option<String>,
    /// Explicit user-agent override; the request header is used when absent.
    pub user_agent: Option<String>,
    pub success: bool,
    pub note: String,
}

/// Build a complete [`LoginAttempt`] from raw request data.
///
/// The user-agent is taken from `raw` when present, otherwise from the
/// `User-Agent` header. A missing or unparseable caller timestamp falls back
/// to the current time.
pub fn classify(raw: RawLogin, headers: &HeaderMap, peer: Option<SocketAddr>) -> LoginAttempt {
    let user_agent = raw.user_agent.or_else(|| header_str(headers, "user-agent"));
    let (device_type, browser, os) = match user_agent.as_deref() {
        Some(ua) if !ua.is_empty() => parse_user_agent(ua),
        _ => (DeviceType::Unknown, Browser::Unknown, Os::Unknown),
    };

    LoginAttempt {
        username: raw.username,
        timestamp: parse_timestamp(raw.timestamp.as_deref()),
        server_ip: observed_ip(headers, peer),
        client_ip: raw.client_ip,
        user_agent,
        device_type,
        browser,
        os,
        success: raw.success,
        note: raw.note,
    }
}

/// Resolve the server-observed client IP.
///
/// Precedence is fixed: first comma-separated token of `X-Forwarded-For`
/// (trimmed) → `X-Real-IP` → transport peer address → `"unknown"`.
pub fn observed_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        return forwarded
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
    }
    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        return real_ip.trim().to_string();
    }
    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

/// Derive device, browser, and OS families from a user-agent string.
///
/// Case-insensitive substring rules, first match wins. The Chrome/Edge and
/// Safari/Chrome exclusions mirror how those browsers embed each other's
/// tokens in their user-agent strings.
pub fn parse_user_agent(user_agent: &str) -> (DeviceType, Browser, Os) {
    let ua = user_agent.to_lowercase();

    let device_type = if ua.contains("mobile") || ua.contains("android") || ua.contains("iphone") {
        DeviceType::Mobile
    } else if ua.contains("tablet") || ua.contains("ipad") {
        DeviceType::Tablet
    } else {
        DeviceType::Desktop
    };

    let browser = if ua.contains("chrome") && !ua.contains("edge") {
        Browser::Chrome
    } else if ua.contains("firefox") {
        Browser::Firefox
    } else if ua.contains("safari") && !ua.contains("chrome") {
        Browser::Safari
    } else if ua.contains("edge") {
        Browser::Edge
    } else {
        Browser::Unknown
    };

    let os = if ua.contains("windows") {
        Os::Windows
    } else if ua.contains("mac") {
        Os::MacOs
    } else if ua.contains("linux") {
        Os::Linux
    } else if ua.contains("android") {
        Os::Android
    } else if ua.contains("ios") {
        Os::Ios
    } else {
        Os::Unknown
    };

    (device_type, browser, os)
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    match raw {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                // Offset-less ISO strings are taken as UTC.
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
            })
            .unwrap_or_else(|_| Utc::now()),
        None => Utc::now(),
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    #[test]
    fn classifies_chrome_on_windows_desktop() {
        let (device, browser, os) = parse_user_agent(CHROME_DESKTOP);
        assert_eq!(device, DeviceType::Desktop);
        assert_eq!(browser, Browser::Chrome);
        assert_eq!(os, Os::Windows);
    }

    #[test]
    fn edge_exclusion_beats_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 Chrome/91.0 Edge/91.0";
        let (_, browser, _) = parse_user_agent(ua);
        assert_eq!(browser, Browser::Edge);
    }

    #[test]
    fn safari_requires_absence_of_chrome() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/14.1 Safari/605.1.15";
        let (device, browser, os) = parse_user_agent(ua);
        assert_eq!(device, DeviceType::Desktop);
        assert_eq!(browser, Browser::Safari);
        assert_eq!(os, Os::MacOs);
    }

    #[test]
    fn firefox_on_linux() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0";
        let (_, browser, os) = parse_user_agent(ua);
        assert_eq!(browser, Browser::Firefox);
        assert_eq!(os, Os::Linux);
    }

    #[test]
    fn ipad_is_a_tablet() {
        let ua = "Mozilla/5.0 (iPad; CPU OS 14_6 like Mac OS X) AppleWebKit/605.1.15";
        let (device, _, _) = parse_user_agent(ua);
        assert_eq!(device, DeviceType::Tablet);
    }

    #[test]
    fn os_rules_apply_in_order() {
        // An Android user-agent also contains "linux"; the linux rule fires
        // first. Same for iPhone strings containing "mac".
        let android = "Mozilla/5.0 (Linux; Android 10; SM-G975F) Chrome/91.0 Mobile Safari/537.36";
        let (device, browser, os) = parse_user_agent(android);
        assert_eq!(device, DeviceType::Mobile);
        assert_eq!(browser, Browser::Chrome);
        assert_eq!(os, Os::Linux);

        let (_, _, os) = parse_user_agent("some client on android without the l-word");
        assert_eq!(os, Os::Android);
    }

    #[test]
    fn empty_user_agent_yields_unknowns() {
        let attempt = classify(RawLogin::default(), &HeaderMap::new(), None);
        assert_eq!(attempt.device_type, DeviceType::Unknown);
        assert_eq!(attempt.browser, Browser::Unknown);
        assert_eq!(attempt.os, Os::Unknown);
        assert_eq!(attempt.server_ip, "unknown");
        assert_eq!(attempt.user_agent, None);
    }

    #[test]
    fn forwarded_for_takes_first_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.9"));
        assert_eq!(observed_ip(&headers, None), "203.0.113.5");
    }

    #[test]
    fn real_ip_then_peer_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.9"));
        assert_eq!(observed_ip(&headers, None), "192.0.2.9");

        let peer: SocketAddr = "198.51.100.3:44312".parse().unwrap();
        assert_eq!(observed_ip(&HeaderMap::new(), Some(peer)), "198.51.100.3");
        assert_eq!(observed_ip(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn caller_timestamp_is_normalized_to_utc() {
        let raw = RawLogin {
            timestamp: Some("2025-03-14T09:26:53.000123+02:00".to_string()),
            ..Default::default()
        };
        let attempt = classify(raw, &HeaderMap::new(), None);
        assert_eq!(
            attempt.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            "2025-03-14T07:26:53.000123Z"
        );
    }

    #[test]
    fn malformed_timestamp_falls_back_to_now() {
        let before = Utc::now();
        let raw = RawLogin {
            timestamp: Some("not-a-date".to_string()),
            ..Default::default()
        };
        let attempt = classify(raw, &HeaderMap::new(), None);
        assert!(attempt.timestamp >= before);
    }
}
