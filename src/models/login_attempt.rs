use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A classified login attempt, the unit of the audit log.
///
/// Serialized with camelCase field names in both backends and on the wire.
/// Unknown fields (such as Mongo's `_id`) are ignored on deserialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginAttempt {
    /// Username as submitted; may be absent or empty.
    pub username: Option<String>,

    /// When the attempt happened (UTC). Stored as a fixed-width RFC 3339
    /// string with microsecond precision so that lexicographic order equals
    /// chronological order.
    #[serde(with = "iso_micros")]
    pub timestamp: DateTime<Utc>,

    /// IP the server observed after proxy-header resolution.
    pub server_ip: String,

    /// IP the caller claimed for itself, stored verbatim.
    pub client_ip: Option<String>,

    /// Raw User-Agent header.
    pub user_agent: Option<String>,

    pub device_type: DeviceType,
    pub browser: Browser,
    pub os: Os,

    /// Whether the credentials checked out.
    pub success: bool,

    /// Human-readable outcome, e.g. "Login successful".
    pub note: String,
}

/// Device class derived from the User-Agent header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

/// Browser family derived from the User-Agent header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Unknown,
}

/// Operating system family derived from the User-Agent header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Os {
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
    Android,
    #[serde(rename = "iOS")]
    Ios,
    Unknown,
}

/// Fixed-width RFC 3339 timestamp serialization.
///
/// Width matters: MongoDB sorts these as plain strings, and the file backend
/// compares them directly, so every value must serialize to the same length.
mod iso_micros {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
