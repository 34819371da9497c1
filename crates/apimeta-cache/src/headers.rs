//! Response headers kept alongside a cached document.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response headers with case-insensitive (lowercased) names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders(BTreeMap<String, String>);

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `ETag` validator, if any.
    pub fn etag(&self) -> Option<&str> {
        self.get("etag").filter(|v| !v.is_empty())
    }

    /// The `Expires` header as a timestamp.
    ///
    /// Returns `None` when absent or not a valid HTTP-date (`0` and `-1` are
    /// common "already expired" values).
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        let value = self.get("expires")?;
        DateTime::parse_from_rfc2822(value.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whole seconds until `Expires`, negative once it has passed.
    pub fn time_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires()
            .map(|expires| expires.signed_duration_since(now).num_seconds())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// Format a timestamp as an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_case_insensitive() {
        let headers: ResponseHeaders = [("ETag", "\"abc\""), ("Expires", "x")].into_iter().collect();
        assert_eq!(headers.get("etag"), Some("\"abc\""));
        assert_eq!(headers.get("ETAG"), Some("\"abc\""));
        assert_eq!(headers.etag(), Some("\"abc\""));
    }

    #[test]
    fn test_expires_http_date() {
        let headers: ResponseHeaders = [("expires", "Sun, 06 Nov 1994 08:49:37 GMT")].into_iter().collect();
        let expected = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(headers.expires(), Some(expected));

        let now = expected - chrono::TimeDelta::seconds(90);
        assert_eq!(headers.time_left(now), Some(90));
        assert_eq!(headers.time_left(expected + chrono::TimeDelta::seconds(1)), Some(-1));
    }

    #[test]
    fn test_expires_invalid() {
        let headers: ResponseHeaders = [("expires", "-1")].into_iter().collect();
        assert_eq!(headers.expires(), None);
        assert_eq!(ResponseHeaders::new().time_left(Utc::now()), None);
    }

    #[test]
    fn test_http_date_roundtrip() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
        let headers: ResponseHeaders = [("expires", http_date(at))].into_iter().collect();
        assert_eq!(headers.expires(), Some(at));
    }

    #[test]
    fn test_empty_etag_ignored() {
        let headers: ResponseHeaders = [("etag", "")].into_iter().collect();
        assert_eq!(headers.etag(), None);
    }
}
