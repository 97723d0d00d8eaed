//! Clip record types.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Engine-assigned surrogate key of a stored clip.
pub type ClipId = i64;

/// A saved web page as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippedPage {
    pub id: ClipId,
    pub title: String,
    pub url: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub word_count: u32,
    pub reading_time: u32,
}

/// A page to be clipped, as supplied by the capture side.
///
/// Has no id and no derived fields; the store assigns and computes those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClip {
    pub title: String,
    pub url: String,
    pub content: String,
    /// Creation instant. Defaults to the time of the write when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewClip {
    /// Create a clip without an explicit timestamp.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            timestamp: None,
        }
    }

    /// Set an explicit creation instant.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Format a timestamp the way it is persisted (RFC 3339, millis, `Z`).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Offset-less layouts older stores may hold; read as UTC.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a persisted timestamp.
///
/// Accepts RFC 3339, and ISO-8601 date-times without an offset (`T` or
/// space separated), which are taken to be UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let rfc3339_err = match DateTime::parse_from_rfc3339(s) {
        Ok(ts) => return Ok(ts.with_timezone(&Utc)),
        Err(e) => e,
    };
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or(rfc3339_err)
}

/// Order clips for display: newest first, later ids first on equal timestamps.
pub fn sort_newest_first(pages: &mut [ClippedPage]) {
    pages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page(id: ClipId, secs: i64) -> ClippedPage {
        ClippedPage {
            id,
            title: format!("page {id}"),
            url: format!("http://example.com/{id}"),
            content: String::new(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            word_count: 0,
            reading_time: 0,
        }
    }

    #[test]
    fn test_timestamp_format_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        let formatted = format_timestamp(&ts);
        assert_eq!(formatted, "2024-03-01T12:30:45.000Z");
        assert_eq!(parse_timestamp(&formatted).unwrap(), ts);
    }

    #[test]
    fn test_parse_accepts_offsets() {
        let parsed = parse_timestamp("2024-03-01T14:30:45+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap());
    }

    #[test]
    fn test_parse_offsetless_timestamps_as_utc() {
        let expected = Utc.with_ymd_and_hms(2023, 11, 2, 9, 15, 0).unwrap();
        assert_eq!(parse_timestamp("2023-11-02T09:15:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-11-02 09:15:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2023-11-02T09:15:00.250").unwrap(),
            expected + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2023-11-02").is_err());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut pages = vec![page(1, 100), page(2, 300), page(3, 200), page(4, 300)];
        sort_newest_first(&mut pages);
        let ids: Vec<_> = pages.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(page(7, 0)).unwrap();
        assert!(json.get("wordCount").is_some());
        assert!(json.get("readingTime").is_some());
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn test_new_clip_timestamp_is_optional() {
        let clip: NewClip =
            serde_json::from_str(r#"{"title":"A","url":"http://x","content":""}"#).unwrap();
        assert_eq!(clip.timestamp, None);
    }
}
