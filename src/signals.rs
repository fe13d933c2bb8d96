//! Broadcast signal documents: the latest signal and the archive.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::normalize::text;

pub const DEFAULT_EMOJI: &str = "💪";
pub const DEFAULT_TITLE: &str = "Latest Signal";
pub const DEFAULT_RATING: &str = "normal";

/// The single broadcast-style message shown on landing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signal {
    pub emoji: Option<String>,
    pub title: Option<String>,
    /// Kept raw; see `render::signal::summary_markup`.
    pub summary: Option<Value>,
    pub ts_utc: Option<String>,
    pub rating: Option<String>,
    pub tags: Vec<String>,
    pub payload: Option<Value>,
}

impl Signal {
    /// `None` when the document is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            emoji: text(map.get("emoji")),
            title: text(map.get("title")),
            summary: map.get("summary").cloned(),
            ts_utc: text(map.get("ts_utc")),
            rating: text(map.get("rating")),
            tags: tags(map.get("tags")),
            payload: map.get("payload").cloned(),
        })
    }

    pub fn heading(&self) -> String {
        format!(
            "{} {}",
            self.emoji.as_deref().unwrap_or(DEFAULT_EMOJI),
            self.title.as_deref().unwrap_or(DEFAULT_TITLE)
        )
    }

    pub fn rating(&self) -> &str {
        self.rating.as_deref().unwrap_or(DEFAULT_RATING)
    }

    pub fn broadcast_time(&self) -> Option<String> {
        self.ts_utc.as_deref().map(format_timestamp)
    }

    /// `payload.notes`, when it holds something worth showing.
    pub fn notes(&self) -> Option<String> {
        match self.payload.as_ref()?.get("notes")? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// One historical signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveEntry {
    pub id: Option<String>,
    pub origin_emoji: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub ts_utc: Option<String>,
    pub date: Option<String>,
    pub rating: Option<String>,
    pub payload: Option<Value>,
}

impl ArchiveEntry {
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let map = value.as_object().unwrap_or(&empty);
        Self {
            id: map.get("id").and_then(|v| match v {
                Value::Number(n) => Some(n.to_string()),
                other => text(Some(other)),
            }),
            origin_emoji: text(map.get("origin").and_then(|o| o.get("emoji"))),
            title: text(map.get("title")),
            summary: text(map.get("summary")),
            ts_utc: text(map.get("ts_utc")),
            date: text(map.get("date")),
            rating: text(map.get("rating")),
            payload: map.get("payload").filter(|p| !p.is_null()).cloned(),
        }
    }

    pub fn heading(&self) -> String {
        let name = self
            .title
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or_default();
        match &self.origin_emoji {
            Some(emoji) => format!("{} {}", emoji, name),
            None => name.to_string(),
        }
    }

    /// `"<time> — <rating>"`, where time falls back to `date`.
    pub fn meta_line(&self) -> String {
        let ts = match (&self.ts_utc, &self.date) {
            (Some(ts), _) => format_timestamp(ts),
            (None, Some(date)) => date.clone(),
            (None, None) => String::new(),
        };
        format!("{} — {}", ts, self.rating.as_deref().unwrap_or(DEFAULT_RATING))
    }

    /// Payload pretty-printed with two-space indentation; `{}` when absent.
    pub fn payload_json(&self) -> String {
        let payload = self
            .payload
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));
        serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Archive entries, or `None` when the document is not a sequence.
pub fn parse_archive(doc: &Value) -> Option<Vec<ArchiveEntry>> {
    doc.as_array()
        .map(|items| items.iter().map(ArchiveEntry::from_value).collect())
}

/// RFC 3339 timestamps are shown in UTC; anything else is shown verbatim.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(ts) => ts
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

fn tags(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|t| match t {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect()
}
