use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// HealthStatus
// ---------------------------------------------------------------------------

/// Derived project health label. Serialized forms match the record store's
/// `overall_health` column values exactly, including the space in "At Risk".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    #[serde(rename = "At Risk")]
    AtRisk,
    Critical,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::AtRisk => "At Risk",
            HealthStatus::Critical => "Critical",
            HealthStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = crate::error::PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Healthy" => Ok(HealthStatus::Healthy),
            "At Risk" => Ok(HealthStatus::AtRisk),
            "Critical" => Ok(HealthStatus::Critical),
            "Unknown" => Ok(HealthStatus::Unknown),
            _ => Err(crate::error::PulseError::InvalidHealthStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SentimentLabel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// MessageRecord
// ---------------------------------------------------------------------------

/// Read projection of one ingested delivery message. Only the columns the
/// analysis prompt needs are selected; write-side fields (`ai_processed`,
/// `sentiment_score`, `ai_insights`) are set through the store client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub content_raw: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// MessageInsight
// ---------------------------------------------------------------------------

/// The reduced insight attached to each message of an analyzed batch,
/// stored in the `ai_insights` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInsight {
    pub summary: Option<String>,
    pub key_topics: Vec<String>,
    pub sentiment: Option<SentimentLabel>,
}

// ---------------------------------------------------------------------------
// ProjectRef
// ---------------------------------------------------------------------------

/// A project with at least one unprocessed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn health_status_serializes_to_store_labels() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::AtRisk).unwrap(),
            "\"At Risk\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"Healthy\""
        );
    }

    #[test]
    fn health_status_roundtrip() {
        for status in [
            HealthStatus::Healthy,
            HealthStatus::AtRisk,
            HealthStatus::Critical,
            HealthStatus::Unknown,
        ] {
            let parsed = HealthStatus::from_str(status.as_str()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn health_status_rejects_unknown_label() {
        assert!(HealthStatus::from_str("fine").is_err());
    }

    #[test]
    fn sentiment_label_lowercase() {
        assert_eq!(
            serde_json::to_string(&SentimentLabel::Positive).unwrap(),
            "\"positive\""
        );
        let parsed: SentimentLabel = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(parsed, SentimentLabel::Negative);
    }

    #[test]
    fn message_record_tolerates_missing_optionals() {
        let json = r#"{"id":"m1","created_at":"2026-01-15T10:00:00Z"}"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "m1");
        assert!(record.title.is_none());
        assert!(record.content_raw.is_null());
    }

    #[test]
    fn message_insight_serializes_nulls() {
        let insight = MessageInsight {
            summary: None,
            key_topics: vec!["deploy".into()],
            sentiment: Some(SentimentLabel::Neutral),
        };
        let json = serde_json::to_value(&insight).unwrap();
        assert!(json["summary"].is_null());
        assert_eq!(json["sentiment"], "neutral");
        assert_eq!(json["key_topics"][0], "deploy");
    }
}
