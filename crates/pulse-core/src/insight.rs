use crate::error::Result;
use crate::types::{MessageInsight, MessageRecord, Priority, SentimentLabel};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Upper bound on records included in one analysis prompt. The extractor
/// truncates oversized batches itself so prompt size stays deterministic.
pub const MAX_BATCH_MESSAGES: usize = 10;

/// Output token budget for one analysis call.
pub const ANALYSIS_MAX_TOKENS: u32 = 2000;

// ---------------------------------------------------------------------------
// ModelClient
// ---------------------------------------------------------------------------

/// Seam to the hosted text-generation model. The extractor and pipeline only
/// see this trait; tests inject scripted implementations.
pub trait ModelClient {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

impl ModelClient for claude_client::ClaudeClient {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        Ok(claude_client::ClaudeClient::complete(self, prompt, max_tokens)?)
    }
}

// ---------------------------------------------------------------------------
// AnalysisInsight (output)
// ---------------------------------------------------------------------------

/// Structured result of analyzing one batch of messages. Immutable once
/// parsed; list fields tolerate absence in the model's JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInsight {
    pub overall_sentiment: SentimentLabel,
    pub sentiment_score: f64,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub key_topics: Vec<String>,
    #[serde(default)]
    pub project_health_indicators: HealthIndicators,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    #[serde(default)]
    pub owner: Option<String>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthIndicators {
    #[serde(default)]
    pub positive_signals: Vec<String>,
    #[serde(default)]
    pub warning_signs: Vec<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

impl AnalysisInsight {
    /// The slice of this insight attached to every message in the batch.
    pub fn reduced(&self) -> MessageInsight {
        MessageInsight {
            summary: (!self.summary.is_empty()).then(|| self.summary.clone()),
            key_topics: self.key_topics.clone(),
            sentiment: Some(self.overall_sentiment),
        }
    }
}

// ---------------------------------------------------------------------------
// InsightExtractor
// ---------------------------------------------------------------------------

/// Builds the analysis prompt for a batch, invokes the model, and parses the
/// response. All failures here are recoverable: the extractor returns `None`
/// and the batch's messages stay unprocessed for a later run.
pub struct InsightExtractor<'a> {
    model: &'a dyn ModelClient,
}

impl<'a> InsightExtractor<'a> {
    pub fn new(model: &'a dyn ModelClient) -> Self {
        Self { model }
    }

    pub fn extract(&self, batch: &[MessageRecord]) -> Option<AnalysisInsight> {
        let prompt = build_prompt(batch);
        let raw = match self.model.complete(&prompt, ANALYSIS_MAX_TOKENS) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("model call failed: {e}");
                return None;
            }
        };
        parse_insight(&raw)
    }
}

fn build_prompt(batch: &[MessageRecord]) -> String {
    let messages_text = batch
        .iter()
        .take(MAX_BATCH_MESSAGES)
        .map(|m| {
            format!(
                "[{}] {}\n{}",
                m.created_at.to_rfc3339(),
                m.title.as_deref().unwrap_or("No title"),
                m.content_raw
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"Analyze these project delivery chat messages and extract structured insights.

MESSAGES:
{messages_text}

Provide analysis in this exact JSON format:
{{
  "overall_sentiment": "positive" | "neutral" | "negative",
  "sentiment_score": 0.0 to 1.0 (0=very negative, 0.5=neutral, 1=very positive),
  "blockers": ["list of identified blockers or risks"],
  "action_items": [
    {{"task": "description", "owner": "person name or null", "priority": "high" | "medium" | "low"}}
  ],
  "key_topics": ["main topics discussed"],
  "project_health_indicators": {{
    "positive_signals": ["list of positive indicators"],
    "warning_signs": ["list of concerns or issues"],
    "recommended_actions": ["suggested next steps"]
  }},
  "summary": "2-3 sentence summary of the conversation"
}}

Return ONLY valid JSON, no other text."#
    )
}

/// Locate the outermost `{` … `}` span. Tolerates models that wrap the JSON
/// object in explanatory prose despite the instruction not to.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn parse_insight(raw: &str) -> Option<AnalysisInsight> {
    let Some(json) = extract_json(raw) else {
        tracing::warn!("model response contained no JSON object");
        return None;
    };
    match serde_json::from_str::<AnalysisInsight>(json) {
        Ok(mut insight) => {
            // Keep the score invariant even when the model strays outside [0, 1].
            insight.sentiment_score = insight.sentiment_score.clamp(0.0, 1.0);
            Some(insight)
        }
        Err(e) => {
            tracing::warn!("failed to parse insight JSON: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
