use serde::{Deserialize, Serialize};

// ─── Request types ────────────────────────────────────────────────────────

/// Body of a `POST /v1/messages` request. Fields borrow from the caller;
/// nothing here outlives the request.
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: Vec<MessageParam<'a>>,
}

#[derive(Debug, Serialize)]
pub struct MessageParam<'a> {
    pub role: &'a str,
    pub content: Vec<ContentParam<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ContentParam<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub text: &'a str,
}

impl<'a> MessagesRequest<'a> {
    /// Single user-turn request carrying one text block.
    pub fn user_text(model: &'a str, max_tokens: u32, text: &'a str) -> Self {
        Self {
            model,
            max_tokens,
            messages: vec![MessageParam {
                role: "user",
                content: vec![ContentParam { kind: "text", text }],
            }],
        }
    }
}

// ─── Response types ───────────────────────────────────────────────────────

/// A `POST /v1/messages` response. Only the fields this crate consumes are
/// modeled; everything else is ignored on deserialization.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Content blocks are discriminated by the JSON `"type"` field. Unknown
/// block kinds (tool use, thinking, future additions) are tolerated and
/// skipped when assembling the text.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl MessagesResponse {
    /// Concatenate all text blocks, in order, joined by newlines.
    /// Returns an empty string if the response carried no text.
    pub fn text(self) -> String {
        self.content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_messages_shape() {
        let req = MessagesRequest::user_text("claude-sonnet-4-20250514", 2000, "hello");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][0]["text"], "hello");
    }

    #[test]
    fn response_text_joins_blocks() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"a"},{"type":"text","text":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text(), "a\nb");
    }

    #[test]
    fn response_skips_unknown_block_kinds() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"tool_use","id":"t1","name":"x","input":{}},{"type":"text","text":"kept"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text(), "kept");
    }

    #[test]
    fn response_usage_is_optional() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"x"}],"stop_reason":"end_turn","usage":{"input_tokens":12,"output_tokens":3}}"#,
        )
        .unwrap();
        let usage = resp.usage.as_ref().unwrap();
        assert_eq!(usage.input_tokens, 12);
        assert_eq!(usage.output_tokens, 3);
    }
}
