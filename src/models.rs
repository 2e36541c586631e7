use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`. The browser resends the full conversation on
/// every turn; nothing is persisted server-side.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<IncomingMessage>,
}

/// A message as the browser runtime sends it. Older clients send `content`
/// as a plain string, newer ones as a part list, and both shapes can appear
/// within the same conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: MessageContent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

/// One entry of a structured content list. Only text parts contribute to
/// the normalized conversation; tool calls, attachments and any future part
/// kinds deserialize into `Other` and are dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized message in the shape the vendor Messages API accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl IncomingMessage {
    /// Resolves the message to a plain `{role, content}` pair: any role
    /// other than `user` coerces to `assistant`, and structured content is
    /// flattened to the in-order concatenation of its text parts.
    pub fn normalize(&self) -> Message {
        let role = if self.role == "user" {
            MessageRole::User
        } else {
            MessageRole::Assistant
        };

        let content = match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Other => None,
                })
                .collect(),
        };

        Message { role, content }
    }
}

/// Normalizes a whole conversation, preserving message order.
pub fn normalize_conversation(messages: &[IncomingMessage]) -> Vec<Message> {
    messages.iter().map(IncomingMessage::normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChatRequest {
        serde_json::from_str(json).expect("request should parse")
    }

    #[test]
    fn normalization_is_identity_on_textual_messages() {
        let request = parse(
            r#"{"messages": [
                {"role": "user", "content": "What bleed do I need?"},
                {"role": "assistant", "content": "0.125 inches on each edge."}
            ]}"#,
        );

        let normalized = normalize_conversation(&request.messages);
        assert_eq!(
            normalized,
            vec![
                Message { role: MessageRole::User, content: "What bleed do I need?".into() },
                Message {
                    role: MessageRole::Assistant,
                    content: "0.125 inches on each edge.".into()
                },
            ]
        );
    }

    #[test]
    fn unknown_roles_coerce_to_assistant() {
        let request = parse(
            r#"{"messages": [
                {"role": "system", "content": "be terse"},
                {"role": "tool", "content": "result"},
                {"content": "no role at all"}
            ]}"#,
        );

        for message in normalize_conversation(&request.messages) {
            assert_eq!(message.role, MessageRole::Assistant);
        }
    }

    #[test]
    fn part_lists_flatten_to_text_parts_in_order() {
        let request = parse(
            r#"{"messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "Can you quote "},
                    {"type": "tool-call", "toolName": "pricing", "args": {}},
                    {"type": "text", "text": "500 tri-fold brochures?"},
                    {"type": "file", "url": "https://example.com/artwork.pdf"}
                ]
            }]}"#,
        );

        let normalized = normalize_conversation(&request.messages);
        assert_eq!(normalized[0].content, "Can you quote 500 tri-fold brochures?");
    }

    #[test]
    fn heterogeneous_shapes_coexist_in_one_conversation() {
        let request = parse(
            r#"{"messages": [
                {"role": "user", "content": "plain"},
                {"role": "assistant", "content": [{"type": "text", "text": "structured"}]},
                {"role": "user", "content": [{"type": "image", "url": "x"}]}
            ]}"#,
        );

        let normalized = normalize_conversation(&request.messages);
        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized[0].content, "plain");
        assert_eq!(normalized[1].content, "structured");
        assert_eq!(normalized[2].content, "");
    }

    #[test]
    fn non_array_messages_fail_to_parse() {
        let result = serde_json::from_str::<ChatRequest>(r#"{"messages": "hello"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_conversation_is_valid() {
        let request = parse(r#"{"messages": []}"#);
        assert!(request.messages.is_empty());
    }

    #[test]
    fn normalized_message_serializes_to_vendor_shape() {
        let message = Message { role: MessageRole::User, content: "hi".into() };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({"role": "user", "content": "hi"})
        );
    }
}
