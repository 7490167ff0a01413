use base64::Engine;
use serde::{Deserialize, Serialize};

/// Message in a chat-completion conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
}

/// Message role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Message content: plain text or multimodal parts (text + images)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multimodal message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Image reference, inlined as a base64 data URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message carrying text plus one inline image
    pub fn user_with_image(text: impl Into<String>, media_type: &str, image: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        Self {
            role: MessageRole::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{}", media_type, encoded),
                    },
                },
            ]),
        }
    }
}

/// Request body for the chat-completions endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Structured-output directive for the completion API
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format: String,
}

impl ResponseFormat {
    /// Force a JSON-object completion
    pub fn json_object() -> Self {
        Self {
            format: "json_object".to_string(),
        }
    }
}

impl ChatRequest {
    /// Create a new request for the given model and messages
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            response_format: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Force a JSON-object response
    pub fn with_json_output(mut self) -> Self {
        self.response_format = Some(ResponseFormat::json_object());
        self
    }

    /// Set sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the completion token cap
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from the chat-completions endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message in a completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl ChatResponse {
    /// The first choice's completion text, if any
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builders() {
        let system = Message::system("You are a reviewer");
        let user = Message::user("Analyze this");
        let assistant = Message::assistant("Done");

        assert!(matches!(system.role, MessageRole::System));
        assert!(matches!(user.role, MessageRole::User));
        assert!(matches!(assistant.role, MessageRole::Assistant));
    }

    #[test]
    fn test_user_with_image_builds_data_url() {
        let msg = Message::user_with_image("Describe this figure", "image/jpeg", &[0xFF, 0xD8]);
        match msg.content {
            MessageContent::Parts(parts) => {
                assert_eq!(parts.len(), 2);
                match &parts[1] {
                    ContentPart::ImageUrl { image_url } => {
                        assert!(image_url.url.starts_with("data:image/jpeg;base64,"));
                    }
                    other => panic!("expected image part, got {:?}", other),
                }
            }
            other => panic!("expected parts, got {:?}", other),
        }
    }

    #[test]
    fn test_chat_request_serialization_skips_absent_fields() {
        let request = ChatRequest::new("gpt-4o-mini", vec![Message::user("hi")]);
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("response_format").is_none());
        assert!(value.get("temperature").is_none());

        let request = request.with_json_output().with_temperature(0.3);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["temperature"], 0.3);
    }

    #[test]
    fn test_chat_response_content() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        }))
        .unwrap();
        assert_eq!(response.content(), Some("hello"));

        let empty: ChatResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.content(), None);
    }
}
