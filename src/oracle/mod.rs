//! LLM completion client.
//!
//! Wraps an OpenAI-compatible chat-completions endpoint behind a small
//! typed API with bounded retry, timeout mapping, and JSON-mode helpers.
//! All eight analysis agents and the section classifier share one
//! explicitly constructed [`OracleClient`].

mod client;
mod types;

pub use client::*;
pub use types::*;

/// Extract JSON from a completion string, handling markdown code fences.
///
/// Attempts extraction in this order:
/// 1. Raw JSON (fast path)
/// 2. ```json ... ``` code blocks
/// 3. ``` ... ``` code blocks
pub fn extract_json(completion: &str) -> Result<&str, String> {
    let trimmed = completion.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    if completion.contains("```json") {
        return completion
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ```json block but content was empty or malformed".to_string());
    }

    if completion.contains("```") {
        return completion
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ``` block but content was empty or malformed".to_string());
    }

    Err(format!(
        "No JSON found in completion. First 100 chars: '{}'",
        completion.chars().take(100).collect::<String>()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_raw_object() {
        assert_eq!(
            extract_json(r#"{"key": "value"}"#).unwrap(),
            r#"{"key": "value"}"#
        );
    }

    #[test]
    fn test_extract_json_raw_array() {
        assert_eq!(extract_json("[1, 2, 3]").unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn test_extract_json_with_whitespace() {
        assert_eq!(
            extract_json("  \n  {\"a\": 1}  \n  ").unwrap(),
            r#"{"a": 1}"#
        );
    }

    #[test]
    fn test_extract_json_from_json_fence() {
        let input = "Here you go:\n```json\n{\"result\": true}\n```\nDone.";
        assert_eq!(extract_json(input).unwrap(), r#"{"result": true}"#);
    }

    #[test]
    fn test_extract_json_from_plain_fence() {
        let input = "```\n{\"data\": 123}\n```";
        assert_eq!(extract_json(input).unwrap(), r#"{"data": 123}"#);
    }

    #[test]
    fn test_extract_json_empty_fence_is_error() {
        assert!(extract_json("```json\n\n```").is_err());
        assert!(extract_json("```\n   \n```").is_err());
    }

    #[test]
    fn test_extract_json_plain_text_is_error() {
        let err = extract_json("No JSON here at all.").unwrap_err();
        assert!(err.contains("No JSON found"));
    }
}
