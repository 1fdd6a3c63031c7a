//! Request and response payloads for the generateContent endpoint, plus the
//! one-shot HTTP call that sends them.
//!
//! Request `Content` entries label the assistant side `"model"`; stored
//! transcripts keep `"assistant"` and the mapping happens in
//! [`build_contents`]. Response types deserialize leniently so that a reply
//! with an unexpected shape degrades to the fixed placeholder instead of an
//! error; the endpoint legitimately returns empty candidate lists.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

use crate::core::message::Message;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Shown in place of a reply when the response carries no extractable text.
pub const NO_ANSWER_PLACEHOLDER: &str = "⚠️ No answer returned";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ReplyContent>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ReplyContent {
    #[serde(default)]
    pub parts: Vec<ReplyPart>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ReplyPart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Failures from one completion call.
#[derive(Debug)]
pub enum CompletionError {
    /// The endpoint answered with a non-success status.
    Http { status: StatusCode, body: String },
    /// The request never completed or the response body was unreadable.
    Network(reqwest::Error),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Http { status, body } => {
                write!(f, "API request failed with status {status}: {body}")
            }
            CompletionError::Network(source) => {
                write!(f, "API request failed: {source}")
            }
        }
    }
}

impl StdError for CompletionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CompletionError::Http { .. } => None,
            CompletionError::Network(source) => Some(source),
        }
    }
}

/// Maps a transcript onto the wire shape, one single-part `Content` per
/// message, in order.
pub fn build_contents(messages: &[Message]) -> Vec<Content> {
    messages
        .iter()
        .map(|message| Content {
            role: message.role.api_label().to_string(),
            parts: vec![Part {
                text: message.content.clone(),
            }],
        })
        .collect()
}

/// Pulls the reply text out of `candidates[0].content.parts[0].text`,
/// substituting the placeholder when any link in that chain is missing or
/// the text is empty.
pub fn extract_reply(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.clone())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_ANSWER_PLACEHOLDER.to_string())
}

/// Sends one conversation to the endpoint and returns the reply text.
///
/// The caller suspends until the response or a transport failure arrives; no
/// retries, no timeout beyond the client default.
pub async fn generate_content(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    contents: Vec<Content>,
) -> Result<String, CompletionError> {
    let url = format!("{base_url}/models/{model}:generateContent");
    let request = GenerateContentRequest { contents };

    let response = client
        .post(&url)
        .query(&[("key", api_key)])
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await
        .map_err(CompletionError::Network)?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        return Err(CompletionError::Http { status, body });
    }

    let parsed: GenerateContentResponse =
        response.json().await.map_err(CompletionError::Network)?;
    Ok(extract_reply(&parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    #[test]
    fn contents_map_assistant_to_model() {
        let transcript = vec![
            Message::user("Hello"),
            Message::assistant("Hi there"),
            Message::user("Another question"),
        ];

        let contents = build_contents(&transcript);

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[2].role, "user");
        assert_eq!(contents[1].parts, vec![Part { text: "Hi there".into() }]);
    }

    #[test]
    fn request_serializes_to_wire_shape() {
        let contents = build_contents(&[Message::new(Role::User, "Hello")]);
        let request = GenerateContentRequest { contents };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [ { "text": "Hello" } ] }
                ]
            })
        );
    }

    #[test]
    fn reply_text_is_extracted_from_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hi there"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(&response), "Hi there");
    }

    #[test]
    fn unknown_response_fields_are_tolerated() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [{"text": "Hi"}],
                        "role": "model"
                    },
                    "finishReason": "STOP",
                    "index": 0
                }],
                "usageMetadata": {"promptTokenCount": 4}
            }"#,
        )
        .unwrap();
        assert_eq!(extract_reply(&response), "Hi");
    }

    #[test]
    fn missing_candidates_yield_placeholder() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_reply(&response), NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn candidate_without_text_yields_placeholder() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#).unwrap();
        assert_eq!(extract_reply(&response), NO_ANSWER_PLACEHOLDER);

        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{}]}"#).unwrap();
        assert_eq!(extract_reply(&response), NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn empty_reply_text_yields_placeholder() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#)
                .unwrap();
        assert_eq!(extract_reply(&response), NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn http_error_carries_status_and_body() {
        let err = CompletionError::Http {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "{\"error\":{\"message\":\"quota\"}}".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("quota"));
    }
}
