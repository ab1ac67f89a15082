//! Request and response wire types for the upstream generation API
//!
//! Matches the generateContent JSON layout: a system instruction and user
//! contents made of text parts on the way out, candidates or an embedded
//! error object on the way back. The credential travels in a header, never
//! in the body.

use serde::{Deserialize, Serialize};

/// Header carrying the decrypted API key on each attempt
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// One outbound generation request
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub system_instruction: SystemInstruction,
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

impl GenerateRequest {
    /// Build a request from a system instruction and one user message
    pub fn new(system_instruction: &str, user_input: &str) -> Self {
        Self {
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: user_input.to_string(),
                }],
            }],
        }
    }
}

/// Upstream response body: either candidates or an embedded error
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Application-level error object embedded in an otherwise valid response
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

impl GenerateResponse {
    /// Extract the first candidate's first text part, if any
    pub fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest::new("be terse", "hello there");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["system_instruction"]["parts"][0]["text"], "be terse");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello there");
    }

    #[test]
    fn test_response_with_candidates() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "hi!"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.into_text().unwrap(), "hi!");
    }

    #[test]
    fn test_response_with_embedded_error() {
        let body = r#"{
            "error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        }"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        let error = response.error.as_ref().unwrap();
        assert_eq!(error.code, 429);
        assert_eq!(error.message, "quota exceeded");
    }

    #[test]
    fn test_empty_response_has_no_text() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.error.is_none());
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_candidate_without_parts_has_no_text() {
        let body = r#"{"candidates": [{"content": {"parts": []}}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert!(response.into_text().is_none());
    }
}
