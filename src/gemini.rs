//! Generation gateway for the Gemini `generateContent` endpoint.
//!
//! Every call is classified into a [GenerationOutcome]; failures of any
//! kind are swallowed at this boundary and come back as a tagged outcome,
//! never as an error the caller has to handle.

use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};

/// Safety threshold applied to all four harm categories.
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Harm categories we configure a threshold for.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Client for the Gemini REST API.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

/// One safety rating from a blocked candidate.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct SafetyRating {
    /// Harm category name, eg `HARM_CATEGORY_HARASSMENT`.
    pub category: String,
    /// Assessed probability name, eg `MEDIUM`.
    pub probability: String,
}

/// Classification of one generation call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GenerationOutcome {
    /// Normal completion with the generated text.
    Complete(String),
    /// Token limit hit; carries whatever partial text was retrievable.
    Truncated(Option<String>),
    /// Blocked by the safety filters, with per-category ratings.
    SafetyBlocked(Vec<SafetyRating>),
    /// The service stopped for some other documented reason.
    Stopped(String),
    /// The response carried no candidates at all.
    Empty,
    /// Transport or decoding failure before any candidate was seen.
    Failed(String),
}

impl GenerationOutcome {
    /// Renders the outcome as the text shown to the user. Error shapes
    /// become human-readable strings rather than failures.
    pub fn into_text(self) -> String {
        match self {
            GenerationOutcome::Complete(text) => text,
            GenerationOutcome::Truncated(Some(text)) => {
                format!(
                    "{}\n\n[Note: Response was truncated due to length limit]",
                    text
                )
            }
            GenerationOutcome::Truncated(None) => {
                "Error: Response exceeded maximum length and could not be retrieved.".to_string()
            }
            GenerationOutcome::SafetyBlocked(ratings) => {
                let safety_info = ratings
                    .iter()
                    .map(|rating| format!("- {}: {}", rating.category, rating.probability))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "Error: Content blocked by safety filters.\n\nSafety ratings:\n{}",
                    safety_info
                )
            }
            GenerationOutcome::Stopped(reason) => {
                format!("Error: Generation stopped. Reason: {}", reason)
            }
            GenerationOutcome::Empty => {
                "Error: No response generated. The content may have been blocked by safety filters."
                    .to_string()
            }
            GenerationOutcome::Failed(message) => {
                format!("Error during generation: {}", message)
            }
        }
    }

    /// True for the normal-completion arm.
    pub fn is_complete(&self) -> bool {
        matches!(self, GenerationOutcome::Complete(_))
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason", default)]
    finish_reason: Option<String>,
    #[serde(rename = "safetyRatings", default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    /// Builds a client for the given credential, model and API base.
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Sends one prompt plus JPEG image to `generateContent` and classifies
    /// the response. Never returns an error; see [GenerationOutcome].
    pub async fn generate(
        &self,
        prompt: &str,
        image_jpeg: &[u8],
        temperature: f32,
        max_output_tokens: u32,
    ) -> GenerationOutcome {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "image/jpeg",
                            data: general_purpose::STANDARD.encode(image_jpeg),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens,
            },
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = match self.http.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(err) => return GenerationOutcome::Failed(err.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return GenerationOutcome::Failed(format!(
                "service returned {}: {}",
                status,
                detail.trim()
            ));
        }

        match response.json::<GenerateResponse>().await {
            Ok(parsed) => classify(parsed),
            Err(err) => GenerationOutcome::Failed(err.to_string()),
        }
    }
}

/// Maps a decoded response onto the outcome taxonomy. The only branching
/// logic of note in the whole application.
fn classify(response: GenerateResponse) -> GenerationOutcome {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return GenerationOutcome::Empty;
    };

    let text = candidate.content.and_then(|content| {
        let joined = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<String>();
        if joined.is_empty() { None } else { Some(joined) }
    });

    match candidate.finish_reason.as_deref() {
        Some("STOP") | None => match text {
            Some(text) => GenerationOutcome::Complete(text),
            None => GenerationOutcome::Failed("response contained no text".to_string()),
        },
        Some("MAX_TOKENS") => GenerationOutcome::Truncated(text),
        Some("SAFETY") => GenerationOutcome::SafetyBlocked(candidate.safety_ratings),
        Some(reason) => GenerationOutcome::Stopped(reason.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_from(value: serde_json::Value) -> GenerateResponse {
        serde_json::from_value(value).expect("decode response")
    }

    #[test]
    fn normal_completion_returns_text_verbatim() {
        let response = response_from(json!({
            "candidates": [{
                "content": {"parts": [{"text": "A quiet beach at dusk."}], "role": "model"},
                "finishReason": "STOP"
            }]
        }));
        let outcome = classify(response);
        assert!(outcome.is_complete());
        assert_eq!(outcome.into_text(), "A quiet beach at dusk.");
    }

    #[test]
    fn multiple_parts_are_joined() {
        let response = response_from(json!({
            "candidates": [{
                "content": {"parts": [{"text": "First. "}, {"text": "Second."}]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(classify(response).into_text(), "First. Second.");
    }

    #[test]
    fn truncation_with_text_appends_notice() {
        let response = response_from(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Partial story"}]},
                "finishReason": "MAX_TOKENS"
            }]
        }));
        let text = classify(response).into_text();
        assert!(text.starts_with("Partial story"));
        assert!(text.ends_with("[Note: Response was truncated due to length limit]"));
    }

    #[test]
    fn truncation_without_text_is_an_explicit_failure_string() {
        let response = response_from(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }));
        assert_eq!(
            classify(response).into_text(),
            "Error: Response exceeded maximum length and could not be retrieved."
        );
    }

    #[test]
    fn safety_block_lists_each_category_and_probability() {
        let response = response_from(json!({
            "candidates": [{
                "finishReason": "SAFETY",
                "safetyRatings": [
                    {"category": "HARM_CATEGORY_HARASSMENT", "probability": "MEDIUM"},
                    {"category": "HARM_CATEGORY_HATE_SPEECH", "probability": "HIGH"}
                ]
            }]
        }));
        let text = classify(response).into_text();
        assert!(text.starts_with("Error: Content blocked by safety filters."));
        assert!(text.contains("- HARM_CATEGORY_HARASSMENT: MEDIUM"));
        assert!(text.contains("- HARM_CATEGORY_HATE_SPEECH: HIGH"));
    }

    #[test]
    fn other_finish_reasons_are_named() {
        let response = response_from(json!({
            "candidates": [{"finishReason": "RECITATION"}]
        }));
        assert_eq!(
            classify(response).into_text(),
            "Error: Generation stopped. Reason: RECITATION"
        );
    }

    #[test]
    fn empty_candidate_list_is_reported_as_possibly_blocked() {
        let response = response_from(json!({}));
        assert_eq!(
            classify(response).into_text(),
            "Error: No response generated. The content may have been blocked by safety filters."
        );
    }

    #[test]
    fn stop_without_text_does_not_panic() {
        let response = response_from(json!({
            "candidates": [{"finishReason": "STOP"}]
        }));
        assert_eq!(
            classify(response).into_text(),
            "Error during generation: response contained no text"
        );
    }
}
