//! The Gemini-backed shopping assistant.
//!
//! The storefront proxies chat messages to the Gemini REST API with a prompt that instructs the model to answer as
//! a PC-shop assistant and to return structured JSON. This endpoint degrades instead of failing: whatever goes
//! wrong upstream (no API key, network trouble, or a reply that isn't the JSON we asked for) the customer gets a
//! polite fallback message and an empty recommendation list, never a 5xx.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sfs_common::Secret;

use crate::config::GeminiConfig;

const FALLBACK_REPLY: &str =
    "Sorry, the shopping assistant is not available right now. Please try again in a few minutes.";

/// The structured reply the assistant prompt asks the model to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub product_name: String,
    pub price: String,
}

impl ChatReply {
    fn fallback() -> Self {
        Self { reply: FALLBACK_REPLY.to_string(), recommendations: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidatePart {
    text: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    api_url: String,
    api_key: Secret<String>,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self { api_url: config.api_url.clone(), api_key: config.api_key.clone(), client: reqwest::Client::new() }
    }

    /// Sends the customer's message to the model and returns the structured reply, falling back to a canned
    /// response on any upstream failure.
    pub async fn ask(&self, message: &str) -> ChatReply {
        if self.api_key.reveal().is_empty() {
            warn!("🤖️ No Gemini API key is configured. Returning the fallback reply.");
            return ChatReply::fallback();
        }
        match self.generate(message).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("🤖️ The assistant request failed: {e}. Returning the fallback reply.");
                ChatReply::fallback()
            },
        }
    }

    async fn generate(&self, message: &str) -> Result<ChatReply, String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": assistant_prompt(message) }] }]
        });
        let url = format!("{}?key={}", self.api_url, self.api_key.reveal());
        let response = self.client.post(&url).json(&body).send().await.map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("Gemini returned {}", response.status()));
        }
        let generated = response.json::<GenerateContentResponse>().await.map_err(|e| e.to_string())?;
        let text = generated
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| "Gemini returned no candidates".to_string())?;
        debug!("🤖️ Raw assistant reply: {text}");
        parse_reply(text).ok_or_else(|| "The model reply was not the JSON document we asked for".to_string())
    }
}

fn assistant_prompt(message: &str) -> String {
    format!(
        "You are a helpful shopping assistant for a PC hardware store. Answer the customer's question below, and \
         recommend up to three relevant products. Respond with a single JSON object of the form {{\"reply\": \
         \"<answer>\", \"recommendations\": [{{\"category\": \"...\", \"product_name\": \"...\", \"price\": \
         \"...\"}}]}} and nothing else.\n\nCustomer: {message}"
    )
}

/// Models love to wrap the JSON we asked for in a markdown code fence. Strip it before parsing.
fn parse_reply(text: &str) -> Option<ChatReply> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix("```json").or_else(|| trimmed.strip_prefix("```")).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed).trim();
    serde_json::from_str::<ChatReply>(trimmed).ok()
}

#[cfg(test)]
mod test {
    use super::parse_reply;

    #[test]
    fn a_bare_json_reply_parses() {
        let reply = parse_reply(r#"{"reply": "Try the RTX 4070.", "recommendations": []}"#).unwrap();
        assert_eq!(reply.reply, "Try the RTX 4070.");
        assert!(reply.recommendations.is_empty());
    }

    #[test]
    fn a_code_fenced_reply_parses() {
        let text = "```json\n{\"reply\": \"Here are some options.\", \"recommendations\": [{\"category\": \
                    \"GPU\", \"product_name\": \"RTX 4070\", \"price\": \"16.500.000₫\"}]}\n```";
        let reply = parse_reply(text).unwrap();
        assert_eq!(reply.recommendations.len(), 1);
        assert_eq!(reply.recommendations[0].product_name, "RTX 4070");
    }

    #[test]
    fn missing_recommendations_default_to_empty() {
        let reply = parse_reply(r#"{"reply": "Hello!"}"#).unwrap();
        assert!(reply.recommendations.is_empty());
    }

    #[test]
    fn prose_that_is_not_json_is_rejected() {
        assert!(parse_reply("I'm sorry, I can't help with that.").is_none());
    }
}
