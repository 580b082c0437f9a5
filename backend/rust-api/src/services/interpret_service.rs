use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::metrics::INTERPRET_REQUESTS_TOTAL;
use crate::models::interpret::{Clarity, Engagement, Interpretation, InterpretRequest};

#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    #[error("No response provided")]
    MissingResponse,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Gateway to the external language-interpretation service. Once input
/// validation passes, every path resolves to a fully populated
/// `Interpretation`: service failures and unparseable output are absorbed
/// into deterministic fallbacks and logged, never surfaced to the session.
pub struct InterpretService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl InterpretService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.interpret_base_url.clone(),
            api_key: config.interpret_api_key.clone(),
            model: config.interpret_model.clone(),
        }
    }

    pub async fn interpret(
        &self,
        req: &InterpretRequest,
        child_name: &str,
    ) -> Result<Interpretation, InterpretError> {
        let typed = req.typed_response.as_deref().unwrap_or("").trim();
        let spoken = req.spoken_transcript.trim();
        if typed.is_empty() && spoken.is_empty() {
            return Err(InterpretError::MissingResponse);
        }

        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Interpretation service not configured, using fallback response");
            INTERPRET_REQUESTS_TOTAL.with_label_values(&["fallback_call"]).inc();
            return Ok(call_failure_fallback());
        };

        let instruction = build_instruction(&req.prompt_text, typed, spoken, child_name);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: 300,
            messages: vec![Message { role: "user", content: &instruction }],
        };

        // No client-side timeout: the service's own timeout behavior
        // applies, and a user action that abandons the wait simply ignores
        // the eventual result.
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::error!("Interpretation service returned status {}", r.status());
                INTERPRET_REQUESTS_TOTAL.with_label_values(&["fallback_call"]).inc();
                return Ok(call_failure_fallback());
            }
            Err(e) => {
                tracing::error!("Interpretation call failed: {}", e);
                INTERPRET_REQUESTS_TOTAL.with_label_values(&["fallback_call"]).inc();
                return Ok(call_failure_fallback());
            }
        };

        let parsed: Result<MessagesResponse, _> = response.json().await;
        let text = match parsed {
            Ok(body) => body
                .content
                .into_iter()
                .find(|block| block.kind == "text")
                .map(|block| block.text),
            Err(e) => {
                tracing::error!("Failed to read interpretation response body: {}", e);
                INTERPRET_REQUESTS_TOTAL.with_label_values(&["fallback_call"]).inc();
                return Ok(call_failure_fallback());
            }
        };

        let Some(text) = text else {
            tracing::error!("Interpretation response contained no text block");
            INTERPRET_REQUESTS_TOTAL.with_label_values(&["fallback_parse"]).inc();
            return Ok(parse_fallback(spoken, child_name));
        };

        match parse_interpretation(&text) {
            Some(interpretation) => {
                INTERPRET_REQUESTS_TOTAL.with_label_values(&["ok"]).inc();
                Ok(interpretation)
            }
            None => {
                tracing::error!("Failed to parse interpretation output: {}", text);
                INTERPRET_REQUESTS_TOTAL.with_label_values(&["fallback_parse"]).inc();
                Ok(parse_fallback(spoken, child_name))
            }
        }
    }
}

pub fn parse_interpretation(text: &str) -> Option<Interpretation> {
    serde_json::from_str(text.trim()).ok()
}

/// The service replied but its output was not the expected shape.
pub fn parse_fallback(spoken_transcript: &str, child_name: &str) -> Interpretation {
    Interpretation {
        interpretation: spoken_transcript.to_string(),
        engagement: Engagement::Neutral,
        feedback_for_child: "Great job speaking!".to_string(),
        insight_for_parent: format!("{} provided a response.", child_name),
        suggested_follow_up: "Tell me more about that.".to_string(),
        clarity: Clarity::Partial,
    }
}

/// The call itself failed (network, configuration, non-success status).
pub fn call_failure_fallback() -> Interpretation {
    Interpretation {
        interpretation: "Unable to interpret".to_string(),
        engagement: Engagement::Neutral,
        feedback_for_child: "Great job speaking!".to_string(),
        insight_for_parent: "API error occurred during interpretation.".to_string(),
        suggested_follow_up: "Try asking about something else.".to_string(),
        clarity: Clarity::Partial,
    }
}

fn build_instruction(prompt_text: &str, typed: &str, spoken: &str, child_name: &str) -> String {
    let typed_display = if typed.is_empty() { "nothing - went straight to speaking" } else { typed };
    format!(
        "You are helping a parent understand their 10-year-old autistic son, {name}.\n\
         \n\
         Context:\n\
         - {name} can pronounce words well when prompted\n\
         - He struggles with spontaneous conversation\n\
         - He's more comfortable writing than speaking\n\
         - He has sensory sensitivities (prefers calm, quiet)\n\
         \n\
         Prompt shown to {name}: \"{prompt}\"\n\
         What {name} typed: \"{typed}\"\n\
         What {name} said (transcription): \"{spoken}\"\n\
         \n\
         Your task:\n\
         1. Interpret what {name} is trying to communicate\n\
         2. Assess his engagement level\n\
         3. Provide gentle, encouraging feedback for {name} (1 sentence, simple)\n\
         4. Give parent insight into {name}'s thoughts\n\
         5. Suggest a good follow-up question for parent to use later\n\
         \n\
         Respond in JSON format:\n\
         {{\n\
           \"interpretation\": \"{name} is saying that...\",\n\
           \"engagement\": \"engaged\" | \"neutral\" | \"disengaged\",\n\
           \"feedbackForChild\": \"Great job! You told me about...\",\n\
           \"insightForParent\": \"{name} seems interested in...\",\n\
           \"suggestedFollowUp\": \"What kind of videos do you like?\",\n\
           \"clarity\": \"clear\" | \"partial\" | \"unclear\"\n\
         }}\n\
         \n\
         Rules for feedback:\n\
         - Always start with encouragement\n\
         - Use simple language (3rd grade reading level)\n\
         - Keep it brief (under 20 words)\n\
         - Never use negative words like \"wrong\" or \"bad\"\n\
         - Be specific about what {name} communicated\n\
         \n\
         IMPORTANT: Return ONLY valid JSON, no other text.",
        name = child_name,
        prompt = prompt_text,
        typed = typed_display,
        spoken = spoken,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_service_output() {
        let text = r#"{
            "interpretation": "He likes blue",
            "engagement": "engaged",
            "feedbackForChild": "Great job! You told me your favorite color.",
            "insightForParent": "He answered directly.",
            "suggestedFollowUp": "What else is blue?",
            "clarity": "clear"
        }"#;

        let parsed = parse_interpretation(text).unwrap();
        assert_eq!(parsed.engagement, Engagement::Engaged);
        assert_eq!(parsed.clarity, Clarity::Clear);
        assert_eq!(parsed.interpretation, "He likes blue");
    }

    #[test]
    fn rejects_malformed_output() {
        assert!(parse_interpretation("I think the child said blue.").is_none());
        assert!(parse_interpretation("{\"interpretation\": \"only half\"}").is_none());
        assert!(parse_interpretation("").is_none());
    }

    #[test]
    fn parse_fallback_echoes_transcript() {
        let fallback = parse_fallback("blue", "Tristan");
        assert_eq!(fallback.interpretation, "blue");
        assert_eq!(fallback.clarity, Clarity::Partial);
        assert_eq!(fallback.engagement, Engagement::Neutral);
        assert_eq!(fallback.feedback_for_child, "Great job speaking!");
        assert_eq!(fallback.insight_for_parent, "Tristan provided a response.");
    }

    #[test]
    fn call_failure_fallback_is_fixed() {
        let fallback = call_failure_fallback();
        assert_eq!(fallback.interpretation, "Unable to interpret");
        assert_eq!(fallback.feedback_for_child, "Great job speaking!");
        assert_eq!(fallback.insight_for_parent, "API error occurred during interpretation.");
        assert_eq!(fallback.clarity, Clarity::Partial);
    }

    #[test]
    fn instruction_mentions_prompt_and_answers() {
        let instruction = build_instruction("What did you do today?", "", "played outside", "Tristan");
        assert!(instruction.contains("What did you do today?"));
        assert!(instruction.contains("nothing - went straight to speaking"));
        assert!(instruction.contains("played outside"));
        assert!(instruction.contains("ONLY valid JSON"));
    }

    #[tokio::test]
    async fn missing_response_is_rejected_before_any_call() {
        let config = Config::for_tests();
        let service = InterpretService::new(&config);

        let req = InterpretRequest {
            prompt_text: "What did you do today?".into(),
            typed_response: Some("   ".into()),
            spoken_transcript: "".into(),
        };
        assert!(matches!(
            service.interpret(&req, "Tristan").await,
            Err(InterpretError::MissingResponse)
        ));
    }

    #[tokio::test]
    async fn unconfigured_service_falls_back() {
        let config = Config { interpret_api_key: None, ..Config::for_tests() };
        let service = InterpretService::new(&config);

        let req = InterpretRequest {
            prompt_text: "What did you do today?".into(),
            typed_response: None,
            spoken_transcript: "played outside".into(),
        };
        let result = service.interpret(&req, "Tristan").await.unwrap();
        assert_eq!(result.interpretation, "Unable to interpret");
        assert_eq!(result.clarity, Clarity::Partial);
    }
}
