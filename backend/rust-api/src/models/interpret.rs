use serde::{Deserialize, Serialize};

/// Interpretation-service rating of the child's apparent interest level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engagement {
    Engaged,
    Neutral,
    Disengaged,
}

/// Interpretation-service rating of how understandable the response was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clarity {
    Clear,
    Partial,
    Unclear,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretRequest {
    pub prompt_text: String,
    #[serde(default)]
    pub typed_response: Option<String>,
    #[serde(default)]
    pub spoken_transcript: String,
}

/// The structured payload the interpretation service is contracted to
/// return. The gateway guarantees a fully populated value on every path
/// (service success, unparseable output, call failure), so downstream code
/// never special-cases absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    pub interpretation: String,
    pub engagement: Engagement,
    pub feedback_for_child: String,
    pub insight_for_parent: String,
    pub suggested_follow_up: String,
    pub clarity: Clarity,
}
