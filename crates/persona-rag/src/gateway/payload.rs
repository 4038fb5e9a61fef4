//! Wire types and payload builders for the generation endpoint
//!
//! Two request shapes exist: the first call of a session carries the
//! system instruction and a single grounded user turn; continuations
//! replay the full prior history as alternating user/model turns
//! before the new grounded question. Generation parameters are pinned
//! low to keep a knowledge-grounded persona deterministic.

use serde::{Deserialize, Serialize};

use crate::types::ConversationTurn;

use super::prompt::format_user_message;

/// Generation request body
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub system_instruction: SystemInstruction,
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

/// Generation response body
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: ResponseContent,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: String,
}

impl GenerateResponse {
    /// Extract the answer text, if the response carries one
    pub fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
    }
}

fn part(text: impl Into<String>) -> Part {
    Part { text: text.into() }
}

/// Payload for the first call of a session: system instruction plus a
/// single context-grounded user turn.
pub fn build_first_call(
    system_instruction: &str,
    question: &str,
    context_documents: &[String],
) -> GenerateRequest {
    GenerateRequest {
        system_instruction: SystemInstruction {
            parts: vec![part(system_instruction)],
        },
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![part(format_user_message(question, context_documents))],
        }],
        generation_config: GenerationConfig {
            temperature: 0.0,
            top_p: 0.5,
            top_k: 30,
        },
    }
}

/// Payload for a continuation call: the session's frozen instruction,
/// the prior turns replayed in order, then the new grounded question.
pub fn build_continuation(
    system_instruction: &str,
    history: &[ConversationTurn],
    question: &str,
    context_documents: &[String],
) -> GenerateRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| Content {
            role: turn.role.wire_name().to_string(),
            parts: vec![part(turn.content.clone())],
        })
        .collect();

    contents.push(Content {
        role: "user".to_string(),
        parts: vec![part(format_user_message(question, context_documents))],
    });

    GenerateRequest {
        system_instruction: SystemInstruction {
            parts: vec![part(system_instruction)],
        },
        contents,
        generation_config: GenerationConfig {
            temperature: 0.0,
            top_p: 0.5,
            top_k: 20,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::Utc;

    #[test]
    fn first_call_payload_shape() {
        let request = build_first_call(
            "persona instruction",
            "Tell me about Meta",
            &["Meta context chunk".to_string()],
        );

        assert_eq!(request.system_instruction.parts[0].text, "persona instruction");
        assert_eq!(request.contents.len(), 1, "single user turn");
        assert_eq!(request.contents[0].role, "user");
        let user_text = &request.contents[0].parts[0].text;
        assert!(user_text.contains("Tell me about Meta"));
        assert!(user_text.contains("Meta context chunk"));
        assert_eq!(request.generation_config.temperature, 0.0);
        assert_eq!(request.generation_config.top_p, 0.5);
        assert_eq!(request.generation_config.top_k, 30);
    }

    #[test]
    fn continuation_replays_history_in_order() {
        let now = Utc::now();
        let history = vec![
            ConversationTurn::new(Role::User, "first question", now),
            ConversationTurn::new(Role::Assistant, "first answer", now),
        ];
        let request =
            build_continuation("frozen persona", &history, "second question", &[]);

        assert_eq!(request.system_instruction.parts[0].text, "frozen persona");
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role, "user");
        assert_eq!(request.contents[0].parts[0].text, "first question");
        assert_eq!(request.contents[1].role, "model");
        assert_eq!(request.contents[1].parts[0].text, "first answer");
        assert_eq!(request.contents[2].role, "user");
        assert!(request.contents[2].parts[0].text.contains("second question"));
        assert_eq!(request.generation_config.top_k, 20);
    }

    #[test]
    fn wire_json_uses_expected_field_names() {
        let request = build_first_call("sys", "q", &[]);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system_instruction").is_some());
        assert!(json.get("generationConfig").is_some());
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[test]
    fn response_text_extraction() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"the answer"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("the answer"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.into_text().is_none());

        let no_field: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(no_field.into_text().is_none());
    }
}
