use serde::{Deserialize, Serialize};
use uba_tutor_model::{ChatMessage, ChatRequest, ChatRole};

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(ToOwned::to_owned),
            parts: vec![Part {
                text: text.to_owned(),
            }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

// ------------------------------
// Types received from the server
// ------------------------------

/// The response of a `generateContent` call. Each streamed chunk of a
/// `streamGenerateContent` call has this same shape.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// The concatenated part texts of the first candidate. Empty when
    /// the response carries no candidate text at all.
    pub fn text(&self) -> String {
        let Some(content) =
            self.candidates.first().and_then(|c| c.content.as_ref())
        else {
            return String::new();
        };
        let mut text = String::new();
        for part in &content.parts {
            text.push_str(&part.text);
        }
        text
    }
}

// -----------
// Conversions
// -----------

#[inline]
pub fn plan_request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(Some("user"), prompt)],
        system_instruction: None,
    }
}

#[inline]
pub fn chat_request(req: &ChatRequest) -> GenerateContentRequest {
    let mut contents: Vec<Content> =
        req.history.iter().map(history_content).collect();
    contents.push(Content::text(Some("user"), &req.message));
    GenerateContentRequest {
        contents,
        system_instruction: Some(Content::text(
            None,
            &req.system_instruction,
        )),
    }
}

#[inline]
fn history_content(msg: &ChatMessage) -> Content {
    let role = match msg.role {
        ChatRole::Learner => "user",
        ChatRole::Tutor => "model",
    };
    Content::text(Some(role), &msg.text)
}
