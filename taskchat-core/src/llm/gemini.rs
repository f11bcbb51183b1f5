use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LanguageModel, ModelInfo};
use crate::error::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Upper bound on how much of an error body is kept in [`LlmError::Status`].
const MAX_ERROR_BODY: usize = 512;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Generative Language `generateContent` and `models` endpoints.
///
/// The key is sent as a header, never in the URL, so it cannot leak through
/// `reqwest::Error` messages.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .user_agent(concat!("taskchat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Same credentials and connection pool, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Every model the key can see, following pagination.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let key = self.api_key()?;
        let url = format!("{}/models", self.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![("pageSize", "1000")];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.as_str()));
            }
            let page_url = Url::parse_with_params(&url, &params).map_err(|e| LlmError::InvalidUrl(format!("{url}: {e}")))?;

            let resp = self
                .client
                .get(page_url)
                .header(API_KEY_HEADER, key)
                .send()
                .await?;
            let page: ListModelsResponse = check_status(resp).await?.json().await?;
            models.extend(page.models.into_iter().map(|m| ModelInfo {
                name: m.name,
                supported_generation_methods: m.supported_generation_methods,
            }));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(models)
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or(LlmError::MissingApiKey)
    }

    fn model_path(&self) -> String {
        // Accept both "gemini-1.5-flash" and "models/gemini-1.5-flash".
        let name = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/models/{name}:generateContent", self.base_url)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let key = self.api_key()?;
        let body = GenerateContentRequest::new(system, user);

        debug!(model = %self.model, "calling generateContent");
        let resp = self
            .client
            .post(self.model_path())
            .header(API_KEY_HEADER, key)
            .json(&body)
            .send()
            .await?;

        let reply: GenerateContentResponse = check_status(resp).await?.json().await?;
        reply.text().ok_or(LlmError::EmptyResponse)
    }
}

async fn check_status(resp: Response) -> Result<Response, LlmError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Status {
        status: status.as_u16(),
        body: truncate_body(body),
    })
}

/// Cut `body` to at most [`MAX_ERROR_BODY`] bytes on a char boundary, marking
/// the cut with `…`.
fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(system: &'a str, user: &'a str) -> Self {
        Self {
            system_instruction: (!system.is_empty()).then(|| Content {
                role: None,
                parts: vec![Part { text: system }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: user }],
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<RemoteModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn client(key: Option<&str>) -> GeminiClient {
        GeminiClient::new(key.map(str::to_owned), DEFAULT_MODEL, "http://localhost:1/v1beta/")
            .expect("client builds")
    }

    #[test]
    fn request_body_uses_camel_case_wire_names() {
        let body = serde_json::to_value(GenerateContentRequest::new("be terse", "add milk"))
            .expect("serializable");
        assert_eq!(
            body,
            json!({
                "systemInstruction": { "parts": [{ "text": "be terse" }] },
                "contents": [{ "role": "user", "parts": [{ "text": "add milk" }] }],
                "generationConfig": { "temperature": 0.0 }
            })
        );
    }

    #[test]
    fn empty_system_instruction_is_omitted() {
        let body = serde_json::to_value(GenerateContentRequest::new("", "Say hello")).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"action\":" }, { "text": "\"list\"}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(reply.text().as_deref(), Some("{\"action\":\"list\"}"));
    }

    #[test]
    fn response_without_text_is_empty() {
        let blocked: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert_eq!(blocked.text(), None);

        let no_parts: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))
                .unwrap();
        assert_eq!(no_parts.text(), None);
    }

    #[test]
    fn list_models_page_parses() {
        let page: ListModelsResponse = serde_json::from_value(json!({
            "models": [{
                "name": "models/gemini-1.5-flash",
                "supportedGenerationMethods": ["generateContent", "countTokens"]
            }],
            "nextPageToken": "abc"
        }))
        .unwrap();
        assert_eq!(page.models[0].name, "models/gemini-1.5-flash");
        assert_eq!(page.models[0].supported_generation_methods.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn model_path_accepts_prefixed_names() {
        let c = client(Some("k"));
        assert_eq!(
            c.model_path(),
            "http://localhost:1/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(
            c.with_model("models/gemini-pro").model_path(),
            "http://localhost:1/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        for key in [None, Some("  ")] {
            let err = client(key).generate("sys", "hi").await.unwrap_err();
            assert!(matches!(err, LlmError::MissingApiKey));
        }
    }

    #[test]
    fn short_error_body_is_kept_whole() {
        assert_eq!(truncate_body("quota exceeded".into()), "quota exceeded");
        let exact = "a".repeat(MAX_ERROR_BODY);
        assert_eq!(truncate_body(exact.clone()), exact);
    }

    #[test]
    fn long_error_body_is_cut_on_a_char_boundary() {
        // 511 ASCII bytes followed by two-byte chars: byte 512 falls inside 'é'.
        let body = format!("{}{}", "a".repeat(MAX_ERROR_BODY - 1), "é".repeat(10));
        let cut = truncate_body(body);
        assert!(cut.ends_with('…'));
        let kept = cut.trim_end_matches('…');
        assert_eq!(kept.len(), MAX_ERROR_BODY - 1);
        assert!(kept.chars().all(|c| c == 'a'));
    }

    #[test]
    fn status_error_names_code_and_body() {
        let err = LlmError::Status {
            status: 403,
            body: truncate_body("PERMISSION_DENIED".into()),
        };
        assert_eq!(err.to_string(), "model endpoint returned HTTP 403: PERMISSION_DENIED");
    }
}
