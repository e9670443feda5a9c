//! Classification suppliers: the AI side of the pipeline.
//!
//! A supplier takes the list of file names found in the target directory and
//! a folder-naming language, asks a text-generation model for a strict JSON
//! object mapping each file name to a category label, and returns that
//! mapping in response order. Everything downstream treats the mapping as
//! opaque input; a response that cannot be parsed is a whole-run failure and
//! no moves are attempted.

use crate::config::{ApiConfig, ModelKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/chat/completions";
const DEEPSEEK_MODEL: &str = "deepseek-reasoner";

/// Model responses can take a while for large file lists.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Ordered (filename, category) pairs as returned by the supplier.
pub type CategoryMapping = Vec<(String, String)>;

/// Errors from the classification call. Any of these aborts the whole run.
#[derive(Debug)]
pub enum SupplierError {
    /// The HTTP request could not be completed.
    RequestFailed { source: reqwest::Error },
    /// The service answered with a non-success status.
    BadStatus { status: reqwest::StatusCode, body: String },
    /// The response body did not have the expected shape.
    UnexpectedResponse { reason: String },
    /// The model's text could not be parsed as a filename→category object.
    InvalidMapping { reason: String },
}

impl std::fmt::Display for SupplierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed { source } => {
                write!(f, "Classification request failed: {}", source)
            }
            Self::BadStatus { status, body } => {
                write!(f, "Classification service returned {}: {}", status, body)
            }
            Self::UnexpectedResponse { reason } => {
                write!(f, "Unexpected classification response: {}", reason)
            }
            Self::InvalidMapping { reason } => {
                write!(f, "Could not parse classification mapping: {}", reason)
            }
        }
    }
}

impl std::error::Error for SupplierError {}

/// Result type for classification calls.
pub type SupplierResult<T> = Result<T, SupplierError>;

/// A service that assigns a category label to each file name.
///
/// Implementations are selected by configuration; callers only see this
/// trait. One call per run, no retries.
pub trait ClassificationSupplier {
    fn classify(&self, filenames: &[String], lang: &str) -> SupplierResult<CategoryMapping>;
}

/// Returns the supplier configured in `api.json`.
pub fn supplier_for(config: &ApiConfig) -> Box<dyn ClassificationSupplier> {
    match config.model_type {
        ModelKind::Gemini => Box::new(GeminiSupplier::new(config.api_key.clone())),
        ModelKind::DeepSeek => Box::new(DeepSeekSupplier::new(config.api_key.clone())),
    }
}

/// Builds the categorization prompt sent to either model.
fn build_prompt(filenames: &[String], lang: &str) -> String {
    format!(
        "Assign a category to each of the file names listed below. \
         Categories become folder names, so every category must be written in {lang} \
         and must be a short single folder name.\n\
         Guidelines:\n\
         - documents (.pdf/.docx/.xlsx) belong together\n\
         - images (.jpg/.png/.gif) belong together\n\
         - videos (.mp4/.avi) belong together\n\
         - archives (.zip/.rar) belong together\n\
         - categorize anything else by what the name suggests it is\n\
         Reply with a strict JSON object and nothing else, for example:\n\
         {{\"file1.txt\": \"documents\", \"image.jpg\": \"images\"}}\n\
         Files to categorize:\n{}",
        filenames.join("\n")
    )
}

/// Strips markdown code fences the model may wrap its JSON in.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses the model's text into an ordered filename→category mapping.
///
/// The text must be a JSON object with string values; anything else is a
/// supplier failure. Object key order is preserved.
fn parse_mapping(raw: &str) -> SupplierResult<CategoryMapping> {
    let cleaned = strip_code_fences(raw);

    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| SupplierError::InvalidMapping {
            reason: e.to_string(),
        })?;

    let object = value.as_object().ok_or_else(|| SupplierError::InvalidMapping {
        reason: "response is not a JSON object".to_string(),
    })?;

    let mut mapping = CategoryMapping::with_capacity(object.len());
    for (filename, category) in object {
        let category = category.as_str().ok_or_else(|| SupplierError::InvalidMapping {
            reason: format!("category for '{}' is not a string", filename),
        })?;
        mapping.push((filename.clone(), category.to_string()));
    }

    Ok(mapping)
}

fn http_client() -> SupplierResult<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SupplierError::RequestFailed { source: e })
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

/// Supplier backed by Google's Gemini `generateContent` endpoint.
pub struct GeminiSupplier {
    api_key: String,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    parts: Vec<GeminiPart>,
}

impl GeminiSupplier {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

impl ClassificationSupplier for GeminiSupplier {
    fn classify(&self, filenames: &[String], lang: &str) -> SupplierResult<CategoryMapping> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(filenames, lang),
                }],
            }],
        };

        let response = http_client()?
            .post(GEMINI_API_URL)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| SupplierError::RequestFailed { source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SupplierError::BadStatus {
                status,
                body: response.text().unwrap_or_default(),
            });
        }

        let body: GeminiResponse =
            response.json().map_err(|e| SupplierError::UnexpectedResponse {
                reason: e.to_string(),
            })?;

        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| SupplierError::UnexpectedResponse {
                reason: "response contains no candidate text".to_string(),
            })?;

        parse_mapping(text)
    }
}

// ---------------------------------------------------------------------------
// DeepSeek
// ---------------------------------------------------------------------------

/// Supplier backed by DeepSeek's OpenAI-compatible chat endpoint.
pub struct DeepSeekSupplier {
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl DeepSeekSupplier {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

impl ClassificationSupplier for DeepSeekSupplier {
    fn classify(&self, filenames: &[String], lang: &str) -> SupplierResult<CategoryMapping> {
        let request = ChatRequest {
            model: DEEPSEEK_MODEL,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(filenames, lang),
            }],
            temperature: 0.3,
            max_tokens: 1024,
        };

        let response = http_client()?
            .post(DEEPSEEK_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| SupplierError::RequestFailed { source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SupplierError::BadStatus {
                status,
                body: response.text().unwrap_or_default(),
            });
        }

        let body: ChatResponse =
            response.json().map_err(|e| SupplierError::UnexpectedResponse {
                reason: e.to_string(),
            })?;

        let text = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| SupplierError::UnexpectedResponse {
                reason: "response contains no choices".to_string(),
            })?;

        parse_mapping(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_json_fence() {
        let raw = "```json\n{\"a.txt\": \"docs\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a.txt\": \"docs\"}");
    }

    #[test]
    fn test_strip_code_fences_plain_fence() {
        let raw = "```\n{\"a.txt\": \"docs\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a.txt\": \"docs\"}");
    }

    #[test]
    fn test_strip_code_fences_no_fence() {
        let raw = "  {\"a.txt\": \"docs\"}  ";
        assert_eq!(strip_code_fences(raw), "{\"a.txt\": \"docs\"}");
    }

    #[test]
    fn test_parse_mapping_preserves_order() {
        let raw = r#"{"z.pdf": "文档", "a.jpg": "图片", "m.zip": "压缩包"}"#;
        let mapping = parse_mapping(raw).expect("Failed to parse mapping");

        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping[0], ("z.pdf".to_string(), "文档".to_string()));
        assert_eq!(mapping[1], ("a.jpg".to_string(), "图片".to_string()));
        assert_eq!(mapping[2], ("m.zip".to_string(), "压缩包".to_string()));
    }

    #[test]
    fn test_parse_mapping_fenced_response() {
        let raw = "```json\n{\"a.pdf\": \"documents\"}\n```";
        let mapping = parse_mapping(raw).expect("Failed to parse mapping");
        assert_eq!(mapping, vec![("a.pdf".to_string(), "documents".to_string())]);
    }

    #[test]
    fn test_parse_mapping_rejects_invalid_json() {
        let result = parse_mapping("sure, here's the mapping:");
        assert!(matches!(result, Err(SupplierError::InvalidMapping { .. })));
    }

    #[test]
    fn test_parse_mapping_rejects_non_object() {
        let result = parse_mapping(r#"["a.pdf", "documents"]"#);
        assert!(matches!(result, Err(SupplierError::InvalidMapping { .. })));
    }

    #[test]
    fn test_parse_mapping_rejects_non_string_category() {
        let result = parse_mapping(r#"{"a.pdf": 3}"#);
        match result {
            Err(SupplierError::InvalidMapping { reason }) => {
                assert!(reason.contains("a.pdf"));
            }
            other => panic!("expected InvalidMapping, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_build_prompt_mentions_language_and_files() {
        let files = vec!["report.pdf".to_string(), "photo.jpg".to_string()];
        let prompt = build_prompt(&files, "Italian");

        assert!(prompt.contains("Italian"));
        assert!(prompt.contains("report.pdf"));
        assert!(prompt.contains("photo.jpg"));
        assert!(prompt.contains("strict JSON"));
    }
}
