//! Gemini client for per-segment moment extraction.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use vmark_models::{Moment, TimeField};

use crate::error::{AnalysisError, AnalysisResult};

/// Default service endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for structured extraction.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Per-call network timeout. Segment uploads can run to hundreds of MB.
const REQUEST_TIMEOUT_SECS: u64 = 600;

/// Extraction prompt sent with every segment.
const EXTRACTION_PROMPT: &str = "Analyze this video segment and identify the most \
noteworthy moments. For each moment provide:\n\
  - The reason why it's significant\n\
  - Start time (in seconds)\n\
  - End time (in seconds)\n\
Return start and end as plain decimal numbers of seconds, encoded as strings.";

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

/// Gemini generateContent request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
struct FileData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "fileUri")]
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

/// Gemini generateContent response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// Files API upload response.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

/// Handle to an uploaded media artifact.
#[derive(Debug, Clone, Deserialize)]
struct RemoteFile {
    /// Resource name, e.g. `files/abc123`
    name: String,
    /// URI referenced from generateContent requests
    uri: String,
    #[serde(rename = "mimeType", default)]
    mime_type: Option<String>,
}

/// Structured extraction payload, as requested via the response schema.
#[derive(Debug, Deserialize)]
struct MomentsPayload {
    #[serde(default)]
    moments: Vec<MomentDto>,
}

#[derive(Debug, Deserialize)]
struct MomentDto {
    #[serde(default)]
    reason: String,
    start: Value,
    end: Value,
}

impl GeminiClient {
    /// Create a client from the `GEMINI_API_KEY` environment variable.
    pub fn new() -> AnalysisResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AnalysisError::config("GEMINI_API_KEY not set"))?;
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against an explicit endpoint (used by tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> AnalysisResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AnalysisError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        })
    }

    /// Override the extraction model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Analyze one segment's media file, returning segment-local moments.
    ///
    /// The uploaded artifact is deleted on a best-effort basis regardless
    /// of whether the extraction call succeeded.
    pub async fn analyze_segment(&self, media: &Path) -> AnalysisResult<Vec<Moment>> {
        let remote = self.upload_media(media).await?;
        info!(media = %media.display(), remote = %remote.name, "Segment uploaded");

        let result = self.extract_moments(&remote).await;

        self.delete_remote(&remote).await;

        result
    }

    /// Upload segment media; returns the service handle.
    async fn upload_media(&self, media: &Path) -> AnalysisResult<RemoteFile> {
        let bytes = tokio::fs::read(media).await?;
        let mime = mime_for(media);
        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AnalysisError::upload(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::upload(format!(
                "Upload returned {}: {}",
                status, body
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::upload(format!("Failed to parse upload response: {}", e)))?;

        Ok(upload.file)
    }

    /// Run structured extraction on an uploaded segment.
    ///
    /// A transport or HTTP failure is a `Service` error; a response that
    /// does not decode as the requested schema degrades to zero moments.
    async fn extract_moments(&self, remote: &RemoteFile) -> AnalysisResult<Vec<Moment>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![
                Content {
                    parts: vec![Part::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    }],
                },
                Content {
                    parts: vec![Part::FileData {
                        file_data: FileData {
                            mime_type: remote
                                .mime_type
                                .clone()
                                .unwrap_or_else(|| "video/mp4".to_string()),
                            file_uri: remote.uri.clone(),
                        },
                    }],
                },
            ],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: moments_schema(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::service(format!("Extraction request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::service(format!(
                "Extraction returned {}: {}",
                status, body
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            AnalysisError::parse(format!("Failed to parse service response: {}", e))
        })?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| AnalysisError::parse("No content in service response"))?;

        // A payload that fails to decode as the requested schema is worth
        // a warning but not a failed segment.
        match parse_moments_text(text) {
            Ok(moments) => Ok(moments),
            Err(e) => {
                warn!(error = %e, "Undecodable extraction payload, treating as zero moments");
                Ok(Vec::new())
            }
        }
    }

    /// Delete the uploaded artifact. Failure is logged, never propagated.
    async fn delete_remote(&self, remote: &RemoteFile) {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, remote.name, self.api_key);

        match self.client.delete(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(remote = %remote.name, "Deleted uploaded segment");
            }
            Ok(response) => {
                warn!(
                    remote = %remote.name,
                    status = %response.status(),
                    "Could not delete uploaded segment"
                );
            }
            Err(e) => {
                warn!(remote = %remote.name, error = %e, "Could not delete uploaded segment");
            }
        }
    }
}

/// JSON schema the service is constrained to.
fn moments_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "moments": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "reason": { "type": "STRING" },
                        "start": { "type": "STRING" },
                        "end": { "type": "STRING" }
                    }
                }
            }
        }
    })
}

/// Parse the extraction payload text into segment-local moments.
///
/// Tolerates markdown code fences around the JSON body. Timestamp values
/// that fail numeric coercion are kept as `TimeField::Raw`.
fn parse_moments_text(text: &str) -> Result<Vec<Moment>, serde_json::Error> {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);

    let payload: MomentsPayload = serde_json::from_str(text.trim())?;

    Ok(payload
        .moments
        .into_iter()
        .map(|dto| {
            let start = coerce_time(&dto.start);
            let end = coerce_time(&dto.end);
            if start.is_raw() || end.is_raw() {
                warn!(
                    reason = %dto.reason,
                    "Moment timestamp failed numeric coercion, keeping raw value"
                );
            }
            Moment {
                reason: dto.reason,
                start,
                end,
            }
        })
        .collect())
}

/// Coerce a schema value into a time field.
fn coerce_time(value: &Value) -> TimeField {
    match value {
        Value::String(s) => TimeField::parse(s),
        Value::Number(n) => match n.as_f64() {
            Some(secs) => TimeField::Seconds(secs),
            None => TimeField::Raw(n.to_string()),
        },
        other => TimeField::Raw(other.to_string()),
    }
}

/// Guess the upload MIME type from the file extension.
fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn extraction_body(payload_text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": payload_text }] }
            }]
        })
    }

    fn upload_body() -> Value {
        json!({
            "file": {
                "name": "files/seg-1",
                "uri": "https://service.test/files/seg-1",
                "mimeType": "video/mp4"
            }
        })
    }

    async fn client_for(server: &MockServer) -> (GeminiClient, tempfile::NamedTempFile) {
        let client = GeminiClient::with_base_url("test-key", server.uri()).unwrap();
        let mut media = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        media.write_all(b"segment bytes").unwrap();
        (client, media)
    }

    #[tokio::test]
    async fn test_analyze_segment_happy_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upload_body()))
            .expect(1)
            .mount(&server)
            .await;

        let payload = r#"{"moments":[{"reason":"ace","start":"30","end":"40.5"}]}"#;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.*:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(extraction_body(payload)))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v1beta/files/seg-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (client, media) = client_for(&server).await;
        let moments = client.analyze_segment(media.path()).await.unwrap();

        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].reason, "ace");
        assert_eq!(moments[0].start, TimeField::Seconds(30.0));
        assert_eq!(moments[0].end, TimeField::Seconds(40.5));
    }

    #[tokio::test]
    async fn test_undecodable_payload_yields_zero_moments() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upload_body()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.*:generateContent$"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(extraction_body("this is not json")),
            )
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v1beta/files/seg-1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (client, media) = client_for(&server).await;
        let moments = client.analyze_segment(media.path()).await.unwrap();
        assert!(moments.is_empty());
    }

    #[tokio::test]
    async fn test_service_error_still_deletes_upload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upload_body()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.*:generateContent$"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v1beta/files/seg-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (client, media) = client_for(&server).await;
        let err = client.analyze_segment(media.path()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Service(_)));
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_propagated() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upload_body()))
            .mount(&server)
            .await;

        let payload = r#"{"moments":[]}"#;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.*:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(extraction_body(payload)))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v1beta/files/seg-1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (client, media) = client_for(&server).await;
        assert!(client.analyze_segment(media.path()).await.is_ok());
    }

    #[test]
    fn test_parse_moments_strips_code_fences() {
        let text = "```json\n{\"moments\":[{\"reason\":\"x\",\"start\":\"1\",\"end\":\"2\"}]}\n```";
        let moments = parse_moments_text(text).unwrap();
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].start, TimeField::Seconds(1.0));
    }

    #[test]
    fn test_parse_moments_keeps_unparseable_timestamps_raw() {
        let text = r#"{"moments":[{"reason":"vague","start":"early on","end":"12"}]}"#;
        let moments = parse_moments_text(text).unwrap();
        assert_eq!(moments[0].start, TimeField::Raw("early on".to_string()));
        assert_eq!(moments[0].end, TimeField::Seconds(12.0));
    }

    #[test]
    fn test_coerce_time_accepts_bare_numbers() {
        assert_eq!(coerce_time(&json!(7.25)), TimeField::Seconds(7.25));
        assert_eq!(coerce_time(&json!("7.25")), TimeField::Seconds(7.25));
        assert!(coerce_time(&json!({"t": 1})).is_raw());
    }

    #[test]
    fn test_mime_for_known_extensions() {
        assert_eq!(mime_for(Path::new("clip.MP4")), "video/mp4");
        assert_eq!(mime_for(Path::new("clip.mkv")), "video/x-matroska");
        assert_eq!(mime_for(Path::new("clip")), "application/octet-stream");
    }
}
