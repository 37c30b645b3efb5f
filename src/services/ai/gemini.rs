//! Real review generator backed by the Gemini generateContent API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{AiError, GeneratedReview, ReviewGenerator, ReviewMetadata};
use crate::config::{AI_PROBE_TIMEOUT, AI_REQUEST_TIMEOUT, GEMINI_API_BASE_URL, GEMINI_MODEL};
use crate::domain::{Language, ReviewStyle};

/// Generation parameters sent alongside the prompt.
///
/// The concise profile runs hotter with half the token budget.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationProfile {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl GenerationProfile {
    /// Profile for the requested review style
    pub fn for_style(style: ReviewStyle) -> Self {
        match style {
            ReviewStyle::Detailed => Self {
                temperature: 0.2,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: 8192,
            },
            ReviewStyle::Concise => Self {
                temperature: 0.4,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 4096,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// Harm categories filtered at medium-and-above
fn safety_settings() -> Vec<SafetySetting> {
    const CATEGORIES: [&str; 4] = [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ];

    CATEGORIES
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_MEDIUM_AND_ABOVE",
        })
        .collect()
}

// --- generateContent wire types ---------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationProfile,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

// ----------------------------------------------------------------------------

/// Review generator calling the Gemini REST API.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiGenerator {
    /// Create a generator using the production API endpoint
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE_URL.to_string())
    }

    /// Create a generator against a custom endpoint (tests)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(AI_REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Build the single natural-language review prompt
    fn build_prompt(code: &str, language: Language, style: ReviewStyle) -> String {
        let style_instruction = match style {
            ReviewStyle::Concise => "Be brief and focus only on the most important issues.",
            ReviewStyle::Detailed => {
                "Provide a detailed analysis including both issues and positive aspects."
            }
        };

        format!(
            "You are an experienced software engineer reviewing code. Provide a thorough but constructive code review.\n\
             \n\
             {style_instruction}\n\
             \n\
             Code to review ({language}):\n\
             ```{language}\n\
             {code}\n\
             ```\n\
             \n\
             Your review should include:\n\
             1. A brief overview of the code purpose and structure\n\
             2. Potential bugs, errors, or issues in the code\n\
             3. Best practices that aren't being followed\n\
             4. Security concerns if applicable\n\
             5. Performance considerations\n\
             6. Positive aspects of the code that are well done\n\
             7. Specific suggestions for improvement with example code where helpful\n\
             \n\
             Format your response in Markdown with proper headings and code blocks.\n\
             Be specific and reference line numbers or code segments where appropriate.\n\
             Be professional and constructive in your feedback."
        )
    }

    /// Map an error-status response body to an [`AiError`]
    fn classify_api_error(status: StatusCode, body: &str) -> AiError {
        let message = serde_json::from_str::<ApiErrorResponse>(body)
            .ok()
            .and_then(|e| e.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("HTTP {}", status));

        if status == StatusCode::TOO_MANY_REQUESTS
            || message.contains("quota")
            || message.contains("rate")
        {
            AiError::RateLimited
        } else if status == StatusCode::SERVICE_UNAVAILABLE {
            AiError::Unavailable("Gemini API".to_string())
        } else {
            AiError::Api(format!("Gemini API error: {} - {}", status, message))
        }
    }
}

#[async_trait]
impl ReviewGenerator for GeminiGenerator {
    async fn generate(
        &self,
        code: &str,
        language: Language,
        style: ReviewStyle,
    ) -> Result<GeneratedReview, AiError> {
        let prompt = Self::build_prompt(code, language, style);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationProfile::for_style(style),
            safety_settings: safety_settings(),
        };

        let endpoint = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        );

        tracing::debug!(model = GEMINI_MODEL, style = %style, "Calling Gemini API");

        let response = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::Unavailable(format!("Gemini API: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::Malformed(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::classify_api_error(status, &body));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| AiError::Malformed(e.to_string()))?;

        if let Some(reason) = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
        {
            return Err(AiError::Blocked(reason));
        }

        let review = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AiError::Malformed("response contained no candidates".to_string()))?;

        Ok(GeneratedReview {
            review,
            metadata: ReviewMetadata {
                language,
                review_style: style,
                model: GEMINI_MODEL.to_string(),
                is_mock: false,
                fallback: false,
                downgraded: false,
                metrics: None,
            },
        })
    }

    /// Probe the lightweight model-listing endpoint to confirm the key is
    /// valid and the service responds.
    async fn is_available(&self) -> bool {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);

        match self
            .client
            .get(&url)
            .timeout(AI_PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "AI availability probe failed");
                false
            }
        }
    }

    fn model_name(&self) -> &str {
        GEMINI_MODEL
    }

    fn is_mock(&self) -> bool {
        false
    }
}
