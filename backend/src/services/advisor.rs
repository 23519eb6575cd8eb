//! Generative-AI yield predictions and crop recommendations.
//!
//! The model is reached through [`TextGenerator`]; [`YieldAdvisor`] owns the
//! prompts and turns free-form completions into typed answers. Models are
//! asked for JSON but rarely return only JSON, so parsing is best-effort:
//!
//! 1. a fenced ```` ```json ```` block,
//! 2. otherwise the first `{…}` (or `[…]`) span,
//! 3. otherwise regex extraction (predictions) or a static list (recommendations).
//!
//! An unreachable or failing model never surfaces as an error; callers get
//! a plausible answer tagged with the failure. Only a missing API key does.

use async_trait::async_trait;
use log::{error, warn};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::routes::advisor::{
    display_or, Advice, CropRecommendation, RecommendationRequest, YieldPrediction, YieldRequest,
};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const AI_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIDENCE: f64 = 75.0;
pub const FALLBACK_CONFIDENCE: f64 = 70.0;

static JSON_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\n(.*?)\n```").expect("valid regex"));
static OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));
static YIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+\.?\d*)\s*(?:metric\s*)?tons?").expect("valid regex")
});
static CONFIDENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*%").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI service not configured: {message}")]
    Config { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("AI provider error: {message}")]
    Provider { message: String },

    #[error("AI provider returned no text")]
    EmptyResponse,
}

/// A single-shot text completion backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(api_key: String, model: String) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(AI_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
            client,
        })
    }

    /// Point at a different API root (used by tests and proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reads `GEMINI_API_KEY` and optionally `GEMINI_MODEL`.
    pub fn from_env() -> Result<Self, AiError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AiError::Config {
                message: "GEMINI_API_KEY is not set".to_string(),
            })?;
        let model = std::env::var("GEMINI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        Self::new(api_key, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(AiError::Provider {
                message: format!("Gemini API returned {status}: {text}"),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let completion: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if completion.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(completion)
    }
}

// ==================== Prompts ====================

fn yield_prompt(req: &YieldRequest) -> String {
    format!(
        "As an agricultural AI expert, predict the crop yield for the following parameters:\n\
         - Crop Type: {crop}\n\
         - Area (hectares): {area}\n\
         - Weather Condition: {weather}\n\
         - Fertilizer Used: {fertilizer}\n\
         - Historical Yield (if available): {historical}\n\
         - Location: Latitude {lat}, Longitude {lng}\n\
         \n\
         Please provide:\n\
         1. Predicted yield in metric tons\n\
         2. Confidence level (percentage)\n\
         3. Key factors affecting the yield\n\
         4. Recommendations for improving yield\n\
         \n\
         Format the response as JSON with keys: predictedYield, confidence, factors, recommendations.",
        crop = non_blank(req.crop_type.as_deref()).unwrap_or("Not specified"),
        area = display_or(&req.area, "Not specified"),
        weather = non_blank(req.weather_condition.as_deref()).unwrap_or("Normal"),
        fertilizer = non_blank(req.fertilizer_used.as_deref()).unwrap_or("Organic"),
        historical = display_or(&req.historical_yield, "Not available"),
        lat = display_or(&req.latitude, "Not specified"),
        lng = display_or(&req.longitude, "Not specified"),
    )
}

fn recommendation_prompt(req: &RecommendationRequest) -> String {
    format!(
        "Based on the location (Latitude: {lat}, Longitude: {lng}) and season: {season}, \
         recommend the best crops to grow in this region of India. Consider:\n\
         - Soil type typical for this region\n\
         - Climate conditions\n\
         - Market demand\n\
         - Profitability\n\
         \n\
         Provide top 5 crop recommendations with brief reasons. \
         Format as JSON array with keys: cropName, reason, suitabilityScore (1-10).",
        lat = display_or(&req.latitude, "Not specified"),
        lng = display_or(&req.longitude, "Not specified"),
        season = non_blank(req.season.as_deref()).unwrap_or("current"),
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ==================== Parsing ====================

/// Locate the JSON payload in a completion: a fenced block wins over a bare span.
pub fn extract_json<'a>(text: &'a str, span: &Regex) -> Option<&'a str> {
    if let Some(caps) = JSON_FENCE_RE.captures(text) {
        return caps.get(1).map(|m| m.as_str());
    }
    span.find(text).map(|m| m.as_str())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn as_advice(value: &Value) -> Option<Advice> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Advice::Text(s.clone())),
        Value::Array(items) => Some(Advice::Items(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        )),
        other => Some(Advice::Text(other.to_string())),
    }
}

/// Pull a yield and confidence out of prose.
fn regex_prediction(text: &str) -> YieldPrediction {
    let predicted_yield = YIELD_RE
        .captures(text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0.0);
    let confidence = CONFIDENCE_RE
        .captures(text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(DEFAULT_CONFIDENCE);
    YieldPrediction {
        predicted_yield,
        confidence,
        factors: Advice::Text(text.to_string()),
        recommendations: Advice::Text(text.to_string()),
        raw_response: Some(text.to_string()),
        error: None,
    }
}

/// Interpret a completion as a yield prediction.
pub fn parse_prediction(text: &str) -> YieldPrediction {
    let parsed = extract_json(text, &OBJECT_RE)
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .filter(Value::is_object);

    let Some(obj) = parsed else {
        return regex_prediction(text);
    };

    let fallback = regex_prediction(text);
    YieldPrediction {
        predicted_yield: obj
            .get("predictedYield")
            .and_then(as_number)
            .unwrap_or(fallback.predicted_yield),
        confidence: obj
            .get("confidence")
            .and_then(as_number)
            .unwrap_or(fallback.confidence),
        factors: obj
            .get("factors")
            .and_then(as_advice)
            .unwrap_or(fallback.factors),
        recommendations: obj
            .get("recommendations")
            .and_then(as_advice)
            .unwrap_or(fallback.recommendations),
        raw_response: None,
        error: None,
    }
}

fn recommendation_from_value(value: &Value) -> Option<CropRecommendation> {
    let crop_name = value.get("cropName")?.as_str()?;
    let reason = value.get("reason").and_then(Value::as_str).unwrap_or("");
    let score = value.get("suitabilityScore").and_then(as_number)?;
    Some(CropRecommendation::new(crop_name, reason, score))
}

/// Recommendations used when the completion holds no JSON array.
pub fn default_recommendations() -> Vec<CropRecommendation> {
    vec![
        CropRecommendation::new("Wheat", "Suitable for this region", 8.0),
        CropRecommendation::new("Rice", "High demand and good climate", 7.0),
        CropRecommendation::new("Cotton", "Profitable crop for this area", 6.0),
    ]
}

fn malformed_recommendations() -> Vec<CropRecommendation> {
    vec![
        CropRecommendation::new("Wheat", "Suitable for this region", 8.0),
        CropRecommendation::new("Rice", "High demand and good climate", 7.0),
    ]
}

fn unavailable_recommendations() -> Vec<CropRecommendation> {
    vec![
        CropRecommendation::new("Wheat", "Suitable for this region", 8.0),
        CropRecommendation::new("Rice", "High demand", 7.0),
    ]
}

/// Interpret a completion as a list of crop recommendations.
pub fn parse_recommendations(text: &str) -> Vec<CropRecommendation> {
    let Some(json) = extract_json(text, &ARRAY_RE) else {
        return default_recommendations();
    };
    let parsed: Option<Vec<CropRecommendation>> =
        serde_json::from_str::<Value>(json).ok().and_then(|v| match v {
            Value::Array(items) => items.iter().map(recommendation_from_value).collect(),
            _ => None,
        });
    match parsed {
        Some(list) => list,
        None => malformed_recommendations(),
    }
}

/// Prediction served when the model cannot be reached.
pub fn unavailable_prediction<R: Rng + ?Sized>(rng: &mut R, err: &AiError) -> YieldPrediction {
    YieldPrediction {
        predicted_yield: 50.0 + rng.gen_range(0.0..100.0),
        confidence: FALLBACK_CONFIDENCE,
        factors: Advice::from("Weather conditions, soil quality, and farming practices"),
        recommendations: Advice::from(
            "Maintain optimal irrigation and use recommended fertilizers",
        ),
        raw_response: None,
        error: Some(err.to_string()),
    }
}

// ==================== Advisor ====================

/// Prompts a [`TextGenerator`] and shapes the answers.
#[derive(Clone, Default)]
pub struct YieldAdvisor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl YieldAdvisor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// An advisor whose every call reports [`AiError::Config`].
    pub fn unconfigured() -> Self {
        Self { generator: None }
    }

    /// Gemini when `GEMINI_API_KEY` is set, unconfigured otherwise.
    pub fn from_env() -> Self {
        match GeminiGenerator::from_env() {
            Ok(gemini) => Self::new(Arc::new(gemini)),
            Err(e) => {
                error!("{}; AI routes will answer 500", e);
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    fn generator(&self) -> Result<&Arc<dyn TextGenerator>, AiError> {
        self.generator.as_ref().ok_or_else(|| AiError::Config {
            message: "GEMINI_API_KEY is not set. Please configure it in environment variables."
                .to_string(),
        })
    }

    pub async fn predict_yield(&self, req: &YieldRequest) -> Result<YieldPrediction, AiError> {
        let generator = self.generator()?;
        match generator.generate(&yield_prompt(req)).await {
            Ok(text) => Ok(parse_prediction(&text)),
            Err(e) => {
                warn!("AI prediction error: {}", e);
                Ok(unavailable_prediction(&mut rand::thread_rng(), &e))
            }
        }
    }

    pub async fn recommend_crops(
        &self,
        req: &RecommendationRequest,
    ) -> Result<Vec<CropRecommendation>, AiError> {
        let generator = self.generator()?;
        match generator.generate(&recommendation_prompt(req)).await {
            Ok(text) => Ok(parse_recommendations(&text)),
            Err(e) => {
                warn!("AI recommendation error: {}", e);
                Ok(unavailable_recommendations())
            }
        }
    }
}

#[cfg(test)]
#[path = "advisor_tests.rs"]
mod advisor_tests;
