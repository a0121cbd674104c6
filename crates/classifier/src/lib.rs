//! Advertising classification of transcripts
//!
//! The classifier sends a fixed-schema prompt with the transcript text to a
//! reasoning endpoint and turns the free-form reply into a [`Classification`].
//! Replies are frequently wrapped in prose or carry trailing commas, so
//! parsing is tolerant (see [`parse`]) and never fails: unusable replies map
//! to [`Classification::default_for`].

pub mod client;
pub mod parse;
pub mod prompt;

pub use client::{OllamaClient, ReasoningClient};
pub use parse::{
    extract_candidate_json, parse_response, repair_and_parse, try_parse_response, ParseError,
};

use serde::{Deserialize, Serialize};
use softad_transcription::Transcript;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Product names that mean "no brand was identified"
pub const PLACEHOLDER_PRODUCT_NAMES: &[&str] = &["无", "未识别", "无特定产品名称", "nan"];

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Reasoning endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Advertising type as labelled by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AdType {
    #[serde(rename = "硬广")]
    Hard,
    #[serde(rename = "软广")]
    Soft,
    #[default]
    #[serde(rename = "无")]
    None,
}

impl AdType {
    /// Map a model-supplied label onto a type; unknown labels are `None`
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        if lower.contains('硬') || lower.contains("hard") {
            AdType::Hard
        } else if lower.contains('软') || lower.contains("soft") {
            AdType::Soft
        } else {
            AdType::None
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AdType::Hard => "硬广",
            AdType::Soft => "软广",
            AdType::None => "无",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed view of one reasoning-endpoint reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub is_ad: bool,
    pub ad_type: AdType,
    /// May list several products separated by `、`
    pub product_name: String,
    pub ad_text: String,
    /// Nominally in `[0, 1]`; out-of-range values are kept as given
    pub confidence: f64,
    pub timestamp: String,
    #[serde(skip)]
    pub raw_response: String,
}

impl Classification {
    /// Fallback used when the reply holds no usable JSON object
    #[must_use]
    pub fn default_for(raw_response: impl Into<String>) -> Self {
        Self {
            is_ad: false,
            ad_type: AdType::None,
            product_name: String::new(),
            ad_text: String::new(),
            confidence: 0.0,
            timestamp: String::new(),
            raw_response: raw_response.into(),
        }
    }

    #[must_use]
    pub fn confidence_bucket(&self) -> ConfidenceBucket {
        ConfidenceBucket::from_confidence(self.confidence)
    }

    /// True when the product name names something real rather than a placeholder
    #[must_use]
    pub fn has_identified_product(&self) -> bool {
        let name = self.product_name.trim();
        !name.is_empty() && !PLACEHOLDER_PRODUCT_NAMES.contains(&name)
    }
}

/// Coarse confidence level used in summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
}

impl ConfidenceBucket {
    pub const HIGH_THRESHOLD: f64 = 0.8;
    pub const MEDIUM_THRESHOLD: f64 = 0.6;

    /// NaN falls through to `Low`
    #[must_use]
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= Self::HIGH_THRESHOLD {
            ConfidenceBucket::High
        } else if confidence >= Self::MEDIUM_THRESHOLD {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ConfidenceBucket::High => "high",
            ConfidenceBucket::Medium => "medium",
            ConfidenceBucket::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies transcripts through a reasoning endpoint
pub struct AdClassifier {
    client: Box<dyn ReasoningClient>,
}

impl AdClassifier {
    pub fn new(client: impl ReasoningClient + 'static) -> Self {
        Self {
            client: Box::new(client),
        }
    }

    /// Ask the endpoint about a transcript and return its reply verbatim.
    ///
    /// Transport failures surface as errors; the caller decides whether to retry later.
    pub fn request(&self, transcript: &Transcript) -> Result<String> {
        let prompt = prompt::build_prompt(&transcript.text);
        debug!("Prompt length: {} chars", prompt.chars().count());
        self.client.generate(&prompt)
    }

    /// Request and parse in one step
    pub fn classify(&self, transcript: &Transcript) -> Result<Classification> {
        let raw = self.request(transcript)?;
        Ok(parse_response(&raw))
    }
}
