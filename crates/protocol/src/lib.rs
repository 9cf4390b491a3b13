use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub mod lenient;

pub const DETECT_PATH: &str = "/api/detect";
pub const HEALTH_PATH: &str = "/api/health";

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectRequest {
    pub text: String,
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
}

impl fmt::Debug for DetectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectRequest")
            .field("text_chars", &self.text.chars().count())
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Body of every `/api/detect` reply. Failures carry `error`, successes carry
/// `result`; nothing else is guaranteed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub result: Option<DetectResult>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectResult {
    #[serde(default, deserialize_with = "lenient::text")]
    pub verdict: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ai_probability: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub key_indicators: Vec<KeyIndicator>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub analysis_rounds: AnalysisRounds,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub caveats: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub model_used: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub elapsed_seconds: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub text_length: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyIndicator {
    #[serde(default, deserialize_with = "lenient::text")]
    pub feature: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub signal: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub strength: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRounds {
    #[serde(default, deserialize_with = "lenient::object")]
    pub round1_features: RoundDetails,
    #[serde(default, deserialize_with = "lenient::object")]
    pub round2_deep_analysis: RoundDetails,
}

/// Raw entries of one analysis round, looked up by feature name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RoundDetails(pub Map<String, Value>);

#[derive(Debug, Clone, PartialEq)]
pub struct SubScore {
    pub score: f64,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub label: String,
    pub confidence: f64,
}

impl RoundDetails {
    /// Returns `None` when the entry is missing or is not an object.
    pub fn sub_score(&self, key: &str, detail_key: &str) -> Option<SubScore> {
        let entry = self.0.get(key)?.as_object()?;
        let score = entry
            .get("score")
            .map(lenient::number_from_value)
            .unwrap_or(0.0);
        let detail = entry
            .get(detail_key)
            .and_then(lenient::text_from_value)
            .filter(|detail| !detail.trim().is_empty());
        Some(SubScore { score, detail })
    }

    pub fn key_evidence(&self) -> Vec<String> {
        self.0
            .get("key_evidence")
            .map(lenient::text_list_from_value)
            .unwrap_or_default()
            .into_iter()
            .filter(|item| !item.trim().is_empty())
            .collect()
    }

    pub fn assessment(&self, label_key: &str, confidence_key: &str) -> Option<Assessment> {
        let label = self
            .0
            .get(label_key)
            .and_then(lenient::text_from_value)
            .filter(|label| !label.trim().is_empty())?;
        let confidence = self
            .0
            .get(confidence_key)
            .map(lenient::number_from_value)
            .unwrap_or(0.0);
        Some(Assessment { label, confidence })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
