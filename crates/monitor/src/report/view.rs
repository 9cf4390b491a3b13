use protocol::{Assessment, DetectResult, RoundDetails};
use std::f64::consts::PI;

pub(crate) const RING_RADIUS: f64 = 52.0;

const DEFAULT_VERDICT: &str = "Inconclusive";
const EMPTY_SUMMARY: &str = "暂无摘要。";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VerdictCategory {
    Ai,
    Human,
    Uncertain,
}

impl VerdictCategory {
    /// "ai" is tested before "human", so a verdict naming both is `Ai`.
    pub(crate) fn classify(verdict: &str) -> Self {
        let verdict = verdict.to_lowercase();
        if verdict.contains("ai") {
            VerdictCategory::Ai
        } else if verdict.contains("human") {
            VerdictCategory::Human
        } else {
            VerdictCategory::Uncertain
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            VerdictCategory::Ai => "AI 生成",
            VerdictCategory::Human => "人类撰写",
            VerdictCategory::Uncertain => "无法确定",
        }
    }

    pub(crate) fn class_name(self) -> &'static str {
        match self {
            VerdictCategory::Ai => "ai",
            VerdictCategory::Human => "human",
            VerdictCategory::Uncertain => "uncertain",
        }
    }
}

pub(crate) fn ring_circumference() -> f64 {
    2.0 * PI * RING_RADIUS
}

pub(crate) fn ring_offset(confidence: f64) -> f64 {
    let circumference = ring_circumference();
    circumference - (confidence / 100.0) * circumference
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProbabilityTone {
    Ai,
    Warning,
    Human,
}

impl ProbabilityTone {
    pub(crate) fn from_probability(probability: f64) -> Self {
        if probability >= 70.0 {
            ProbabilityTone::Ai
        } else if probability >= 40.0 {
            ProbabilityTone::Warning
        } else {
            ProbabilityTone::Human
        }
    }

    pub(crate) fn class_name(self) -> &'static str {
        match self {
            ProbabilityTone::Ai => "ai",
            ProbabilityTone::Warning => "warning",
            ProbabilityTone::Human => "human",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Severity {
    Low,
    Mid,
    High,
}

impl Severity {
    pub(crate) fn from_score(score: f64) -> Self {
        if score <= 3.0 {
            Severity::Low
        } else if score <= 6.0 {
            Severity::Mid
        } else {
            Severity::High
        }
    }

    pub(crate) fn class_name(self) -> &'static str {
        match self {
            Severity::Low => "score-low",
            Severity::Mid => "score-mid",
            Severity::High => "score-high",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SignalKind {
    Ai,
    Human,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strength {
    Strong,
    Moderate,
    Weak,
}

impl Strength {
    fn parse(raw: &str) -> Self {
        let raw = raw.to_lowercase();
        if raw.contains("strong") {
            Strength::Strong
        } else if raw.contains("weak") {
            Strength::Weak
        } else {
            Strength::Moderate
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Strength::Strong => "强",
            Strength::Moderate => "中",
            Strength::Weak => "弱",
        }
    }

    pub(crate) fn class_name(self) -> &'static str {
        match self {
            Strength::Strong => "strong",
            Strength::Moderate => "moderate",
            Strength::Weak => "weak",
        }
    }
}

struct RoundTable {
    title: &'static str,
    detail_key: &'static str,
    features: &'static [(&'static str, &'static str)],
    assessment_keys: (&'static str, &'static str),
    with_evidence: bool,
}

const ROUNDS: [RoundTable; 2] = [
    RoundTable {
        title: "第一轮 · 特征提取",
        detail_key: "evidence",
        features: &[
            ("lexical_diversity", "词汇多样性"),
            ("sentence_burstiness", "句式突变性"),
            ("discourse_patterns", "篇章组织"),
            ("content_semantics", "内容语义"),
            ("stylistic_consistency", "风格一致性"),
        ],
        assessment_keys: ("preliminary_assessment", "confidence"),
        with_evidence: false,
    },
    RoundTable {
        title: "第二轮 · 深度分析",
        detail_key: "details",
        features: &[
            ("micro_patterns", "微观模式"),
            ("semantic_depth", "语义深度"),
            ("linguistic_fingerprint", "语言指纹"),
            ("ai_telltales", "AI 特征"),
        ],
        assessment_keys: ("revised_assessment", "revised_confidence"),
        with_evidence: true,
    },
];

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ScoreRow {
    pub(crate) label: &'static str,
    pub(crate) score: f64,
    pub(crate) severity: Severity,
    pub(crate) width_percent: f64,
    pub(crate) detail: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RoundView {
    pub(crate) title: &'static str,
    pub(crate) rows: Vec<ScoreRow>,
    pub(crate) evidence: Vec<String>,
    pub(crate) assessment: Option<Assessment>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct IndicatorView {
    pub(crate) feature: String,
    pub(crate) signal: SignalKind,
    pub(crate) strength: Strength,
    pub(crate) detail: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MetaView {
    pub(crate) model: String,
    pub(crate) elapsed_seconds: f64,
    pub(crate) text_length: u64,
}

impl MetaView {
    pub(crate) fn model_label(&self) -> String {
        format!("模型：{}", self.model)
    }

    pub(crate) fn elapsed_label(&self) -> String {
        format!("耗时：{} 秒", format_number(self.elapsed_seconds))
    }

    pub(crate) fn length_label(&self) -> String {
        format!("文本：{} 字符", self.text_length)
    }
}

/// Display model of one detection result. Text fields are raw; each output
/// format escapes them for its own medium.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ReportView {
    pub(crate) verdict: VerdictCategory,
    pub(crate) verdict_raw: String,
    pub(crate) confidence: f64,
    pub(crate) ring_offset: f64,
    pub(crate) ai_probability: f64,
    pub(crate) probability_tone: ProbabilityTone,
    pub(crate) summary: String,
    pub(crate) indicators: Vec<IndicatorView>,
    pub(crate) rounds: Vec<RoundView>,
    pub(crate) caveats: Vec<String>,
    pub(crate) meta: MetaView,
}

impl ReportView {
    pub(crate) fn from_result(result: &DetectResult) -> Self {
        let verdict_raw = if result.verdict.trim().is_empty() {
            DEFAULT_VERDICT.to_string()
        } else {
            result.verdict.clone()
        };
        let rounds = [
            &result.analysis_rounds.round1_features,
            &result.analysis_rounds.round2_deep_analysis,
        ]
        .into_iter()
        .zip(ROUNDS.iter())
        .map(|(details, table)| round_view(details, table))
        .collect();

        Self {
            verdict: VerdictCategory::classify(&verdict_raw),
            verdict_raw,
            confidence: result.confidence,
            ring_offset: ring_offset(result.confidence),
            ai_probability: result.ai_probability,
            probability_tone: ProbabilityTone::from_probability(result.ai_probability),
            summary: if result.summary.trim().is_empty() {
                EMPTY_SUMMARY.to_string()
            } else {
                result.summary.clone()
            },
            indicators: result
                .key_indicators
                .iter()
                .map(|indicator| IndicatorView {
                    feature: indicator.feature.clone(),
                    signal: if indicator.signal.to_lowercase().contains("ai") {
                        SignalKind::Ai
                    } else {
                        SignalKind::Human
                    },
                    strength: Strength::parse(&indicator.strength),
                    detail: Some(indicator.detail.clone()).filter(|d| !d.trim().is_empty()),
                })
                .collect(),
            rounds,
            caveats: result
                .caveats
                .iter()
                .filter(|caveat| !caveat.trim().is_empty())
                .cloned()
                .collect(),
            meta: MetaView {
                model: if result.model_used.trim().is_empty() {
                    "N/A".to_string()
                } else {
                    result.model_used.clone()
                },
                elapsed_seconds: result.elapsed_seconds,
                text_length: result.text_length,
            },
        }
    }

    pub(crate) fn confidence_label(&self) -> String {
        format!("{}%", format_number(self.confidence))
    }

    pub(crate) fn probability_label(&self) -> String {
        format!("{}%", format_number(self.ai_probability))
    }

    /// Swept fraction of the confidence ring, clamped for drawing.
    pub(crate) fn ring_fill_ratio(&self) -> f64 {
        (1.0 - self.ring_offset / ring_circumference()).clamp(0.0, 1.0)
    }

    pub(crate) fn has_caveats(&self) -> bool {
        !self.caveats.is_empty()
    }
}

fn round_view(details: &RoundDetails, table: &RoundTable) -> RoundView {
    let rows = table
        .features
        .iter()
        .filter_map(|(key, label)| {
            let sub = details.sub_score(key, table.detail_key)?;
            Some(ScoreRow {
                label: *label,
                score: sub.score,
                severity: Severity::from_score(sub.score),
                width_percent: sub.score * 10.0,
                detail: sub.detail,
            })
        })
        .collect();
    let (label_key, confidence_key) = table.assessment_keys;
    RoundView {
        title: table.title,
        rows,
        evidence: if table.with_evidence {
            details.key_evidence()
        } else {
            Vec::new()
        },
        assessment: details.assessment(label_key, confidence_key),
    }
}

/// Whole numbers print without a fraction, like the backend sends them.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
