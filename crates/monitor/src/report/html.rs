use crate::layers::storage::ThemeMode;

use super::escape::html_escape;
use super::view::{
    format_number, ring_circumference, IndicatorView, ProbabilityTone, ReportView, RoundView,
    SignalKind, VerdictCategory, RING_RADIUS,
};

const STYLE: &str = r#"
:root, [data-theme="dark"] {
    --bg: #12141a; --bg-card: #1b1e27; --text: #e6e8ee; --dim: #8b90a0; --border: #2a2e3a;
    --ai-color: #ef5b5b; --human-color: #3fbf7f; --uncertain-color: #d6a93a; --warning: #e8913a;
}
[data-theme="light"] {
    --bg: #f6f7f9; --bg-card: #ffffff; --text: #1d2230; --dim: #5d6475; --border: #d9dce3;
    --ai-color: #d64040; --human-color: #23945e; --uncertain-color: #b8871a; --warning: #d2731c;
}
body { background: var(--bg); color: var(--text); font-family: system-ui, sans-serif; margin: 2rem; }
.card { background: var(--bg-card); border: 1px solid var(--border); border-radius: 4px; padding: 1rem; margin-bottom: 1rem; }
.hidden { display: none; }
.verdict-badge.ai { color: var(--ai-color); } .verdict-badge.human { color: var(--human-color); } .verdict-badge.uncertain { color: var(--uncertain-color); }
.prob-bar { background: var(--border); height: 8px; border-radius: 4px; }
.prob-fill { height: 8px; border-radius: 4px; }
.prob-fill.ai { background: var(--ai-color); } .prob-fill.warning { background: var(--warning); } .prob-fill.human { background: var(--human-color); }
.indicator-signal { display: inline-block; width: 8px; height: 8px; border-radius: 50%; margin-right: 0.4rem; }
.indicator-signal.ai { background: var(--ai-color); } .indicator-signal.human { background: var(--human-color); }
.indicator-strength { margin-left: 0.5rem; font-size: 0.8rem; color: var(--dim); }
.indicator-detail, .score-evidence { color: var(--dim); font-size: 0.85rem; margin: 0.2rem 0 0.6rem; }
.score-item { display: flex; align-items: center; gap: 0.6rem; }
.score-name { min-width: 7rem; }
.score-bar { flex: 1; background: var(--border); height: 6px; border-radius: 3px; }
.score-bar-fill { height: 6px; border-radius: 3px; }
.score-low { background: var(--human-color); color: var(--human-color); }
.score-mid { background: var(--warning); color: var(--warning); }
.score-high { background: var(--ai-color); color: var(--ai-color); }
.score-value { background: none; min-width: 3rem; text-align: right; }
.meta { color: var(--dim); font-size: 0.8rem; display: flex; gap: 1.5rem; }
"#;

/// Renders a standalone report page. All backend text is escaped.
pub(crate) fn render_html(view: &ReportView, theme: ThemeMode) -> String {
    let class = view.verdict.class_name();
    let circumference = ring_circumference();
    let indicators: String = view.indicators.iter().map(render_indicator).collect();
    let rounds: String = view.rounds.iter().map(render_round).collect();
    let caveat_items: String = view
        .caveats
        .iter()
        .map(|caveat| format!("<li>{}</li>", html_escape(caveat)))
        .collect();
    let caveat_class = if view.has_caveats() {
        "card caveats"
    } else {
        "card caveats hidden"
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN" data-theme="{theme}">
<head>
<meta charset="utf-8">
<title>AI 生成内容检测报告</title>
<style>{STYLE}</style>
</head>
<body>
<section class="card verdict-card {class}">
    <svg width="128" height="128" viewBox="0 0 128 128">
        <circle cx="64" cy="64" r="{radius}" fill="none" stroke="var(--border)" stroke-width="8"/>
        <circle class="confidence-ring-fill" cx="64" cy="64" r="{radius}" fill="none" stroke="var(--{ring_color})" stroke-width="8"
            stroke-dasharray="{circumference:.3}" stroke-dashoffset="{offset:.3}" transform="rotate(-90 64 64)"/>
        <text x="64" y="70" text-anchor="middle" fill="currentColor">{confidence}</text>
    </svg>
    <h1 class="verdict-badge {class}">{badge}</h1>
    <div class="verdict-raw">{verdict_raw}</div>
</section>
<section class="card">
    <div>AI 概率 <span class="prob-value" style="color: var(--{tone_color})">{probability}</span></div>
    <div class="prob-bar"><div class="prob-fill {tone}" style="width:{probability_width}%"></div></div>
</section>
<section class="card">
    <h2>摘要</h2>
    <p class="result-summary">{summary}</p>
</section>
<section class="card">
    <h2>关键指标</h2>
    <div class="indicators-list">{indicators}</div>
</section>
{rounds}
<section class="{caveat_class}">
    <h2>注意事项</h2>
    <ul class="caveats-list">{caveat_items}</ul>
</section>
<footer class="meta">
    <span>{model}</span><span>{elapsed}</span><span>{length}</span>
</footer>
</body>
</html>
"#,
        theme = theme.as_str(),
        radius = format_number(RING_RADIUS),
        ring_color = ring_color(view),
        offset = view.ring_offset,
        confidence = view.confidence_label(),
        badge = view.verdict.label(),
        verdict_raw = html_escape(&view.verdict_raw),
        tone_color = tone_color(view),
        probability = view.probability_label(),
        tone = view.probability_tone.class_name(),
        probability_width = format_number(view.ai_probability),
        summary = html_escape(&view.summary),
        model = html_escape(&view.meta.model_label()),
        elapsed = view.meta.elapsed_label(),
        length = view.meta.length_label(),
    )
}

fn ring_color(view: &ReportView) -> &'static str {
    match view.verdict {
        VerdictCategory::Ai => "ai-color",
        VerdictCategory::Human => "human-color",
        VerdictCategory::Uncertain => "uncertain-color",
    }
}

fn tone_color(view: &ReportView) -> &'static str {
    match view.probability_tone {
        ProbabilityTone::Ai => "ai-color",
        ProbabilityTone::Warning => "warning",
        ProbabilityTone::Human => "human-color",
    }
}

fn render_indicator(indicator: &IndicatorView) -> String {
    let signal = match indicator.signal {
        SignalKind::Ai => "ai",
        SignalKind::Human => "human",
    };
    let detail = indicator
        .detail
        .as_deref()
        .map(|detail| format!(r#"<div class="indicator-detail">{}</div>"#, html_escape(detail)))
        .unwrap_or_default();
    format!(
        r#"<div class="indicator-item"><span class="indicator-signal {signal}"></span><span class="indicator-name">{name}</span><span class="indicator-strength {strength_class}">{strength}</span>{detail}</div>"#,
        name = html_escape(&indicator.feature),
        strength_class = indicator.strength.class_name(),
        strength = indicator.strength.label(),
    )
}

fn render_round(round: &RoundView) -> String {
    let mut body = String::new();
    for row in &round.rows {
        let class = row.severity.class_name();
        body.push_str(&format!(
            r#"<div class="score-item"><span class="score-name">{label}</span><div class="score-bar"><div class="score-bar-fill {class}" style="width:{width}%"></div></div><span class="score-value {class}">{score}/10</span></div>"#,
            label = row.label,
            width = format_number(row.width_percent),
            score = format_number(row.score),
        ));
        if let Some(detail) = &row.detail {
            body.push_str(&format!(
                r#"<div class="score-evidence">{}</div>"#,
                html_escape(detail)
            ));
        }
    }
    if !round.evidence.is_empty() {
        body.push_str(r#"<div class="key-evidence"><div class="score-name">关键证据</div>"#);
        for item in &round.evidence {
            body.push_str(&format!(
                r#"<div class="score-evidence">- {}</div>"#,
                html_escape(item)
            ));
        }
        body.push_str("</div>");
    }
    if let Some(assessment) = &round.assessment {
        body.push_str(&format!(
            r#"<div class="score-evidence">判断：{} ({}%)</div>"#,
            html_escape(&assessment.label),
            format_number(assessment.confidence),
        ));
    }
    format!(
        "<section class=\"card round\">\n    <h2>{}</h2>\n    {}\n</section>\n",
        round.title, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::DetectResult;
    use serde_json::json;

    fn view(value: serde_json::Value) -> ReportView {
        let result: DetectResult = serde_json::from_value(value).expect("decode");
        ReportView::from_result(&result)
    }

    #[test]
    fn markup_in_backend_text_is_inert() {
        let page = render_html(
            &view(json!({
                "verdict": "AI-generated",
                "summary": "<script>alert(1)</script>",
                "key_indicators": [
                    {"feature": "<b>bold</b>", "signal": "AI", "detail": "<img src=x onerror=alert(2)>"}
                ],
                "caveats": ["<iframe>"],
                "model_used": "<m>"
            })),
            ThemeMode::Dark,
        );
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("&lt;img src=x onerror=alert(2)&gt;"));
        assert!(page.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(page.contains("<li>&lt;iframe&gt;</li>"));
        assert!(!page.contains("<m>"));
    }

    #[test]
    fn ring_and_bars_use_computed_geometry() {
        let page = render_html(
            &view(json!({
                "verdict": "Human-written",
                "confidence": 50,
                "ai_probability": 45,
                "analysis_rounds": {"round1_features": {"discourse_patterns": {"score": 4}}}
            })),
            ThemeMode::Light,
        );
        let circumference = ring_circumference();
        assert!(page.contains(&format!("stroke-dasharray=\"{circumference:.3}\"")));
        assert!(page.contains(&format!("stroke-dashoffset=\"{:.3}\"", circumference / 2.0)));
        assert!(page.contains("stroke=\"var(--human-color)\""));
        assert!(page.contains(r#"class="prob-fill warning" style="width:45%""#));
        assert!(page.contains(r#"class="score-bar-fill score-mid" style="width:40%""#));
        assert!(page.contains(r#"data-theme="light""#));
    }

    #[test]
    fn empty_caveats_hide_section() {
        let page = render_html(&view(json!({})), ThemeMode::Dark);
        assert!(page.contains(r#"class="card caveats hidden""#));
        assert!(page.contains("暂无摘要。"));
        assert!(page.contains("模型：N/A"));

        let page = render_html(&view(json!({"caveats": ["short"]})), ThemeMode::Dark);
        assert!(page.contains(r#"class="card caveats""#));
        assert!(page.contains("<li>short</li>"));
    }

    #[test]
    fn key_evidence_follows_round_two_scores() {
        let page = render_html(
            &view(json!({
                "analysis_rounds": {
                    "round2_deep_analysis": {
                        "semantic_depth": {"score": 8, "details": "shallow"},
                        "key_evidence": ["no personal detail"]
                    }
                }
            })),
            ThemeMode::Dark,
        );
        let scores = page.find("语义深度").expect("score row");
        let evidence = page.find("- no personal detail").expect("evidence");
        assert!(scores < evidence);
    }
}
