use super::escape::{sanitize_for_terminal, single_line};
use super::view::{format_number, ReportView, SignalKind};

const BAR_CELLS: usize = 20;

/// Text rendering of a report for stdout.
pub(crate) fn render_plain(view: &ReportView) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "结论：{} ({})",
        view.verdict.label(),
        single_line(&view.verdict_raw)
    ));
    out.push(format!(
        "置信度：{} {}",
        bar(view.ring_fill_ratio() * 100.0),
        view.confidence_label()
    ));
    out.push(format!(
        "AI 概率：{} {}",
        bar(view.ai_probability),
        view.probability_label()
    ));
    out.push(String::new());
    out.push("摘要".to_string());
    out.push(sanitize_for_terminal(&view.summary));

    if !view.indicators.is_empty() {
        out.push(String::new());
        out.push("关键指标".to_string());
        for indicator in &view.indicators {
            let marker = match indicator.signal {
                SignalKind::Ai => "[AI]",
                SignalKind::Human => "[人类]",
            };
            out.push(format!(
                "  {marker} {} ({})",
                single_line(&indicator.feature),
                indicator.strength.label()
            ));
            if let Some(detail) = &indicator.detail {
                out.push(format!("      {}", single_line(detail)));
            }
        }
    }

    for round in &view.rounds {
        if round.rows.is_empty() && round.evidence.is_empty() {
            continue;
        }
        out.push(String::new());
        out.push(round.title.to_string());
        for row in &round.rows {
            out.push(format!(
                "  {} {} {}/10",
                row.label,
                bar(row.width_percent),
                format_number(row.score)
            ));
            if let Some(detail) = &row.detail {
                out.push(format!("      {}", single_line(detail)));
            }
        }
        if !round.evidence.is_empty() {
            out.push("  关键证据".to_string());
            for item in &round.evidence {
                out.push(format!("    - {}", single_line(item)));
            }
        }
        if let Some(assessment) = &round.assessment {
            out.push(format!(
                "  判断：{} ({}%)",
                single_line(&assessment.label),
                format_number(assessment.confidence)
            ));
        }
    }

    if view.has_caveats() {
        out.push(String::new());
        out.push("注意事项".to_string());
        for caveat in &view.caveats {
            out.push(format!("  • {}", single_line(caveat)));
        }
    }

    out.push(String::new());
    out.push(format!(
        "{}  {}  {}",
        single_line(&view.meta.model_label()),
        view.meta.elapsed_label(),
        view.meta.length_label()
    ));
    let mut text = out.join("\n");
    text.push('\n');
    text
}

pub(crate) fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_CELLS as f64).round() as usize;
    let mut out = String::with_capacity(BAR_CELLS * 3);
    out.extend(std::iter::repeat('█').take(filled));
    out.extend(std::iter::repeat('░').take(BAR_CELLS - filled));
    out
}
