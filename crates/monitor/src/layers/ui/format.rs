use crate::report::escape::{sanitize_for_terminal, single_line};
use crate::report::plain::bar;
use crate::report::view::{format_number, ReportView, RoundView, SignalKind};
use ratatui::text::{Line, Span, Text};

use super::app::{StageState, STAGE_LABELS};
use super::text::{display_width, wrap_text_lines};
use super::theme::{Theme, ValueStyle};

/// Styled report for the result panel. Every backend string is sanitized
/// before it reaches the frame.
pub(super) fn format_report(theme: &Theme, view: &ReportView, width: u16) -> Text<'static> {
    let mut lines = Vec::new();
    let verdict_style = theme.verdict_style(view.verdict);
    lines.push(Line::from(vec![
        Span::styled(view.verdict.label(), verdict_style),
        Span::styled(
            format!("  {}", single_line(&view.verdict_raw)),
            theme.value_style(ValueStyle::Dim),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("置信度   ", theme.key_style()),
        Span::styled(bar(view.ring_fill_ratio() * 100.0), verdict_style),
        Span::styled(
            format!(" {}", view.confidence_label()),
            theme.value_style(ValueStyle::Important),
        ),
    ]));
    let tone = theme.tone_style(view.probability_tone);
    lines.push(Line::from(vec![
        Span::styled("AI 概率  ", theme.key_style()),
        Span::styled(bar(view.ai_probability), tone),
        Span::styled(format!(" {}", view.probability_label()), tone),
    ]));

    section(&mut lines, theme, "摘要");
    lines.extend(kv_lines(theme, "", view.summary.clone(), ValueStyle::Normal, width));

    if !view.indicators.is_empty() {
        section(&mut lines, theme, "关键指标");
        for indicator in &view.indicators {
            let is_ai = indicator.signal == SignalKind::Ai;
            lines.push(Line::from(vec![
                Span::styled("● ", theme.signal_style(is_ai)),
                Span::styled(
                    single_line(&indicator.feature),
                    theme.value_style(ValueStyle::Normal),
                ),
                Span::styled(
                    format!(" [{}]", indicator.strength.label()),
                    theme.value_style(ValueStyle::Dim),
                ),
            ]));
            if let Some(detail) = &indicator.detail {
                lines.extend(kv_lines(theme, " ", detail.clone(), ValueStyle::Dim, width));
            }
        }
    }

    for round in &view.rounds {
        round_lines(&mut lines, theme, round, width);
    }

    if view.has_caveats() {
        section(&mut lines, theme, "注意事项");
        for caveat in &view.caveats {
            lines.extend(kv_lines(theme, "•", caveat.clone(), ValueStyle::Normal, width));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(
            single_line(&view.meta.model_label()),
            theme.value_style(ValueStyle::Dim),
        ),
        Span::styled(
            format!("  {}  {}", view.meta.elapsed_label(), view.meta.length_label()),
            theme.value_style(ValueStyle::Dim),
        ),
    ]));
    Text::from(lines)
}

fn round_lines(lines: &mut Vec<Line<'static>>, theme: &Theme, round: &RoundView, width: u16) {
    if round.rows.is_empty() && round.evidence.is_empty() && round.assessment.is_none() {
        return;
    }
    section(lines, theme, round.title);
    let label_width = round
        .rows
        .iter()
        .map(|row| display_width(row.label))
        .max()
        .unwrap_or(0);
    for row in &round.rows {
        let severity = theme.severity_style(row.severity);
        let padding = " ".repeat(label_width.saturating_sub(display_width(row.label)));
        lines.push(Line::from(vec![
            Span::styled(format!("{}{padding} ", row.label), theme.key_style()),
            Span::styled(bar(row.width_percent), severity),
            Span::styled(format!(" {}/10", format_number(row.score)), severity),
        ]));
        if let Some(detail) = &row.detail {
            lines.extend(kv_lines(theme, " ", detail.clone(), ValueStyle::Dim, width));
        }
    }
    if !round.evidence.is_empty() {
        lines.push(Line::styled("关键证据", theme.key_style()));
        for item in &round.evidence {
            lines.extend(kv_lines(theme, "-", item.clone(), ValueStyle::Normal, width));
        }
    }
    if let Some(assessment) = &round.assessment {
        lines.push(Line::from(vec![
            Span::styled("判断：", theme.key_style()),
            Span::styled(
                format!(
                    "{} ({}%)",
                    single_line(&assessment.label),
                    format_number(assessment.confidence)
                ),
                theme.value_style(ValueStyle::Important),
            ),
        ]));
    }
}

pub(super) fn format_loading(theme: &Theme, stages: &[StageState]) -> Text<'static> {
    let mut lines = vec![
        Line::styled("正在分析文本...", theme.accent_style()),
        Line::default(),
    ];
    for (index, (label, stage)) in STAGE_LABELS.iter().zip(stages).enumerate() {
        let marker = match stage {
            StageState::Idle => "○",
            StageState::Active => "◉",
            StageState::Done => "✓",
        };
        lines.push(Line::styled(
            format!("{marker} {}. {label}", index + 1),
            theme.stage_style(*stage),
        ));
    }
    Text::from(lines)
}

pub(super) fn format_error(theme: &Theme, message: &str, width: u16) -> Text<'static> {
    let mut lines = vec![Line::styled("检测失败", theme.error_style())];
    lines.extend(kv_lines(
        theme,
        "",
        message.to_string(),
        ValueStyle::Normal,
        width,
    ));
    Text::from(lines)
}

fn section(lines: &mut Vec<Line<'static>>, theme: &Theme, title: &str) {
    lines.push(Line::default());
    lines.push(Line::styled(title.to_string(), theme.accent_style()));
}

/// Sanitized, pre-wrapped value with `key` hanging in front of the first
/// line and later lines indented to match.
fn kv_lines(
    theme: &Theme,
    key: &str,
    value: String,
    level: ValueStyle,
    width: u16,
) -> Vec<Line<'static>> {
    let value = sanitize_for_terminal(&value);
    let key_label = if key.is_empty() {
        String::new()
    } else {
        format!("{key} ")
    };
    let key_width = display_width(&key_label);
    let width = width.max(1) as usize;
    let value_width = width.saturating_sub(key_width).max(1);
    let wrapped = wrap_text_lines(&value, value_width);
    let mut lines = Vec::with_capacity(wrapped.len().max(1));
    let indent = " ".repeat(key_width);
    for (idx, segment) in wrapped.into_iter().enumerate() {
        let prefix = if idx == 0 {
            key_label.clone()
        } else {
            indent.clone()
        };
        lines.push(Line::from(vec![
            Span::styled(prefix, theme.key_style()),
            Span::styled(segment, theme.value_style(level)),
        ]));
    }
    lines
}
