use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use super::app::{AppState, BackendStatus, ResultPanel, SettingsField};
use super::format::{format_error, format_loading, format_report};
use super::text::{
    display_width, mask, pad_right, truncate_with_ellipsis, wrap_text_lines, wrapped_cursor,
};
use super::theme::{Theme, ValueStyle};

const PLACEHOLDER: &str = "在左侧输入待检测文本，按 Ctrl+R 开始检测。";

pub(crate) fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let theme = Theme::for_mode(app.theme_mode);
    frame.render_widget(Paragraph::new("").style(theme.base_style()), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    draw_header(frame, app, &theme, chunks[0]);
    draw_editor(frame, app, &theme, body[0]);
    draw_result(frame, app, &theme, body[1]);
    draw_footer(frame, app, &theme, chunks[2]);

    if app.settings_open {
        draw_settings(frame, app, &theme);
    }
    if let Some(toast) = &app.toast {
        draw_toast(frame, &theme, &toast.message);
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let (status, status_style) = match app.backend {
        BackendStatus::Unknown => ("连接中", theme.value_style(ValueStyle::Dim)),
        BackendStatus::Online => ("在线", theme.signal_style(false)),
        BackendStatus::Offline => ("离线", theme.error_style()),
    };
    let header_line = Line::from(vec![
        Span::styled("Server: ", theme.key_style()),
        Span::styled(app.server.clone(), theme.value_style(ValueStyle::Important)),
        Span::styled("  ● ", status_style),
        Span::styled(status, status_style),
        Span::styled("  Theme: ", theme.key_style()),
        Span::styled(
            app.theme_mode.as_str(),
            theme.value_style(ValueStyle::Normal),
        ),
    ]);
    let header = Paragraph::new(header_line)
        .block(theme.block("AIGC 文本检测"))
        .style(theme.value_style(ValueStyle::Normal));
    frame.render_widget(header, area);
}

fn draw_editor(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let block = if app.settings_open {
        theme.block("待检测文本")
    } else {
        theme.focused_block("待检测文本")
    };
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    let text_area = parts[0];
    let width = text_area.width.max(1) as usize;
    let wrapped = wrap_text_lines(app.editor.text(), width);
    let (line, column) = app.editor.cursor_position();
    let (row, col) = wrapped_cursor(app.editor.text(), line, column, width);
    let height = text_area.height.max(1) as usize;
    let scroll = row.saturating_sub(height - 1);

    let content = if app.editor.text().is_empty() {
        Paragraph::new(Line::styled("粘贴或输入文本...", theme.help_style()))
    } else {
        Paragraph::new(wrapped.join("\n"))
            .style(theme.value_style(ValueStyle::Normal))
            .scroll((scroll as u16, 0))
    };
    frame.render_widget(content, text_area);

    let stats = Line::from(vec![
        Span::styled(app.stats.chars_label(), theme.value_style(ValueStyle::Dim)),
        Span::styled(" · ", theme.help_style()),
        Span::styled(app.stats.words_label(), theme.value_style(ValueStyle::Dim)),
    ]);
    frame.render_widget(Paragraph::new(stats), parts[1]);

    if !app.settings_open {
        frame.set_cursor_position((
            text_area.x + col.min(width.saturating_sub(1)) as u16,
            text_area.y + (row - scroll).min(height - 1) as u16,
        ));
    }
}

fn draw_result(frame: &mut ratatui::Frame, app: &mut AppState, theme: &Theme, area: Rect) {
    let inner = theme.block("检测结果").inner(area);
    let width = inner.width;
    let (text, scrollable) = match &app.panel {
        ResultPanel::Placeholder => (
            Text::from(Line::styled(PLACEHOLDER, theme.help_style())),
            false,
        ),
        ResultPanel::Loading => (format_loading(theme, &app.stages), false),
        ResultPanel::Content(view) => (format_report(theme, view, width), true),
        ResultPanel::Error(message) => (format_error(theme, message, width), false),
    };
    let total_lines = if scrollable { text.lines.len() } else { 1 };
    app.set_result_metrics(total_lines, inner.height);
    let title = if scrollable {
        format!(
            "检测结果 (line {}/{})",
            app.result_scroll.saturating_add(1),
            app.result_total_lines
        )
    } else {
        "检测结果".to_string()
    };
    let block = theme.block(&title);

    let mut widget = Paragraph::new(text)
        .block(block)
        .style(theme.value_style(ValueStyle::Normal));
    if scrollable {
        widget = widget.scroll((app.result_scroll as u16, 0));
    } else {
        widget = widget.wrap(Wrap { trim: true });
    }
    frame.render_widget(Clear, area);
    frame.render_widget(widget, area);
}

fn draw_footer(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let trigger_style = if app.detect_running {
        theme.value_style(ValueStyle::Dim)
    } else {
        theme.accent_style()
    };
    let mut footer_spans = vec![
        Span::styled(format!("[{}]  ", app.trigger_label()), trigger_style),
        Span::styled(
            "Ctrl+R/F5=detect  Ctrl+S=settings  Ctrl+T=theme  Ctrl+L=reset  Ctrl+E=export  PgUp/PgDn=scroll  Ctrl+Q=quit  ",
            theme.help_style(),
        ),
    ];
    if app.confirm_quit {
        footer_spans.push(Span::styled(
            "再次按 Ctrl+Q 退出 / Esc 取消  ",
            theme.warn_style(),
        ));
    }
    let footer = Paragraph::new(Line::from(footer_spans)).block(theme.block("Controls"));
    frame.render_widget(footer, area);
}

fn draw_settings(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme) {
    let area = centered_rect(frame.area(), 64, 12);
    let block = theme.focused_block("设置");
    let inner = block.inner(area);
    let label_width = SettingsField::ALL
        .iter()
        .map(|field| display_width(field.label()))
        .max()
        .unwrap_or(0)
        + 2;
    let value_width = (inner.width as usize).saturating_sub(label_width + 1);

    let mut lines = Vec::new();
    let mut cursor = None;
    for (index, field) in SettingsField::ALL.into_iter().enumerate() {
        let editor = app.form.field(field);
        let selected = field == app.form.selected;
        let value = if field == SettingsField::ApiKey && !app.form.reveal_key {
            mask(editor.text())
        } else {
            editor.text().to_string()
        };
        let (_, column) = editor.cursor_position();
        let shown = if display_width(&value) > value_width {
            // keep the tail visible while typing
            let skip = display_width(&value) - value_width;
            if selected {
                cursor = Some((index, column.saturating_sub(skip)));
            }
            value.chars().skip(skip).collect()
        } else {
            if selected {
                cursor = Some((index, column));
            }
            value
        };
        let label_style = if selected {
            theme.highlight_style()
        } else {
            theme.key_style()
        };
        lines.push(Line::from(vec![
            Span::styled(pad_right(field.label(), label_width), label_style),
            Span::styled(" ", theme.base_style()),
            Span::styled(shown, theme.value_style(ValueStyle::Normal)),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::styled(
        truncate_with_ellipsis(
            "Tab/↑/↓=field  Enter=save  Esc=close  F2=show/hide key",
            inner.width as usize,
        ),
        theme.help_style(),
    ));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    if let Some((row, column)) = cursor {
        frame.set_cursor_position((
            inner.x + (label_width + 1 + column).min(inner.width.saturating_sub(1) as usize) as u16,
            inner.y + row as u16,
        ));
    }
}

fn draw_toast(frame: &mut ratatui::Frame, theme: &Theme, message: &str) {
    let outer = frame.area();
    let width = (display_width(message) as u16 + 4).min(outer.width);
    let area = Rect {
        x: outer.x + outer.width.saturating_sub(width + 1),
        y: outer.y + 1,
        width,
        height: 3,
    }
    .intersection(outer);
    let widget = Paragraph::new(Line::styled(message.to_string(), theme.warn_style()))
        .block(theme.focused_block(""));
    frame.render_widget(Clear, area);
    frame.render_widget(widget, area);
}

fn centered_rect(outer: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::service::UiEvent;
    use crate::layers::storage::{Settings, ThemeMode};
    use protocol::DetectResult;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Instant;

    fn render(app: &mut AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 32)).expect("terminal");
        terminal.draw(|frame| draw_ui(frame, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn draws_every_panel_state() {
        let mut app = AppState::new(
            "http://127.0.0.1:8765".to_string(),
            &Settings::default(),
            ThemeMode::Light,
        );
        let screen = render(&mut app);
        assert!(screen.contains("http://127.0.0.1:8765"));
        assert!(screen.contains("Ctrl+R/F5=detect"));

        app.panel = ResultPanel::Loading;
        render(&mut app);

        let result = DetectResult {
            verdict: "AI-generated".to_string(),
            model_used: "gpt-4o".to_string(),
            caveats: (0..60).map(|idx| format!("caveat-{idx}")).collect(),
            ..DetectResult::default()
        };
        app.handle_event(UiEvent::DetectionSucceeded(Box::new(result)));
        let screen = render(&mut app);
        assert!(screen.contains("AI-generated"));
        assert!(screen.contains("line 1/"));
        assert!(app.result_max_scroll > 0);

        app.handle_event(UiEvent::DetectionFailed("boom".to_string()));
        let screen = render(&mut app);
        assert!(screen.contains("boom"));
    }

    #[test]
    fn settings_modal_masks_key_until_revealed() {
        let settings = Settings {
            api_key: "sk-secret".to_string(),
            ..Settings::default()
        };
        let mut app = AppState::new(String::new(), &settings, ThemeMode::Dark);
        app.open_settings();
        app.show_toast("saved", Instant::now());
        let screen = render(&mut app);
        assert!(!screen.contains("sk-secret"));
        assert!(screen.contains("saved"));
        app.form.reveal_key = true;
        let screen = render(&mut app);
        assert!(screen.contains("sk-secret"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut app = AppState::default();
        app.open_settings();
        app.show_toast("a fairly long toast message", Instant::now());
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).expect("terminal");
        terminal.draw(|frame| draw_ui(frame, &mut app)).expect("draw");
    }
}
