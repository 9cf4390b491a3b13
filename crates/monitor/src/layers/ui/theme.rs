use ratatui::style::{Color, Modifier, Style};

use crate::layers::storage::ThemeMode;
use crate::report::view::{ProbabilityTone, Severity, VerdictCategory};

use super::app::StageState;

#[derive(Clone, Copy)]
pub(crate) enum ValueStyle {
    Normal,
    Important,
    Dim,
}

pub(crate) struct Theme {
    background: Color,
    border: Color,
    title: Color,
    text: Color,
    dim: Color,
    accent: Color,
    highlight_fg: Color,
    highlight_bg: Color,
    ai: Color,
    human: Color,
    uncertain: Color,
    warn: Color,
    error: Color,
}

impl Theme {
    pub(crate) fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    pub(crate) fn dark() -> Self {
        Self {
            background: Color::Reset,
            border: Color::DarkGray,
            title: Color::Blue,
            text: Color::White,
            dim: Color::Gray,
            accent: Color::Cyan,
            highlight_fg: Color::White,
            highlight_bg: Color::DarkGray,
            ai: Color::LightRed,
            human: Color::LightGreen,
            uncertain: Color::Yellow,
            warn: Color::LightYellow,
            error: Color::Red,
        }
    }

    pub(crate) fn light() -> Self {
        Self {
            background: Color::White,
            border: Color::Gray,
            title: Color::Blue,
            text: Color::Black,
            dim: Color::DarkGray,
            accent: Color::Blue,
            highlight_fg: Color::Black,
            highlight_bg: Color::Gray,
            ai: Color::Red,
            human: Color::Green,
            uncertain: Color::Rgb(0xb8, 0x87, 0x1a),
            warn: Color::Rgb(0xd2, 0x73, 0x1c),
            error: Color::Red,
        }
    }

    pub(crate) fn base_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub(crate) fn block<'a>(&self, title: &'a str) -> ratatui::widgets::Block<'a> {
        ratatui::widgets::Block::default()
            .title(ratatui::text::Span::styled(
                title,
                Style::default()
                    .fg(self.title)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(ratatui::widgets::Borders::ALL)
            .border_style(Style::default().fg(self.border))
            .style(self.base_style())
    }

    pub(crate) fn focused_block<'a>(&self, title: &'a str) -> ratatui::widgets::Block<'a> {
        self.block(title)
            .border_style(Style::default().fg(self.accent))
    }

    pub(crate) fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn help_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(crate) fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn warn_style(&self) -> Style {
        Style::default().fg(self.warn).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn key_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(crate) fn value_style(&self, level: ValueStyle) -> Style {
        match level {
            ValueStyle::Normal => Style::default().fg(self.text),
            ValueStyle::Important => Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD),
            ValueStyle::Dim => Style::default().fg(self.dim),
        }
    }

    pub(crate) fn verdict_style(&self, verdict: VerdictCategory) -> Style {
        let color = match verdict {
            VerdictCategory::Ai => self.ai,
            VerdictCategory::Human => self.human,
            VerdictCategory::Uncertain => self.uncertain,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn tone_style(&self, tone: ProbabilityTone) -> Style {
        let color = match tone {
            ProbabilityTone::Ai => self.ai,
            ProbabilityTone::Warning => self.warn,
            ProbabilityTone::Human => self.human,
        };
        Style::default().fg(color)
    }

    pub(crate) fn severity_style(&self, severity: Severity) -> Style {
        let color = match severity {
            Severity::Low => self.human,
            Severity::Mid => self.warn,
            Severity::High => self.ai,
        };
        Style::default().fg(color)
    }

    pub(crate) fn signal_style(&self, is_ai: bool) -> Style {
        Style::default().fg(if is_ai { self.ai } else { self.human })
    }

    pub(crate) fn stage_style(&self, stage: StageState) -> Style {
        match stage {
            StageState::Idle => Style::default().fg(self.dim),
            StageState::Active => Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD),
            StageState::Done => Style::default().fg(self.human),
        }
    }
}
