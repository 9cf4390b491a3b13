use crate::layers::policy::validate::{validate_submission, TextStats};
use crate::layers::service::detection::STAGE_COUNT;
use crate::layers::service::UiEvent;
use crate::layers::storage::{self, parse_temperature, LocalStore, Settings, ThemeMode};
use crate::report::view::format_number;
use crate::report::{render_html, ReportView};
use protocol::DetectRequest;
use std::path::Path;
use std::time::{Duration, Instant};

use super::editor::TextEditor;

pub(crate) const TOAST_DURATION: Duration = Duration::from_millis(2_200);

pub(crate) const STAGE_LABELS: [&str; STAGE_COUNT] = ["特征提取", "深度分析", "综合判定"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum StageState {
    #[default]
    Idle,
    Active,
    Done,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum ResultPanel {
    #[default]
    Placeholder,
    Loading,
    Content(Box<ReportView>),
    Error(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum BackendStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum SettingsField {
    #[default]
    ApiBase,
    ApiKey,
    Model,
    Temperature,
}

impl SettingsField {
    pub(crate) const ALL: [SettingsField; 4] = [
        SettingsField::ApiBase,
        SettingsField::ApiKey,
        SettingsField::Model,
        SettingsField::Temperature,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SettingsField::ApiBase => "API Base URL",
            SettingsField::ApiKey => "API Key",
            SettingsField::Model => "模型名称",
            SettingsField::Temperature => "Temperature",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|field| *field == self).unwrap_or(0)
    }

    pub(crate) fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub(crate) fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Editable copy of the settings. The form is what a detection reads, so
/// edits apply before they are saved.
#[derive(Clone, Debug, Default)]
pub(crate) struct SettingsForm {
    pub(crate) api_base: TextEditor,
    pub(crate) api_key: TextEditor,
    pub(crate) model: TextEditor,
    pub(crate) temperature: TextEditor,
    pub(crate) selected: SettingsField,
    pub(crate) reveal_key: bool,
}

impl SettingsForm {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self {
            api_base: TextEditor::with_text(settings.api_base.clone()),
            api_key: TextEditor::with_text(settings.api_key.clone()),
            model: TextEditor::with_text(settings.model.clone()),
            temperature: TextEditor::with_text(format_number(settings.temperature)),
            selected: SettingsField::default(),
            reveal_key: false,
        }
    }

    pub(crate) fn to_settings(&self) -> Settings {
        Settings {
            api_base: self.api_base.text().to_string(),
            api_key: self.api_key.text().to_string(),
            model: self.model.text().to_string(),
            temperature: parse_temperature(self.temperature.text()),
        }
    }

    pub(crate) fn field(&self, field: SettingsField) -> &TextEditor {
        match field {
            SettingsField::ApiBase => &self.api_base,
            SettingsField::ApiKey => &self.api_key,
            SettingsField::Model => &self.model,
            SettingsField::Temperature => &self.temperature,
        }
    }

    pub(crate) fn selected_mut(&mut self) -> &mut TextEditor {
        match self.selected {
            SettingsField::ApiBase => &mut self.api_base,
            SettingsField::ApiKey => &mut self.api_key,
            SettingsField::Model => &mut self.model,
            SettingsField::Temperature => &mut self.temperature,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Toast {
    pub(crate) message: String,
    shown_at: Instant,
}

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) server: String,
    pub(crate) backend: BackendStatus,
    pub(crate) theme_mode: ThemeMode,
    pub(crate) editor: TextEditor,
    pub(crate) stats: TextStats,
    pub(crate) form: SettingsForm,
    pub(crate) settings_open: bool,
    pub(crate) panel: ResultPanel,
    pub(crate) stages: [StageState; STAGE_COUNT],
    pub(crate) detect_running: bool,
    pub(crate) toast: Option<Toast>,
    pub(crate) result_scroll: usize,
    pub(crate) result_max_scroll: usize,
    pub(crate) result_total_lines: usize,
    pub(crate) result_view_height: u16,
    pub(crate) confirm_quit: bool,
}

impl AppState {
    pub(crate) fn new(server: String, settings: &Settings, theme_mode: ThemeMode) -> Self {
        Self {
            server,
            theme_mode,
            form: SettingsForm::from_settings(settings),
            ..Self::default()
        }
    }

    pub(crate) fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::StageReached(index) => {
                for stage in self.stages.iter_mut().take(index) {
                    *stage = StageState::Done;
                }
                if let Some(stage) = self.stages.get_mut(index) {
                    if *stage != StageState::Done {
                        *stage = StageState::Active;
                    }
                }
            }
            UiEvent::StagesDone => self.stages = [StageState::Done; STAGE_COUNT],
            UiEvent::DetectionSucceeded(result) => {
                self.panel = ResultPanel::Content(Box::new(ReportView::from_result(&result)));
                self.result_scroll = 0;
            }
            UiEvent::DetectionFailed(message) => {
                self.panel = ResultPanel::Error(message);
                self.result_scroll = 0;
            }
            UiEvent::DetectionFinished => self.detect_running = false,
            UiEvent::HealthChecked(outcome) => {
                self.backend = if outcome.is_ok() {
                    BackendStatus::Online
                } else {
                    BackendStatus::Offline
                };
            }
        }
    }

    pub(crate) fn on_text_changed(&mut self) {
        self.stats = TextStats::of(self.editor.text());
    }

    /// Validates the current text and form. On success the run is marked
    /// started and the request is returned for the caller to send.
    pub(crate) fn begin_detection(&mut self, now: Instant) -> Option<DetectRequest> {
        if self.detect_running {
            return None;
        }
        match validate_submission(&self.form.to_settings(), self.editor.text()) {
            Ok(request) => {
                self.detect_running = true;
                self.stages = [StageState::Idle; STAGE_COUNT];
                self.panel = ResultPanel::Loading;
                self.result_scroll = 0;
                Some(request)
            }
            Err(err) => {
                self.show_toast(err.message(), now);
                if err.opens_settings() {
                    self.open_settings();
                }
                None
            }
        }
    }

    pub(crate) fn trigger_label(&self) -> &'static str {
        if self.detect_running {
            "检测中..."
        } else {
            "开始检测"
        }
    }

    pub(crate) fn reset(&mut self) {
        self.panel = ResultPanel::Placeholder;
        self.detect_running = false;
        self.stages = [StageState::Idle; STAGE_COUNT];
        self.result_scroll = 0;
    }

    pub(crate) fn open_settings(&mut self) {
        self.settings_open = true;
        self.form.selected = SettingsField::default();
    }

    pub(crate) fn close_settings(&mut self) {
        self.settings_open = false;
        self.form.reveal_key = false;
    }

    pub(crate) fn save_settings(&mut self, store: &LocalStore, now: Instant) {
        match storage::save_settings(store, &self.form.to_settings()) {
            Ok(()) => {
                self.close_settings();
                self.show_toast("配置已保存", now);
            }
            Err(err) => {
                tracing::warn!(event = "settings.save_failed", error = %err);
                self.show_toast("配置保存失败", now);
            }
        }
    }

    pub(crate) fn toggle_theme(&mut self, store: &LocalStore) {
        self.theme_mode = storage::toggle_theme(store, self.theme_mode);
    }

    /// Writes the shown report as a standalone HTML page.
    pub(crate) fn export_report(&mut self, path: &Path, now: Instant) {
        let ResultPanel::Content(view) = &self.panel else {
            self.show_toast("暂无可导出的结果", now);
            return;
        };
        let page = render_html(view, self.theme_mode);
        match std::fs::write(path, page) {
            Ok(()) => {
                tracing::info!(event = "report.exported", path = %path.display());
                self.show_toast(format!("报告已导出：{}", path.display()), now);
            }
            Err(err) => {
                tracing::warn!(event = "report.export_failed", path = %path.display(), error = %err);
                self.show_toast(format!("导出失败：{err}"), now);
            }
        }
    }

    pub(crate) fn show_toast(&mut self, message: impl Into<String>, now: Instant) {
        self.toast = Some(Toast {
            message: message.into(),
            shown_at: now,
        });
    }

    pub(crate) fn expire_toast(&mut self, now: Instant) {
        if let Some(toast) = &self.toast {
            if now.saturating_duration_since(toast.shown_at) >= TOAST_DURATION {
                self.toast = None;
            }
        }
    }

    pub(crate) fn set_result_metrics(&mut self, total_lines: usize, view_height: u16) {
        let total_lines = total_lines.max(1);
        self.result_total_lines = total_lines;
        self.result_view_height = view_height;
        self.result_max_scroll = total_lines.saturating_sub(view_height as usize);
        if self.result_scroll > self.result_max_scroll {
            self.result_scroll = self.result_max_scroll;
        }
    }

    pub(crate) fn scroll_down(&mut self, lines: usize) {
        self.result_scroll = (self.result_scroll + lines).min(self.result_max_scroll);
    }

    pub(crate) fn scroll_up(&mut self, lines: usize) {
        self.result_scroll = self.result_scroll.saturating_sub(lines);
    }

    pub(crate) fn page_size(&self) -> usize {
        let height = self.result_view_height.max(1) as usize;
        height.saturating_sub(1).max(1)
    }
}
