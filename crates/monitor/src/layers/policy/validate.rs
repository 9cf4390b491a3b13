use crate::layers::storage::Settings;
use protocol::DetectRequest;

pub(crate) const MIN_TEXT_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TextStats {
    pub(crate) chars: usize,
    pub(crate) words: usize,
}

impl TextStats {
    pub(crate) fn of(text: &str) -> Self {
        Self {
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
        }
    }

    pub(crate) fn chars_label(&self) -> String {
        format!("{} 个字符", self.chars)
    }

    pub(crate) fn words_label(&self) -> String {
        format!("{} 个词", self.words)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationError {
    MissingConfig,
    EmptyText,
    TextTooShort,
}

impl ValidationError {
    pub(crate) fn message(self) -> &'static str {
        match self {
            ValidationError::MissingConfig => "请先在设置中配置 API 参数",
            ValidationError::EmptyText => "请输入待检测文本",
            ValidationError::TextTooShort => "文本至少需要 50 个字符",
        }
    }

    /// The settings panel opens alongside the notice.
    pub(crate) fn opens_settings(self) -> bool {
        matches!(self, ValidationError::MissingConfig)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Checks run in order and the first failure wins.
pub(crate) fn validate_submission(
    settings: &Settings,
    text: &str,
) -> Result<DetectRequest, ValidationError> {
    let settings = settings.trimmed();
    if settings.api_base.is_empty() || settings.api_key.is_empty() || settings.model.is_empty() {
        return Err(ValidationError::MissingConfig);
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if text.chars().count() < MIN_TEXT_CHARS {
        return Err(ValidationError::TextTooShort);
    }
    Ok(DetectRequest {
        text: text.to_string(),
        api_base: settings.api_base,
        api_key: settings.api_key,
        model: settings.model,
        temperature: settings.temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Settings {
        Settings {
            api_base: "https://llm.example/v1".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.1,
        }
    }

    #[test]
    fn stats_count_chars_and_words() {
        assert_eq!(TextStats::of(""), TextStats { chars: 0, words: 0 });
        assert_eq!(TextStats::of("   \n\t"), TextStats { chars: 5, words: 0 });
        assert_eq!(
            TextStats::of("  hello   wide\nworld "),
            TextStats { chars: 21, words: 3 }
        );
        assert_eq!(TextStats::of("橘子很酸").chars, 4);
        assert_eq!(TextStats::of("ab").chars_label(), "2 个字符");
        assert_eq!(TextStats::of("a b").words_label(), "2 个词");
    }

    #[test]
    fn missing_config_is_checked_first() {
        let mut settings = configured();
        settings.model = "   ".to_string();
        assert_eq!(
            validate_submission(&settings, ""),
            Err(ValidationError::MissingConfig)
        );
        assert!(ValidationError::MissingConfig.opens_settings());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(
            validate_submission(&configured(), " \n "),
            Err(ValidationError::EmptyText)
        );
        assert!(!ValidationError::EmptyText.opens_settings());
    }

    #[test]
    fn length_gate_is_fifty_characters() {
        let short = "x".repeat(49);
        let err = validate_submission(&configured(), &short).expect_err("too short");
        assert_eq!(err, ValidationError::TextTooShort);
        assert_eq!(err.message(), "文本至少需要 50 个字符");

        let exact = "x".repeat(50);
        let request = validate_submission(&configured(), &exact).expect("passes");
        assert_eq!(request.text.chars().count(), 50);
    }

    #[test]
    fn length_ignores_surrounding_whitespace() {
        let padded = format!("   {}   ", "y".repeat(49));
        assert_eq!(
            validate_submission(&configured(), &padded),
            Err(ValidationError::TextTooShort)
        );
    }

    #[test]
    fn request_carries_trimmed_settings() {
        let mut settings = configured();
        settings.api_base = " https://llm.example/v1 ".to_string();
        settings.temperature = 0.4;
        let text = format!("  {}  ", "z".repeat(60));
        let request = validate_submission(&settings, &text).expect("valid");
        assert_eq!(request.api_base, "https://llm.example/v1");
        assert_eq!(request.text, "z".repeat(60));
        assert_eq!(request.temperature, 0.4);
    }
}
