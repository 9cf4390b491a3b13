use anyhow::Context;
use std::io::Read;
use std::path::Path;

use crate::cli::Args;
use crate::layers::policy::validate::validate_submission;
use crate::layers::service::DetectClient;
use crate::layers::storage::{self, LocalStore, Settings, ThemeMode};
use crate::report::{render_html, render_plain, ReportView};

pub(crate) const EXIT_SUCCESS: u8 = 0;
const EXIT_DETECTION_FAILED: u8 = 1;
const EXIT_INVALID_INPUT: u8 = 2;

/// One detection without the terminal UI. The report goes to stdout and
/// failures to stderr. Returns the process exit status.
pub(crate) async fn run_headless(
    args: &Args,
    store: &LocalStore,
    text_file: &Path,
) -> anyhow::Result<u8> {
    let text = read_text(text_file)?;
    let settings = apply_overrides(storage::load_settings(store), args);
    let request = match validate_submission(&settings, &text) {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(event = "headless.invalid", reason = %err);
            eprintln!("{err}");
            return Ok(EXIT_INVALID_INPUT);
        }
    };

    let client = DetectClient::new(&args.server)?;
    let result = match client.detect(&request).await {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{err}");
            return Ok(EXIT_DETECTION_FAILED);
        }
    };

    let view = ReportView::from_result(&result);
    print!("{}", render_plain(&view));
    if let Some(path) = &args.html_out {
        let theme = storage::load_theme(store);
        write_html(&view, theme, path)?;
        tracing::info!(event = "report.exported", path = %path.display());
    }
    Ok(EXIT_SUCCESS)
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read text from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Command-line values win over saved settings and are not persisted.
fn apply_overrides(mut settings: Settings, args: &Args) -> Settings {
    if let Some(api_base) = &args.api_base {
        settings.api_base = api_base.clone();
    }
    if let Some(api_key) = &args.api_key {
        settings.api_key = api_key.clone();
    }
    if let Some(model) = &args.model {
        settings.model = model.clone();
    }
    if let Some(temperature) = args.temperature.filter(|value| value.is_finite()) {
        settings.temperature = temperature;
    }
    settings
}

fn write_html(view: &ReportView, theme: ThemeMode, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, render_html(view, theme))
        .with_context(|| format!("failed to write report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use clap::Parser;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["aigc-monitor"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("parse")
    }

    #[test]
    fn overrides_replace_saved_values() {
        let saved = Settings {
            api_base: "https://saved.example".to_string(),
            api_key: "sk-saved".to_string(),
            model: "saved-model".to_string(),
            temperature: 0.5,
        };
        let merged = apply_overrides(saved, &args(&["--model", "gpt-4o", "--temperature", "0"]));
        assert_eq!(merged.api_base, "https://saved.example");
        assert_eq!(merged.model, "gpt-4o");
        assert_eq!(merged.temperature, 0.0);
    }

    #[tokio::test]
    async fn missing_config_exits_before_sending() {
        let dir = TempDir::new().expect("tempdir");
        let text_path = dir.path().join("input.txt");
        std::fs::write(&text_path, "x".repeat(80)).expect("write");
        let store = LocalStore::open(dir.path().join("store"));
        let code = run_headless(&args(&["--server", "http://127.0.0.1:9"]), &store, &text_path)
            .await
            .expect("run");
        assert_eq!(code, EXIT_INVALID_INPUT);
    }

    #[tokio::test]
    async fn writes_html_report_on_success() {
        let server = serve(Router::new().route(
            "/api/detect",
            post(|| async {
                Json(json!({"success": true, "result": {"verdict": "AI-generated", "summary": "<b>x</b>"}}))
            }),
        ))
        .await;
        let dir = TempDir::new().expect("tempdir");
        let text_path = dir.path().join("input.txt");
        std::fs::write(&text_path, "y".repeat(80)).expect("write");
        let html_path = dir.path().join("report.html");
        let html_arg = html_path.to_string_lossy().to_string();
        let store = LocalStore::open(dir.path().join("store"));
        let code = run_headless(
            &args(&[
                "--server",
                &server,
                "--api-base",
                "https://llm.example/v1",
                "--api-key",
                "sk-test",
                "--model",
                "gpt-4o",
                "--html-out",
                &html_arg,
            ]),
            &store,
            &text_path,
        )
        .await
        .expect("run");
        assert_eq!(code, EXIT_SUCCESS);
        let page = std::fs::read_to_string(&html_path).expect("page");
        assert!(page.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(storage::load_settings(&store).api_key.is_empty());
    }

    #[tokio::test]
    async fn backend_failure_exits_with_detection_code() {
        let server = serve(Router::new().route(
            "/api/detect",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_GATEWAY,
                    Json(json!({"error": "API returned HTTP 401."})),
                )
            }),
        ))
        .await;
        let dir = TempDir::new().expect("tempdir");
        let text_path = dir.path().join("input.txt");
        std::fs::write(&text_path, "z".repeat(80)).expect("write");
        let store = LocalStore::open(dir.path().join("store"));
        let code = run_headless(
            &args(&[
                "--server",
                &server,
                "--api-base",
                "https://llm.example/v1",
                "--api-key",
                "sk-test",
                "--model",
                "gpt-4o",
            ]),
            &store,
            &text_path,
        )
        .await
        .expect("run");
        assert_eq!(code, EXIT_DETECTION_FAILED);
    }
}
