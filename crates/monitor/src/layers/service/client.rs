use anyhow::Context;
use protocol::{DetectEnvelope, DetectRequest, DetectResult, HealthStatus, DETECT_PATH, HEALTH_PATH};
use reqwest::Client;
use std::time::Instant;

pub(crate) const DEFAULT_SERVER: &str = "http://127.0.0.1:8765";

/// HTTP client for the detection service. One call per detection; no retry
/// and no timeout beyond the transport default.
#[derive(Clone)]
pub(crate) struct DetectClient {
    server: String,
    http: Client,
}

impl DetectClient {
    pub(crate) fn new(server: &str) -> anyhow::Result<Self> {
        // Reject an unusable base up front instead of on the first request.
        join_base_path(server, DETECT_PATH)?;
        let http = Client::builder()
            .user_agent(concat!("aigc-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            server: server.trim().to_string(),
            http,
        })
    }

    pub(crate) fn server(&self) -> &str {
        &self.server
    }

    pub(crate) async fn detect(&self, request: &DetectRequest) -> anyhow::Result<DetectResult> {
        let url = join_base_path(&self.server, DETECT_PATH)?;
        tracing::info!(
            event = "detect.request",
            url = %url,
            model = %request.model,
            text_chars = request.text.chars().count(),
            temperature = request.temperature,
        );
        let started = Instant::now();
        let response = match self.http.post(&url).json(request).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    event = "detect.transport_error",
                    is_timeout = err.is_timeout(),
                    is_connect = err.is_connect(),
                    error = %err,
                );
                anyhow::bail!("请求失败: {err}");
            }
        };
        let status = response.status();
        let body = response
            .bytes()
            .await
            .with_context(|| format!("读取响应失败 ({})", status.as_u16()))?;
        let outcome = interpret_response(status.as_u16(), status.is_success(), &body);
        match &outcome {
            Ok(result) => tracing::info!(
                event = "detect.response",
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                verdict = %result.verdict,
                confidence = result.confidence,
            ),
            Err(err) => tracing::warn!(
                event = "detect.failed",
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                body_len = body.len(),
                error = %err,
            ),
        }
        outcome
    }

    pub(crate) async fn health(&self) -> anyhow::Result<HealthStatus> {
        let url = join_base_path(&self.server, HEALTH_PATH)?;
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("health probe failed: {url}"))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("health probe returned {}", status.as_u16());
        }
        let health = response
            .json::<HealthStatus>()
            .await
            .context("health probe returned an unexpected body")?;
        Ok(health)
    }
}

/// Maps a raw reply to a result or a user-facing error message.
pub(crate) fn interpret_response(
    status: u16,
    success: bool,
    body: &[u8],
) -> anyhow::Result<DetectResult> {
    let envelope: DetectEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(_) if !success => anyhow::bail!("{}", server_error_message(status)),
        Err(err) => anyhow::bail!("响应解析失败: {err}"),
    };
    if let Some(error) = envelope.error {
        anyhow::bail!("{error}");
    }
    if !success {
        anyhow::bail!("{}", server_error_message(status));
    }
    envelope
        .result
        .ok_or_else(|| anyhow::anyhow!("响应缺少检测结果"))
}

fn server_error_message(status: u16) -> String {
    format!("服务器错误 ({status})")
}

pub(crate) fn join_base_path(base: &str, path: &str) -> anyhow::Result<String> {
    let base = base.trim();
    if base.is_empty() {
        anyhow::bail!("server url is empty");
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!("server url must start with http:// or https://: {base}");
    }
    let normalized_base = base.trim_end_matches('/');
    let normalized_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    Ok(format!("{normalized_base}{normalized_path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn sample_request() -> DetectRequest {
        DetectRequest {
            text: "t".repeat(64),
            api_base: "https://llm.example/v1".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.1,
        }
    }

    #[test]
    fn joins_base_and_path() {
        assert_eq!(
            join_base_path("http://127.0.0.1:8765/", "/api/detect").expect("join"),
            "http://127.0.0.1:8765/api/detect"
        );
        assert_eq!(
            join_base_path("https://detector.local", "api/health").expect("join"),
            "https://detector.local/api/health"
        );
        assert!(join_base_path("  ", DETECT_PATH).is_err());
        assert!(join_base_path("127.0.0.1:8765", DETECT_PATH).is_err());
    }

    #[test]
    fn error_field_wins_even_on_success_status() {
        let err = interpret_response(200, true, br#"{"error":"Input text is empty."}"#)
            .expect_err("error body");
        assert_eq!(err.to_string(), "Input text is empty.");
    }

    #[test]
    fn failed_status_without_message_uses_status_code() {
        let err = interpret_response(502, false, b"{}").expect_err("bad gateway");
        assert_eq!(err.to_string(), "服务器错误 (502)");

        let err = interpret_response(500, false, b"<html>oops</html>").expect_err("html body");
        assert_eq!(err.to_string(), "服务器错误 (500)");
    }

    #[test]
    fn failed_status_prefers_backend_message() {
        let err = interpret_response(422, false, br#"{"error":"API returned HTTP 401."}"#)
            .expect_err("422");
        assert_eq!(err.to_string(), "API returned HTTP 401.");
    }

    #[test]
    fn success_without_result_is_an_error() {
        let err = interpret_response(200, true, br#"{"success":true}"#).expect_err("no result");
        assert_eq!(err.to_string(), "响应缺少检测结果");
        assert!(interpret_response(200, true, b"not json")
            .expect_err("garbage")
            .to_string()
            .starts_with("响应解析失败"));
    }

    #[tokio::test]
    async fn posts_request_and_decodes_result() {
        let app = Router::new().route(
            "/api/detect",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["api_key"], "sk-test");
                assert_eq!(body["temperature"], 0.1);
                Json(json!({
                    "success": true,
                    "result": {
                        "verdict": "Human-written",
                        "confidence": 72,
                        "ai_probability": 18,
                        "model_used": body["model"],
                        "text_length": body["text"].as_str().map(|t| t.len()).unwrap_or(0)
                    }
                }))
            }),
        );
        let server = serve(app).await;
        let client = DetectClient::new(&server).expect("client");
        let result = client.detect(&sample_request()).await.expect("detect");
        assert_eq!(result.verdict, "Human-written");
        assert_eq!(result.model_used, "gpt-4o");
        assert_eq!(result.text_length, 64);
        assert!(result.key_indicators.is_empty());
    }

    #[tokio::test]
    async fn surfaces_backend_validation_error() {
        let app = Router::new().route(
            "/api/detect",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "Model name is required."})),
                )
            }),
        );
        let server = serve(app).await;
        let client = DetectClient::new(&server).expect("client");
        let err = client
            .detect(&sample_request())
            .await
            .expect_err("backend error");
        assert_eq!(err.to_string(), "Model name is required.");
    }

    #[tokio::test]
    async fn unreachable_server_reports_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        let client = DetectClient::new(&format!("http://{addr}")).expect("client");
        let err = client
            .detect(&sample_request())
            .await
            .expect_err("connection refused");
        assert!(err.to_string().starts_with("请求失败"));
    }

    #[tokio::test]
    async fn health_probe_reads_status() {
        let app = Router::new().route("/api/health", get(|| async { Json(json!({"status": "ok"})) }));
        let server = serve(app).await;
        let client = DetectClient::new(&server).expect("client");
        assert!(client.health().await.expect("health").is_ok());
    }
}
