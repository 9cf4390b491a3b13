use protocol::DetectRequest;
use std::time::Duration;
use tokio::sync::mpsc;

use super::client::DetectClient;
use super::events::UiEvent;

pub(crate) const STAGE_COUNT: usize = 3;

/// Elapsed offsets at which the cosmetic progress stages advance. They do not
/// track backend progress.
pub(crate) const STAGE_OFFSETS: [Duration; STAGE_COUNT] = [
    Duration::from_millis(500),
    Duration::from_millis(8_000),
    Duration::from_millis(16_000),
];

pub(crate) const RENDER_DELAY: Duration = Duration::from_millis(300);

/// Starts the progress timers and the single backend call. Completion is
/// reported through `ui_tx`, always ending with `DetectionFinished`.
pub(crate) fn spawn_detection(
    client: DetectClient,
    request: DetectRequest,
    ui_tx: mpsc::Sender<UiEvent>,
) {
    spawn_progress_simulator(ui_tx.clone());
    tokio::spawn(async move {
        run_detection(&client, &request, &ui_tx).await;
    });
}

// Timers are never cancelled; a late tick may land on a newer run.
fn spawn_progress_simulator(ui_tx: mpsc::Sender<UiEvent>) {
    for (index, offset) in STAGE_OFFSETS.into_iter().enumerate() {
        let ui_tx = ui_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(offset).await;
            let _ = ui_tx.send(UiEvent::StageReached(index)).await;
        });
    }
}

async fn run_detection(
    client: &DetectClient,
    request: &DetectRequest,
    ui_tx: &mpsc::Sender<UiEvent>,
) {
    match client.detect(request).await {
        Ok(result) => {
            let _ = ui_tx.send(UiEvent::StagesDone).await;
            tokio::time::sleep(RENDER_DELAY).await;
            let _ = ui_tx
                .send(UiEvent::DetectionSucceeded(Box::new(result)))
                .await;
        }
        Err(err) => {
            let _ = ui_tx.send(UiEvent::DetectionFailed(err.to_string())).await;
        }
    }
    let _ = ui_tx.send(UiEvent::DetectionFinished).await;
}

pub(crate) fn spawn_health_probe(client: DetectClient, ui_tx: mpsc::Sender<UiEvent>) {
    tokio::spawn(async move {
        let outcome = match client.health().await {
            Ok(health) if health.is_ok() => Ok(()),
            Ok(health) => Err(format!("unexpected status {:?}", health.status)),
            Err(err) => Err(err.to_string()),
        };
        if let Err(err) = &outcome {
            tracing::warn!(event = "health.failed", server = %client.server(), error = %err);
        } else {
            tracing::info!(event = "health.ok", server = %client.server());
        }
        let _ = ui_tx.send(UiEvent::HealthChecked(outcome)).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> DetectClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        DetectClient::new(&format!("http://{addr}")).expect("client")
    }

    fn request() -> DetectRequest {
        DetectRequest {
            text: "w".repeat(80),
            api_base: "https://llm.example/v1".to_string(),
            api_key: "sk".to_string(),
            model: "m".to_string(),
            temperature: 0.1,
        }
    }

    async fn drain(mut rx: mpsc::Receiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn success_marks_stages_then_delivers_result() {
        let client = serve(Router::new().route(
            "/api/detect",
            post(|| async { Json(json!({"result": {"verdict": "AI-generated"}})) }),
        ))
        .await;
        let (tx, rx) = mpsc::channel(16);
        run_detection(&client, &request(), &tx).await;
        drop(tx);
        let events = drain(rx).await;
        assert!(matches!(events[0], UiEvent::StagesDone));
        match &events[1] {
            UiEvent::DetectionSucceeded(result) => assert_eq!(result.verdict, "AI-generated"),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(events[2], UiEvent::DetectionFinished));
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn failure_still_finishes() {
        let client = serve(Router::new().route(
            "/api/detect",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))) }),
        ))
        .await;
        let (tx, rx) = mpsc::channel(16);
        run_detection(&client, &request(), &tx).await;
        drop(tx);
        let events = drain(rx).await;
        match &events[0] {
            UiEvent::DetectionFailed(message) => assert_eq!(message, "服务器错误 (500)"),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(events[1], UiEvent::DetectionFinished));
    }

    #[tokio::test(start_paused = true)]
    async fn progress_ticks_follow_fixed_offsets() {
        let (tx, mut rx) = mpsc::channel(16);
        spawn_progress_simulator(tx);
        let started = tokio::time::Instant::now();
        let mut seen = Vec::new();
        while let Some(UiEvent::StageReached(index)) = rx.recv().await {
            seen.push((index, started.elapsed()));
        }
        let indices: Vec<usize> = seen.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        for ((_, elapsed), offset) in seen.iter().zip(STAGE_OFFSETS) {
            assert!(*elapsed >= offset);
        }
    }
}
