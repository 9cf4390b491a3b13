use protocol::DetectResult;

/// Messages delivered to the UI loop from spawned tasks.
#[derive(Debug)]
pub(crate) enum UiEvent {
    /// Progress simulator reached the offset with this index.
    StageReached(usize),
    StagesDone,
    DetectionSucceeded(Box<DetectResult>),
    DetectionFailed(String),
    DetectionFinished,
    HealthChecked(Result<(), String>),
}
