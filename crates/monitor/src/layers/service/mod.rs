pub(crate) mod client;
pub(crate) mod detection;
pub(crate) mod events;
pub(crate) mod logging;

pub(crate) use client::{DetectClient, DEFAULT_SERVER};
pub(crate) use detection::{spawn_detection, spawn_health_probe};
pub(crate) use events::UiEvent;
pub(crate) use logging::{init_tracing, LogOptions};
