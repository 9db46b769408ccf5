use giffos_core::{GifRef, QualityMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Progress of one copy action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum CopyPhase {
    Idle,
    Fetching,
    Staging,
    Handoff,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum SessionEvent {
    Log { level: LogLevel, message: String },
    /// Stored API key, sent once at startup
    ApiKeyLoaded(String),
    /// Query text was wiped because the quality mode changed
    QueryReset { quality: QualityMode },
    Results { gifs: Vec<GifRef>, page_cursor: u32 },
    Selection(Option<usize>),
    Copy(CopyPhase),
    Error(String),
}
