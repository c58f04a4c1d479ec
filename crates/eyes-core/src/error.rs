use thiserror::Error;

/// Errors surfaced at the fallible edges of the crate.
///
/// The per-frame paths (triggers, ticks, sensor and battery updates) never
/// produce these; bad input there is dropped and logged instead.
#[derive(Debug, Error)]
pub enum EyesError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("frame has {got} pixels, expected {expected}")]
    FrameSize { expected: usize, got: usize },
    #[error("bad pixel value: {0}")]
    Pixel(String),
    #[error("display sink: {0}")]
    Sink(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EyesError>;
