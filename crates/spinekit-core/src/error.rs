use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpineError {
    #[error("need {required} points, got {got}")]
    InsufficientPoints { required: usize, got: usize },
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("missing input: {0}")]
    MissingInput(&'static str),
    #[error("pixel buffer holds {got} bytes, expected {expected}")]
    BufferSize { expected: usize, got: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

pub type Result<T> = std::result::Result<T, SpineError>;

/// Fails with `InsufficientPoints` unless `points` holds at least `required` entries.
pub fn require_points<T>(points: &[T], required: usize) -> Result<()> {
    if points.len() < required {
        return Err(SpineError::InsufficientPoints {
            required,
            got: points.len(),
        });
    }
    Ok(())
}
