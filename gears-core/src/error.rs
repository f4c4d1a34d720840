/// Errors raised while building gear geometry
use thiserror::Error;

/// Failure modes of gear mesh construction.
///
/// A gear either exists fully formed or not at all, so every variant is
/// reported before any vertex is written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GearError {
    #[error("a gear needs at least one tooth, got {0}")]
    InvalidToothCount(u32),

    #[error("invalid gear dimension {name} = {value}")]
    InvalidDimensions { name: &'static str, value: f32 },
}

pub type GearResult<T> = Result<T, GearError>;
