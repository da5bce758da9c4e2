use thiserror::Error;

use crate::core::{ContainerId, ShapeId};

pub type MotionResult<T> = Result<T, MotionError>;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("unknown shape id: {0:?}")]
    UnknownShape(ShapeId),

    #[error("unknown container id: {0:?}")]
    UnknownContainer(ContainerId),

    #[error("no render in progress: {0}")]
    NoActiveRender(&'static str),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
