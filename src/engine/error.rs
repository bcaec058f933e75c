use thiserror::Error;

use crate::model::{AxisError, HistoryError};
use crate::sys::desktop::NativeError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    OutOfRange(#[from] AxisError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("desktop backend call failed: {0}")]
    Native(#[from] NativeError),
    #[error("backend reported no virtual desktops")]
    NoDesktops,
}
