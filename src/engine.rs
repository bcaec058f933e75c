pub mod error;
pub mod recovery;
pub mod resolver;

pub use error::EngineError;
pub use recovery::RetryPolicy;
pub use resolver::{
    ActionFailure, ActionReport, DesktopEngine, DesktopSlot, Destination, MoveKind, Request,
    Transition, WindowMove,
};

#[cfg(test)]
mod tests;
