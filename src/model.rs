pub mod axis;
pub mod history;

pub use axis::{AxisError, DesktopAxis, DesktopPosition};
pub use history::{DesktopHistory, HistoryEntry, HistoryError, ResolvedEntry};
