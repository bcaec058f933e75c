//! The seam between the engine and the operating system's virtual desktop
//! manager. Everything the engine needs from the OS is expressed on the
//! [`DesktopOps`] trait; backends live behind it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identity of a virtual desktop.
///
/// Desktops keep their identity when other desktops are created, removed or
/// reordered, while their 1-based index may shift. The engine treats the
/// value as opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DesktopId(u64);

impl DesktopId {
    pub fn new(id: u64) -> DesktopId {
        DesktopId(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DesktopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Native handle of a top-level window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(u64);

impl WindowId {
    pub fn new(id: u64) -> WindowId {
        WindowId(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub pid: i32,
    pub title: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NativeError {
    /// The native desktop manager's handle table went stale, typically after
    /// the shell recreated its COM objects. Recoverable by reinitializing
    /// and retrying once.
    #[error("stale desktop manager state: {0}")]
    Stale(String),
    /// Any other backend failure. Not recoverable by reinitialization.
    #[error("desktop backend error: {0}")]
    Backend(String),
}

/// Operations the engine needs from a virtual desktop backend.
///
/// Implementations must tolerate being called again immediately after
/// [`DesktopOps::reinitialize`]; the engine retries a whole failed
/// resolution as a unit.
pub trait DesktopOps: Send + Sync {
    /// Stable identities of all desktops, in on-screen order.
    fn desktops(&self) -> Result<Vec<DesktopId>, NativeError>;

    /// 1-based index of the visible desktop.
    fn current_desktop(&self) -> Result<usize, NativeError>;

    /// Make the given desktop visible.
    fn switch_to(&self, desktop: DesktopId) -> Result<(), NativeError>;

    /// The window that currently has input focus.
    fn focused_window(&self) -> Result<WindowInfo, NativeError>;

    /// All top-level windows of the given process.
    fn windows_of(&self, pid: i32) -> Result<Vec<WindowInfo>, NativeError>;

    /// Move a window to the given desktop without switching to it.
    fn move_window(&self, window: WindowId, desktop: DesktopId) -> Result<(), NativeError>;

    /// Tear down and rebuild the native manager handles after a stale
    /// failure.
    fn reinitialize(&self) -> Result<(), NativeError>;
}
