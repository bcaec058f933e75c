//! Pandesk moves the focused window and the visible virtual desktop along
//! a one-dimensional ordered sequence of desktops, with undo/redo history
//! and recovery from stale native desktop-manager state. The OS surface
//! lives behind [`sys::desktop::DesktopOps`].

pub mod actor;
pub mod common;
pub mod engine;
pub mod model;
pub mod sys;
