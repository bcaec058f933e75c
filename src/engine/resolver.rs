//! Resolves desktop move requests into OS effects and result records.
//!
//! Every resolution reads the desktop set fresh from the backend, derives
//! the target on a one-shot axis, routes the OS-affecting section through
//! the recovery wrapper, and records qualifying moves in the history. The
//! engine owns one mutex over history and position resolution; the
//! foreground dispatch and the background sampler both go through it, so a
//! sampler tick can never interleave with a user-triggered pan.

use std::sync::Arc;

use parking_lot::Mutex;
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::common::config::Settings;
use crate::model::{DesktopAxis, DesktopHistory, HistoryEntry};
use crate::sys::desktop::{DesktopId, DesktopOps, WindowInfo};
use crate::sys::matcher::WindowMatcher;

use super::error::EngineError;
use super::recovery::{self, RetryPolicy};

/// What a move does with the focused window and the visible desktop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MoveKind {
    /// Switch the visible desktop.
    Pan,
    /// Move the focused window group without switching.
    Shove,
    /// Shove, then pan.
    Drag,
}

/// Where a move is headed. Absolute slots never loop; an out-of-range slot
/// is a reported user error. Directional targets always loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    Slot(i64),
    Left,
    Right,
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Slot(k) => write!(f, "{k}"),
            Destination::Left => f.write_str("left"),
            Destination::Right => f.write_str("right"),
        }
    }
}

/// A desktop the engine acted on: live index plus stable identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DesktopSlot {
    pub index: usize,
    pub id: DesktopId,
}

/// Visible-desktop change of a pan or drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub start: DesktopSlot,
    pub end: DesktopSlot,
}

/// Window relocation of a shove or drag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowMove {
    pub windows: Vec<WindowInfo>,
    pub start: DesktopSlot,
    pub end: DesktopSlot,
}

/// The request that produced a report or failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Move { kind: MoveKind, to: Destination },
    Undo,
    Redo,
    Sample,
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Move { kind, to } => write!(f, "{kind} {to}"),
            Request::Undo => f.write_str("undo"),
            Request::Redo => f.write_str("redo"),
            Request::Sample => f.write_str("position sample"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionReport {
    pub request: Request,
    pub switched: Option<Transition>,
    pub moved: Option<WindowMove>,
}

impl std::fmt::Display for ActionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.moved, &self.switched) {
            (Some(m), Some(t)) => write!(
                f,
                "{}: moved {} window(s) and switched desktop {} -> {}",
                self.request,
                m.windows.len(),
                t.start.index,
                t.end.index
            ),
            (Some(m), None) => write!(
                f,
                "{}: moved {} window(s) to desktop {}, still on {}",
                self.request,
                m.windows.len(),
                m.end.index,
                m.start.index
            ),
            (None, Some(t)) => {
                write!(f, "{}: switched desktop {} -> {}", self.request, t.start.index, t.end.index)
            }
            (None, None) => write!(f, "{}: no effect", self.request),
        }
    }
}

/// Failure result handed across the engine boundary. Ordinary value, not a
/// fault: the caller renders it next to successful reports.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{request} failed: {source}")]
pub struct ActionFailure {
    pub request: Request,
    pub source: EngineError,
}

struct EngineState {
    history: DesktopHistory,
}

/// The desktop position & history engine.
pub struct DesktopEngine {
    ops: Arc<dyn DesktopOps>,
    matcher: WindowMatcher,
    policy: RetryPolicy,
    state: Mutex<EngineState>,
}

impl DesktopEngine {
    /// Seeds the history with the currently visible desktop, so the first
    /// user action already has an undo target.
    pub fn new(ops: Arc<dyn DesktopOps>, settings: &Settings) -> Result<DesktopEngine, EngineError> {
        let matcher = WindowMatcher::new(&settings.related_windows);
        let policy = settings.recovery;
        let seed = recovery::run(&*ops, policy, |ops| Self::current_entry(ops))?;
        Ok(DesktopEngine {
            ops,
            matcher,
            policy,
            state: Mutex::new(EngineState {
                history: DesktopHistory::new(seed, settings.history_capacity),
            }),
        })
    }

    #[instrument(skip(self))]
    pub fn resolve(&self, kind: MoveKind, to: Destination) -> Result<ActionReport, ActionFailure> {
        self.run_request(Request::Move { kind, to })
    }

    #[instrument(skip(self))]
    pub fn undo(&self) -> Result<ActionReport, ActionFailure> {
        self.run_request(Request::Undo)
    }

    #[instrument(skip(self))]
    pub fn redo(&self) -> Result<ActionReport, ActionFailure> {
        self.run_request(Request::Redo)
    }

    /// Records the currently visible desktop, so switches made outside the
    /// engine (OS shortcuts, task view) enter history too. Returns whether
    /// a new entry was recorded.
    pub fn sample(&self) -> Result<bool, ActionFailure> {
        let mut state = self.state.lock();
        let entry = recovery::run(&*self.ops, self.policy, |ops| Self::current_entry(ops))
            .map_err(|source| ActionFailure { request: Request::Sample, source })?;
        Ok(state.history.push(entry))
    }

    /// Entry list and cursor, oldest first.
    pub fn history_snapshot(&self) -> (Vec<HistoryEntry>, usize) {
        let state = self.state.lock();
        (state.history.iter().copied().collect(), state.history.cursor())
    }

    fn run_request(&self, request: Request) -> Result<ActionReport, ActionFailure> {
        let mut state = self.state.lock();
        let result = match request {
            Request::Move { kind, to } => self.run_move(&mut state, kind, to),
            Request::Undo => self.replay(&mut state, Direction::Back),
            Request::Redo => self.replay(&mut state, Direction::Forward),
            Request::Sample => unreachable!("samples do not go through run_request"),
        };
        match result {
            Ok((switched, moved)) => Ok(ActionReport { request, switched, moved }),
            Err(source) => {
                warn!("{request} failed: {source}");
                Err(ActionFailure { request, source })
            }
        }
    }

    fn run_move(
        &self,
        state: &mut EngineState,
        kind: MoveKind,
        to: Destination,
    ) -> Result<(Option<Transition>, Option<WindowMove>), EngineError> {
        let (switched, moved, end, total) =
            recovery::run(&*self.ops, self.policy, |ops| {
                let (ids, axis, start_index) = Self::live_axis(ops)?;
                let start_pos = axis.at(start_index as i64)?;
                let target = match to {
                    Destination::Slot(k) => axis.at(k)?,
                    Destination::Left => start_pos.left(),
                    Destination::Right => start_pos.right(),
                };
                let start = DesktopSlot { index: start_index, id: ids[start_index - 1] };
                let end = DesktopSlot { index: target.index(), id: ids[target.index() - 1] };

                let moved = match kind {
                    MoveKind::Pan => None,
                    MoveKind::Shove | MoveKind::Drag => {
                        let focused = ops.focused_window()?;
                        let candidates = ops.windows_of(focused.pid)?;
                        let group = self.matcher.related(&focused, &candidates);
                        for window in &group {
                            ops.move_window(window.id, end.id)?;
                        }
                        Some(WindowMove { windows: group, start, end })
                    }
                };
                let switched = match kind {
                    MoveKind::Shove => None,
                    MoveKind::Pan | MoveKind::Drag => {
                        ops.switch_to(end.id)?;
                        Some(Transition { start, end })
                    }
                };
                Ok((switched, moved, end, axis.total()))
            })?;

        // Explicit pans and drags enter history; shoves leave the visible
        // desktop alone and do not.
        if matches!(kind, MoveKind::Pan | MoveKind::Drag) {
            state.history.push(HistoryEntry::new(end.id, end.index, total));
        }
        Ok((switched, moved))
    }

    fn replay(
        &self,
        state: &mut EngineState,
        direction: Direction,
    ) -> Result<(Option<Transition>, Option<WindowMove>), EngineError> {
        let entry = match direction {
            Direction::Back => state.history.undo()?,
            Direction::Forward => state.history.redo()?,
        };
        let result = recovery::run(&*self.ops, self.policy, |ops| {
            let (ids, _axis, start_index) = Self::live_axis(ops)?;
            let resolved = entry.resolve(&ids);
            if !resolved.found {
                debug!(
                    "desktop {} no longer exists, replaying to index {} instead",
                    entry.id, resolved.index
                );
            }
            let start = DesktopSlot { index: start_index, id: ids[start_index - 1] };
            let end = DesktopSlot { index: resolved.index, id: ids[resolved.index - 1] };
            ops.switch_to(end.id)?;
            Ok((Some(Transition { start, end }), None))
        });
        if result.is_err() {
            // The switch never happened; put the cursor back.
            let _ = match direction {
                Direction::Back => state.history.redo(),
                Direction::Forward => state.history.undo(),
            };
        }
        result
    }

    fn current_entry(ops: &dyn DesktopOps) -> Result<HistoryEntry, EngineError> {
        let (ids, axis, index) = Self::live_axis(ops)?;
        Ok(HistoryEntry::new(ids[index - 1], index, axis.total()))
    }

    /// One fresh read of the desktop set; the axis is never cached across
    /// resolutions because desktops come and go between calls.
    fn live_axis(ops: &dyn DesktopOps) -> Result<(Vec<DesktopId>, DesktopAxis, usize), EngineError> {
        let ids = ops.desktops()?;
        if ids.is_empty() {
            return Err(EngineError::NoDesktops);
        }
        let axis = DesktopAxis::new(ids.len());
        let index = axis.check(ops.current_desktop()? as i64)?;
        Ok((ids, axis, index))
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Back,
    Forward,
}
