//! One-dimensional coordinate model over the current set of virtual
//! desktops. Indices are 1-based; the axis is rebuilt from a live desktop
//! enumeration on every resolution and never cached.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AxisError {
    #[error("desktop {index} is out of bounds (1..={total})")]
    OutOfRange { index: i64, total: usize },
}

/// The legal index range `[1..total]` and its arithmetic rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DesktopAxis {
    total: usize,
}

impl DesktopAxis {
    pub fn new(total: usize) -> DesktopAxis {
        debug_assert!(total >= 1, "axis over an empty desktop set");
        DesktopAxis { total }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Validates that `index` lies in `[1..total]`.
    pub fn check(&self, index: i64) -> Result<usize, AxisError> {
        if index < 1 || index > self.total as i64 {
            return Err(AxisError::OutOfRange { index, total: self.total });
        }
        Ok(index as usize)
    }

    /// Maps any integer into `[1..total]` with 1-based modular wraparound.
    pub fn wrap(&self, index: i64) -> usize {
        ((index - 1).rem_euclid(self.total as i64) + 1) as usize
    }

    /// A validated position at `index`.
    pub fn at(&self, index: i64) -> Result<DesktopPosition, AxisError> {
        Ok(DesktopPosition { index: self.check(index)?, axis: *self })
    }
}

/// A validated index on a [`DesktopAxis`].
///
/// Positions are created per resolution from live axis state and are not
/// persisted; history snapshots carry a stable identity instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DesktopPosition {
    index: usize,
    axis: DesktopAxis,
}

impl DesktopPosition {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn axis(&self) -> DesktopAxis {
        self.axis
    }

    /// The position `n` steps to the right. Looping wraps around the axis
    /// and always succeeds; non-looping fails when the result leaves the
    /// axis, which is the policy for absolute slot jumps.
    pub fn plus(&self, n: i64, looped: bool) -> Result<DesktopPosition, AxisError> {
        let raw = self.index as i64 + n;
        if looped {
            Ok(DesktopPosition { index: self.axis.wrap(raw), axis: self.axis })
        } else {
            self.axis.at(raw)
        }
    }

    pub fn minus(&self, n: i64, looped: bool) -> Result<DesktopPosition, AxisError> {
        self.plus(-n, looped)
    }

    pub fn left(&self) -> DesktopPosition {
        DesktopPosition { index: self.axis.wrap(self.index as i64 - 1), axis: self.axis }
    }

    pub fn right(&self) -> DesktopPosition {
        DesktopPosition { index: self.axis.wrap(self.index as i64 + 1), axis: self.axis }
    }
}
