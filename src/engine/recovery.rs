//! Retry orchestration around backend-touching operations.
//!
//! The Windows shell occasionally invalidates the COM objects behind the
//! virtual desktop manager; the next call then fails with a stale-handle
//! error even though the desktops are fine. Reinitializing the managers
//! and retrying once recovers this class of failure completely, so that is
//! the default policy. The failure is a one-shot desync, not a rate
//! limit, hence no unbounded retry.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::sys::desktop::{DesktopOps, NativeError};

use super::error::EngineError;

/// How a stale-handle failure is retried. Selected in the config file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Run once, propagate everything.
    None,
    /// Reinitialize the native managers and retry exactly once.
    ReinitOnce,
    /// Retry up to `attempts` times, sleeping `delay_ms` between tries,
    /// without reinitialization.
    Backoff { attempts: u32, delay_ms: u64 },
}

fn is_stale(err: &EngineError) -> bool {
    matches!(err, EngineError::Native(NativeError::Stale(_)))
}

/// Runs `op`, applying `policy` to stale-handle failures. Non-stale
/// failures always propagate immediately; a retried `op` observes the
/// backend fresh, so it must re-read any state it depends on.
pub fn run<T>(
    ops: &dyn DesktopOps,
    policy: RetryPolicy,
    mut op: impl FnMut(&dyn DesktopOps) -> Result<T, EngineError>,
) -> Result<T, EngineError> {
    match policy {
        RetryPolicy::None => op(ops),
        RetryPolicy::ReinitOnce => match op(ops) {
            Err(err) if is_stale(&err) => {
                warn!("stale desktop manager state, reinitializing: {err}");
                ops.reinitialize()?;
                let value = op(ops)?;
                info!("recovered after manager reinitialization");
                Ok(value)
            }
            other => other,
        },
        RetryPolicy::Backoff { attempts, delay_ms } => {
            let mut last = op(ops);
            let mut tried = 0;
            while tried < attempts && last.as_ref().is_err_and(is_stale) {
                tried += 1;
                warn!("stale desktop manager state, retry {tried}/{attempts}");
                thread::sleep(Duration::from_millis(delay_ms));
                last = op(ops);
            }
            last
        }
    }
}
