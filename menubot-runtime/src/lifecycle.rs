//! Bot status as an atomic state value, plus the busy guard that admits one lifecycle call at a time.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::debug;

/// `Stopped → Starting → Running → Stopping → Stopped`. `Starting → Stopping` is also allowed so a
/// transport waiting for pairing can be stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BotStatus {
    Stopped = 0,
    Starting = 1,
    Running = 2,
    Stopping = 3,
}

impl BotStatus {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => BotStatus::Starting,
            2 => BotStatus::Running,
            3 => BotStatus::Stopping,
            _ => BotStatus::Stopped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BotStatus::Stopped => "stopped",
            BotStatus::Starting => "starting",
            BotStatus::Running => "running",
            BotStatus::Stopping => "stopping",
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a lifecycle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Another transition was in flight, or the request does not apply to the current status.
    Ignored,
    /// The transport could not be brought up; status is back to `Stopped`.
    Failed,
}

#[derive(Debug)]
pub struct Lifecycle {
    status: AtomicU8,
    busy: AtomicBool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            status: AtomicU8::new(BotStatus::Stopped as u8),
            busy: AtomicBool::new(false),
        }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> BotStatus {
        BotStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Moves `from → to` only if the current status is `from`.
    pub fn transition(&self, from: BotStatus, to: BotStatus) -> bool {
        let moved = self
            .status
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        debug!(from = %from, to = %to, moved, "status transition");
        moved
    }

    /// Moves to `to` from whichever of `from` is current.
    pub fn transition_any(&self, from: &[BotStatus], to: BotStatus) -> Option<BotStatus> {
        from.iter()
            .copied()
            .find(|&current| self.transition(current, to))
    }

    pub fn force(&self, to: BotStatus) {
        self.status.store(to as u8, Ordering::SeqCst);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Claims the busy flag; `None` if another lifecycle call holds it.
    pub fn try_busy(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard { flag: &self.busy })
    }
}

/// Releases the busy flag on drop.
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
