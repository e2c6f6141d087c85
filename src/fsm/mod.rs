//! Node lifecycle state.
//!
//! ```text
//!  BOOTING ──[peripherals up]──▶ JOINING_NETWORK ──[connected]──▶ SYNCING_TIME
//!     │                                │                               │
//!  [init failure: halt]      [start failure: reboot]             [time read]
//!                                                                      ▼
//!                                                                    READY
//! ```
//!
//! The lifecycle only moves forward.  There is no error state: a boot
//! failure leaves the node in `Booting` or `JoiningNetwork` and the caller
//! halts or reboots it.

use log::info;

/// Enumeration of all lifecycle states, in boot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum NodeState {
    Booting = 0,
    JoiningNetwork = 1,
    SyncingTime = 2,
    Ready = 3,
}

impl NodeState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Booting => "Booting",
            Self::JoiningNetwork => "JoiningNetwork",
            Self::SyncingTime => "SyncingTime",
            Self::Ready => "Ready",
        }
    }

    /// The only state this one may advance to.
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Booting => Some(Self::JoiningNetwork),
            Self::JoiningNetwork => Some(Self::SyncingTime),
            Self::SyncingTime => Some(Self::Ready),
            Self::Ready => None,
        }
    }
}

/// Forward-only tracker for the current [`NodeState`].
#[derive(Debug)]
pub struct Lifecycle {
    current: NodeState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            current: NodeState::Booting,
        }
    }

    pub fn current(&self) -> NodeState {
        self.current
    }

    /// Move to the successor state and return `(from, to)`, or `None` if
    /// already `Ready`.
    pub fn advance(&mut self) -> Option<(NodeState, NodeState)> {
        let from = self.current;
        let to = from.successor()?;
        info!("FSM transition: {} -> {}", from.name(), to.name());
        self.current = to;
        Some((from, to))
    }
}
