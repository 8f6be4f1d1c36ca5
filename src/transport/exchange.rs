//! Lifecycle of a single query exchange.
//!
//! An exchange starts `Pending` and ends in exactly one terminal state. The
//! success path, a socket error and the deadline can all try to finish it;
//! the first transition wins and the rest are no-ops.

use std::sync::atomic::{AtomicU8, Ordering};

/// State of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExchangeState {
    Pending = 0,
    Succeeded = 1,
    Failed = 2,
    TimedOut = 3,
}

impl ExchangeState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Succeeded,
            2 => Self::Failed,
            3 => Self::TimedOut,
            _ => Self::Pending,
        }
    }

    /// Returns true for every state except `Pending`.
    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

/// Settle-once guard for an exchange.
#[derive(Debug)]
pub struct Exchange {
    state: AtomicU8,
}

impl Exchange {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ExchangeState::Pending as u8),
        }
    }

    /// Moves the exchange into `terminal` if it is still pending.
    ///
    /// Returns false if another outcome already settled it.
    pub fn settle(&self, terminal: ExchangeState) -> bool {
        debug_assert!(terminal.is_terminal());
        self.state
            .compare_exchange(
                ExchangeState::Pending as u8,
                terminal as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn state(&self) -> ExchangeState {
        ExchangeState::from_u8(self.state.load(Ordering::Acquire))
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}
