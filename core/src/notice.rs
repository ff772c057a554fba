//! Single-slot error notice with auto-clear.
//!
//! # Design
//! Showing an error hands out a fresh `ErrorTimer`. The host arms a real
//! timer for it and reports back through `expire`; only the most recently
//! issued timer can clear the slot, so an expiry that arrives after a
//! dismissal or a newer error is a no-op.

use std::fmt;

use crate::error::ErrorKind;

/// Handle for one scheduled auto-clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorTimer(u64);

impl ErrorTimer {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ErrorTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorSlot {
    current: Option<ErrorKind>,
    armed: Option<ErrorTimer>,
    issued: u64,
}

impl ErrorSlot {
    pub fn current(&self) -> Option<ErrorKind> {
        self.current
    }

    pub fn armed(&self) -> Option<ErrorTimer> {
        self.armed
    }

    /// Replace the active error. Returns the new timer and the one it voids.
    pub fn show(&mut self, kind: ErrorKind) -> (ErrorTimer, Option<ErrorTimer>) {
        self.issued += 1;
        let timer = ErrorTimer(self.issued);
        self.current = Some(kind);
        (timer, self.armed.replace(timer))
    }

    /// Clear immediately. Returns the voided timer, if one was armed.
    pub fn dismiss(&mut self) -> Option<ErrorTimer> {
        self.current = None;
        self.armed.take()
    }

    /// Clear if `timer` is still the armed one.
    pub fn expire(&mut self, timer: ErrorTimer) -> bool {
        if self.armed != Some(timer) {
            return false;
        }
        self.current = None;
        self.armed = None;
        true
    }
}
