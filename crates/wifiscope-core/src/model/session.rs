// ── Capture session flags ──
//
// Each flag carries the last value the backend confirmed plus an optional
// hint set when the user issued a command. The hint is shown until the next
// authoritative status event, which always replaces it.

use serde::{Deserialize, Serialize};

/// A boolean reconciled between an optimistic hint and a confirmed value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledFlag {
    confirmed: bool,
    optimistic: Option<bool>,
}

impl ReconciledFlag {
    pub fn confirmed_as(value: bool) -> Self {
        Self {
            confirmed: value,
            optimistic: None,
        }
    }

    /// Effective value: the pending hint if any, else the confirmed value.
    pub fn value(&self) -> bool {
        self.optimistic.unwrap_or(self.confirmed)
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn optimistic(&self) -> Option<bool> {
        self.optimistic
    }

    /// `true` while a hint is waiting for confirmation.
    pub fn is_pending(&self) -> bool {
        self.optimistic.is_some()
    }

    pub fn set_optimistic(&mut self, value: bool) {
        self.optimistic = Some(value);
    }

    pub fn clear_optimistic(&mut self) {
        self.optimistic = None;
    }

    /// Apply an authoritative value; any pending hint is discarded.
    pub fn confirm(&mut self, value: bool) {
        self.confirmed = value;
        self.optimistic = None;
    }
}

/// Process-lifetime capture session state.
///
/// `connected` and `capturing` are independent: capture is only started
/// while connected, but status events are applied as received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSession {
    pub capturing: ReconciledFlag,
    pub connected: ReconciledFlag,
}

impl CaptureSession {
    pub fn is_capturing(&self) -> bool {
        self.capturing.value()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_overrides_until_confirmed() {
        let mut flag = ReconciledFlag::default();
        flag.set_optimistic(true);
        assert!(flag.value());
        assert!(!flag.confirmed());
        assert!(flag.is_pending());

        flag.confirm(false);
        assert!(!flag.value());
        assert!(!flag.is_pending());
    }

    #[test]
    fn clearing_hint_reverts_to_confirmed() {
        let mut flag = ReconciledFlag::confirmed_as(true);
        flag.set_optimistic(false);
        assert!(!flag.value());
        flag.clear_optimistic();
        assert!(flag.value());
    }

    #[test]
    fn session_flags_are_independent() {
        let mut session = CaptureSession::default();
        session.connected.confirm(true);
        assert!(session.is_connected());
        assert!(!session.is_capturing());
    }
}
