use std::collections::BTreeSet;
use std::fmt;

/// Identifies one submission. Events tagged with an older id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(super) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Awaiting,
    Collecting {
        expected: usize,
        received: BTreeSet<usize>,
    },
    /// `missing` is non-zero when the server finished before every
    /// placeholder was filled.
    Succeeded {
        missing: usize,
    },
    Failed {
        reason: String,
    },
}

impl SessionState {
    pub fn is_live(&self) -> bool {
        matches!(self, SessionState::Awaiting | SessionState::Collecting { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Awaiting => "awaiting",
            SessionState::Collecting { .. } => "collecting",
            SessionState::Succeeded { .. } => "succeeded",
            SessionState::Failed { .. } => "failed",
        }
    }

    /// `(received, expected)` while collecting.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match self {
            SessionState::Collecting { expected, received } => Some((received.len(), *expected)),
            _ => None,
        }
    }
}

