use crate::protocol::NoteToken;
use std::fmt;

/// Index of a configured source; doubles as its position in the pipeline's
/// source list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub usize);

impl SourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source {}", self.0 + 1)
    }
}

/// One decoded protocol line. `duration_ms` is always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub token: NoteToken,
    pub duration_ms: u32,
}

impl NoteEvent {
    pub fn new(token: NoteToken, duration_ms: u32) -> Self {
        debug_assert!(duration_ms > 0);
        Self { token, duration_ms }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEvent {
    pub source: SourceId,
    pub event: NoteEvent,
}
