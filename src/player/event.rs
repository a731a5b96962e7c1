use uuid::Uuid;

use crate::speech::UtteranceId;

/// Token for a scheduled rest on a segment with no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GapId(Uuid);

impl GapId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GapId {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the driver loop can receive: engine completions, elapsed gap
/// timers, and external stop requests (Ctrl-C, UI pause).
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    UtteranceFinished(UtteranceId),
    GapElapsed(GapId),
    Stop,
}
