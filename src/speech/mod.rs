pub mod process;
pub mod voices;

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(Uuid);

impl UtteranceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UtteranceId {
    fn default() -> Self {
        Self::new()
    }
}

/// A synthesizer voice identity as listed by the platform's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub identity: String,
    pub language_tag: String,
}

/// One request to vocalize a string in a given language at a given rate.
/// `voice` is `None` when the directory was empty; the engine then uses its
/// own default.
#[derive(Debug, Clone)]
pub struct UtteranceRequest {
    pub id: UtteranceId,
    pub text: String,
    pub language: String,
    pub rate: f32,
    pub voice: Option<Voice>,
}

/// An asynchronous speech device. `submit` does not block; the engine signals
/// completion later with an event carrying the request's id. The engine is a
/// process-wide resource: at most one utterance is audible at a time, and
/// `cancel` discards the current utterance along with anything queued.
pub trait SpeechEngine {
    fn submit(&mut self, request: UtteranceRequest);
    fn cancel(&mut self);
    fn speaking(&self) -> bool;
    fn available(&self) -> bool {
        true
    }
}

/// The platform's registry of synthesizer voices. Population is asynchronous
/// and platform-dependent; `ready` reports whether the initial population has
/// produced a non-empty list.
pub trait VoiceDirectory {
    fn list_voices(&self) -> Vec<Voice>;

    fn ready(&self) -> bool {
        !self.list_voices().is_empty()
    }
}
