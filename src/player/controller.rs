use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::player::event::GapId;
use crate::speech::voices::find_voice;
use crate::speech::{SpeechEngine, UtteranceId, UtteranceRequest, VoiceDirectory};
use crate::story::Story;

/// Rest substituted for a segment that carries no text. A perceptible pause,
/// never a zero-duration skip.
pub const SEGMENT_GAP_MS: u64 = 400;

/// Per-session narration settings. Rates are read at the moment each
/// utterance is submitted, so mid-playback adjustments take effect on the
/// next phrase.
#[derive(Debug, Clone)]
pub struct PlayerSettings {
    pub source_rate: f32,
    pub target_rate: f32,
    pub source_lang: String,
    pub target_lang: String,
    pub target_enabled: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            source_rate: 1.0,
            target_rate: 1.0,
            source_lang: "en-US".to_string(),
            target_lang: "ru-RU".to_string(),
            target_enabled: true,
        }
    }
}

/// Playback phase machine. `Stepping` is only observable transiently while a
/// step is being built; between steps the controller sits in
/// `AwaitingCompletion` until the awaited token fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Stepping,
    AwaitingCompletion,
    Stopped,
}

/// What the current step is waiting on. Cleared by `stop`, so a completion
/// that arrives for an already-cancelled utterance matches nothing and is
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    Utterance(UtteranceId),
    Gap(GapId),
}

/// Result of feeding the controller one operation or event. `Gap` instructs
/// the driver to schedule a timer and deliver `on_gap_elapsed` later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum StepOutcome {
    Speaking,
    Gap { id: GapId, duration: Duration },
    Finished,
    Ignored,
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("platform has no speech synthesis")]
    EngineUnavailable,
    #[error("voice directory has not finished populating")]
    VoicesNotReady,
    #[error("no segment at index {0}")]
    SegmentOutOfRange(usize),
}

/// Sequential utterance playback controller.
///
/// Walks the story's segments in order, submitting up to two utterances per
/// segment (source first, then target) and advancing only when the last one
/// of the step completes. The engine and voice directory are injected at
/// construction so the controller runs against fakes in tests.
pub struct Controller<E, D> {
    story: Story,
    pub settings: PlayerSettings,
    engine: E,
    voices: D,
    phase: Phase,
    cursor: usize,
    awaiting: Option<Wait>,
}

impl<E: SpeechEngine, D: VoiceDirectory> Controller<E, D> {
    pub fn new(story: Story, engine: E, voices: D) -> Self {
        Self {
            story,
            settings: PlayerSettings::default(),
            engine,
            voices,
            phase: Phase::Idle,
            cursor: 0,
            awaiting: None,
        }
    }

    pub fn running(&self) -> bool {
        matches!(self.phase, Phase::Stepping | Phase::AwaitingCompletion)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the segment currently being narrated. Meaningful while
    /// running; equals the segment count after a natural finish.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    /// Begin narration from the first segment. A no-op while already
    /// running; any utterance in flight on the shared engine is cancelled
    /// first so at most one is ever audible.
    pub fn start(&mut self) -> Result<StepOutcome, PlayerError> {
        if self.running() {
            debug!("start ignored: playback already running");
            return Ok(StepOutcome::Ignored);
        }
        if !self.engine.available() {
            return Err(PlayerError::EngineUnavailable);
        }
        if !self.voices.ready() {
            return Err(PlayerError::VoicesNotReady);
        }
        if self.engine.speaking() {
            self.engine.cancel();
        }
        self.cursor = 0;
        self.phase = Phase::Stepping;
        info!(segments = self.story.content.len(), "playback started");
        Ok(self.step())
    }

    /// Halt narration. Idempotent; the engine cancel discards the in-flight
    /// and queued utterances of the current step, and their completion
    /// events, should any still arrive, match nothing.
    pub fn stop(&mut self) {
        let was_running = self.running();
        self.awaiting = None;
        self.phase = Phase::Stopped;
        self.engine.cancel();
        if was_running {
            info!(cursor = self.cursor, "playback stopped");
        }
    }

    /// Speak a single segment's source text once, outside of sequential
    /// playback. Cancels any running narration, like tapping a phrase while
    /// the whole story is playing.
    pub fn play_segment(&mut self, index: usize) -> Result<(), PlayerError> {
        if !self.engine.available() {
            return Err(PlayerError::EngineUnavailable);
        }
        if !self.voices.ready() {
            return Err(PlayerError::VoicesNotReady);
        }
        let text = self
            .story
            .content
            .get(index)
            .ok_or(PlayerError::SegmentOutOfRange(index))?
            .source_text
            .clone();
        self.stop();
        if let Some(text) = text {
            let lang = self.settings.source_lang.clone();
            let request = self.build_request(&text, &lang, self.settings.source_rate);
            self.engine.submit(request);
        }
        Ok(())
    }

    /// Engine signalled that an utterance finished. Advances only when it is
    /// the one the current step awaits; completions for cancelled or
    /// non-final utterances fall through.
    pub fn on_utterance_complete(&mut self, id: UtteranceId) -> StepOutcome {
        if self.running() && self.awaiting == Some(Wait::Utterance(id)) {
            self.awaiting = None;
            self.cursor += 1;
            return self.step();
        }
        trace!(?id, "completion ignored: not the awaited utterance");
        StepOutcome::Ignored
    }

    /// A scheduled rest for a text-less segment elapsed.
    pub fn on_gap_elapsed(&mut self, id: GapId) -> StepOutcome {
        if self.running() && self.awaiting == Some(Wait::Gap(id)) {
            self.awaiting = None;
            self.cursor += 1;
            return self.step();
        }
        trace!(?id, "gap ignored: not the awaited rest");
        StepOutcome::Ignored
    }

    /// Narrate the segment at the cursor: source utterance first, then
    /// target, awaiting only the last of the step. No two segments' audio
    /// ever overlap because the next step starts only from here.
    fn step(&mut self) -> StepOutcome {
        if self.cursor >= self.story.content.len() {
            self.phase = Phase::Idle;
            self.awaiting = None;
            info!("playback finished");
            return StepOutcome::Finished;
        }
        self.phase = Phase::Stepping;

        let segment = self.story.content[self.cursor].clone();
        let mut requests = Vec::with_capacity(2);
        if let Some(text) = &segment.source_text {
            let lang = self.settings.source_lang.clone();
            requests.push(self.build_request(text, &lang, self.settings.source_rate));
        }
        if self.settings.target_enabled {
            if let Some(text) = &segment.target_text {
                let lang = self.settings.target_lang.clone();
                requests.push(self.build_request(text, &lang, self.settings.target_rate));
            }
        }

        if requests.is_empty() {
            let id = GapId::new();
            self.awaiting = Some(Wait::Gap(id));
            self.phase = Phase::AwaitingCompletion;
            trace!(cursor = self.cursor, "segment has no text, resting");
            return StepOutcome::Gap {
                id,
                duration: Duration::from_millis(SEGMENT_GAP_MS),
            };
        }

        let last_id = requests[requests.len() - 1].id;
        self.awaiting = Some(Wait::Utterance(last_id));
        self.phase = Phase::AwaitingCompletion;
        for request in requests {
            trace!(cursor = self.cursor, lang = %request.language, "submitting utterance");
            self.engine.submit(request);
        }
        StepOutcome::Speaking
    }

    fn build_request(&self, text: &str, lang: &str, rate: f32) -> UtteranceRequest {
        // Recomputed per utterance: the directory may change mid-session.
        let voices = self.voices.list_voices();
        let voice = find_voice(lang, &voices);
        if voice.is_none() {
            trace!(lang, "no voice available, engine default");
        }
        UtteranceRequest {
            id: UtteranceId::new(),
            text: text.to_string(),
            language: lang.to_string(),
            rate,
            voice,
        }
    }
}
