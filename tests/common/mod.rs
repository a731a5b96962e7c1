#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use skazka::speech::{SpeechEngine, UtteranceRequest, Voice, VoiceDirectory};
use skazka::story::{Meta, Segment, Story};

/// Recording speech engine. Clones share the same state, so tests keep a
/// handle while the controller owns the other.
#[derive(Clone)]
pub struct FakeEngine {
    pub submitted: Arc<Mutex<Vec<UtteranceRequest>>>,
    pub cancels: Arc<AtomicUsize>,
    pub speaking: Arc<AtomicBool>,
    pub present: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            submitted: Arc::new(Mutex::new(Vec::new())),
            cancels: Arc::new(AtomicUsize::new(0)),
            speaking: Arc::new(AtomicBool::new(false)),
            present: true,
        }
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    pub fn submissions(&self) -> Vec<UtteranceRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl SpeechEngine for FakeEngine {
    fn submit(&mut self, request: UtteranceRequest) {
        self.speaking.store(true, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(request);
    }

    fn cancel(&mut self) {
        self.speaking.store(false, Ordering::SeqCst);
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    fn speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn available(&self) -> bool {
        self.present
    }
}

/// Directory with a fixed voice list. `ready` is independent of the list so
/// tests can model "populated but empty" platforms.
#[derive(Clone)]
pub struct FakeVoices {
    pub voices: Vec<Voice>,
    pub ready: bool,
}

impl FakeVoices {
    pub fn with(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            ready: true,
        }
    }

    pub fn not_ready() -> Self {
        Self {
            voices: Vec::new(),
            ready: false,
        }
    }

    pub fn empty_but_ready() -> Self {
        Self {
            voices: Vec::new(),
            ready: true,
        }
    }
}

impl VoiceDirectory for FakeVoices {
    fn list_voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn ready(&self) -> bool {
        self.ready
    }
}

/// Directory whose list can be filled in from another task, for readiness
/// tests.
#[derive(Clone, Default)]
pub struct SharedVoices {
    pub voices: Arc<Mutex<Vec<Voice>>>,
}

impl VoiceDirectory for SharedVoices {
    fn list_voices(&self) -> Vec<Voice> {
        self.voices.lock().unwrap().clone()
    }
}

pub fn voice(identity: &str, tag: &str) -> Voice {
    Voice {
        identity: identity.to_string(),
        language_tag: tag.to_string(),
    }
}

pub fn default_voices() -> FakeVoices {
    FakeVoices::with(vec![voice("Alex", "en-US"), voice("Milena", "ru-RU")])
}

pub fn story(segments: Vec<Segment>) -> Story {
    Story {
        meta: Meta {
            title: "Bear and Bee".to_string(),
            source: "test".to_string(),
        },
        content: segments,
    }
}

pub fn bilingual(en: &str, ru: &str) -> Segment {
    Segment {
        source_text: Some(en.to_string()),
        target_text: Some(ru.to_string()),
        ..Segment::default()
    }
}

pub fn source_only(en: &str) -> Segment {
    Segment {
        source_text: Some(en.to_string()),
        ..Segment::default()
    }
}

pub fn timestamp_only(ts: &str) -> Segment {
    Segment {
        timestamp: Some(ts.to_string()),
        ..Segment::default()
    }
}
