use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{interval, timeout};

use super::{Voice, VoiceDirectory};

pub const VOICE_POLL_MS: u64 = 100;

/// Resolve a language tag to a voice from the live directory.
///
/// Preference order: exact tag match, then any voice sharing the primary
/// language subtag, then the first voice at all (a wrong-language voice beats
/// silence). `None` only when the directory is empty, in which case the
/// utterance proceeds with the engine default.
pub fn find_voice(tag: &str, voices: &[Voice]) -> Option<Voice> {
    if let Some(v) = voices
        .iter()
        .find(|v| v.language_tag.eq_ignore_ascii_case(tag))
    {
        return Some(v.clone());
    }
    let primary = primary_subtag(tag);
    if let Some(v) = voices
        .iter()
        .find(|v| primary_subtag(&v.language_tag).eq_ignore_ascii_case(primary))
    {
        return Some(v.clone());
    }
    voices.first().cloned()
}

fn primary_subtag(tag: &str) -> &str {
    tag.get(..2).unwrap_or(tag)
}

/// Wait for the directory's initial population.
///
/// Some platforms emit a change notification when voices appear, others only
/// ever populate silently, so we listen for the notify and poll as a
/// fallback, resolving a single ready signal once the list is non-empty.
/// Returns `false` if `max_wait` elapses first; `None` waits indefinitely.
pub async fn wait_ready<D: VoiceDirectory>(
    directory: &D,
    changed: &Notify,
    max_wait: Option<Duration>,
) -> bool {
    let poll = async {
        let mut ticker = interval(Duration::from_millis(VOICE_POLL_MS));
        loop {
            if directory.ready() {
                return;
            }
            tokio::select! {
                _ = changed.notified() => {}
                _ = ticker.tick() => {}
            }
        }
    };

    match max_wait {
        Some(limit) => timeout(limit, poll).await.is_ok(),
        None => {
            poll.await;
            true
        }
    }
}
