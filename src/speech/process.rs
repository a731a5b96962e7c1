//! Child-process speech backends: `say` on macOS, `espeak-ng` elsewhere.
//! One process per utterance, killed on cancel.

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::process::Command;
use tokio::sync::{mpsc, Notify};
use tracing::{info, warn};

use crate::player::event::PlayerEvent;

use super::{SpeechEngine, UtteranceRequest, Voice, VoiceDirectory};

/// Nominal speech rate; utterance rates are multipliers on this.
const BASE_WPM: f32 = 175.0;

enum EngineCmd {
    Speak(UtteranceRequest),
    Cancel,
}

/// Speech engine backed by a spawned synthesizer process. Requests queue up
/// and play strictly one at a time; a completion event is sent to the player
/// channel when a process exits on its own (never for cancelled ones).
pub struct ProcessEngine {
    cmd_tx: mpsc::UnboundedSender<EngineCmd>,
    speaking: Arc<AtomicBool>,
    available: bool,
}

impl ProcessEngine {
    pub fn new(program: &str, events: mpsc::Sender<PlayerEvent>) -> Self {
        let available = std::process::Command::new(program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();
        if !available {
            warn!(program, "speech program not found, playback disabled");
        }

        let speaking = Arc::new(AtomicBool::new(false));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(worker(
            program.to_string(),
            cmd_rx,
            events,
            speaking.clone(),
        ));

        Self {
            cmd_tx,
            speaking,
            available,
        }
    }

    /// Platform default synthesizer program.
    pub fn autodetect() -> &'static str {
        if cfg!(target_os = "macos") {
            "say"
        } else {
            "espeak-ng"
        }
    }
}

impl SpeechEngine for ProcessEngine {
    fn submit(&mut self, request: UtteranceRequest) {
        if self.cmd_tx.send(EngineCmd::Speak(request)).is_err() {
            warn!("speech worker is gone, dropping utterance");
        }
    }

    fn cancel(&mut self) {
        let _ = self.cmd_tx.send(EngineCmd::Cancel);
    }

    fn speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn available(&self) -> bool {
        self.available
    }
}

async fn worker(
    program: String,
    mut cmd_rx: mpsc::UnboundedReceiver<EngineCmd>,
    events: mpsc::Sender<PlayerEvent>,
    speaking: Arc<AtomicBool>,
) {
    let mut queue: VecDeque<UtteranceRequest> = VecDeque::new();
    loop {
        if queue.is_empty() {
            speaking.store(false, Ordering::SeqCst);
            match cmd_rx.recv().await {
                Some(EngineCmd::Speak(req)) => queue.push_back(req),
                Some(EngineCmd::Cancel) => continue,
                None => return,
            }
        }
        let Some(req) = queue.pop_front() else {
            continue;
        };

        speaking.store(true, Ordering::SeqCst);
        let mut command = Command::new(&program);
        build_args(&mut command, &program, &req);
        let mut child = match command
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %program, error = %e, "failed to spawn synthesizer");
                // Report completion anyway so playback does not stall.
                let _ = events.send(PlayerEvent::UtteranceFinished(req.id)).await;
                continue;
            }
        };

        let finished = loop {
            tokio::select! {
                _ = child.wait() => break true,
                cmd = cmd_rx.recv() => match cmd {
                    Some(EngineCmd::Speak(r)) => queue.push_back(r),
                    Some(EngineCmd::Cancel) => {
                        let _ = child.kill().await;
                        queue.clear();
                        break false;
                    }
                    None => {
                        let _ = child.kill().await;
                        return;
                    }
                }
            }
        };

        if finished {
            let _ = events.send(PlayerEvent::UtteranceFinished(req.id)).await;
        }
    }
}

fn build_args(cmd: &mut Command, program: &str, req: &UtteranceRequest) {
    let wpm = (BASE_WPM * req.rate).round() as i64;
    if program.ends_with("say") {
        cmd.arg("-r").arg(wpm.to_string());
        if let Some(voice) = &req.voice {
            cmd.arg("-v").arg(&voice.identity);
        }
    } else {
        cmd.arg("-s").arg(wpm.to_string());
        if let Some(voice) = &req.voice {
            cmd.arg("-v").arg(&voice.identity);
        }
    }
    cmd.arg(&req.text);
}

/// Voice directory populated by parsing the synthesizer's voice listing.
/// Population runs on a spawned task; `changed` fires once it lands, and
/// `ready` stays false until the list is non-empty.
pub struct ProcessVoiceDirectory {
    voices: Arc<RwLock<Vec<Voice>>>,
    populated: Arc<AtomicBool>,
    changed: Arc<Notify>,
}

impl ProcessVoiceDirectory {
    pub fn spawn(program: &str) -> Self {
        let voices = Arc::new(RwLock::new(Vec::new()));
        let populated = Arc::new(AtomicBool::new(false));
        let changed = Arc::new(Notify::new());
        tokio::spawn(populate(
            program.to_string(),
            voices.clone(),
            populated.clone(),
            changed.clone(),
        ));
        Self {
            voices,
            populated,
            changed,
        }
    }

    pub fn changed(&self) -> &Notify {
        &self.changed
    }
}

impl VoiceDirectory for ProcessVoiceDirectory {
    fn list_voices(&self) -> Vec<Voice> {
        self.voices
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn ready(&self) -> bool {
        self.populated.load(Ordering::SeqCst) && !self.list_voices().is_empty()
    }
}

async fn populate(
    program: String,
    voices: Arc<RwLock<Vec<Voice>>>,
    populated: Arc<AtomicBool>,
    changed: Arc<Notify>,
) {
    let flag = if program.ends_with("say") {
        "-v?"
    } else {
        "--voices"
    };
    match Command::new(&program).arg(flag).output().await {
        Ok(out) => {
            let parsed = parse_voice_list(&program, &String::from_utf8_lossy(&out.stdout));
            info!(count = parsed.len(), program = %program, "voice directory populated");
            if let Ok(mut guard) = voices.write() {
                *guard = parsed;
            }
        }
        Err(e) => {
            warn!(program = %program, error = %e, "could not list voices");
        }
    }
    populated.store(true, Ordering::SeqCst);
    changed.notify_waiters();
}

fn parse_voice_list(program: &str, raw: &str) -> Vec<Voice> {
    let mut voices = Vec::new();
    for line in raw.lines() {
        if program.ends_with("say") {
            // "Milena              ru_RU    # Text after the hash is a sample."
            let head = line.split('#').next().unwrap_or("");
            let mut parts: Vec<&str> = head.split_whitespace().collect();
            let Some(lang) = parts.pop() else { continue };
            if parts.is_empty() || !lang.contains('_') {
                continue;
            }
            voices.push(Voice {
                identity: parts.join(" "),
                language_tag: lang.replace('_', "-"),
            });
        } else {
            // espeak-ng --voices: "Pty Language Age/Gender VoiceName File Other"
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 4 || cols[0] == "Pty" {
                continue;
            }
            voices.push(Voice {
                identity: cols[3].to_string(),
                language_tag: cols[1].to_string(),
            });
        }
    }
    voices
}

#[cfg(test)]
mod tests {
    use super::parse_voice_list;

    #[test]
    fn parses_espeak_listing() {
        let raw = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  en-gb          M  english             gmw/en               (en 2)
 5  ru             M  russian             zle/ru
";
        let voices = parse_voice_list("espeak-ng", raw);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].identity, "english");
        assert_eq!(voices[0].language_tag, "en-gb");
        assert_eq!(voices[1].language_tag, "ru");
    }

    #[test]
    fn parses_say_listing() {
        let raw = "\
Alex                en_US    # Most people recognize me by my voice.
Milena              ru_RU    # Здравствуйте, меня зовут Милена.
Bad News            en_US    # The light you see at the end of the tunnel.
";
        let voices = parse_voice_list("say", raw);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].identity, "Milena");
        assert_eq!(voices[1].language_tag, "ru-RU");
        assert_eq!(voices[2].identity, "Bad News");
    }
}
