use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::debug;

use crate::speech::{SpeechEngine, VoiceDirectory};

use super::controller::{Controller, PlayerError, StepOutcome};
use super::event::PlayerEvent;

/// Drive the controller until the story is exhausted or a `Stop` arrives.
///
/// The controller itself never sleeps or awaits; this loop executes its
/// outcomes, scheduling gap timers back onto the same event channel the
/// engine reports completions on.
pub async fn run<E: SpeechEngine, D: VoiceDirectory>(
    controller: &mut Controller<E, D>,
    mut rx: mpsc::Receiver<PlayerEvent>,
    tx: mpsc::Sender<PlayerEvent>,
) -> Result<(), PlayerError> {
    let outcome = controller.start()?;
    if dispatch(outcome, &tx) {
        return Ok(());
    }

    while let Some(event) = rx.recv().await {
        let outcome = match event {
            PlayerEvent::UtteranceFinished(id) => controller.on_utterance_complete(id),
            PlayerEvent::GapElapsed(id) => controller.on_gap_elapsed(id),
            PlayerEvent::Stop => {
                controller.stop();
                return Ok(());
            }
        };
        if dispatch(outcome, &tx) {
            return Ok(());
        }
    }
    debug!("event channel closed, leaving playback loop");
    Ok(())
}

/// Execute one outcome. Returns true when playback is finished.
fn dispatch(outcome: StepOutcome, tx: &mpsc::Sender<PlayerEvent>) -> bool {
    match outcome {
        StepOutcome::Finished => true,
        StepOutcome::Gap { id, duration } => {
            let tx = tx.clone();
            tokio::spawn(async move {
                sleep(duration).await;
                let _ = tx.send(PlayerEvent::GapElapsed(id)).await;
            });
            false
        }
        StepOutcome::Speaking | StepOutcome::Ignored => false,
    }
}
