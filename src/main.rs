use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use skazka::player::controller::{Controller, PlayerSettings};
use skazka::player::driver;
use skazka::player::event::PlayerEvent;
use skazka::speech::process::{ProcessEngine, ProcessVoiceDirectory};
use skazka::speech::voices;
use skazka::speech::SpeechEngine;
use skazka::story::loader;

const VOICE_WAIT: Duration = Duration::from_secs(10);

struct Options {
    location: String,
    program: Option<String>,
    settings: PlayerSettings,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut location = None;
        let mut program = None;
        let mut settings = PlayerSettings::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--source-rate" => {
                    settings.source_rate = next_value(&mut args, "--source-rate")?;
                }
                "--target-rate" => {
                    settings.target_rate = next_value(&mut args, "--target-rate")?;
                }
                "--no-target" => settings.target_enabled = false,
                "--program" => {
                    program = Some(
                        args.next()
                            .context("--program requires a synthesizer command")?,
                    );
                }
                other if other.starts_with("--") => bail!("unknown option: {other}"),
                other => location = Some(other.to_string()),
            }
        }
        let Some(location) = location else {
            bail!(
                "usage: skazka <story.json | url> [--source-rate R] [--target-rate R] \
                 [--no-target] [--program CMD]"
            );
        };
        Ok(Self {
            location,
            program,
            settings,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<f32> {
    let raw = args
        .next()
        .with_context(|| format!("{flag} requires a value"))?;
    let rate: f32 = raw
        .parse()
        .with_context(|| format!("{flag} expects a number, got '{raw}'"))?;
    if rate <= 0.0 {
        bail!("{flag} must be positive");
    }
    Ok(rate)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let opts = Options::parse(std::env::args().skip(1))?;

    let story = if opts.location.starts_with("http://") || opts.location.starts_with("https://") {
        loader::fetch_story(&opts.location).await?
    } else {
        loader::load_story(&opts.location)?
    };
    println!("{} ({})", story.meta.title, story.meta.source);

    let program = opts
        .program
        .unwrap_or_else(|| ProcessEngine::autodetect().to_string());
    let (tx, rx) = mpsc::channel(100);
    let engine = ProcessEngine::new(&program, tx.clone());
    if !engine.available() {
        bail!("speech program '{program}' not found; install it or pass --program");
    }

    let directory = ProcessVoiceDirectory::spawn(&program);
    if !voices::wait_ready(&directory, directory.changed(), Some(VOICE_WAIT)).await {
        bail!("no synthesizer voices appeared within {VOICE_WAIT:?}");
    }

    let mut controller = Controller::new(story, engine, directory);
    controller.settings = opts.settings;

    // Ctrl-C ends playback cleanly instead of leaving a child mid-utterance.
    let stop_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(PlayerEvent::Stop).await;
        }
    });

    driver::run(&mut controller, rx, tx).await?;
    Ok(())
}
