//! Replay a recording.

use std::path::PathBuf;

use mimic_common::config::Settings;
use mimic_playback::{Player, PlaybackTuning, RepeatOptions};
use mimic_recording_model::Recording;

pub async fn run(
    path: PathBuf,
    speed: Option<f64>,
    repeat: Option<u32>,
    infinite: bool,
    seed: Option<u64>,
    mut settings: Settings,
) -> anyhow::Result<()> {
    if let Some(speed) = speed {
        settings.playback_speed = speed;
    }

    let recording = Recording::load(&path)?;
    println!(
        "Loaded {} events ({:.1}s{}) from {}",
        recording.len(),
        recording.duration_secs(),
        if recording.gaming_mode { ", gaming" } else { "" },
        path.display()
    );

    let tuning = PlaybackTuning::from_settings(&settings);
    let options = if infinite {
        RepeatOptions::infinite()
    } else if let Some(count) = repeat {
        RepeatOptions::times(count)
    } else {
        RepeatOptions::from(&settings.repeat)
    };

    let injector = make_injector(&recording)?;
    let mut player = match seed {
        Some(seed) => Player::with_seed(injector, tuning, seed),
        None => Player::new(injector, tuning),
    };
    let controller = player.controller();

    let watcher = tokio::spawn({
        let controller = controller.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!();
                println!("Stopping...");
                controller.stop();
            }
        }
    });

    let run = tokio::task::spawn_blocking(move || {
        player.play_repeated(&recording, options, |status| println!("{status}"))
    })
    .await?;
    watcher.abort();

    if run.completed {
        println!("Done: {} events replayed", run.events_replayed);
    } else {
        println!("Stopped after {} events", run.events_replayed);
    }
    Ok(())
}

#[cfg(feature = "enigo")]
fn make_injector(_recording: &Recording) -> anyhow::Result<mimic_playback::EnigoInjector> {
    Ok(mimic_playback::EnigoInjector::new()?)
}

#[cfg(not(feature = "enigo"))]
fn make_injector(recording: &Recording) -> anyhow::Result<mimic_playback::ScriptedInjector> {
    println!("Built without the 'enigo' feature; performing a dry run.");
    Ok(mimic_playback::ScriptedInjector::new(
        recording.virtual_screen,
    ))
}
