//! Capture input to a recording file.

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use mimic_capture::{detect_best_source, CaptureSession, Recorder};
use mimic_common::config::Settings;

pub async fn run(
    output: PathBuf,
    gaming: bool,
    duration: Option<f64>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let gaming = gaming || settings.gaming_mode;
    let screen = mimic_platform::current_virtual_screen()?;

    println!("Recording to: {}", output.display());
    println!(
        "  Screen: {}x{} at ({}, {})",
        screen.width, screen.height, screen.left, screen.top
    );
    println!("  Gaming mode: {gaming}");
    println!();
    println!("Press Ctrl+C to stop recording...");

    let recorder = Recorder::new(screen, gaming);
    let source = detect_best_source(screen);
    let session = CaptureSession::new(source, recorder);
    let flag = session.recording_flag();

    let handle = tokio::spawn(session.run());

    match duration {
        Some(secs) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = tokio::time::sleep(Duration::from_secs_f64(secs.max(0.0))) => {}
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
        }
    }
    flag.store(false, Ordering::SeqCst);

    let recording = handle.await??;
    recording.save(&output)?;

    println!();
    println!(
        "Saved {} events ({:.1}s) to {}",
        recording.len(),
        recording.duration_secs(),
        output.display()
    );
    Ok(())
}
