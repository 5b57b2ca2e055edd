//! Show recording information.

use std::collections::BTreeMap;
use std::path::PathBuf;

use mimic_recording_model::Recording;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let recording = Recording::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load recording: {e}"))?;

    println!("Recording: {}", path.display());
    println!(
        "  Screen: {}x{} at ({}, {})",
        recording.virtual_screen.width,
        recording.virtual_screen.height,
        recording.virtual_screen.left,
        recording.virtual_screen.top
    );
    println!("  Gaming mode: {}", recording.gaming_mode);
    println!("  Duration: {:.2}s", recording.duration_secs());
    println!("  Events: {}", recording.len());

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for event in &recording.events {
        *counts.entry(event.tag()).or_default() += 1;
    }
    for (tag, count) in counts {
        println!("    {tag}: {count}");
    }

    Ok(())
}
