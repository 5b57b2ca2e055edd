//! Check system capabilities.

use mimic_capture::source::{mice_device_diagnostic, MiceDeviceSource};
use mimic_common::config::{config_file_path, Settings};
use mimic_platform::{detect_display_server, detect_monitors, DisplayServer};

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    println!("Mimic System Check");
    println!("{}", "=".repeat(50));

    match detect_display_server() {
        DisplayServer::Wayland => println!("[OK] Display server: Wayland"),
        DisplayServer::X11 => println!("[OK] Display server: X11"),
        DisplayServer::Windows => println!("[OK] Display server: Windows"),
        DisplayServer::MacOS => println!("[OK] Display server: macOS"),
        DisplayServer::Unknown => println!("[WARN] Display server: Unknown"),
    }

    let monitors = detect_monitors()?;
    println!("[OK] Monitors detected: {}", monitors.len());
    for m in &monitors {
        println!(
            "     {} {}x{} at ({}, {}) scale {}x {}",
            m.name,
            m.width,
            m.height,
            m.x,
            m.y,
            m.scale_factor,
            if m.primary { "(primary)" } else { "" }
        );
    }

    if MiceDeviceSource::is_supported() {
        println!("[OK] Capture source: /dev/input/mice readable");
    } else {
        println!("[WARN] Capture source unavailable");
        println!("       {}", mice_device_diagnostic());
    }

    if cfg!(feature = "enigo") {
        println!("[OK] Injection backend: enigo");
    } else {
        println!("[WARN] Built without the 'enigo' feature; playback is a dry run");
    }

    println!();
    println!("Config: {}", config_file_path().display());
    println!(
        "  start_key={} stop_key={} speed={} gaming={}",
        settings.start_key, settings.stop_key, settings.playback_speed, settings.gaming_mode
    );

    Ok(())
}
