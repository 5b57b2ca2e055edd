//! Event normalization and accumulation.
//!
//! The recorder turns raw readings into the persisted event stream:
//! pixel positions become fractional virtual-screen coordinates, every
//! event is stamped with monotonic seconds since capture start, pointer
//! moves below the noise threshold are dropped, and key holds are
//! measured into `key_duration` events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mimic_common::clock::RecordingClock;
use mimic_recording_model::{normalize_key, InputEvent, MouseButton, Point2D, Recording, VirtualScreen};

use crate::source::RawInput;

/// Pointer moves closer than this (fractional distance) to the last
/// recorded move are dropped as sensor noise.
const MOVE_NOISE_THRESHOLD: f64 = 0.01;

pub struct Recorder {
    screen: VirtualScreen,
    gaming_mode: bool,
    recording: Arc<AtomicBool>,
    clock: Option<RecordingClock>,
    events: Vec<InputEvent>,
    last_move: Option<Point2D>,
    press_times: HashMap<String, f64>,
    held_keys: Vec<String>,
}

impl Recorder {
    pub fn new(screen: VirtualScreen, gaming_mode: bool) -> Self {
        Self {
            screen,
            gaming_mode,
            recording: Arc::new(AtomicBool::new(false)),
            clock: None,
            events: Vec::new(),
            last_move: None,
            press_times: HashMap::new(),
            held_keys: Vec::new(),
        }
    }

    /// Begin a capture run. A second call while recording is a no-op.
    pub fn start(&mut self) {
        if self.recording.load(Ordering::SeqCst) {
            return;
        }

        self.events.clear();
        self.last_move = None;
        self.press_times.clear();
        self.held_keys.clear();
        self.clock = Some(RecordingClock::start());
        self.recording.store(true, Ordering::SeqCst);

        tracing::info!(screen = ?self.screen, gaming = self.gaming_mode, "Recording started");
    }

    /// End the capture run and hand back the recording.
    ///
    /// Keys still held at this point get a synthetic `key_duration` and
    /// `key_release` so the stream never ends with an unbalanced press.
    /// Returns `None` when no run was started. The run counts as started
    /// even if the shared flag was already cleared externally; the
    /// buffered events are still returned.
    pub fn stop(&mut self) -> Option<Recording> {
        self.recording.store(false, Ordering::SeqCst);
        let clock = self.clock.take()?;

        let now = clock.elapsed_secs();
        for key in std::mem::take(&mut self.held_keys) {
            if let Some(pressed_at) = self.press_times.remove(&key) {
                self.events.push(InputEvent::KeyDuration {
                    key: key.clone(),
                    duration: now - pressed_at,
                });
            }
            self.events.push(InputEvent::KeyRelease { key, t: now });
        }

        let mut recording = Recording::new(self.screen, self.gaming_mode);
        recording.events = std::mem::take(&mut self.events);

        tracing::info!(
            events = recording.len(),
            duration_secs = recording.duration_secs(),
            "Recording stopped"
        );
        Some(recording)
    }

    /// Route a raw reading to the matching handler.
    pub fn ingest(&mut self, reading: RawInput) {
        match reading {
            RawInput::PointerMove { x, y } => self.on_move(x, y),
            RawInput::Button {
                x,
                y,
                button,
                pressed,
            } => self.on_button(x, y, button, pressed),
            RawInput::Wheel { x, y, dx, dy } => self.on_scroll(x, y, dx, dy),
            RawInput::Key { key, pressed } => {
                if pressed {
                    self.on_key_press(&key);
                } else {
                    self.on_key_release(&key);
                }
            }
        }
    }

    pub fn on_move(&mut self, x: i32, y: i32) {
        if !self.is_recording() {
            return;
        }

        let (fx, fy) = self.screen.to_fractional(x, y);
        let point = Point2D::new(fx, fy);
        if let Some(last) = &self.last_move {
            if last.distance_to(&point) < MOVE_NOISE_THRESHOLD {
                return;
            }
        }

        let t = self.now();
        self.events.push(InputEvent::Move { x: fx, y: fy, t });
        self.last_move = Some(point);
    }

    pub fn on_button(&mut self, x: i32, y: i32, button: MouseButton, pressed: bool) {
        if !self.is_recording() {
            return;
        }

        let (fx, fy) = self.screen.to_fractional(x, y);
        let t = self.now();
        self.events.push(InputEvent::Click {
            x: fx,
            y: fy,
            button,
            pressed,
            t,
        });
    }

    pub fn on_scroll(&mut self, x: i32, y: i32, dx: f64, dy: f64) {
        if !self.is_recording() {
            return;
        }

        let (fx, fy) = self.screen.to_fractional(x, y);
        let t = self.now();
        self.events.push(InputEvent::Scroll {
            x: fx,
            y: fy,
            dx,
            dy,
            t,
        });
    }

    /// Record a key-down edge. Repeats while the key is held (keyboard
    /// auto-repeat) are ignored.
    pub fn on_key_press(&mut self, raw_key: &str) {
        if !self.is_recording() {
            return;
        }

        let key = normalize_key(raw_key);
        if self.held_keys.contains(&key) {
            return;
        }

        let t = self.now();
        self.press_times.insert(key.clone(), t);
        self.held_keys.push(key.clone());
        self.events.push(InputEvent::KeyPress { key, t });
    }

    /// Record a key-up edge, preceded by the measured hold duration when
    /// the matching press was captured.
    pub fn on_key_release(&mut self, raw_key: &str) {
        if !self.is_recording() {
            return;
        }

        let key = normalize_key(raw_key);
        let t = self.now();

        if let Some(pressed_at) = self.press_times.remove(&key) {
            self.events.push(InputEvent::KeyDuration {
                key: key.clone(),
                duration: t - pressed_at,
            });
        }
        self.held_keys.retain(|held| held != &key);
        self.events.push(InputEvent::KeyRelease { key, t });
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Shared flag for external coordination (signal handlers, hotkeys).
    pub fn recording_flag(&self) -> Arc<AtomicBool> {
        self.recording.clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn now(&self) -> f64 {
        match &self.clock {
            Some(clock) => clock.elapsed_secs(),
            None => 0.0,
        }
    }
}
