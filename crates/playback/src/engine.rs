//! The playback engine.
//!
//! Replays a recording event by event: inter-event delays are
//! reconstructed from timestamps and scaled by the playback speed,
//! pointer moves are rendered as synthesized human-like motion, and key
//! holds recorded as `key_duration` events override the timestamp-based
//! release timing. All waits are cancellation-aware and any keys still
//! held when the loop exits are released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mimic_common::clock::precise_sleep_secs;
use mimic_recording_model::{InputEvent, Point2D, Recording};
use mimic_synthesis::{jitter_path, synthesize_path, synthesize_timing, MotionProfile};

use crate::injector::InputInjector;
use crate::tuning::{PlaybackTuning, RepeatOptions};

/// Delays at or under this are dropped rather than slept.
const WAIT_THRESHOLD_SECS: f64 = 0.010;

const WAIT_VARIATION_SECS: f64 = 0.002;
const WAIT_VARIATION_GAMING_SECS: f64 = 0.001;

/// Displacements beyond half the screen are corrected gradually.
const LARGE_JUMP_THRESHOLD: f64 = 0.5;
const GRADUAL_STEP: f64 = 0.1;
const GRADUAL_STEP_DELAY_SECS: f64 = 0.030;
const GRADUAL_STEP_DELAY_GAMING_SECS: f64 = 0.020;

const DIRECT_MOVE_JITTER: f64 = 0.005;
const DIRECT_MOVE_JITTER_GAMING: f64 = 0.002;

/// Settle after positioning on a click target, and before releasing.
const CLICK_SETTLE_SECS: f64 = 0.050;
const RELEASE_SETTLE_SECS: f64 = 0.020;

const REPEAT_PAUSE_SECS: f64 = 0.100;

/// Longest uninterruptible wait slice; bounds cancellation latency.
const CANCEL_POLL_SECS: f64 = 0.050;

/// Handle for observing and stopping a replay from another thread.
#[derive(Clone)]
pub struct PlaybackController {
    playing: Arc<AtomicBool>,
    stop_requested: Arc<AtomicBool>,
}

impl PlaybackController {
    /// Request a cooperative stop. The engine notices at the next wait
    /// slice or event boundary.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRun {
    /// False when the run was cancelled or refused.
    pub completed: bool,

    /// Events processed before the run ended.
    pub events_replayed: usize,
}

pub struct Player<I: InputInjector> {
    injector: I,
    tuning: PlaybackTuning,
    playing: Arc<AtomicBool>,
    stop_requested: Arc<AtomicBool>,
    rng: StdRng,
}

impl<I: InputInjector> Player<I> {
    pub fn new(injector: I, tuning: PlaybackTuning) -> Self {
        Self {
            injector,
            tuning,
            playing: Arc::new(AtomicBool::new(false)),
            stop_requested: Arc::new(AtomicBool::new(false)),
            rng: StdRng::from_entropy(),
        }
    }

    /// Player with pinned randomness, for reproducible replays.
    pub fn with_seed(injector: I, tuning: PlaybackTuning, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new(injector, tuning)
        }
    }

    pub fn controller(&self) -> PlaybackController {
        PlaybackController {
            playing: self.playing.clone(),
            stop_requested: self.stop_requested.clone(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    /// Replay a recording once.
    pub fn play(&mut self, recording: &Recording) -> PlaybackRun {
        self.stop_requested.store(false, Ordering::SeqCst);
        self.play_once(recording)
    }

    /// Replay a recording one or more times per the repeat options, with
    /// a short pause between passes. Progress strings are emitted
    /// through `status`.
    pub fn play_repeated(
        &mut self,
        recording: &Recording,
        options: RepeatOptions,
        mut status: impl FnMut(&str),
    ) -> PlaybackRun {
        self.stop_requested.store(false, Ordering::SeqCst);
        let passes = options.passes();

        let mut total = 0;
        let mut completed = true;
        let mut pass = 0u32;

        loop {
            if let Some(n) = passes {
                if pass >= n {
                    break;
                }
            }
            if self.stop_requested.load(Ordering::SeqCst) {
                completed = false;
                break;
            }
            pass += 1;

            match passes {
                Some(1) => status("Playing..."),
                Some(n) => status(&format!("Playing... ({pass}/{n})")),
                None => status(&format!("Playing... ({pass})")),
            }

            let run = self.play_once(recording);
            total += run.events_replayed;
            if !run.completed {
                completed = false;
                break;
            }

            let more = match passes {
                Some(n) => pass < n,
                None => true,
            };
            if more && !self.wait_interruptible(REPEAT_PAUSE_SECS) {
                completed = false;
                break;
            }
        }

        PlaybackRun {
            completed,
            events_replayed: total,
        }
    }

    fn play_once(&mut self, recording: &Recording) -> PlaybackRun {
        if self
            .playing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Playback already running, ignoring replay request");
            return PlaybackRun {
                completed: false,
                events_replayed: 0,
            };
        }

        let gaming = recording.gaming_mode;
        let tuning = if gaming {
            self.tuning.with_gaming_overrides()
        } else {
            self.tuning
        };
        let profile = MotionProfile::for_mode(gaming)
            .with_path_smoothing(tuning.path_smoothing)
            .with_acceleration(tuning.mouse_acceleration)
            .with_micro_jitter(tuning.micro_jitter);

        tracing::info!(
            events = recording.len(),
            gaming,
            speed = tuning.speed,
            "Playback started"
        );

        let mut last_timestamp: Option<f64> = None;
        let mut current_pos: Option<Point2D> = None;
        let mut held_keys: Vec<String> = Vec::new();
        let mut press_instants: HashMap<String, Instant> = HashMap::new();
        let mut pending_holds: HashMap<String, f64> = HashMap::new();
        let mut replayed = 0usize;
        let mut completed = true;

        for event in &recording.events {
            if self.cancelled() {
                completed = false;
                break;
            }

            if let InputEvent::KeyDuration { key, duration } = event {
                pending_holds.insert(key.clone(), duration / tuning.speed);
                replayed += 1;
                continue;
            }

            // A release with a pending hold is timed off the measured
            // duration instead of the recorded timestamp gap.
            let duration_override = matches!(
                event,
                InputEvent::KeyRelease { key, .. } if pending_holds.contains_key(key)
            );

            if let Some(t) = event.timestamp() {
                if let Some(prev) = last_timestamp {
                    if !duration_override && !self.wait_between_events(t - prev, gaming, &tuning) {
                        completed = false;
                        break;
                    }
                }
                last_timestamp = Some(t);
            }

            match event {
                InputEvent::Move { x, y, .. } => {
                    let target = Point2D::new(*x, *y).clamped();
                    match current_pos {
                        None => self.injector.move_to(target.x, target.y),
                        Some(pos) => {
                            if !self.move_cursor(pos, target, gaming, &tuning, &profile) {
                                completed = false;
                                break;
                            }
                        }
                    }
                    current_pos = Some(target);
                }

                InputEvent::Click {
                    x,
                    y,
                    button,
                    pressed,
                    ..
                } => {
                    let target = Point2D::new(*x, *y).clamped();
                    if *pressed {
                        if let Some(pos) = current_pos {
                            if pos != target
                                && !self.move_cursor(pos, target, gaming, &tuning, &profile)
                            {
                                completed = false;
                                break;
                            }
                        } else {
                            self.injector.move_to(target.x, target.y);
                        }
                        current_pos = Some(target);

                        precise_sleep_secs(CLICK_SETTLE_SECS);
                        let hover = tuning.hover_delay * self.rng.gen_range(0.9..=1.1);
                        if hover > 0.0 && !self.wait_interruptible(hover) {
                            completed = false;
                            break;
                        }
                        self.injector.button(target.x, target.y, *button, true);
                    } else {
                        precise_sleep_secs(RELEASE_SETTLE_SECS);
                        self.injector.button(target.x, target.y, *button, false);
                        current_pos = Some(target);
                    }
                }

                InputEvent::Scroll { x, y, dx, dy, .. } => {
                    self.injector.scroll(*x, *y, *dx, *dy);
                    current_pos = Some(Point2D::new(*x, *y).clamped());
                }

                InputEvent::KeyPress { key, .. } => {
                    self.injector.key(key, true);
                    press_instants.insert(key.clone(), Instant::now());
                    if !held_keys.contains(key) {
                        held_keys.push(key.clone());
                    }
                }

                InputEvent::KeyRelease { key, .. } => {
                    if let Some(hold) = pending_holds.remove(key) {
                        let elapsed = press_instants
                            .get(key)
                            .map(|at| at.elapsed().as_secs_f64())
                            .unwrap_or(0.0);
                        let remaining = hold - elapsed;
                        if remaining > 0.0 && !self.wait_interruptible(remaining) {
                            completed = false;
                            break;
                        }
                    }
                    self.injector.key(key, false);
                    press_instants.remove(key);
                    held_keys.retain(|held| held != key);
                }

                InputEvent::KeyDuration { .. } => {}
            }

            replayed += 1;
        }

        // Never leave the target with a stuck modifier.
        for key in held_keys.drain(..) {
            self.injector.key(&key, false);
        }

        self.playing.store(false, Ordering::SeqCst);
        tracing::info!(events = replayed, completed, "Playback finished");

        PlaybackRun {
            completed,
            events_replayed: replayed,
        }
    }

    /// Reconstruct the recorded gap, scaled by speed and roughened by a
    /// small symmetric variation. Sub-threshold gaps are dropped.
    fn wait_between_events(&mut self, gap: f64, gaming: bool, tuning: &PlaybackTuning) -> bool {
        let mut delay = gap.max(0.0) / tuning.speed;
        if delay <= WAIT_THRESHOLD_SECS {
            return true;
        }

        if tuning.jitter_amount > 0 {
            let variation = if gaming {
                WAIT_VARIATION_GAMING_SECS
            } else {
                WAIT_VARIATION_SECS
            };
            delay = (delay + self.rng.gen_range(-variation..=variation)).max(0.0);
        }
        self.wait_interruptible(delay)
    }

    fn move_cursor(
        &mut self,
        from: Point2D,
        to: Point2D,
        gaming: bool,
        tuning: &PlaybackTuning,
        profile: &MotionProfile,
    ) -> bool {
        let distance = from.distance_to(&to);

        if distance > LARGE_JUMP_THRESHOLD {
            return self.gradual_move(from, to, distance, gaming, tuning, profile);
        }

        if tuning.human_like_mouse && distance >= profile.direct_threshold {
            return self.human_like_move(from, to, distance, tuning, profile);
        }

        let mut target = to;
        if tuning.jitter_amount > 0 {
            let j = if gaming {
                DIRECT_MOVE_JITTER_GAMING
            } else {
                DIRECT_MOVE_JITTER
            };
            target = Point2D::new(
                to.x + self.rng.gen_range(-j..=j),
                to.y + self.rng.gen_range(-j..=j),
            )
            .clamped();
        }
        self.injector.move_to(target.x, target.y);
        true
    }

    /// Walk a large displacement in bounded steps so the cursor never
    /// teleports across the screen in a single frame. In human-like mode
    /// each step is rendered through the synthesis pipeline; otherwise
    /// the steps are direct warps.
    fn gradual_move(
        &mut self,
        from: Point2D,
        to: Point2D,
        distance: f64,
        gaming: bool,
        tuning: &PlaybackTuning,
        profile: &MotionProfile,
    ) -> bool {
        let steps = (distance / GRADUAL_STEP).ceil().max(1.0) as usize;
        let delay = if gaming {
            GRADUAL_STEP_DELAY_GAMING_SECS
        } else {
            GRADUAL_STEP_DELAY_SECS
        };
        tracing::debug!(distance, steps, "Correcting large pointer jump");

        let mut current = from;
        for i in 1..=steps {
            if self.cancelled() {
                return false;
            }
            let t = i as f64 / steps as f64;
            let point = Point2D::lerp(&from, &to, t);

            if tuning.human_like_mouse {
                let step_distance = current.distance_to(&point);
                if !self.human_like_move(current, point, step_distance, tuning, profile) {
                    return false;
                }
            } else {
                self.injector.move_to(point.x, point.y);
            }
            current = point;

            if i < steps && !self.wait_interruptible(delay) {
                return false;
            }
        }
        true
    }

    fn human_like_move(
        &mut self,
        from: Point2D,
        to: Point2D,
        distance: f64,
        tuning: &PlaybackTuning,
        profile: &MotionProfile,
    ) -> bool {
        let path = synthesize_path(from, to, profile, &mut self.rng);
        let path = jitter_path(&path, distance, profile, &mut self.rng);
        let delays = synthesize_timing(path.len(), distance, profile, &mut self.rng);

        self.injector.move_to(path[0].x, path[0].y);
        for (point, delay) in path[1..].iter().zip(&delays) {
            if !self.wait_interruptible(delay / tuning.speed) {
                return false;
            }
            self.injector.move_to(point.x, point.y);
        }
        true
    }

    /// Sleep in bounded slices, bailing out early on cancellation.
    fn wait_interruptible(&self, secs: f64) -> bool {
        let mut remaining = secs;
        while remaining > 0.0 {
            if self.cancelled() {
                return false;
            }
            let slice = remaining.min(CANCEL_POLL_SECS);
            precise_sleep_secs(slice);
            remaining -= slice;
        }
        !self.cancelled()
    }

    fn cancelled(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mimic_recording_model::{MouseButton, VirtualScreen};

    use super::*;
    use crate::injector::{InjectedCall, ScriptedInjector};

    fn direct_tuning() -> PlaybackTuning {
        PlaybackTuning {
            speed: 2.0,
            jitter_amount: 0,
            hover_delay: 0.0,
            human_like_mouse: false,
            mouse_acceleration: 0.5,
            micro_jitter: 0.0,
            path_smoothing: 0.5,
        }
    }

    fn recording(events: Vec<InputEvent>) -> Recording {
        let mut recording = Recording::new(VirtualScreen::new(1920, 1080, 0, 0), false);
        recording.events = events;
        recording
    }

    fn player(tuning: PlaybackTuning) -> Player<ScriptedInjector> {
        Player::with_seed(ScriptedInjector::default(), tuning, 42)
    }

    #[test]
    fn test_replays_events_in_order() {
        let mut player = player(direct_tuning());
        let run = player.play(&recording(vec![
            InputEvent::Move {
                x: 0.2,
                y: 0.2,
                t: 0.0,
            },
            InputEvent::Click {
                x: 0.2,
                y: 0.2,
                button: MouseButton::Left,
                pressed: true,
                t: 0.001,
            },
            InputEvent::Click {
                x: 0.2,
                y: 0.2,
                button: MouseButton::Left,
                pressed: false,
                t: 0.002,
            },
            InputEvent::KeyPress {
                key: "a".to_string(),
                t: 0.003,
            },
            InputEvent::KeyRelease {
                key: "a".to_string(),
                t: 0.004,
            },
        ]));

        assert!(run.completed);
        assert_eq!(run.events_replayed, 5);
        assert!(!player.is_playing());

        let calls = player.injector().calls();
        assert_eq!(calls[0], InjectedCall::Move { x: 0.2, y: 0.2 });
        assert!(matches!(
            calls[1],
            InjectedCall::Button { pressed: true, .. }
        ));
        assert!(matches!(
            calls[2],
            InjectedCall::Button { pressed: false, .. }
        ));
        assert!(matches!(calls[3], InjectedCall::Key { pressed: true, .. }));
        assert!(matches!(
            calls[4],
            InjectedCall::Key { pressed: false, .. }
        ));
    }

    #[test]
    fn test_key_duration_overrides_release_timestamp() {
        let mut player = player(PlaybackTuning {
            speed: 1.0,
            ..direct_tuning()
        });

        // The release timestamp claims a 5 s hold, the measured duration
        // says 20 ms; the duration wins.
        let started = Instant::now();
        let run = player.play(&recording(vec![
            InputEvent::KeyPress {
                key: "w".to_string(),
                t: 0.0,
            },
            InputEvent::KeyDuration {
                key: "w".to_string(),
                duration: 0.02,
            },
            InputEvent::KeyRelease {
                key: "w".to_string(),
                t: 5.0,
            },
        ]));

        assert!(run.completed);
        assert!(started.elapsed() < Duration::from_secs(1));

        let calls = player.injector().calls();
        assert_eq!(
            calls.last(),
            Some(&InjectedCall::Key {
                key: "w".to_string(),
                pressed: false
            })
        );
    }

    #[test]
    fn test_large_jump_is_walked_in_steps() {
        let mut player = player(direct_tuning());
        let run = player.play(&recording(vec![
            InputEvent::Move {
                x: 0.05,
                y: 0.05,
                t: 0.0,
            },
            InputEvent::Move {
                x: 0.95,
                y: 0.95,
                t: 0.001,
            },
        ]));

        assert!(run.completed);
        let moves: Vec<_> = player
            .injector()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                InjectedCall::Move { x, y } => Some((x, y)),
                _ => None,
            })
            .collect();

        // sqrt(2)*0.9 of travel in <=0.1 steps needs at least 13 moves
        // after the initial position.
        assert!(moves.len() >= 13, "only {} moves", moves.len());
        let (x, y) = *moves.last().unwrap();
        assert!((x - 0.95).abs() < 1e-9);
        assert!((y - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_large_jump_synthesizes_motion_between_steps() {
        let mut player = player(PlaybackTuning {
            human_like_mouse: true,
            ..direct_tuning()
        });
        let run = player.play(&recording(vec![
            InputEvent::Move {
                x: 0.05,
                y: 0.05,
                t: 0.0,
            },
            InputEvent::Move {
                x: 0.95,
                y: 0.95,
                t: 0.001,
            },
        ]));

        assert!(run.completed);
        let moves: Vec<_> = player
            .injector()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                InjectedCall::Move { x, y } => Some((x, y)),
                _ => None,
            })
            .collect();

        // 13 gradual steps, each rendered as a sampled sub-path of at
        // least 3 points, must produce far more than 14 bare warps.
        assert!(
            moves.len() > 26,
            "expected synthesized sub-paths, got {} moves",
            moves.len()
        );
        let (x, y) = *moves.last().unwrap();
        assert!((x - 0.95).abs() < 1e-9);
        assert!((y - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_human_like_move_renders_a_path() {
        let mut player = player(PlaybackTuning {
            human_like_mouse: true,
            ..direct_tuning()
        });
        let run = player.play(&recording(vec![
            InputEvent::Move {
                x: 0.1,
                y: 0.5,
                t: 0.0,
            },
            InputEvent::Move {
                x: 0.45,
                y: 0.5,
                t: 0.001,
            },
        ]));

        assert!(run.completed);
        let moves: Vec<_> = player
            .injector()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                InjectedCall::Move { x, y } => Some((x, y)),
                _ => None,
            })
            .collect();

        assert!(moves.len() > 3, "expected a sampled path, got {moves:?}");
        assert_eq!(*moves.last().unwrap(), (0.45, 0.5));
        for (x, y) in moves {
            assert!((0.0..=1.0).contains(&x));
            assert!((0.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn test_seeded_replay_is_deterministic() {
        let rec = recording(vec![
            InputEvent::Move {
                x: 0.2,
                y: 0.3,
                t: 0.0,
            },
            InputEvent::Move {
                x: 0.6,
                y: 0.7,
                t: 0.001,
            },
        ]);
        let tuning = PlaybackTuning {
            human_like_mouse: true,
            ..direct_tuning()
        };

        let mut a = Player::with_seed(ScriptedInjector::default(), tuning, 7);
        let mut b = Player::with_seed(ScriptedInjector::default(), tuning, 7);
        a.play(&rec);
        b.play(&rec);

        assert_eq!(a.injector().calls(), b.injector().calls());
    }

    #[test]
    fn test_reentrant_play_is_refused() {
        let mut player = player(direct_tuning());
        player.playing.store(true, Ordering::SeqCst);

        let run = player.play_once(&recording(vec![InputEvent::Move {
            x: 0.5,
            y: 0.5,
            t: 0.0,
        }]));

        assert!(!run.completed);
        assert_eq!(run.events_replayed, 0);
        assert!(player.injector().calls().is_empty());
    }

    #[test]
    fn test_stop_interrupts_a_long_wait() {
        let mut player = player(direct_tuning());
        let controller = player.controller();
        let log = player.injector().log();

        let handle = std::thread::spawn(move || {
            player.play(&recording(vec![
                InputEvent::KeyPress {
                    key: "w".to_string(),
                    t: 0.0,
                },
                InputEvent::Move {
                    x: 0.5,
                    y: 0.5,
                    t: 30.0,
                },
            ]))
        });

        std::thread::sleep(Duration::from_millis(100));
        let started = Instant::now();
        controller.stop();
        let run = handle.join().unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!run.completed);
        assert!(!controller.is_playing());

        // The held key was released on the way out.
        let calls = log.lock().unwrap();
        assert_eq!(
            calls.last(),
            Some(&InjectedCall::Key {
                key: "w".to_string(),
                pressed: false
            })
        );
    }

    #[test]
    fn test_repeat_runs_requested_passes() {
        let mut player = player(direct_tuning());
        let rec = recording(vec![InputEvent::Move {
            x: 0.3,
            y: 0.3,
            t: 0.0,
        }]);

        let mut statuses = Vec::new();
        let run = player.play_repeated(&rec, RepeatOptions::times(3), |s| {
            statuses.push(s.to_string());
        });

        assert!(run.completed);
        assert_eq!(run.events_replayed, 3);
        assert_eq!(
            statuses,
            vec!["Playing... (1/3)", "Playing... (2/3)", "Playing... (3/3)"]
        );
        assert!(!player.is_playing());
    }

    #[test]
    fn test_repeat_disabled_is_a_single_pass() {
        let mut player = player(direct_tuning());
        let rec = recording(vec![InputEvent::Move {
            x: 0.3,
            y: 0.3,
            t: 0.0,
        }]);

        let mut statuses = Vec::new();
        let run = player.play_repeated(&rec, RepeatOptions::once(), |s| {
            statuses.push(s.to_string());
        });

        assert!(run.completed);
        assert_eq!(run.events_replayed, 1);
        assert_eq!(statuses, vec!["Playing..."]);
    }

    #[test]
    fn test_gaming_recording_applies_overrides() {
        let tuning = PlaybackTuning {
            hover_delay: 0.5,
            ..direct_tuning()
        };
        let mut player = player(tuning);

        let mut rec = recording(vec![InputEvent::Click {
            x: 0.5,
            y: 0.5,
            button: MouseButton::Left,
            pressed: true,
            t: 0.0,
        }]);
        rec.gaming_mode = true;

        // Hover is capped at 50 ms in gaming mode; a full 0.5 s hover
        // would dominate the elapsed time.
        let started = Instant::now();
        let run = player.play(&rec);
        assert!(run.completed);
        assert!(started.elapsed() < Duration::from_millis(400));
    }
}
