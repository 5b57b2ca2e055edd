//! Input injection backends.
//!
//! Injection is fire-and-forget: a failed synthetic event mid-replay is
//! logged and skipped, because aborting the run would leave the target
//! application in a half-replayed state that is worse than one missed
//! event.

use mimic_recording_model::{MouseButton, VirtualScreen};

/// Sink for synthetic input. Pointer coordinates are fractional; each
/// implementation converts to its own screen geometry.
pub trait InputInjector: Send {
    /// The geometry injected coordinates are mapped onto.
    fn virtual_screen(&self) -> VirtualScreen;

    fn move_to(&mut self, x: f64, y: f64);

    fn button(&mut self, x: f64, y: f64, button: MouseButton, pressed: bool);

    fn scroll(&mut self, x: f64, y: f64, dx: f64, dy: f64);

    /// `key` is a normalized identifier: a single printable character or
    /// a named special key such as `enter` or `shift`.
    fn key(&mut self, key: &str, pressed: bool);
}

/// One injected action, recorded by [`ScriptedInjector`].
#[derive(Debug, Clone, PartialEq)]
pub enum InjectedCall {
    Move {
        x: f64,
        y: f64,
    },
    Button {
        x: f64,
        y: f64,
        button: MouseButton,
        pressed: bool,
    },
    Scroll {
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
    },
    Key {
        key: String,
        pressed: bool,
    },
}

/// Injector that records every call instead of touching the OS.
///
/// The call log is behind an `Arc` so a test can keep a handle while the
/// player owns the injector, including across threads.
pub struct ScriptedInjector {
    screen: VirtualScreen,
    calls: std::sync::Arc<std::sync::Mutex<Vec<InjectedCall>>>,
}

impl ScriptedInjector {
    pub fn new(screen: VirtualScreen) -> Self {
        Self {
            screen,
            calls: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the call log.
    pub fn log(&self) -> std::sync::Arc<std::sync::Mutex<Vec<InjectedCall>>> {
        self.calls.clone()
    }

    /// Snapshot of the calls made so far.
    pub fn calls(&self) -> Vec<InjectedCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn push(&self, call: InjectedCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Default for ScriptedInjector {
    fn default() -> Self {
        Self::new(VirtualScreen::default())
    }
}

impl InputInjector for ScriptedInjector {
    fn virtual_screen(&self) -> VirtualScreen {
        self.screen
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(InjectedCall::Move { x, y });
    }

    fn button(&mut self, x: f64, y: f64, button: MouseButton, pressed: bool) {
        self.push(InjectedCall::Button {
            x,
            y,
            button,
            pressed,
        });
    }

    fn scroll(&mut self, x: f64, y: f64, dx: f64, dy: f64) {
        self.push(InjectedCall::Scroll { x, y, dx, dy });
    }

    fn key(&mut self, key: &str, pressed: bool) {
        self.push(InjectedCall::Key {
            key: key.to_string(),
            pressed,
        });
    }
}

#[cfg(feature = "enigo")]
pub use enigo_impl::EnigoInjector;

#[cfg(feature = "enigo")]
mod enigo_impl {
    use enigo::{
        Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse,
        Settings as EnigoSettings,
    };

    use mimic_common::error::{MimicError, MimicResult};
    use mimic_recording_model::{MouseButton, VirtualScreen};

    use super::InputInjector;

    /// OS-level injector backed by `enigo`.
    pub struct EnigoInjector {
        enigo: Enigo,
        screen: VirtualScreen,
    }

    impl EnigoInjector {
        /// Connect to the display server and query the current
        /// virtual-screen geometry.
        pub fn new() -> MimicResult<Self> {
            let screen = mimic_platform::current_virtual_screen()?;
            let enigo = Enigo::new(&EnigoSettings::default())
                .map_err(|e| MimicError::playback(format!("Failed to initialize enigo: {e}")))?;
            Ok(Self { enigo, screen })
        }

        fn to_pixels(&self, x: f64, y: f64) -> (i32, i32) {
            self.screen.to_absolute(x, y)
        }

        fn map_button(button: MouseButton) -> Button {
            match button {
                MouseButton::Left => Button::Left,
                MouseButton::Right => Button::Right,
                MouseButton::Middle => Button::Middle,
            }
        }

        fn map_key(key: &str) -> Option<Key> {
            let mut chars = key.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Some(Key::Unicode(c));
            }

            let mapped = match key {
                "enter" | "return" => Key::Return,
                "esc" | "escape" => Key::Escape,
                "space" => Key::Space,
                "tab" => Key::Tab,
                "backspace" => Key::Backspace,
                "delete" => Key::Delete,
                "home" => Key::Home,
                "end" => Key::End,
                "page_up" => Key::PageUp,
                "page_down" => Key::PageDown,
                "up" => Key::UpArrow,
                "down" => Key::DownArrow,
                "left" => Key::LeftArrow,
                "right" => Key::RightArrow,
                "shift" | "shift_l" | "shift_r" => Key::Shift,
                "ctrl" | "ctrl_l" | "ctrl_r" | "control" => Key::Control,
                "alt" | "alt_l" | "alt_r" | "alt_gr" => Key::Alt,
                "cmd" | "meta" | "super" => Key::Meta,
                "caps_lock" => Key::CapsLock,
                "f1" => Key::F1,
                "f2" => Key::F2,
                "f3" => Key::F3,
                "f4" => Key::F4,
                "f5" => Key::F5,
                "f6" => Key::F6,
                "f7" => Key::F7,
                "f8" => Key::F8,
                "f9" => Key::F9,
                "f10" => Key::F10,
                "f11" => Key::F11,
                "f12" => Key::F12,
                _ => return None,
            };
            Some(mapped)
        }
    }

    impl InputInjector for EnigoInjector {
        fn virtual_screen(&self) -> VirtualScreen {
            self.screen
        }

        fn move_to(&mut self, x: f64, y: f64) {
            let (px, py) = self.to_pixels(x, y);
            if let Err(e) = self.enigo.move_mouse(px, py, Coordinate::Abs) {
                tracing::warn!(error = %e, "Mouse move injection failed");
            }
        }

        fn button(&mut self, x: f64, y: f64, button: MouseButton, pressed: bool) {
            self.move_to(x, y);
            let direction = if pressed {
                Direction::Press
            } else {
                Direction::Release
            };
            if let Err(e) = self.enigo.button(Self::map_button(button), direction) {
                tracing::warn!(error = %e, button = button.as_str(), "Button injection failed");
            }
        }

        fn scroll(&mut self, x: f64, y: f64, dx: f64, dy: f64) {
            self.move_to(x, y);
            if dy != 0.0 {
                if let Err(e) = self.enigo.scroll(dy.round() as i32, Axis::Vertical) {
                    tracing::warn!(error = %e, "Vertical scroll injection failed");
                }
            }
            if dx != 0.0 {
                if let Err(e) = self.enigo.scroll(dx.round() as i32, Axis::Horizontal) {
                    tracing::warn!(error = %e, "Horizontal scroll injection failed");
                }
            }
        }

        fn key(&mut self, key: &str, pressed: bool) {
            let Some(mapped) = Self::map_key(key) else {
                tracing::warn!(key, "Unmapped key, skipping");
                return;
            };
            let direction = if pressed {
                Direction::Press
            } else {
                Direction::Release
            };
            if let Err(e) = self.enigo.key(mapped, direction) {
                tracing::warn!(error = %e, key, "Key injection failed");
            }
        }
    }
}
