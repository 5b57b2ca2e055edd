//! Raw input sources.
//!
//! A source yields device-level readings in absolute virtual-screen
//! pixels; all normalization happens downstream in the recorder.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Read;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use mimic_common::error::{MimicError, MimicResult};
use mimic_recording_model::{MouseButton, VirtualScreen};

const LEFT_BUTTON: usize = 0;
const RIGHT_BUTTON: usize = 1;
const MIDDLE_BUTTON: usize = 2;

const MICE_DEVICE: &str = "/dev/input/mice";

/// A device-level input reading, in absolute virtual-screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    PointerMove {
        x: i32,
        y: i32,
    },
    Button {
        x: i32,
        y: i32,
        button: MouseButton,
        pressed: bool,
    },
    Wheel {
        x: i32,
        y: i32,
        dx: f64,
        dy: f64,
    },
    Key {
        key: String,
        pressed: bool,
    },
}

/// Trait for raw input sources.
pub trait InputSource: Send {
    /// Poll for the next reading. Returns `None` when nothing is pending.
    fn poll(&mut self) -> MimicResult<Option<RawInput>>;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// Whether the source can currently produce readings.
    fn is_available(&self) -> bool;
}

/// Pointer source reading 3-byte PS/2 packets from `/dev/input/mice`.
///
/// Relative deltas are integrated into an absolute position within the
/// virtual-screen bounds. Covers pointer motion and the three standard
/// buttons; wheel and keyboard readings need a different device.
// TODO: keyboard capture via /dev/input/event* (requires input group)
pub struct MiceDeviceSource {
    device: std::fs::File,
    pending: VecDeque<RawInput>,
    screen: VirtualScreen,
    x: f64,
    y: f64,
    button_state: [bool; 3],
}

impl MiceDeviceSource {
    pub fn new(screen: VirtualScreen) -> MimicResult<Self> {
        #[cfg(unix)]
        let device = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(MICE_DEVICE)
            .map_err(|e| MimicError::capture(format!("Failed to open {MICE_DEVICE}: {e}")))?;

        #[cfg(not(unix))]
        let device = OpenOptions::new()
            .read(true)
            .open(MICE_DEVICE)
            .map_err(|e| MimicError::capture(format!("Failed to open {MICE_DEVICE}: {e}")))?;

        Ok(Self {
            device,
            pending: VecDeque::new(),
            x: screen.left as f64 + screen.width as f64 / 2.0,
            y: screen.top as f64 + screen.height as f64 / 2.0,
            screen,
            button_state: [false, false, false],
        })
    }

    pub fn is_supported() -> bool {
        OpenOptions::new().read(true).open(MICE_DEVICE).is_ok()
    }

    fn ingest_packets(&mut self) -> MimicResult<()> {
        loop {
            let mut packet = [0u8; 3];
            match self.device.read(&mut packet) {
                Ok(3) => self.process_packet(packet),
                Ok(_) => break,
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(err) => {
                    return Err(MimicError::capture(format!(
                        "Failed reading {MICE_DEVICE}: {err}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn process_packet(&mut self, packet: [u8; 3]) {
        let dx = packet[1] as i8 as f64;
        let dy = packet[2] as i8 as f64;

        let max_x = (self.screen.left + self.screen.width as i32 - 1) as f64;
        let max_y = (self.screen.top + self.screen.height as i32 - 1) as f64;
        self.x = (self.x + dx).clamp(self.screen.left as f64, max_x);
        self.y = (self.y - dy).clamp(self.screen.top as f64, max_y);

        let (x, y) = (self.x.round() as i32, self.y.round() as i32);
        self.pending.push_back(RawInput::PointerMove { x, y });

        let left = packet[0] & 0b001 != 0;
        let right = packet[0] & 0b010 != 0;
        let middle = packet[0] & 0b100 != 0;

        self.push_button_transition(LEFT_BUTTON, left, MouseButton::Left);
        self.push_button_transition(RIGHT_BUTTON, right, MouseButton::Right);
        self.push_button_transition(MIDDLE_BUTTON, middle, MouseButton::Middle);
    }

    fn push_button_transition(&mut self, idx: usize, now: bool, button: MouseButton) {
        if self.button_state[idx] == now {
            return;
        }
        self.button_state[idx] = now;
        self.pending.push_back(RawInput::Button {
            x: self.x.round() as i32,
            y: self.y.round() as i32,
            button,
            pressed: now,
        });
    }
}

impl InputSource for MiceDeviceSource {
    fn poll(&mut self) -> MimicResult<Option<RawInput>> {
        if let Some(reading) = self.pending.pop_front() {
            return Ok(Some(reading));
        }

        self.ingest_packets()?;
        Ok(self.pending.pop_front())
    }

    fn name(&self) -> &str {
        "mice-device"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Source replaying a pre-loaded reading sequence, for tests and demos.
pub struct ScriptedSource {
    readings: VecDeque<RawInput>,
}

impl ScriptedSource {
    pub fn new(readings: Vec<RawInput>) -> Self {
        Self {
            readings: readings.into(),
        }
    }

    /// A source that never produces readings.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl InputSource for ScriptedSource {
    fn poll(&mut self) -> MimicResult<Option<RawInput>> {
        Ok(self.readings.pop_front())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Detect the best available input source for the current system.
pub fn detect_best_source(screen: VirtualScreen) -> Box<dyn InputSource> {
    if MiceDeviceSource::is_supported() {
        match MiceDeviceSource::new(screen) {
            Ok(source) => {
                tracing::info!("Using mice device source");
                return Box::new(source);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to initialize mice device source");
            }
        }
    }

    tracing::warn!(
        details = %mice_device_diagnostic(),
        "Using empty input source; pointer and click events will not be captured"
    );
    Box::new(ScriptedSource::empty())
}

#[cfg(unix)]
pub fn mice_device_diagnostic() -> String {
    let uid = unsafe { libc::geteuid() };
    let gid = unsafe { libc::getegid() };

    match std::fs::metadata(MICE_DEVICE) {
        Ok(meta) => {
            let mode = meta.mode() & 0o777;
            let owner = meta.uid();
            let group = meta.gid();
            format!(
                "device={MICE_DEVICE} mode={mode:o} owner_uid={owner} owner_gid={group} process_uid={uid} process_gid={gid}; likely missing 'input' group membership. Fix: sudo usermod -aG input $USER && log out/in"
            )
        }
        Err(err) => format!(
            "device={MICE_DEVICE} unavailable ({err}); ensure the kernel input device exists and permissions allow read access"
        ),
    }
}

#[cfg(not(unix))]
pub fn mice_device_diagnostic() -> String {
    format!("device={MICE_DEVICE} is only available on unix targets")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_drains_in_order() {
        let mut source = ScriptedSource::new(vec![
            RawInput::PointerMove { x: 10, y: 20 },
            RawInput::Key {
                key: "a".to_string(),
                pressed: true,
            },
        ]);

        assert_eq!(
            source.poll().unwrap(),
            Some(RawInput::PointerMove { x: 10, y: 20 })
        );
        assert!(matches!(
            source.poll().unwrap(),
            Some(RawInput::Key { pressed: true, .. })
        ));
        assert_eq!(source.poll().unwrap(), None);
        assert_eq!(source.poll().unwrap(), None);
    }

    #[test]
    fn test_empty_source_is_available_but_silent() {
        let mut source = ScriptedSource::empty();
        assert!(source.is_available());
        assert_eq!(source.poll().unwrap(), None);
    }
}
