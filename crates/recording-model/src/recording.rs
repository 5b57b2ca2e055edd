//! The persisted recording container.

use std::path::Path;

use serde::{Deserialize, Serialize};

use mimic_common::error::{MimicError, MimicResult};

use crate::event::InputEvent;
use crate::geometry::VirtualScreen;

/// A captured session: the virtual-screen geometry at capture time, the
/// ordered event sequence, and the tuning profile it was recorded under.
///
/// Created empty at capture start, appended to while capturing, frozen
/// and persisted on stop, loaded read-only for playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Geometry captured at recording start. Playback re-queries the
    /// current geometry instead of trusting this one; it is kept for
    /// diagnostics and tooling.
    pub virtual_screen: VirtualScreen,

    /// The ordered event sequence.
    pub events: Vec<InputEvent>,

    /// Whether the gaming tuning profile applies to this recording.
    #[serde(default)]
    pub gaming_mode: bool,
}

impl Recording {
    /// Create an empty recording for the given screen geometry.
    pub fn new(virtual_screen: VirtualScreen, gaming_mode: bool) -> Self {
        Self {
            virtual_screen,
            events: Vec::new(),
            gaming_mode,
        }
    }

    /// Load a recording from a JSON file.
    ///
    /// Decode failures and missing required fields surface as
    /// [`MimicError::Decode`]; playback must not start from them.
    pub fn load(path: impl AsRef<Path>) -> MimicResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MimicError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                MimicError::Io(e)
            }
        })?;

        serde_json::from_str(&content)
            .map_err(|e| MimicError::decode(format!("{}: {e}", path.display())))
    }

    /// Save the recording as a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> MimicResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the last timestamped event, in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.events
            .iter()
            .rev()
            .find_map(|e| e.timestamp())
            .unwrap_or(0.0)
    }
}
