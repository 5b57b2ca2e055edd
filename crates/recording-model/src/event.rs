//! Input event types and their wire format.
//!
//! Events are persisted as JSON arrays with the tag as the first field
//! and the timestamp as the last, e.g. `["move", 0.5, 0.25, 1.875]`.
//! The format is self-describing and versionless: unknown trailing
//! elements are ignored on load, missing elements are a decode error.

use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Timestamp in fractional seconds since recording start.
pub type Seconds = f64;

/// A single recorded input event.
///
/// Pointer coordinates are fractional (`[0.0, 1.0]²` over the virtual
/// screen); timestamps are monotonic seconds since capture start.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer position update.
    Move { x: f64, y: f64, t: Seconds },

    /// Mouse button press or release edge at a pointer position.
    Click {
        x: f64,
        y: f64,
        button: MouseButton,
        pressed: bool,
        t: Seconds,
    },

    /// Scroll wheel delta at a pointer position.
    Scroll {
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        t: Seconds,
    },

    /// Key-down edge. `key` is a normalized lowercase identifier:
    /// a single printable character or a named special key.
    KeyPress { key: String, t: Seconds },

    /// Key-up edge.
    KeyRelease { key: String, t: Seconds },

    /// Derived event recorded when a key is released: the exact hold
    /// time, consumed at playback to reproduce the same hold length.
    KeyDuration { key: String, duration: Seconds },
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

impl InputEvent {
    /// Wire tag for this event.
    pub fn tag(&self) -> &'static str {
        match self {
            InputEvent::Move { .. } => "move",
            InputEvent::Click { .. } => "click",
            InputEvent::Scroll { .. } => "scroll",
            InputEvent::KeyPress { .. } => "key_press",
            InputEvent::KeyRelease { .. } => "key_release",
            InputEvent::KeyDuration { .. } => "key_duration",
        }
    }

    /// Timestamp of this event, if it carries one.
    ///
    /// `KeyDuration` carries a hold length rather than a point in time
    /// and returns `None`.
    pub fn timestamp(&self) -> Option<Seconds> {
        match self {
            InputEvent::Move { t, .. }
            | InputEvent::Click { t, .. }
            | InputEvent::Scroll { t, .. }
            | InputEvent::KeyPress { t, .. }
            | InputEvent::KeyRelease { t, .. } => Some(*t),
            InputEvent::KeyDuration { .. } => None,
        }
    }

    /// Fractional pointer position, if this event contains one.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            InputEvent::Move { x, y, .. }
            | InputEvent::Click { x, y, .. }
            | InputEvent::Scroll { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }
}

/// Normalize a raw key identifier to its canonical lowercase form.
///
/// Strips listener-style `Key.` prefixes and stray quotes, then
/// lowercases, so `Key.ENTER`, `'w'` and `W` become `enter`, `w`, `w`.
pub fn normalize_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix("Key.").unwrap_or(trimmed);
    let stripped = stripped.trim_matches(|c| c == '\'' || c == '"');
    stripped.to_lowercase()
}

impl Serialize for InputEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InputEvent::Move { x, y, t } => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element(self.tag())?;
                seq.serialize_element(x)?;
                seq.serialize_element(y)?;
                seq.serialize_element(t)?;
                seq.end()
            }
            InputEvent::Click {
                x,
                y,
                button,
                pressed,
                t,
            } => {
                let mut seq = serializer.serialize_seq(Some(6))?;
                seq.serialize_element(self.tag())?;
                seq.serialize_element(x)?;
                seq.serialize_element(y)?;
                seq.serialize_element(button)?;
                seq.serialize_element(pressed)?;
                seq.serialize_element(t)?;
                seq.end()
            }
            InputEvent::Scroll { x, y, dx, dy, t } => {
                let mut seq = serializer.serialize_seq(Some(6))?;
                seq.serialize_element(self.tag())?;
                seq.serialize_element(x)?;
                seq.serialize_element(y)?;
                seq.serialize_element(dx)?;
                seq.serialize_element(dy)?;
                seq.serialize_element(t)?;
                seq.end()
            }
            InputEvent::KeyPress { key, t } | InputEvent::KeyRelease { key, t } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(self.tag())?;
                seq.serialize_element(key)?;
                seq.serialize_element(t)?;
                seq.end()
            }
            InputEvent::KeyDuration { key, duration } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(self.tag())?;
                seq.serialize_element(key)?;
                seq.serialize_element(duration)?;
                seq.end()
            }
        }
    }
}

const EVENT_TAGS: &[&str] = &[
    "move",
    "click",
    "scroll",
    "key_press",
    "key_release",
    "key_duration",
];

impl<'de> Deserialize<'de> for InputEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EventVisitor;

        fn element<'de, A, T>(seq: &mut A, index: usize) -> Result<T, A::Error>
        where
            A: SeqAccess<'de>,
            T: Deserialize<'de>,
        {
            seq.next_element::<T>()?
                .ok_or_else(|| de::Error::invalid_length(index, &"a complete event array"))
        }

        impl<'de> Visitor<'de> for EventVisitor {
            type Value = InputEvent;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an event array with a leading tag")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<InputEvent, A::Error> {
                let tag: String = element(&mut seq, 0)?;

                let event = match tag.as_str() {
                    "move" => InputEvent::Move {
                        x: element(&mut seq, 1)?,
                        y: element(&mut seq, 2)?,
                        t: element(&mut seq, 3)?,
                    },
                    "click" => InputEvent::Click {
                        x: element(&mut seq, 1)?,
                        y: element(&mut seq, 2)?,
                        button: element(&mut seq, 3)?,
                        pressed: element(&mut seq, 4)?,
                        t: element(&mut seq, 5)?,
                    },
                    "scroll" => InputEvent::Scroll {
                        x: element(&mut seq, 1)?,
                        y: element(&mut seq, 2)?,
                        dx: element(&mut seq, 3)?,
                        dy: element(&mut seq, 4)?,
                        t: element(&mut seq, 5)?,
                    },
                    "key_press" => InputEvent::KeyPress {
                        key: element(&mut seq, 1)?,
                        t: element(&mut seq, 2)?,
                    },
                    "key_release" => InputEvent::KeyRelease {
                        key: element(&mut seq, 1)?,
                        t: element(&mut seq, 2)?,
                    },
                    "key_duration" => InputEvent::KeyDuration {
                        key: element(&mut seq, 1)?,
                        duration: element(&mut seq, 2)?,
                    },
                    other => return Err(de::Error::unknown_variant(other, EVENT_TAGS)),
                };

                // Unknown trailing fields are ignored.
                while seq.next_element::<IgnoredAny>()?.is_some() {}

                Ok(event)
            }
        }

        deserializer.deserialize_seq(EventVisitor)
    }
}
