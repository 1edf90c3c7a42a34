#![forbid(unsafe_code)]

//! Deterministic, JSON-friendly page event schema.
//!
//! The host (browser glue or a test driver) pushes [`PageEvent`] values into the
//! page. Keyboard events arrive as raw DOM `key`/`code` strings and are
//! normalized into [`KeyCode`] here so the rest of the workspace never sees
//! browser naming quirks.

use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// Encoded as a compact `u8` bitset in JSON (`mods`).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

impl Modifiers {
    #[must_use]
    pub const fn from_bits_truncate_u8(bits: u8) -> Self {
        Self::from_bits_truncate(bits)
    }
}

bitflags! {
    /// Event kinds a page listens for.
    ///
    /// The host installs one DOM listener per kind present in the set.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventKinds: u8 {
        const KEY       = 0b0001;
        const ACTIVATE  = 0b0010;
        const SUBMIT    = 0b0100;
        const PROXIMITY = 0b1000;
    }
}

impl EventKinds {
    /// DOM-facing names of the kinds in this set, in bit order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.contains(Self::KEY) {
            out.push("key");
        }
        if self.contains(Self::ACTIVATE) {
            out.push("activate");
        }
        if self.contains(Self::SUBMIT) {
            out.push("submit");
        }
        if self.contains(Self::PROXIMITY) {
            out.push("proximity");
        }
        out
    }
}

/// Phase for key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPhase {
    Down,
    Up,
}

/// Normalized key code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Home,
    End,
    Up,
    Down,
    Left,
    Right,
    Unidentified { key: Box<str>, code: Box<str> },
}

impl KeyCode {
    #[must_use]
    pub fn to_code_string(&self) -> String {
        match self {
            Self::Char(c) => c.to_string(),
            Self::Enter => "Enter".to_string(),
            Self::Escape => "Escape".to_string(),
            Self::Tab => "Tab".to_string(),
            Self::BackTab => "BackTab".to_string(),
            Self::Home => "Home".to_string(),
            Self::End => "End".to_string(),
            Self::Up => "Up".to_string(),
            Self::Down => "Down".to_string(),
            Self::Left => "Left".to_string(),
            Self::Right => "Right".to_string(),
            Self::Unidentified { .. } => "Unidentified".to_string(),
        }
    }

    #[must_use]
    pub fn from_code_string(code: &str, raw_key: Option<&str>, raw_code: Option<&str>) -> Self {
        match code {
            "Enter" => Self::Enter,
            "Escape" => Self::Escape,
            "Tab" => Self::Tab,
            "BackTab" => Self::BackTab,
            "Home" => Self::Home,
            "End" => Self::End,
            "Up" => Self::Up,
            "Down" => Self::Down,
            "Left" => Self::Left,
            "Right" => Self::Right,
            "Unidentified" => Self::Unidentified {
                key: raw_key.unwrap_or("").into(),
                code: raw_code.unwrap_or("").into(),
            },
            _ => {
                let mut chars = code.chars();
                match (chars.next(), chars.next()) {
                    (Some(first), None) => Self::Char(first),
                    _ => Self::Unidentified {
                        key: raw_key.unwrap_or(code).into(),
                        code: raw_code.unwrap_or("").into(),
                    },
                }
            }
        }
    }

    /// Keys that activate a focused control (`Enter`, `Space`).
    #[must_use]
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Enter | Self::Char(' '))
    }
}

/// Normalized key input event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub phase: KeyPhase,
    pub code: KeyCode,
    pub mods: Modifiers,
    pub repeat: bool,
}

impl KeyInput {
    /// Convenience constructor for an unmodified key press.
    #[must_use]
    pub fn press(code: KeyCode) -> Self {
        Self {
            phase: KeyPhase::Down,
            code,
            mods: Modifiers::empty(),
            repeat: false,
        }
    }

    #[must_use]
    pub fn is_press(&self) -> bool {
        self.phase == KeyPhase::Down
    }
}

/// Page element an event was delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum Target {
    /// A catalog entry, by document-order index.
    MediaEntry { index: usize },
    /// The dimmed area around the lightbox content.
    SurfaceBackdrop,
    SurfaceClose,
    SurfacePrev,
    SurfaceNext,
    NavToggle,
    NavLink,
    Other,
}

/// Normalized page event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Document-level key event. `target` is the focused element, if the host knows it.
    Key {
        key: KeyInput,
        target: Option<Target>,
    },
    /// Pointer activation (click) on an element.
    Activate { target: Target },
    /// Contact form submission with its named field values.
    Submit { fields: BTreeMap<String, String> },
    /// A lazily loaded image's distance from the viewport edge.
    Proximity { image: usize, distance_px: u32 },
}

impl PageEvent {
    #[must_use]
    pub fn key(code: KeyCode) -> Self {
        Self::Key {
            key: KeyInput::press(code),
            target: None,
        }
    }

    #[must_use]
    pub fn activate(target: Target) -> Self {
        Self::Activate { target }
    }

    #[must_use]
    pub const fn kind(&self) -> EventKinds {
        match self {
            Self::Key { .. } => EventKinds::KEY,
            Self::Activate { .. } => EventKinds::ACTIVATE,
            Self::Submit { .. } => EventKinds::SUBMIT,
            Self::Proximity { .. } => EventKinds::PROXIMITY,
        }
    }
}

/// Deterministic normalization of DOM key/code strings into a [`KeyCode`].
#[must_use]
pub fn normalize_dom_key_code(dom_key: &str, dom_code: &str, mods: Modifiers) -> KeyCode {
    // Shift+Tab is the reverse focus direction.
    if dom_key == "Tab" && mods.contains(Modifiers::SHIFT) {
        return KeyCode::BackTab;
    }

    // Prefer the logical `key` for printable characters (already includes shift).
    let mut chars = dom_key.chars();
    if let Some(first) = chars.next()
        && chars.next().is_none()
    {
        return KeyCode::Char(first);
    }

    match dom_key {
        "Enter" => KeyCode::Enter,
        "Escape" | "Esc" => KeyCode::Escape,
        "Tab" => KeyCode::Tab,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "ArrowUp" | "Up" => KeyCode::Up,
        "ArrowDown" | "Down" => KeyCode::Down,
        "ArrowLeft" | "Left" => KeyCode::Left,
        "ArrowRight" | "Right" => KeyCode::Right,
        "Spacebar" => KeyCode::Char(' '),
        _ => key_code_from_dom_code(dom_code, mods).unwrap_or_else(|| KeyCode::Unidentified {
            key: dom_key.into(),
            code: dom_code.into(),
        }),
    }
}

fn key_code_from_dom_code(dom_code: &str, mods: Modifiers) -> Option<KeyCode> {
    if dom_code == "Tab" && mods.contains(Modifiers::SHIFT) {
        return Some(KeyCode::BackTab);
    }

    Some(match dom_code {
        "Enter" | "NumpadEnter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "Tab" => KeyCode::Tab,
        "Space" => KeyCode::Char(' '),
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "ArrowUp" => KeyCode::Up,
        "ArrowDown" => KeyCode::Down,
        "ArrowLeft" => KeyCode::Left,
        "ArrowRight" => KeyCode::Right,
        _ => return None,
    })
}

/// JSON encoding used by session traces and the harness.
///
/// A `kind` tag plus the minimum semantic fields needed for replay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEventJson {
    Key {
        phase: KeyPhase,
        code: String,
        #[serde(default)]
        mods: u8,
        #[serde(default)]
        repeat: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw_key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw_code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Target>,
    },
    Activate {
        target: Target,
    },
    Submit {
        #[serde(default)]
        fields: BTreeMap<String, String>,
    },
    Proximity {
        image: usize,
        distance_px: u32,
    },
}

impl PageEvent {
    /// Encode this event as a stable JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&PageEventJson::from(self))
    }

    /// Decode a previously encoded event JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        let json: PageEventJson = serde_json::from_str(s)?;
        Ok(Self::from(json))
    }
}

impl From<&PageEvent> for PageEventJson {
    fn from(value: &PageEvent) -> Self {
        match value {
            PageEvent::Key { key, target } => {
                let (code, raw_key, raw_code) = match &key.code {
                    KeyCode::Unidentified { key, code } => (
                        "Unidentified".to_string(),
                        Some(key.to_string()),
                        Some(code.to_string()),
                    ),
                    other => (other.to_code_string(), None, None),
                };
                Self::Key {
                    phase: key.phase,
                    code,
                    mods: key.mods.bits(),
                    repeat: key.repeat,
                    raw_key,
                    raw_code,
                    target: *target,
                }
            }
            PageEvent::Activate { target } => Self::Activate { target: *target },
            PageEvent::Submit { fields } => Self::Submit {
                fields: fields.clone(),
            },
            PageEvent::Proximity { image, distance_px } => Self::Proximity {
                image: *image,
                distance_px: *distance_px,
            },
        }
    }
}

impl From<PageEventJson> for PageEvent {
    fn from(value: PageEventJson) -> Self {
        match value {
            PageEventJson::Key {
                phase,
                code,
                mods,
                repeat,
                raw_key,
                raw_code,
                target,
            } => Self::Key {
                key: KeyInput {
                    phase,
                    code: KeyCode::from_code_string(
                        &code,
                        raw_key.as_deref(),
                        raw_code.as_deref(),
                    ),
                    mods: Modifiers::from_bits_truncate_u8(mods),
                    repeat,
                },
                target,
            },
            PageEventJson::Activate { target } => Self::Activate { target },
            PageEventJson::Submit { fields } => Self::Submit { fields },
            PageEventJson::Proximity { image, distance_px } => {
                Self::Proximity { image, distance_px }
            }
        }
    }
}
