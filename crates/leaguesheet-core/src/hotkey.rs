// Global show/hide shortcut.
//
// `Shortcut` is the parsed form of a config string such as `ctrl+alt+l`.
// Listeners that hook the OS keyboard implement `GlobalShortcutListener`;
// where no hook is available, `UnsupportedShortcutListener` reports a
// failure that the status bar shows. The parsed shortcut is matched inside
// the terminal either way.

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::HotkeyConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("invalid shortcut `{input}`: {reason}")]
    Parse { input: String, reason: String },

    #[error("global shortcuts are not supported on {0}")]
    Unsupported(String),

    #[error("shortcut {0} could not be registered: {1}")]
    Registration(String, String),
}

// ---------------------------------------------------------------------------
// Shortcut
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutKey {
    /// A printable key, stored lowercase.
    Char(char),
    /// Function key F1..F24.
    F(u8),
    Space,
    Enter,
    Tab,
}

/// A key plus the modifiers that must be held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: ShortcutKey,
}

impl Shortcut {
    /// Parse `+`-separated tokens, modifiers first, key last. Case and
    /// surrounding whitespace are ignored. At least one modifier is
    /// required so the shortcut cannot swallow ordinary typing.
    pub fn parse(input: &str) -> Result<Self, HotkeyError> {
        let fail = |reason: &str| HotkeyError::Parse {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let tokens: Vec<String> = input
            .split('+')
            .map(|t| t.trim().to_lowercase())
            .collect();
        let Some((key_token, modifier_tokens)) = tokens.split_last() else {
            return Err(fail("empty shortcut"));
        };

        let mut shortcut = Shortcut {
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            key: ShortcutKey::Space,
        };
        for token in modifier_tokens {
            let flag = match token.as_str() {
                "ctrl" | "control" => &mut shortcut.ctrl,
                "alt" | "option" => &mut shortcut.alt,
                "shift" => &mut shortcut.shift,
                "meta" | "super" | "win" | "cmd" => &mut shortcut.meta,
                "" => return Err(fail("empty token")),
                other => return Err(fail(&format!("unknown modifier `{other}`"))),
            };
            if *flag {
                return Err(fail(&format!("modifier `{token}` repeated")));
            }
            *flag = true;
        }

        shortcut.key = parse_key(key_token).ok_or_else(|| fail("unknown key"))?;
        if !(shortcut.ctrl || shortcut.alt || shortcut.meta) {
            return Err(fail("needs ctrl, alt or meta"));
        }
        Ok(shortcut)
    }
}

fn parse_key(token: &str) -> Option<ShortcutKey> {
    match token {
        "space" => return Some(ShortcutKey::Space),
        "enter" | "return" => return Some(ShortcutKey::Enter),
        "tab" => return Some(ShortcutKey::Tab),
        _ => {}
    }

    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return (c.is_ascii_alphanumeric() || c.is_ascii_punctuation()).then_some(ShortcutKey::Char(c));
    }

    token
        .strip_prefix('f')
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=24).contains(n))
        .map(ShortcutKey::F)
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ];
        for (held, name) in modifiers {
            if held {
                write!(f, "{name}+")?;
            }
        }
        match self.key {
            ShortcutKey::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            ShortcutKey::F(n) => write!(f, "F{n}"),
            ShortcutKey::Space => f.write_str("Space"),
            ShortcutKey::Enter => f.write_str("Enter"),
            ShortcutKey::Tab => f.write_str("Tab"),
        }
    }
}

// ---------------------------------------------------------------------------
// Listener abstraction
// ---------------------------------------------------------------------------

pub type TriggerCallback = Box<dyn Fn() + Send + Sync>;

/// A system-wide keyboard hook.
pub trait GlobalShortcutListener: Send {
    /// Start listening for `shortcut`. Replaces any earlier registration.
    fn register(&mut self, shortcut: &Shortcut) -> Result<(), HotkeyError>;

    /// Stop listening. Must return promptly.
    fn unregister(&mut self);

    /// Set the callback run on each trigger. It runs off the UI task and
    /// should only post a message.
    fn on_trigger(&mut self, callback: TriggerCallback);
}

/// Listener for platforms without a supported keyboard hook.
#[derive(Debug)]
pub struct UnsupportedShortcutListener {
    platform: &'static str,
}

impl Default for UnsupportedShortcutListener {
    fn default() -> Self {
        UnsupportedShortcutListener {
            platform: std::env::consts::OS,
        }
    }
}

impl GlobalShortcutListener for UnsupportedShortcutListener {
    fn register(&mut self, _shortcut: &Shortcut) -> Result<(), HotkeyError> {
        Err(HotkeyError::Unsupported(self.platform.to_string()))
    }

    fn unregister(&mut self) {}

    fn on_trigger(&mut self, _callback: TriggerCallback) {}
}

/// The listener for the current platform.
pub fn platform_listener() -> Box<dyn GlobalShortcutListener> {
    Box::new(UnsupportedShortcutListener::default())
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Hotkey state shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyStatus {
    Disabled,
    /// Registered system-wide.
    Global(Shortcut),
    /// Parsed, but only active while the terminal has focus.
    TerminalOnly(Shortcut, HotkeyError),
    /// The configured string could not be parsed.
    Invalid(HotkeyError),
}

impl HotkeyStatus {
    /// The shortcut to match in the terminal, if any.
    pub fn shortcut(&self) -> Option<Shortcut> {
        match self {
            HotkeyStatus::Global(s) | HotkeyStatus::TerminalOnly(s, _) => Some(*s),
            HotkeyStatus::Disabled | HotkeyStatus::Invalid(_) => None,
        }
    }
}

impl fmt::Display for HotkeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotkeyStatus::Disabled => f.write_str("hotkey off"),
            HotkeyStatus::Global(s) => write!(f, "hotkey {s}"),
            HotkeyStatus::TerminalOnly(s, _) => write!(f, "hotkey {s} (terminal only)"),
            HotkeyStatus::Invalid(_) => f.write_str("hotkey invalid"),
        }
    }
}

/// Parse the configured shortcut and try to register it with `listener`.
/// Failures never propagate; they end up in the returned status.
pub fn register_from_config(
    config: &HotkeyConfig,
    listener: &mut dyn GlobalShortcutListener,
    callback: TriggerCallback,
) -> HotkeyStatus {
    if !config.enabled {
        return HotkeyStatus::Disabled;
    }

    let shortcut = match Shortcut::parse(&config.shortcut) {
        Ok(s) => s,
        Err(e) => {
            warn!("{}", e);
            return HotkeyStatus::Invalid(e);
        }
    };

    listener.on_trigger(callback);
    match listener.register(&shortcut) {
        Ok(()) => {
            info!("Global shortcut {} registered", shortcut);
            HotkeyStatus::Global(shortcut)
        }
        Err(e) => {
            warn!("{}", e);
            HotkeyStatus::TerminalOnly(shortcut, e)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
