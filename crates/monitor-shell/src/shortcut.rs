//! Keyboard binding for the "new agent" action.

use crate::error::ShortcutParseError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

/// A key event as delivered by the window shell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyPress {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyBinding {
    key: String,
    modifiers: Modifiers,
}

impl KeyBinding {
    /// Parses `"cmd+n"`, `"ctrl+shift+N"` and similar. Keys compare case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, ShortcutParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ShortcutParseError::Empty);
        }

        let parts: Vec<&str> = trimmed.split('+').map(str::trim).collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(ShortcutParseError::Empty);
        }
        let Some((key, modifier_parts)) = parts.split_last() else {
            return Err(ShortcutParseError::Empty);
        };
        if modifier_flag(key).is_some() {
            return Err(ShortcutParseError::KeyCount(trimmed.to_string()));
        }

        let mut modifiers = Modifiers::default();
        for part in modifier_parts {
            match modifier_flag(part) {
                Some(Modifier::Meta) => modifiers.meta = true,
                Some(Modifier::Ctrl) => modifiers.ctrl = true,
                Some(Modifier::Alt) => modifiers.alt = true,
                Some(Modifier::Shift) => modifiers.shift = true,
                None if part.chars().count() == 1 => {
                    return Err(ShortcutParseError::KeyCount(trimmed.to_string()));
                }
                None => return Err(ShortcutParseError::UnknownModifier((*part).to_string())),
            }
        }

        Ok(Self {
            key: key.to_ascii_lowercase(),
            modifiers,
        })
    }

    pub fn matches(&self, press: &KeyPress) -> bool {
        press.modifiers == self.modifiers && press.key.eq_ignore_ascii_case(&self.key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

#[derive(Clone, Copy)]
enum Modifier {
    Meta,
    Ctrl,
    Alt,
    Shift,
}

fn modifier_flag(name: &str) -> Option<Modifier> {
    match name.to_ascii_lowercase().as_str() {
        "cmd" | "command" | "meta" | "super" => Some(Modifier::Meta),
        "ctrl" | "control" => Some(Modifier::Ctrl),
        "alt" | "option" => Some(Modifier::Alt),
        "shift" => Some(Modifier::Shift),
        _ => None,
    }
}

/// Binding plus the enabled flag; disabled while no workspace is active.
#[derive(Clone, Debug)]
pub struct NewAgentShortcut {
    binding: KeyBinding,
    enabled: bool,
}

impl NewAgentShortcut {
    pub fn new(binding: KeyBinding) -> Self {
        Self {
            binding,
            enabled: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn binding(&self) -> &KeyBinding {
        &self.binding
    }

    pub fn triggers(&self, press: &KeyPress) -> bool {
        self.enabled && self.binding.matches(press)
    }
}
