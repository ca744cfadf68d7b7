use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::surface::Align;

/// Decides whether a typed character may reach the field's value.
pub type KeyFilter = fn(char) -> bool;

pub fn digits_only(c: char) -> bool {
    c.is_ascii_digit()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputColor {
    #[default]
    Default,
    Error,
}

/// Where a text field sits on the surface, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputGeometry {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub font_size: i32,
    pub align: Align,
    pub max_len: usize,
}

/// A single-line text input positioned over the canvas.
#[derive(Clone, Debug)]
pub struct InputField {
    geometry: InputGeometry,
    value: String,
    color: InputColor,
    focused: bool,
    key_filter: Option<KeyFilter>,
}

impl InputField {
    pub fn new(geometry: InputGeometry) -> Self {
        Self {
            geometry,
            value: String::new(),
            color: InputColor::Default,
            focused: false,
            key_filter: None,
        }
    }

    /// Registers the keypress filter. Characters it rejects never reach the value.
    pub fn on_keypress(&mut self, filter: KeyFilter) {
        self.key_filter = Some(filter);
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn geometry(&self) -> &InputGeometry {
        &self.geometry
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn color(&self) -> InputColor {
        self.color
    }

    pub fn set_color(&mut self, color: InputColor) {
        self.color = color;
    }

    /// Applies a key press. Returns true when the value changed, which is
    /// the field's input-change event.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if !self.focused {
            return false;
        }
        match key.code {
            KeyCode::Backspace => self.value.pop().is_some(),
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                if let Some(filter) = self.key_filter {
                    if !filter(c) {
                        return false;
                    }
                }
                if self.value.chars().count() >= self.geometry.max_len {
                    return false;
                }
                self.value.push(c);
                true
            }
            _ => false,
        }
    }
}
