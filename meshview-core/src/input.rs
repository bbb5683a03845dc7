/// Window-system independent input events
use crate::arcball::DragMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other,
}

impl MouseButton {
    /// Camera control driven by this button: left rotates, middle zooms,
    /// right pans.
    pub fn drag_mode(self) -> Option<DragMode> {
        match self {
            MouseButton::Left => Some(DragMode::Rotate),
            MouseButton::Middle => Some(DragMode::Zoom),
            MouseButton::Right => Some(DragMode::Pan),
            MouseButton::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press,
    Release,
    Repeat,
}

/// Keys the viewers react to. Letters are lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseButton { button: MouseButton, action: Action },
    /// Cursor position in window pixels, origin top-left.
    CursorMoved { x: f32, y: f32 },
    Key { key: Key, action: Action },
    Resized { width: u32, height: u32 },
    CloseRequested,
}
