//! Event kinds, propagation phases and input payloads

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::layout::Point;

/// Identifies the kind of an event
///
/// Built-in kinds are grouped into numeric bands. Band membership is a range
/// check, so any id at or above [`EventType::CUSTOM_BASE`] is free for
/// application-defined events and can never collide with a built-in one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(pub u32);

impl EventType {
    pub const NONE: EventType = EventType(0);

    // System band
    pub const INIT: EventType = EventType(1);
    pub const TICK: EventType = EventType(2);
    pub const RESIZE: EventType = EventType(3);
    pub const SIGNAL: EventType = EventType(4);
    pub const QUIT: EventType = EventType(5);

    // Raw keyboard band
    pub const KEY_PRESS: EventType = EventType(100);
    pub const KEY_RELEASE: EventType = EventType(101);
    pub const KEY_REPEAT: EventType = EventType(102);

    // Raw mouse band
    pub const MOUSE_PRESS: EventType = EventType(200);
    pub const MOUSE_RELEASE: EventType = EventType(201);
    pub const MOUSE_MOVE: EventType = EventType(202);
    pub const MOUSE_WHEEL: EventType = EventType(203);
    pub const MOUSE_ENTER: EventType = EventType(204);
    pub const MOUSE_LEAVE: EventType = EventType(205);

    // Semantic action band
    pub const ACTION: EventType = EventType(300);
    pub const ACTION_ACTIVATE: EventType = EventType(301);
    pub const ACTION_CANCEL: EventType = EventType(302);
    pub const ACTION_NAVIGATE: EventType = EventType(303);

    // Component band
    pub const CLICK: EventType = EventType(400);
    pub const DOUBLE_CLICK: EventType = EventType(401);
    pub const CHANGE: EventType = EventType(402);
    pub const FOCUS: EventType = EventType(403);
    pub const BLUR: EventType = EventType(404);
    pub const SUBMIT: EventType = EventType(405);
    pub const SCROLL: EventType = EventType(406);
    pub const SELECT: EventType = EventType(407);

    /// First id reserved for application-defined events
    pub const CUSTOM_BASE: u32 = 10_000;

    const SYSTEM_BAND: (u32, u32) = (1, 100);
    const KEY_BAND: (u32, u32) = (100, 200);
    const MOUSE_BAND: (u32, u32) = (200, 300);
    const ACTION_BAND: (u32, u32) = (300, 400);
    const COMPONENT_BAND: (u32, u32) = (400, 500);

    /// Create an application-defined event type; `offset` is added to [`Self::CUSTOM_BASE`]
    pub const fn custom(offset: u32) -> Self {
        EventType(Self::CUSTOM_BASE.saturating_add(offset))
    }

    const fn in_band(self, band: (u32, u32)) -> bool {
        self.0 >= band.0 && self.0 < band.1
    }

    pub const fn is_system(self) -> bool {
        self.in_band(Self::SYSTEM_BAND)
    }

    pub const fn is_key(self) -> bool {
        self.in_band(Self::KEY_BAND)
    }

    pub const fn is_mouse(self) -> bool {
        self.in_band(Self::MOUSE_BAND)
    }

    pub const fn is_action(self) -> bool {
        self.in_band(Self::ACTION_BAND)
    }

    pub const fn is_component(self) -> bool {
        self.in_band(Self::COMPONENT_BAND)
    }

    pub const fn is_custom(self) -> bool {
        self.0 >= Self::CUSTOM_BASE
    }

    /// Human-readable name for built-in kinds
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::NONE => "none",
            Self::INIT => "init",
            Self::TICK => "tick",
            Self::RESIZE => "resize",
            Self::SIGNAL => "signal",
            Self::QUIT => "quit",
            Self::KEY_PRESS => "key-press",
            Self::KEY_RELEASE => "key-release",
            Self::KEY_REPEAT => "key-repeat",
            Self::MOUSE_PRESS => "mouse-press",
            Self::MOUSE_RELEASE => "mouse-release",
            Self::MOUSE_MOVE => "mouse-move",
            Self::MOUSE_WHEEL => "mouse-wheel",
            Self::MOUSE_ENTER => "mouse-enter",
            Self::MOUSE_LEAVE => "mouse-leave",
            Self::ACTION => "action",
            Self::ACTION_ACTIVATE => "action-activate",
            Self::ACTION_CANCEL => "action-cancel",
            Self::ACTION_NAVIGATE => "action-navigate",
            Self::CLICK => "click",
            Self::DOUBLE_CLICK => "double-click",
            Self::CHANGE => "change",
            Self::FOCUS => "focus",
            Self::BLUR => "blur",
            Self::SUBMIT => "submit",
            Self::SCROLL => "scroll",
            Self::SELECT => "select",
            _ => return None,
        };
        Some(name)
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.is_custom() => write!(f, "custom({})", self.0 - Self::CUSTOM_BASE),
            None => write!(f, "unknown({})", self.0),
        }
    }
}

/// Propagation stage of an event
///
/// `None` is both the resting state before dispatch starts and the state the
/// event is returned to once dispatch ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum EventPhase {
    #[default]
    None,
    /// Travelling from the root down to the target's parent
    Capture,
    /// At the hit-tested node
    Target,
    /// Travelling from the target's parent back up to the root
    Bubble,
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventPhase::None => "none",
            EventPhase::Capture => "capture",
            EventPhase::Target => "target",
            EventPhase::Bubble => "bubble",
        };
        f.write_str(name)
    }
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    None,
    /// Left mouse button
    Left,
    /// Middle mouse button (scroll wheel)
    Middle,
    /// Right mouse button
    Right,
    WheelUp,
    WheelDown,
}

/// Types of mouse input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseAction {
    Press,
    Release,
    Move,
    Wheel,
}

impl MouseAction {
    /// The raw mouse event type this action is reported as
    pub fn event_type(self) -> EventType {
        match self {
            MouseAction::Press => EventType::MOUSE_PRESS,
            MouseAction::Release => EventType::MOUSE_RELEASE,
            MouseAction::Move => EventType::MOUSE_MOVE,
            MouseAction::Wheel => EventType::MOUSE_WHEEL,
        }
    }
}

/// Mouse input as produced by the platform reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseEvent {
    /// Column; absolute on input, node-local when delivered to a component
    pub x: i32,
    /// Row; absolute on input, node-local when delivered to a component
    pub y: i32,
    pub action: MouseAction,
    pub button: MouseButton,
}

impl MouseEvent {
    pub fn new(x: i32, y: i32, action: MouseAction, button: MouseButton) -> Self {
        Self { x, y, action, button }
    }

    /// Left-button press at a screen position
    pub fn press(x: i32, y: i32) -> Self {
        Self::new(x, y, MouseAction::Press, MouseButton::Left)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Copy of this event with coordinates replaced
    pub fn at(&self, point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            ..*self
        }
    }

    pub fn is_primary_press(&self) -> bool {
        self.action == MouseAction::Press && self.button == MouseButton::Left
    }
}

/// Logical key identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Tab,
    BackTab,
    Enter,
    Esc,
    Backspace,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

bitflags! {
    /// Modifier keys held during a key event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL = 0b0010;
        const ALT = 0b0100;
        const META = 0b1000;
    }
}

/// Types of key input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    Press,
    Release,
    Repeat,
}

impl KeyAction {
    /// The raw key event type this action is reported as
    pub fn event_type(self) -> EventType {
        match self {
            KeyAction::Press => EventType::KEY_PRESS,
            KeyAction::Release => EventType::KEY_RELEASE,
            KeyAction::Repeat => EventType::KEY_REPEAT,
        }
    }
}

/// Key input as produced by the platform reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, action: KeyAction, modifiers: Modifiers) -> Self {
        Self {
            key,
            action,
            modifiers,
        }
    }

    /// Key press without modifiers
    pub fn press(key: Key) -> Self {
        Self::new(key, KeyAction::Press, Modifiers::empty())
    }

    /// Plain Tab, whether reported as a named key or as the tab character
    pub fn is_tab(&self) -> bool {
        matches!(self.key, Key::Tab | Key::Char('\t')) && !self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Shift+Tab, including terminals that report it as a distinct back-tab key
    pub fn is_back_tab(&self) -> bool {
        match self.key {
            Key::BackTab => true,
            Key::Tab | Key::Char('\t') => self.modifiers.contains(Modifiers::SHIFT),
            _ => false,
        }
    }
}
