use glam::Vec2;
use std::collections::HashSet;

/// Keys the demo binds. Hosts map their native key codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    T,
    Y,
    Space,
    LeftControl,
    LeftShift,
    Up,
    Down,
    Left,
    Right,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    NumpadAdd,
    NumpadSubtract,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keyboard and mouse state as of the last host poll.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys_held: HashSet<Key>,
    buttons_held: HashSet<MouseButton>,
    mouse_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }
    }

    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons_held.insert(button);
        } else {
            self.buttons_held.remove(&button);
        }
    }

    /// Accumulate raw mouse motion until the next [`InputState::end_frame`].
    pub fn add_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_held.contains(&button)
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// -1, 0 or +1 from a pair of opposing keys.
    pub fn axis(&self, negative: Key, positive: Key) -> f32 {
        let mut value = 0.0;
        if self.is_key_down(positive) {
            value += 1.0;
        }
        if self.is_key_down(negative) {
            value -= 1.0;
        }
        value
    }

    /// Drop per-frame accumulators once the frame has consumed them.
    pub fn end_frame(&mut self) {
        self.mouse_delta = Vec2::ZERO;
    }

    /// Forget everything held, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys_held.clear();
        self.buttons_held.clear();
        self.mouse_delta = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_and_release() {
        let mut input = InputState::new();
        input.set_key(Key::W, true);
        assert!(input.is_key_down(Key::W));
        input.set_key(Key::W, false);
        assert!(!input.is_key_down(Key::W));
    }

    #[test]
    fn axis_cancels_opposing_keys() {
        let mut input = InputState::new();
        input.set_key(Key::Q, true);
        assert_eq!(input.axis(Key::Q, Key::E), -1.0);
        input.set_key(Key::E, true);
        assert_eq!(input.axis(Key::Q, Key::E), 0.0);
    }

    #[test]
    fn mouse_delta_resets_each_frame() {
        let mut input = InputState::new();
        input.add_mouse_delta(Vec2::new(2.0, 1.0));
        input.add_mouse_delta(Vec2::new(1.0, 1.0));
        assert_eq!(input.mouse_delta(), Vec2::new(3.0, 2.0));
        input.end_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn clear_releases_everything() {
        let mut input = InputState::new();
        input.set_key(Key::Space, true);
        input.set_button(MouseButton::Right, true);
        input.clear();
        assert!(!input.is_key_down(Key::Space));
        assert!(!input.is_button_down(MouseButton::Right));
    }
}
