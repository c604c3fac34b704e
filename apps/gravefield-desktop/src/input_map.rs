use glam::Vec2;
use gravefield_input::{InputState, Key, MouseButton};
use winit::keyboard::KeyCode;

/// A window event buffered until the frame driver polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(Key, bool),
    Button(MouseButton, bool),
    MouseMotion(Vec2),
    /// The window lost focus; release everything held.
    Clear,
}

impl InputEvent {
    pub fn apply(self, input: &mut InputState) {
        match self {
            Self::Key(key, pressed) => input.set_key(key, pressed),
            Self::Button(button, pressed) => input.set_button(button, pressed),
            Self::MouseMotion(delta) => input.add_mouse_delta(delta),
            Self::Clear => input.clear(),
        }
    }
}

pub fn key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyY => Key::Y,
        KeyCode::Space => Key::Space,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::NumpadAdd => Key::NumpadAdd,
        KeyCode::NumpadSubtract => Key::NumpadSubtract,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

pub fn button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_keys_are_mapped() {
        assert_eq!(key(KeyCode::KeyT), Some(Key::T));
        assert_eq!(key(KeyCode::NumpadAdd), Some(Key::NumpadAdd));
        assert_eq!(key(KeyCode::Digit5), Some(Key::Digit5));
        assert_eq!(key(KeyCode::F12), None);
    }

    #[test]
    fn events_update_input_state() {
        let mut input = InputState::new();
        InputEvent::Key(Key::W, true).apply(&mut input);
        InputEvent::Button(MouseButton::Right, true).apply(&mut input);
        InputEvent::MouseMotion(Vec2::new(3.0, -1.0)).apply(&mut input);
        InputEvent::MouseMotion(Vec2::new(1.0, 1.0)).apply(&mut input);

        assert!(input.is_key_down(Key::W));
        assert!(input.is_button_down(MouseButton::Right));
        assert_eq!(input.mouse_delta(), Vec2::new(4.0, 0.0));

        InputEvent::Key(Key::W, false).apply(&mut input);
        assert!(!input.is_key_down(Key::W));

        InputEvent::Clear.apply(&mut input);
        assert!(!input.is_button_down(MouseButton::Right));
    }
}
