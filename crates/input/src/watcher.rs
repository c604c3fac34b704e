use crate::state::{InputState, Key};

/// Maps one key to a command value, fired on the press edge.
#[derive(Debug, Clone)]
pub struct KeyWatcher<C> {
    key: Key,
    command: C,
    was_down: bool,
}

impl<C: Clone> KeyWatcher<C> {
    pub fn new(key: Key, command: C) -> Self {
        Self {
            key,
            command,
            was_down: false,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn command(&self) -> &C {
        &self.command
    }

    /// Returns the command if the key went down since the last poll.
    pub fn poll(&mut self, input: &InputState) -> Option<C> {
        let down = input.is_key_down(self.key);
        let fired = down && !self.was_down;
        self.was_down = down;
        fired.then(|| self.command.clone())
    }
}

/// Ordered set of key watchers polled together once per frame.
#[derive(Debug, Clone)]
pub struct KeyBindings<C> {
    watchers: Vec<KeyWatcher<C>>,
}

impl<C> Default for KeyBindings<C> {
    fn default() -> Self {
        Self {
            watchers: Vec::new(),
        }
    }
}

impl<C: Clone + std::fmt::Debug> KeyBindings<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, key: Key, command: C) -> &mut Self {
        self.watchers.push(KeyWatcher::new(key, command));
        self
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    pub fn watchers(&self) -> &[KeyWatcher<C>] {
        &self.watchers
    }

    /// Poll every watcher in binding order and collect fired commands.
    pub fn poll(&mut self, input: &InputState) -> Vec<C> {
        let fired: Vec<C> = self
            .watchers
            .iter_mut()
            .filter_map(|w| w.poll(input))
            .collect();
        for command in &fired {
            tracing::debug!(?command, "key command fired");
        }
        fired
    }

    /// Re-sync edge state without firing, e.g. after input was suppressed.
    pub fn resync(&mut self, input: &InputState) {
        for watcher in &mut self.watchers {
            watcher.was_down = input.is_key_down(watcher.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Cmd {
        Toggle,
        Other,
    }

    #[test]
    fn fires_once_per_press() {
        let mut input = InputState::new();
        let mut watcher = KeyWatcher::new(Key::T, Cmd::Toggle);
        assert_eq!(watcher.poll(&input), None);

        input.set_key(Key::T, true);
        assert_eq!(watcher.poll(&input), Some(Cmd::Toggle));
        assert_eq!(watcher.poll(&input), None);

        input.set_key(Key::T, false);
        assert_eq!(watcher.poll(&input), None);
        input.set_key(Key::T, true);
        assert_eq!(watcher.poll(&input), Some(Cmd::Toggle));
    }

    #[test]
    fn bindings_fire_in_order() {
        let mut input = InputState::new();
        let mut bindings = KeyBindings::new();
        bindings.bind(Key::Digit2, Cmd::Other).bind(Key::Digit1, Cmd::Toggle);
        input.set_key(Key::Digit1, true);
        input.set_key(Key::Digit2, true);
        assert_eq!(bindings.poll(&input), vec![Cmd::Other, Cmd::Toggle]);
        assert!(bindings.poll(&input).is_empty());
    }

    #[test]
    fn resync_swallows_held_keys() {
        let mut input = InputState::new();
        let mut bindings = KeyBindings::new();
        bindings.bind(Key::Y, Cmd::Toggle);
        input.set_key(Key::Y, true);
        bindings.resync(&input);
        assert!(bindings.poll(&input).is_empty());
    }
}
