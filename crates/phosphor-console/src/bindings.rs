use std::collections::HashMap;

use phosphor_engine::Buttons;

/// Translation from raw host key codes to logical pad buttons.
///
/// The engine never sees key codes; the console folds them into pad events
/// here. Unbound codes are ignored.
pub struct KeyBindings {
    map: HashMap<u32, Buttons>,
}

impl KeyBindings {
    /// Browser-keycode defaults: arrows for the d-pad, Z/X/A/S for the
    /// face buttons, Q/W for the shoulders, Enter for start, Shift for
    /// select.
    pub fn new() -> Self {
        let mut bindings = Self::empty();
        bindings.bind(37, Buttons::LEFT);
        bindings.bind(38, Buttons::UP);
        bindings.bind(39, Buttons::RIGHT);
        bindings.bind(40, Buttons::DOWN);
        bindings.bind(88, Buttons::A); // X key
        bindings.bind(90, Buttons::B); // Z key
        bindings.bind(83, Buttons::X); // S key
        bindings.bind(65, Buttons::Y); // A key
        bindings.bind(81, Buttons::L); // Q key
        bindings.bind(87, Buttons::R); // W key
        bindings.bind(13, Buttons::START); // Enter
        bindings.bind(16, Buttons::SELECT); // Shift
        bindings
    }

    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key_code: u32, button: Buttons) {
        self.map.insert(key_code, button);
    }

    pub fn unbind(&mut self, key_code: u32) {
        self.map.remove(&key_code);
    }

    pub fn button_for(&self, key_code: u32) -> Option<Buttons> {
        self.map.get(&key_code).copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_maps_to_start() {
        let bindings = KeyBindings::new();
        assert_eq!(bindings.button_for(13), Some(Buttons::START));
    }

    #[test]
    fn unbound_codes_are_ignored() {
        let bindings = KeyBindings::new();
        assert_eq!(bindings.button_for(999), None);
    }

    #[test]
    fn rebinding_replaces() {
        let mut bindings = KeyBindings::new();
        bindings.bind(13, Buttons::A);
        assert_eq!(bindings.button_for(13), Some(Buttons::A));
        bindings.unbind(13);
        assert_eq!(bindings.button_for(13), None);
    }
}
