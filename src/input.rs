use crate::constants::KEY_COUNT;

/// Latched state of the 16-key hex keypad. The host writes it between cycles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyPad {
    keys: [bool; KEY_COUNT],
}

impl KeyPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        if let Some(slot) = self.keys.get_mut(usize::from(key)) {
            *slot = pressed;
        }
    }

    pub fn press(&mut self, key: u8) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: u8) {
        self.set(key, false);
    }

    /// Keys above 0xF do not exist and are never pressed.
    pub fn is_key_pressed(&self, key: u8) -> bool {
        self.keys.get(usize::from(key)).copied().unwrap_or(false)
    }

    /// Lowest numbered key currently held down.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&down| down).map(|key| key as u8)
    }
}
