use std::collections::HashSet;

/// Keyboard snapshot keyed by `KeyboardEvent.key` values (" ", "Escape", "a")
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyState {
    pressed: HashSet<String>,
    just_pressed: HashSet<String>,
    just_released: HashSet<String>,
}

impl KeyState {
    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }

    pub fn was_just_pressed(&self, key: &str) -> bool {
        self.just_pressed.contains(key)
    }

    pub fn was_just_released(&self, key: &str) -> bool {
        self.just_released.contains(key)
    }

    fn set_pressed(&mut self, key: &str) {
        // key repeat fires keydown again while held, only the first counts
        if self.pressed.insert(key.to_owned()) {
            self.just_pressed.insert(key.to_owned());
        }
    }

    fn set_released(&mut self, key: &str) {
        if self.pressed.remove(key) {
            self.just_released.insert(key.to_owned());
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
    pub pressed: bool,
    pub button: i16,
}

/// Raw input recorded between frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub pointer: PointerState,
    pub keys: KeyState,
}

impl InputState {
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16) {
        self.pointer = PointerState {
            x,
            y,
            pressed: true,
            button,
        };
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.pointer.x = x;
        self.pointer.y = y;
        self.pointer.pressed = false;
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.pointer.x = x;
        self.pointer.y = y;
    }

    pub fn key_down(&mut self, key: &str) {
        self.keys.set_pressed(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.set_released(key);
    }

    /// Drops the edge-triggered sets once a frame has consumed them
    pub fn end_frame(&mut self) {
        self.keys.just_pressed.clear();
        self.keys.just_released.clear();
    }
}
