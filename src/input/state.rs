//! Input handling

use glam::Vec2;
use smallvec::SmallVec;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use super::command::{InputAction, InputMapper};

/// Input state manager
#[derive(Debug)]
pub struct Input {
    /// Currently pressed keys
    pressed_keys: HashSet<KeyCode>,
    /// Keys that were just pressed this frame
    just_pressed_keys: HashSet<KeyCode>,
    /// Currently pressed mouse buttons
    pressed_mouse_buttons: HashSet<MouseButton>,
    /// Mouse buttons just pressed this frame
    just_pressed_mouse_buttons: HashSet<MouseButton>,
    /// Discrete actions injected by the host this frame
    injected_actions: SmallVec<[InputAction; 4]>,
    /// Movement axes set directly by the host (gamepad, scripted input)
    axis_override: Option<Vec2>,
    /// Mouse movement delta this frame
    mouse_delta: Vec2,
}

impl Input {
    /// Create a new input manager
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            just_pressed_keys: HashSet::new(),
            pressed_mouse_buttons: HashSet::new(),
            just_pressed_mouse_buttons: HashSet::new(),
            injected_actions: SmallVec::new(),
            axis_override: None,
            mouse_delta: Vec2::ZERO,
        }
    }

    /// Call at the end of each frame to clear per-frame state
    pub fn update(&mut self) {
        self.just_pressed_keys.clear();
        self.just_pressed_mouse_buttons.clear();
        self.injected_actions.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Process a keyboard event
    pub fn process_keyboard(&mut self, key_code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.pressed_keys.contains(&key_code) {
                    self.just_pressed_keys.insert(key_code);
                }
                self.pressed_keys.insert(key_code);
            }
            ElementState::Released => {
                self.pressed_keys.remove(&key_code);
            }
        }
    }

    /// Process a mouse button event
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.pressed_mouse_buttons.contains(&button) {
                    self.just_pressed_mouse_buttons.insert(button);
                }
                self.pressed_mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.pressed_mouse_buttons.remove(&button);
            }
        }
    }

    /// Process raw mouse delta (camera look)
    pub fn process_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    /// Trigger a discrete action without a physical key
    pub fn inject_action(&mut self, action: InputAction) {
        self.injected_actions.push(action);
    }

    /// Set the movement axes directly; `None` returns control to the keys
    pub fn set_axes(&mut self, axes: Option<Vec2>) {
        self.axis_override = axes.map(|a| a.clamp(Vec2::NEG_ONE, Vec2::ONE));
    }

    /// Check if a key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Get mouse movement delta this frame
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Movement axes: `x` is horizontal (right positive), `y` is vertical
    /// (forward positive).
    pub fn movement_axes(&self, mapper: &InputMapper) -> Vec2 {
        if let Some(axes) = self.axis_override {
            return axes;
        }

        let mut axes = Vec2::ZERO;
        for (key, action) in mapper.iter() {
            if !self.pressed_keys.contains(&key) {
                continue;
            }
            match action {
                InputAction::MoveForward => axes.y += 1.0,
                InputAction::MoveBackward => axes.y -= 1.0,
                InputAction::MoveRight => axes.x += 1.0,
                InputAction::MoveLeft => axes.x -= 1.0,
                _ => {}
            }
        }
        axes.clamp(Vec2::NEG_ONE, Vec2::ONE)
    }

    /// Discrete actions triggered this frame, each at most once
    pub fn triggered_actions(&self, mapper: &InputMapper) -> SmallVec<[InputAction; 4]> {
        let mut actions: SmallVec<[InputAction; 4]> = SmallVec::new();
        let mut push = |action: InputAction| {
            if action.is_discrete() && !actions.contains(&action) {
                actions.push(action);
            }
        };

        for action in &self.injected_actions {
            push(*action);
        }
        for key in &self.just_pressed_keys {
            if let Some(action) = mapper.get_action(*key) {
                push(action);
            }
        }
        for button in &self.just_pressed_mouse_buttons {
            if let Some(action) = mapper.get_mouse_action(*button) {
                push(action);
            }
        }
        actions
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_axes_from_keys() {
        let mapper = InputMapper::with_defaults();
        let mut input = Input::new();

        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        assert_eq!(input.movement_axes(&mapper), Vec2::new(1.0, 1.0));

        // Arrow key on the same axis does not exceed the unit range
        input.process_keyboard(KeyCode::ArrowUp, ElementState::Pressed);
        assert_eq!(input.movement_axes(&mapper), Vec2::new(1.0, 1.0));

        input.process_keyboard(KeyCode::KeyW, ElementState::Released);
        input.process_keyboard(KeyCode::ArrowUp, ElementState::Released);
        assert_eq!(input.movement_axes(&mapper), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_axis_override_wins() {
        let mapper = InputMapper::with_defaults();
        let mut input = Input::new();

        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.set_axes(Some(Vec2::new(-3.0, 0.5)));
        assert_eq!(input.movement_axes(&mapper), Vec2::new(-1.0, 0.5));

        input.set_axes(None);
        assert_eq!(input.movement_axes(&mapper), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_triggered_actions_are_per_frame() {
        let mapper = InputMapper::with_defaults();
        let mut input = Input::new();

        input.process_keyboard(KeyCode::KeyE, ElementState::Pressed);
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.inject_action(InputAction::Interact);

        let actions = input.triggered_actions(&mapper);
        assert_eq!(actions.len(), 2);
        assert!(actions.contains(&InputAction::Interact));
        assert!(actions.contains(&InputAction::Fire));

        // Held keys do not retrigger on the next frame
        input.update();
        assert!(input.triggered_actions(&mapper).is_empty());
        assert!(input.is_key_pressed(KeyCode::KeyE));
    }

    #[test]
    fn test_movement_keys_are_not_discrete_actions() {
        let mapper = InputMapper::with_defaults();
        let mut input = Input::new();

        input.process_keyboard(KeyCode::KeyA, ElementState::Pressed);
        assert!(input.triggered_actions(&mapper).is_empty());
    }
}
