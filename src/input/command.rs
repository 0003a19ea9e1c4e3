//! Logical input actions and their key bindings
//!
//! Physical keys and mouse buttons map to a small set of actions. The
//! discrete actions (interact, fire, jump) become `GameEvent::Input` events;
//! the movement actions feed the two continuous movement axes.
//!
//! # Example
//!
//! ```ignore
//! let mut mapper = InputMapper::with_defaults();
//! mapper.bind(KeyCode::KeyF, InputAction::Interact);
//!
//! if let Some(action) = mapper.get_action(KeyCode::KeyF) {
//!     assert_eq!(action, InputAction::Interact);
//! }
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

// ============================================================================
// Input Actions
// ============================================================================

/// Logical input actions that map to game behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    // -------------------------------------------------------------------------
    // Movement axes
    // -------------------------------------------------------------------------
    /// Move away from the camera
    MoveForward,
    /// Move toward the camera
    MoveBackward,
    /// Strafe left
    MoveLeft,
    /// Strafe right
    MoveRight,

    // -------------------------------------------------------------------------
    // Discrete events
    // -------------------------------------------------------------------------
    /// Jump if grounded
    Jump,
    /// Interact with the targeted object
    Interact,
    /// Fire a projectile
    Fire,
}

impl InputAction {
    /// Whether this action is a one-shot event rather than an axis
    #[must_use]
    pub const fn is_discrete(self) -> bool {
        matches!(self, Self::Jump | Self::Interact | Self::Fire)
    }
}

// ============================================================================
// Input Mapper
// ============================================================================

/// Maps physical inputs to logical actions.
///
/// Supports runtime rebinding and querying of key-to-action mappings.
#[derive(Debug, Clone)]
pub struct InputMapper {
    /// Key to action bindings
    key_bindings: FxHashMap<KeyCode, InputAction>,
    /// Mouse button to action bindings
    mouse_bindings: FxHashMap<MouseButton, InputAction>,
    /// Reverse lookup: action to keys (for displaying bindings in UI)
    action_keys: FxHashMap<InputAction, Vec<KeyCode>>,
}

impl InputMapper {
    /// Create an empty input mapper.
    #[must_use]
    pub fn new() -> Self {
        Self {
            key_bindings: FxHashMap::default(),
            mouse_bindings: FxHashMap::default(),
            action_keys: FxHashMap::default(),
        }
    }

    /// Create an input mapper with WASD, E to interact, Space to jump and
    /// left mouse to fire.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut mapper = Self::new();

        mapper.bind(KeyCode::KeyW, InputAction::MoveForward);
        mapper.bind(KeyCode::KeyS, InputAction::MoveBackward);
        mapper.bind(KeyCode::KeyA, InputAction::MoveLeft);
        mapper.bind(KeyCode::KeyD, InputAction::MoveRight);

        mapper.bind(KeyCode::ArrowUp, InputAction::MoveForward);
        mapper.bind(KeyCode::ArrowDown, InputAction::MoveBackward);
        mapper.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        mapper.bind(KeyCode::ArrowRight, InputAction::MoveRight);

        mapper.bind(KeyCode::Space, InputAction::Jump);
        mapper.bind(KeyCode::KeyE, InputAction::Interact);
        mapper.bind_mouse(MouseButton::Left, InputAction::Fire);

        mapper
    }

    /// Bind a key to an action.
    ///
    /// If the key was previously bound, the old binding is replaced.
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        if let Some(old_action) = self.key_bindings.get(&key)
            && let Some(keys) = self.action_keys.get_mut(old_action)
        {
            keys.retain(|k| *k != key);
        }

        self.key_bindings.insert(key, action);
        self.action_keys.entry(action).or_default().push(key);
    }

    /// Bind a mouse button to an action.
    pub fn bind_mouse(&mut self, button: MouseButton, action: InputAction) {
        self.mouse_bindings.insert(button, action);
    }

    /// Unbind a key.
    pub fn unbind(&mut self, key: KeyCode) {
        if let Some(action) = self.key_bindings.remove(&key)
            && let Some(keys) = self.action_keys.get_mut(&action)
        {
            keys.retain(|k| *k != key);
        }
    }

    /// Get the action for a key.
    #[must_use]
    pub fn get_action(&self, key: KeyCode) -> Option<InputAction> {
        self.key_bindings.get(&key).copied()
    }

    /// Get the action for a mouse button.
    #[must_use]
    pub fn get_mouse_action(&self, button: MouseButton) -> Option<InputAction> {
        self.mouse_bindings.get(&button).copied()
    }

    /// Get all keys bound to an action.
    #[must_use]
    pub fn get_keys(&self, action: InputAction) -> &[KeyCode] {
        self.action_keys
            .get(&action)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over all key bindings.
    pub fn iter(&self) -> impl Iterator<Item = (KeyCode, InputAction)> + '_ {
        self.key_bindings.iter().map(|(&k, &a)| (k, a))
    }
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_mapper_defaults() {
        let mapper = InputMapper::with_defaults();

        assert_eq!(
            mapper.get_action(KeyCode::KeyW),
            Some(InputAction::MoveForward)
        );
        assert_eq!(mapper.get_action(KeyCode::Space), Some(InputAction::Jump));
        assert_eq!(mapper.get_action(KeyCode::KeyE), Some(InputAction::Interact));
        assert_eq!(
            mapper.get_mouse_action(MouseButton::Left),
            Some(InputAction::Fire)
        );
    }

    #[test]
    fn test_input_mapper_rebind() {
        let mut mapper = InputMapper::with_defaults();

        mapper.bind(KeyCode::KeyW, InputAction::Jump);
        assert_eq!(mapper.get_action(KeyCode::KeyW), Some(InputAction::Jump));

        // MoveForward should no longer have W
        assert!(
            !mapper
                .get_keys(InputAction::MoveForward)
                .contains(&KeyCode::KeyW)
        );
        assert!(
            mapper
                .get_keys(InputAction::MoveForward)
                .contains(&KeyCode::ArrowUp)
        );
    }

    #[test]
    fn test_input_mapper_unbind() {
        let mut mapper = InputMapper::with_defaults();

        mapper.unbind(KeyCode::KeyE);
        assert!(mapper.get_action(KeyCode::KeyE).is_none());
        assert!(mapper.get_keys(InputAction::Interact).is_empty());
    }

    #[test]
    fn test_discrete_actions() {
        assert!(InputAction::Fire.is_discrete());
        assert!(InputAction::Interact.is_discrete());
        assert!(!InputAction::MoveLeft.is_discrete());
    }
}
