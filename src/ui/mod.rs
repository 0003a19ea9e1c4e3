//! User interface state

mod hud;
mod rect;

pub use hud::{COMPLETION_MESSAGE, Hud, IconElement, TextElement};
pub use rect::{Anchor, Rect};
