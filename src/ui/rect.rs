//! Screen-space placement for HUD elements

use glam::Vec2;

/// Point of the screen a HUD rect is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    TopLeft,
    TopRight,
    Center,
}

impl Anchor {
    /// Pivot as a fraction of the screen (and of the rect itself)
    #[must_use]
    pub const fn pivot(self) -> Vec2 {
        match self {
            Self::TopLeft => Vec2::ZERO,
            Self::TopRight => Vec2::new(1.0, 0.0),
            Self::Center => Vec2::splat(0.5),
        }
    }
}

/// Pixel rectangle offset from its anchor
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub offset: Vec2,
    pub size: Vec2,
    pub anchor: Anchor,
}

impl Rect {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            offset: Vec2::new(x, y),
            size: Vec2::new(width, height),
            anchor: Anchor::TopLeft,
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Top-left corner on a screen of `screen` pixels
    #[must_use]
    pub fn origin(&self, screen: Vec2) -> Vec2 {
        let pivot = self.anchor.pivot();
        (screen - self.size) * pivot + self.offset
    }

    /// Whether `point` falls inside the rect on a screen of `screen` pixels
    #[must_use]
    pub fn contains(&self, screen: Vec2, point: Vec2) -> bool {
        let min = self.origin(screen);
        let max = min + self.size;
        point.cmpge(min).all() && point.cmplt(max).all()
    }
}
