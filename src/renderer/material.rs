//! Materials and the per-entity material state the renderer draws
//!
//! Gameplay never touches colours directly. It flips an entity's
//! `Appearance` between variants and the host renderer reads
//! `Appearance::material()` when drawing.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Material definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Base color
    pub color: Vec3,
    /// Specular reflectivity (0.0 - 1.0)
    pub specular: f32,
    /// Shininess exponent
    pub shininess: f32,
}

impl Material {
    /// Create a new material with a color
    pub fn new(color: Vec3) -> Self {
        Self {
            color,
            specular: 0.5,
            shininess: 32.0,
        }
    }

    /// Create a shiny material
    pub fn shiny(color: Vec3) -> Self {
        Self {
            color,
            specular: 1.0,
            shininess: 64.0,
        }
    }

    /// Gold, used for coins
    pub fn gold() -> Self {
        Self::shiny(Vec3::new(1.0, 0.8, 0.1))
    }

    /// Red, used for locked doors
    pub fn red() -> Self {
        Self::new(Vec3::new(0.9, 0.2, 0.2))
    }

    /// Gray
    pub fn gray() -> Self {
        Self::new(Vec3::splat(0.5))
    }

    /// Bright highlight shown on the targeted object
    pub fn highlight() -> Self {
        Self::shiny(Vec3::new(0.4, 1.0, 1.0))
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec3::new(0.8, 0.8, 0.8))
    }
}

/// Which material of a set is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaterialVariant {
    #[default]
    Default,
    Locked,
    Highlight,
}

/// The materials an object can switch between
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSet {
    pub default: Material,
    /// Falls back to `default` when absent
    pub locked: Option<Material>,
    pub highlight: Material,
}

impl MaterialSet {
    pub fn new(default: Material) -> Self {
        Self {
            default,
            locked: None,
            highlight: Material::highlight(),
        }
    }

    #[must_use]
    pub fn with_locked(mut self, locked: Material) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn get(&self, variant: MaterialVariant) -> Material {
        match variant {
            MaterialVariant::Default => self.default,
            MaterialVariant::Locked => self.locked.unwrap_or(self.default),
            MaterialVariant::Highlight => self.highlight,
        }
    }
}

impl Default for MaterialSet {
    fn default() -> Self {
        Self::new(Material::default())
    }
}

/// Material state component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub materials: MaterialSet,
    variant: MaterialVariant,
}

impl Appearance {
    pub fn new(materials: MaterialSet) -> Self {
        Self {
            materials,
            variant: MaterialVariant::Default,
        }
    }

    pub fn variant(&self) -> MaterialVariant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: MaterialVariant) {
        self.variant = variant;
    }

    /// The material to draw right now
    pub fn material(&self) -> Material {
        self.materials.get(self.variant)
    }

    pub fn is_highlighted(&self) -> bool {
        self.variant == MaterialVariant::Highlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_falls_back_to_default() {
        let set = MaterialSet::new(Material::gray());
        assert_eq!(set.get(MaterialVariant::Locked), Material::gray());

        let set = set.with_locked(Material::red());
        assert_eq!(set.get(MaterialVariant::Locked), Material::red());
    }

    #[test]
    fn test_appearance_switches_material() {
        let mut appearance = Appearance::new(MaterialSet::new(Material::gold()));
        assert_eq!(appearance.material(), Material::gold());

        appearance.set_variant(MaterialVariant::Highlight);
        assert!(appearance.is_highlighted());
        assert_eq!(appearance.material(), Material::highlight());
    }
}
