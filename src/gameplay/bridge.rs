//! Bridges that rise and sink forever

/// Open-loop vertical oscillation between two offsets of the start height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bridge {
    initial_y: f32,
    min_y: f32,
    max_y: f32,
    speed: f32,
    moving_down: bool,
}

impl Bridge {
    /// `min_y` and `max_y` are offsets from `initial_y`; swapped if reversed
    pub fn new(initial_y: f32, min_y: f32, max_y: f32, speed: f32) -> Self {
        Self {
            initial_y,
            min_y: min_y.min(max_y),
            max_y: max_y.max(min_y),
            speed: speed.abs(),
            moving_down: false,
        }
    }

    pub fn is_moving_down(&self) -> bool {
        self.moving_down
    }

    pub fn lower_bound(&self) -> f32 {
        self.initial_y + self.min_y
    }

    pub fn upper_bound(&self) -> f32 {
        self.initial_y + self.max_y
    }

    /// Advance from height `y` by `dt` seconds and return the new height
    pub fn tick(&mut self, y: f32, dt: f32) -> f32 {
        let step = self.speed * dt.max(0.0);
        let y = if self.moving_down { y - step } else { y + step };

        if y >= self.upper_bound() {
            self.moving_down = true;
            self.upper_bound()
        } else if y <= self.lower_bound() {
            self.moving_down = false;
            self.lower_bound()
        } else {
            y
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new(0.0, 0.1, 2.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_rises_first() {
        let mut bridge = Bridge::new(1.0, 0.1, 2.0, 1.0);
        let y = bridge.tick(1.5, 0.25);
        assert!((y - 1.75).abs() < 1e-6);
        assert!(!bridge.is_moving_down());
    }

    #[test]
    fn test_bridge_turns_at_top_and_bottom() {
        let mut bridge = Bridge::new(0.0, 0.1, 2.0, 1.0);
        let mut y = 1.9;

        y = bridge.tick(y, 0.5);
        assert_eq!(y, 2.0);
        assert!(bridge.is_moving_down());

        y = bridge.tick(y, 1.0);
        assert!((y - 1.0).abs() < 1e-6);

        y = bridge.tick(y, 5.0);
        assert!((y - 0.1).abs() < 1e-6);
        assert!(!bridge.is_moving_down());
    }

    #[test]
    fn test_bridge_stays_in_band() {
        let mut bridge = Bridge::new(4.0, 0.1, 2.0, 1.3);
        // Starts below the band: the first tick snaps it in
        let mut y = 4.0;
        let steps = [0.016, 0.033, 0.5, 0.007, 1.7, 0.02];
        for dt in steps.iter().cycle().take(2000) {
            y = bridge.tick(y, *dt);
            assert!(y >= bridge.lower_bound() - 1e-5);
            assert!(y <= bridge.upper_bound() + 1e-5);
        }
    }

    #[test]
    fn test_reversed_bounds_are_normalised() {
        let bridge = Bridge::new(0.0, 3.0, 1.0, 1.0);
        assert_eq!(bridge.lower_bound(), 1.0);
        assert_eq!(bridge.upper_bound(), 3.0);
    }
}
