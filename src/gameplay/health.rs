//! Health pool and the zones that heal or hurt

use serde::{Deserialize, Serialize};

use super::sinks::{HealthChange, HealthSink};

/// Health clamped to `[0, max]`; reaching zero resets to max
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Add `amount` (negative for damage).
    pub fn apply(&mut self, amount: i32) -> HealthChange {
        self.current = self.current.saturating_add(amount).min(self.max);
        if self.current <= 0 {
            log::info!("You died.");
            self.current = self.max;
            return HealthChange::Died;
        }
        HealthChange::Changed(self.current)
    }
}

/// What a zone does to whoever stands in it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZoneEffect {
    /// Applied on every contact step
    Heal { amount: i32 },
    /// Applied at most once per `interval` seconds
    Damage { amount: i32, interval: f32 },
}

/// A healing area or a hazard (lava, spikes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthZone {
    pub effect: ZoneEffect,
    last_damage_at: Option<f64>,
}

impl HealthZone {
    pub fn new(effect: ZoneEffect) -> Self {
        Self {
            effect,
            last_damage_at: None,
        }
    }

    pub fn healing(amount: i32) -> Self {
        Self::new(ZoneEffect::Heal { amount })
    }

    pub fn hazard(amount: i32, interval: f32) -> Self {
        Self::new(ZoneEffect::Damage { amount, interval })
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self.effect, ZoneEffect::Damage { .. })
    }

    /// Apply the zone to `target` at game time `now`.
    ///
    /// Returns `None` when damage is still cooling down.
    pub fn apply(&mut self, now: f64, target: &mut dyn HealthSink) -> Option<HealthChange> {
        match self.effect {
            ZoneEffect::Heal { amount } => Some(target.modify_health(amount)),
            ZoneEffect::Damage { amount, interval } => {
                if let Some(last) = self.last_damage_at
                    && now - last < f64::from(interval)
                {
                    return None;
                }
                self.last_damage_at = Some(now);
                Some(target.modify_health(-amount))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pool(Health);

    impl HealthSink for Pool {
        fn modify_health(&mut self, amount: i32) -> HealthChange {
            self.0.apply(amount)
        }
    }

    #[test]
    fn test_health_clamps_to_max() {
        let mut health = Health::new(100);
        assert_eq!(health.apply(25), HealthChange::Changed(100));
        assert_eq!(health.apply(-30), HealthChange::Changed(70));
        assert_eq!(health.apply(500), HealthChange::Changed(100));
    }

    #[test]
    fn test_health_resets_on_death() {
        let mut health = Health::new(100);
        assert_eq!(health.apply(-99), HealthChange::Changed(1));
        assert_eq!(health.apply(-1), HealthChange::Died);
        assert_eq!(health.current(), 100);

        assert_eq!(health.apply(-1000), HealthChange::Died);
        assert_eq!(health.current(), 100);
    }

    #[test]
    fn test_health_stays_in_range_for_any_sequence() {
        let mut health = Health::new(100);
        let amounts = [-7, 13, -250, 1, 99, -100, -1, 40, i32::MIN, i32::MAX, -3];
        for amount in amounts.iter().cycle().take(200) {
            health.apply(*amount);
            assert!(health.current() >= 0 && health.current() <= health.max());
        }
    }

    #[test]
    fn test_damage_respects_cooldown() {
        let mut pool = Pool(Health::new(100));
        let mut lava = HealthZone::hazard(1, 1.0);

        assert_eq!(lava.apply(0.0, &mut pool), Some(HealthChange::Changed(99)));
        assert_eq!(lava.apply(0.5, &mut pool), None);
        assert_eq!(pool.0.current(), 99);

        assert_eq!(lava.apply(1.0, &mut pool), Some(HealthChange::Changed(98)));
        assert_eq!(lava.apply(2.5, &mut pool), Some(HealthChange::Changed(97)));
    }

    #[test]
    fn test_first_damage_is_never_on_cooldown() {
        let mut pool = Pool(Health::new(100));
        let mut spikes = HealthZone::hazard(5, 1.0);

        // Contact right at level start still hurts
        assert_eq!(spikes.apply(0.2, &mut pool), Some(HealthChange::Changed(95)));
    }

    #[test]
    fn test_healing_has_no_cooldown() {
        let mut pool = Pool(Health::new(100));
        pool.0.apply(-10);
        let mut spring = HealthZone::healing(1);

        for _ in 0..3 {
            assert!(spring.apply(0.0, &mut pool).is_some());
        }
        assert_eq!(pool.0.current(), 93);
        assert!(!spring.is_hazard());
    }

    #[test]
    fn test_cooldown_is_per_zone() {
        let mut pool = Pool(Health::new(100));
        let mut lava = HealthZone::hazard(1, 1.0);
        let mut spikes = HealthZone::hazard(1, 1.0);

        lava.apply(0.0, &mut pool);
        spikes.apply(0.1, &mut pool);
        assert_eq!(pool.0.current(), 98);
    }
}
