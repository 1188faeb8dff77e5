//! Periodic ammo drops over the arena.

use glam::Vec3;
use rand::Rng;

use crate::config::AmmoRules;

/// Drops a crate from the sky every `drop_interval` seconds while fewer than
/// `max_crates` are on the field.
#[derive(Debug, Clone, Default)]
pub struct AmmoDropper {
    /// Time since the last drop (or since the field filled up).
    pub timer: f32,
    /// Crates dropped so far.
    pub dropped: u32,
}

impl AmmoDropper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the timer and return a drop point when one is due.
    pub fn update(&mut self, dt: f32, rules: &AmmoRules, live_crates: usize, rng: &mut impl Rng) -> Option<Vec3> {
        if rules.drop_interval <= 0.0 {
            return None;
        }
        if live_crates >= rules.max_crates {
            self.timer = 0.0;
            return None;
        }

        self.timer += dt;
        if self.timer < rules.drop_interval {
            return None;
        }
        self.timer = 0.0;
        self.dropped += 1;

        let (min, max) = (rules.drop_area_min.min(rules.drop_area_max), rules.drop_area_min.max(rules.drop_area_max));
        let x = if max.x > min.x { rng.gen_range(min.x..max.x) } else { min.x };
        let z = if max.y > min.y { rng.gen_range(min.y..max.y) } else { min.y };
        Some(Vec3::new(x, rules.drop_height, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn drops_once_interval_has_passed() {
        let rules = AmmoRules {
            drop_interval: 1.0,
            ..AmmoRules::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let mut dropper = AmmoDropper::new();

        assert!(dropper.update(0.5, &rules, 0, &mut rng).is_none());
        let point = dropper.update(0.5, &rules, 0, &mut rng).unwrap();
        assert_eq!(point.y, rules.drop_height);
        assert!(point.x >= rules.drop_area_min.x && point.x < rules.drop_area_max.x);
        assert!(point.z >= rules.drop_area_min.y && point.z < rules.drop_area_max.y);
        assert_eq!(dropper.dropped, 1);
    }

    #[test]
    fn full_field_holds_the_timer() {
        let rules = AmmoRules {
            drop_interval: 1.0,
            max_crates: 1,
            ..AmmoRules::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let mut dropper = AmmoDropper::new();
        for _ in 0..10 {
            assert!(dropper.update(0.5, &rules, 1, &mut rng).is_none());
        }
        assert_eq!(dropper.timer, 0.0);
    }

    #[test]
    fn zero_interval_disables_drops() {
        let rules = AmmoRules {
            drop_interval: 0.0,
            ..AmmoRules::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let mut dropper = AmmoDropper::new();
        assert!(dropper.update(100.0, &rules, 0, &mut rng).is_none());
    }
}
