use crate::canvas::Point;

// Per-tick physics constants
const GRAVITY: f64 = 0.3;
const WIND_DRIFT: f64 = 1.5;
const SPIN: f64 = 0.2;

/// How far below ground level a falling seed travels before it counts as landed
const IMPACT_DEPTH: f64 = 80.0;
/// Resting depth below ground level of a buried seed
pub const REST_DEPTH: f64 = 25.0;

/// A single dispersed seed in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub position: Point,
    pub angle: f64,
    pub vertical_velocity: f64,
    pub active: bool,
}

impl Seed {
    /// A seed released at rest from `position`
    pub fn released_at(position: Point) -> Self {
        Self {
            position,
            angle: 0.0,
            vertical_velocity: 0.0,
            active: true,
        }
    }
}

/// Ballistic motion for at most one falling seed
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPhysics {
    ground_level: f64,
    seed: Option<Seed>,
    landed: Option<Point>,
}

impl SeedPhysics {
    pub fn new(ground_level: f64) -> Self {
        Self {
            ground_level,
            seed: None,
            landed: None,
        }
    }

    /// Replace any previous seed with a fresh one released at `position`
    pub fn spawn(&mut self, position: Point) {
        self.seed = Some(Seed::released_at(position));
        self.landed = None;
    }

    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    /// The airborne seed, if any
    pub fn active_seed(&self) -> Option<&Seed> {
        self.seed().filter(|s| s.active)
    }

    pub fn is_airborne(&self) -> bool {
        self.active_seed().is_some()
    }

    /// Where the last seed came to rest in the soil
    pub fn landed(&self) -> Option<Point> {
        self.landed
    }

    /// Advance the active seed by one tick. Returns true on the tick it lands.
    pub fn step(&mut self) -> bool {
        let Some(seed) = self.seed.as_mut().filter(|s| s.active) else {
            return false;
        };

        seed.vertical_velocity += GRAVITY;
        seed.position.y += seed.vertical_velocity;
        seed.position.x += WIND_DRIFT;
        seed.angle += SPIN;

        if seed.position.y >= self.ground_level + IMPACT_DEPTH {
            seed.active = false;
            self.landed = Some(Point::new(seed.position.x, self.ground_level + REST_DEPTH));
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: f64 = 480.0;

    #[test]
    fn step_without_seed_is_noop() {
        let mut physics = SeedPhysics::new(GROUND);
        assert!(!physics.step());
        assert!(physics.seed().is_none());
        assert!(physics.landed().is_none());
    }

    #[test]
    fn velocity_strictly_increases_until_landing() {
        let mut physics = SeedPhysics::new(GROUND);
        physics.spawn(Point::new(550.0, 250.0));

        let mut last_velocity = physics.seed().unwrap().vertical_velocity;
        let mut ticks = 0;
        while physics.is_airborne() {
            physics.step();
            let seed = physics.seed().unwrap();
            if seed.active {
                assert!(seed.vertical_velocity > last_velocity);
            }
            last_velocity = seed.vertical_velocity;
            ticks += 1;
            assert!(ticks < 1000, "seed never landed");
        }
    }

    #[test]
    fn drift_and_spin_are_constant_per_tick() {
        let mut physics = SeedPhysics::new(GROUND);
        physics.spawn(Point::new(100.0, 100.0));
        physics.step();
        physics.step();

        let seed = physics.seed().unwrap();
        assert!((seed.position.x - 103.0).abs() < 1e-9);
        assert!((seed.angle - 0.4).abs() < 1e-9);
        // 0.3 then 0.6
        assert!((seed.position.y - 100.9).abs() < 1e-9);
    }

    #[test]
    fn landing_records_resting_position() {
        let mut physics = SeedPhysics::new(GROUND);
        physics.spawn(Point::new(500.0, GROUND + 79.9));

        assert!(physics.step());
        let seed = physics.seed().unwrap();
        assert!(!seed.active);

        let landed = physics.landed().unwrap();
        assert!((landed.x - seed.position.x).abs() < 1e-9);
        assert!((landed.y - (GROUND + REST_DEPTH)).abs() < 1e-9);

        // Landed seeds no longer move
        let before = *seed;
        assert!(!physics.step());
        assert_eq!(*physics.seed().unwrap(), before);
    }

    #[test]
    fn spawn_replaces_previous_seed() {
        let mut physics = SeedPhysics::new(GROUND);
        physics.spawn(Point::new(500.0, GROUND + 79.9));
        physics.step();
        assert!(physics.landed().is_some());

        physics.spawn(Point::new(10.0, 10.0));
        assert!(physics.is_airborne());
        assert!(physics.landed().is_none());
    }
}
