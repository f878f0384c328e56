//! The animation state owned by the tick loop.

use crate::branch::{BranchGenerator, TreeGeometry, TreeParams};
use crate::camera::Camera;
use crate::canvas::{Point, SURFACE_WIDTH};
use crate::phase::{AnimationPhase, GrowthParameters, PhaseController, PhaseEffect, TICK_STEP};
use crate::seed::{SeedPhysics, REST_DEPTH};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::FRAC_PI_2;
use tracing::{debug, info};

/// World y of the soil surface
pub const GROUND_LEVEL: f64 = 480.0;
pub const TRUNK_LENGTH: f64 = 150.0;
pub const MAX_DEPTH: u32 = 8;

/// Below this effective growth the tree is not generated
const MIN_TREE_SCALE: f64 = 0.01;

// Spawn point used when no flower tip has been recorded
const FALLBACK_SPAWN_DX: f64 = 100.0;
const FALLBACK_SPAWN_HEIGHT: f64 = 150.0;

/// Everything that changes while the animation runs.
///
/// Created at startup and rebuilt wholesale by [`LifeCycle::reset`].
pub struct LifeCycle {
    controller: PhaseController,
    seeds: SeedPhysics,
    camera: Camera,
    tree: TreeGeometry,
    planting: Point,
    rng_seed: u64,
    rng: StdRng,
}

impl LifeCycle {
    /// `rng_seed` drives leaf jitter; every cycle replays the same sequence
    pub fn new(rng_seed: u64) -> Self {
        Self {
            controller: PhaseController::new(),
            seeds: SeedPhysics::new(GROUND_LEVEL),
            camera: Camera::IDENTITY,
            tree: TreeGeometry::default(),
            planting: Point::new(SURFACE_WIDTH / 2.0, GROUND_LEVEL + REST_DEPTH),
            rng_seed,
            rng: StdRng::seed_from_u64(rng_seed),
        }
    }

    /// Restore every field to its start-of-day value
    pub fn reset(&mut self) {
        *self = Self::new(self.rng_seed);
    }

    pub fn phase(&self) -> AnimationPhase {
        self.controller.phase()
    }

    pub fn timer(&self) -> u32 {
        self.controller.timer()
    }

    pub fn growth(&self) -> GrowthParameters {
        self.controller.growth()
    }

    pub fn seeds(&self) -> &SeedPhysics {
        &self.seeds
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn tree(&self) -> &TreeGeometry {
        &self.tree
    }

    /// Flower centers from the latest generation pass
    pub fn flower_positions(&self) -> &[Point] {
        &self.tree.flowers
    }

    /// Rightmost outermost tip from the latest generation pass
    pub fn flower_anchor(&self) -> Option<Point> {
        self.tree.rightmost_tip
    }

    /// Where the buried seed sits and the tree takes root
    pub fn planting(&self) -> Point {
        self.planting
    }

    /// Tree base on the soil surface
    pub fn tree_origin(&self) -> Point {
        Point::new(self.planting.x, GROUND_LEVEL)
    }

    /// Advance one scheduler tick
    pub fn tick(&mut self) {
        let previous = self.controller.phase();

        if previous == AnimationPhase::Dispersal && self.seeds.step() {
            if let Some(landed) = self.seeds.landed() {
                debug!(x = landed.x, y = landed.y, "seed landed");
            }
        }

        let (next, effects) = self.controller.advance(TICK_STEP, self.seeds.is_airborne());
        self.controller = next;

        for effect in effects {
            match effect {
                PhaseEffect::SpawnSeed => self.spawn_seed(),
                PhaseEffect::ResetCycle => {
                    info!("cycle complete, starting over");
                    self.reset();
                    return;
                }
            }
        }

        if self.controller.phase() != previous {
            info!(from = ?previous, to = ?self.controller.phase(), "phase transition");
        }

        self.camera = Camera::derive(self.controller.phase(), self.controller.timer(), &self.seeds);
        self.regenerate_tree();
    }

    /// Spawn point for the next dispersed seed
    pub fn spawn_point(&self) -> Point {
        self.flower_anchor().unwrap_or(Point::new(
            self.planting.x + FALLBACK_SPAWN_DX,
            GROUND_LEVEL - FALLBACK_SPAWN_HEIGHT,
        ))
    }

    fn spawn_seed(&mut self) {
        let at = self.spawn_point();
        debug!(x = at.x, y = at.y, anchored = self.tree.rightmost_tip.is_some(), "seed released");
        self.seeds.spawn(at);
    }

    fn regenerate_tree(&mut self) {
        let growth = self.controller.growth();
        let effective = self
            .controller
            .tree_blend()
            .map(|blend| growth.tree_growth_scale * blend)
            .unwrap_or(0.0);

        if effective <= MIN_TREE_SCALE {
            self.tree = TreeGeometry::default();
            return;
        }

        let params = TreeParams {
            origin: self.tree_origin(),
            trunk_length: TRUNK_LENGTH,
            initial_angle: FRAC_PI_2,
            max_depth: MAX_DEPTH,
            scale: effective,
            growth_progress: effective,
        };
        let generator = BranchGenerator::new(growth.show_flowers, growth.flower_scale);
        self.tree = generator.generate(&params, &mut self.rng);
    }
}
