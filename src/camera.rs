//! World to screen mapping under a time-varying zoom and pan.
//!
//! `screen = (world + offset) * zoom - (zoom - 1) * dimension / 2`
//!
//! Every drawn entity that lives in the world (soil, buried seed, sprout,
//! seedling, tree, falling seed) goes through [`Camera::to_screen`].

use crate::canvas::{Point, SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::phase::{ramp, AnimationPhase, RESET_TICKS};
use crate::seed::SeedPhysics;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 8.0;
/// Timer units over which the dispersal zoom-in runs
const ZOOM_IN_TICKS: f64 = 55.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Camera {
    pub const IDENTITY: Camera = Camera {
        zoom: MIN_ZOOM,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Camera that keeps `target` at the center of the screen at any zoom
    pub fn tracking(target: Point, zoom: f64) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            offset_x: SURFACE_WIDTH / 2.0 - target.x,
            offset_y: SURFACE_HEIGHT / 2.0 - target.y,
        }
    }

    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(
            Self::axis(world.x, self.offset_x, self.zoom, SURFACE_WIDTH),
            Self::axis(world.y, self.offset_y, self.zoom, SURFACE_HEIGHT),
        )
    }

    /// Screen length of a world-space length
    pub fn scale(&self, length: f64) -> f64 {
        length * self.zoom
    }

    fn axis(world: f64, offset: f64, zoom: f64, dimension: f64) -> f64 {
        (world + offset) * zoom - (zoom - 1.0) * dimension / 2.0
    }

    /// Camera for the given phase state.
    ///
    /// Identity except while a dispersed seed is followed: zooms in on the
    /// airborne seed, holds 8x on the landed seed, then eases back to
    /// identity over the Reset phase.
    pub fn derive(phase: AnimationPhase, timer: u32, seeds: &SeedPhysics) -> Self {
        match phase {
            AnimationPhase::Dispersal => {
                if let Some(seed) = seeds.active_seed() {
                    let zoom = MIN_ZOOM + (timer as f64 / ZOOM_IN_TICKS) * (MAX_ZOOM - MIN_ZOOM);
                    Self::tracking(seed.position, zoom)
                } else if let Some(landed) = seeds.landed() {
                    Self::tracking(landed, MAX_ZOOM)
                } else {
                    Self::IDENTITY
                }
            }
            AnimationPhase::Reset => {
                let progress = ramp(timer, RESET_TICKS);
                let start = seeds
                    .landed()
                    .map(|landed| Self::tracking(landed, MAX_ZOOM))
                    .unwrap_or(Self { zoom: MAX_ZOOM, ..Self::IDENTITY });
                Self {
                    zoom: MAX_ZOOM - progress * (MAX_ZOOM - MIN_ZOOM),
                    offset_x: start.offset_x * (1.0 - progress),
                    offset_y: start.offset_y * (1.0 - progress),
                }
            }
            _ => Self::IDENTITY,
        }
    }
}
