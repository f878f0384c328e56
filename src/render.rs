//! Frame composition, back to front:
//! sky, sun, clouds, soil, the plant for the current phase, the dispersed
//! seed, then the HUD.

use crate::camera::Camera;
use crate::canvas::{colors, Canvas, Point, Rect, Rgb, SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::phase::{AnimationPhase, SEEDLING_TICKS};
use crate::state::{LifeCycle, GROUND_LEVEL};
use std::f64::consts::{PI, TAU};
use std::time::Duration;

/// Sun speed in radians per second of wall-clock time
const SUN_SPEED: f64 = 0.5;
const SUN_RADIUS: f64 = 30.0;
const SUN_ARC_HEIGHT: f64 = 150.0;
const SUN_ARC_TOP: f64 = 50.0;

/// Thickness of the lighter topsoil band
const TOPSOIL_DEPTH: f64 = 50.0;

const SEED_SIZE: f64 = 8.0;
const SEED_OUTLINE_POINTS: usize = 12;

const SPROUT_START: u32 = 20;
const SPROUT_LENGTH: f64 = 20.0;
const SEEDLING_STEM_HEIGHT: f64 = 60.0;
const SEEDLING_LEAF_SIZE: f64 = 20.0;
const SEEDLING_LEAF_START: f64 = 0.2;

const PETALS: usize = 5;
const PETAL_SIZE: f64 = 4.0;

const HINT: &str = "Press ESC to exit, SPACE to restart";

/// Sun position, advanced by real elapsed time rather than ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkyClock {
    angle: f64,
}

impl SkyClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.angle = (self.angle + SUN_SPEED * elapsed.as_secs_f64()).rem_euclid(TAU);
    }

    /// Sky tint: brightest with the sun high, darkest at its lowest
    pub fn sky_color(&self) -> Rgb {
        let s = self.angle.sin();
        let channel = |base: f64, swing: f64| (base + swing * s).clamp(0.0, 255.0) as u8;
        Rgb {
            r: channel(100.0, 50.0),
            g: channel(170.0, 100.0),
            b: channel(200.0, 80.0),
        }
    }

    pub fn sun_position(&self) -> Point {
        Point::new(
            SURFACE_WIDTH * self.angle / PI,
            SUN_ARC_HEIGHT * self.angle.sin() + SUN_ARC_TOP,
        )
    }
}

/// Compose one frame onto the back buffer. Does not present it.
pub fn draw_frame<C: Canvas + ?Sized>(canvas: &mut C, cycle: &LifeCycle, sky: &SkyClock, hud: bool) {
    let camera = cycle.camera();

    canvas.set_background(sky.sky_color());
    draw_sun(canvas, sky);
    draw_clouds(canvas);
    draw_soil(canvas, &camera);

    match cycle.phase() {
        AnimationPhase::Germination => {
            draw_buried_seed(canvas, cycle, &camera);
            draw_sprout(canvas, cycle, &camera);
        }
        AnimationPhase::Seedling => {
            draw_buried_seed(canvas, cycle, &camera);
            draw_seedling(canvas, cycle, &camera);
        }
        _ => {}
    }

    // Empty until the tree fades in at the end of the seedling phase
    draw_tree(canvas, cycle, &camera);

    let seeds = cycle.seeds();
    if let Some(seed) = seeds.active_seed() {
        draw_seed(canvas, camera.to_screen(seed.position), seed.angle, camera.scale(2.0));
    } else if let Some(landed) = seeds.landed() {
        draw_seed(canvas, camera.to_screen(landed), 0.0, camera.scale(1.0));
    }

    if hud {
        draw_hud(canvas, cycle.phase());
    }
}

fn draw_sun<C: Canvas + ?Sized>(canvas: &mut C, sky: &SkyClock) {
    let center = sky.sun_position();
    canvas.fill_ellipse(center, SUN_RADIUS, SUN_RADIUS, colors::YELLOW);

    for i in 0..12 {
        let angle = (i as f64 * 30.0).to_radians();
        let (sin, cos) = angle.sin_cos();
        let inner = Point::new(center.x + (SUN_RADIUS + 5.0) * cos, center.y + (SUN_RADIUS + 5.0) * sin);
        let outer = Point::new(center.x + (SUN_RADIUS + 20.0) * cos, center.y + (SUN_RADIUS + 20.0) * sin);
        canvas.draw_line(inner, outer, colors::YELLOW, 1.0);
    }
}

fn draw_clouds<C: Canvas + ?Sized>(canvas: &mut C) {
    for cloud in 0..3 {
        let x = 100.0 + cloud as f64 * 200.0;
        let y = 80.0 + ((cloud * 17) % 50) as f64;

        for i in 0..5i32 {
            let puff = Point::new(x + i as f64 * 25.0, y + ((i * 13) % 20 - 10) as f64);
            let radius = 20.0 + ((i * 7) % 10) as f64;
            canvas.fill_ellipse(puff, radius, radius, colors::WHITE);
        }
    }
}

fn draw_soil<C: Canvas + ?Sized>(canvas: &mut C, camera: &Camera) {
    // Wide enough to cover the view at any pan
    let left = -SURFACE_WIDTH;
    let right = 2.0 * SURFACE_WIDTH;

    let top = camera.to_screen(Point::new(left, GROUND_LEVEL));
    let band = camera.to_screen(Point::new(right, GROUND_LEVEL + TOPSOIL_DEPTH));
    canvas.fill_rect(Rect::new(top.x, top.y, band.x, band.y), colors::DARK_BROWN);

    let bottom = camera.to_screen(Point::new(right, GROUND_LEVEL + 2.0 * SURFACE_HEIGHT));
    canvas.fill_rect(Rect::new(top.x, band.y, bottom.x, bottom.y), colors::SOIL_BROWN);
}

fn draw_buried_seed<C: Canvas + ?Sized>(canvas: &mut C, cycle: &LifeCycle, camera: &Camera) {
    let swell = match cycle.phase() {
        AnimationPhase::Germination => cycle.timer() as f64 / 20.0,
        _ => 2.0,
    };
    let at = camera.to_screen(cycle.planting());
    draw_seed(canvas, at, 0.0, camera.scale(1.0 + swell));
}

fn draw_sprout<C: Canvas + ?Sized>(canvas: &mut C, cycle: &LifeCycle, camera: &Camera) {
    let timer = cycle.timer();
    if timer <= SPROUT_START {
        return;
    }
    let progress = (timer - SPROUT_START) as f64 / SPROUT_START as f64;
    let base = cycle.planting();
    let tip = Point::new(base.x, base.y - progress * SPROUT_LENGTH);
    canvas.draw_line(
        camera.to_screen(base),
        camera.to_screen(tip),
        colors::LIGHT_GREEN,
        camera.scale(1.0),
    );
}

/// The stem rises out of the buried seed toward the surface while two
/// leaves unfold
fn draw_seedling<C: Canvas + ?Sized>(canvas: &mut C, cycle: &LifeCycle, camera: &Camera) {
    let progress = (cycle.timer() as f64 / SEEDLING_TICKS as f64).min(1.0);
    let seed = cycle.planting();
    let base = Point::new(seed.x, seed.y + progress * (GROUND_LEVEL - seed.y));
    let stem_height = SEEDLING_STEM_HEIGHT * progress;
    let top = Point::new(base.x, base.y - stem_height);

    canvas.draw_line(
        camera.to_screen(base),
        camera.to_screen(top),
        colors::LEAF_GREEN,
        camera.scale((progress * 4.0).max(2.0)),
    );

    if progress > SEEDLING_LEAF_START {
        let unfolded = (progress - SEEDLING_LEAF_START) / (1.0 - SEEDLING_LEAF_START);
        let size = SEEDLING_LEAF_SIZE * unfolded;
        let y = base.y - stem_height * 0.5;
        for side in [-1.0, 1.0] {
            canvas.fill_ellipse(
                camera.to_screen(Point::new(base.x + side * size, y)),
                camera.scale(size),
                camera.scale(size * 0.6),
                colors::LIGHT_GREEN,
            );
        }
    }
}

fn draw_tree<C: Canvas + ?Sized>(canvas: &mut C, cycle: &LifeCycle, camera: &Camera) {
    let tree = cycle.tree();

    for segment in &tree.segments {
        canvas.draw_line(
            camera.to_screen(segment.from),
            camera.to_screen(segment.to),
            segment.color,
            camera.scale(segment.width),
        );
    }

    for leaf in &tree.leaves {
        let radius = camera.scale(leaf.radius);
        canvas.fill_ellipse(camera.to_screen(leaf.center), radius, radius, colors::LIGHT_GREEN);
    }

    let petal = PETAL_SIZE * cycle.growth().flower_scale;
    if petal <= 0.0 {
        return;
    }
    for &flower in cycle.flower_positions() {
        draw_flower(canvas, camera, flower, petal);
    }
}

fn draw_flower<C: Canvas + ?Sized>(canvas: &mut C, camera: &Camera, center: Point, petal: f64) {
    let radius = camera.scale(petal);
    for i in 0..PETALS {
        let angle = i as f64 * TAU / PETALS as f64;
        let at = Point::new(center.x + petal * angle.cos(), center.y + petal * angle.sin());
        canvas.fill_ellipse(camera.to_screen(at), radius, radius, colors::PETAL_PINK);
    }
    let heart = camera.scale((petal - 1.0).max(0.0));
    canvas.fill_ellipse(camera.to_screen(center), heart, heart, colors::YELLOW);
}

/// Seed drawn as a rotated oval with a stripe through its long axis
fn draw_seed<C: Canvas + ?Sized>(canvas: &mut C, center: Point, angle: f64, scale: f64) {
    let size = SEED_SIZE * scale;
    let (sin, cos) = angle.sin_cos();

    let outline: Vec<Point> = (0..SEED_OUTLINE_POINTS)
        .map(|i| {
            let t = i as f64 * TAU / SEED_OUTLINE_POINTS as f64;
            let local_x = size * t.cos();
            let local_y = size * 0.5 * t.sin();
            Point::new(
                center.x + local_x * cos - local_y * sin,
                center.y + local_x * sin + local_y * cos,
            )
        })
        .collect();
    canvas.fill_polygon(&outline, colors::SEED);

    let half = size * 0.8;
    canvas.draw_line(
        Point::new(center.x + half * cos, center.y + half * sin),
        Point::new(center.x - half * cos, center.y - half * sin),
        colors::SEED_STRIPE,
        (scale / 3.0).max(1.0),
    );
}

fn draw_hud<C: Canvas + ?Sized>(canvas: &mut C, phase: AnimationPhase) {
    canvas.draw_text(Point::new(10.0, 10.0), phase.title(), 2);
    canvas.draw_text(Point::new(10.0, SURFACE_HEIGHT - 20.0), HINT, 1);
}
