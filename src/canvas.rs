//! Drawing and input capability consumed by the animation core.
//!
//! Everything the renderer draws goes through [`Canvas`]; the core never
//! touches a display resource directly.

use crossterm::event::KeyCode;
use std::io;

/// Logical surface width, in world units at 1x zoom
pub const SURFACE_WIDTH: f64 = 800.0;
/// Logical surface height
pub const SURFACE_HEIGHT: f64 = 600.0;

/// A point on the logical surface (or in world space)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }
}

/// 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Helper to create RGB colors
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb { r, g, b }
}

/// The drawing surface plus non-blocking keyboard polling.
///
/// Coordinates are logical (800x600, y grows downward). Implementations draw
/// into a back buffer; nothing becomes visible until [`Canvas::swap_buffers`].
pub trait Canvas {
    /// Clear the back buffer to a solid color
    fn set_background(&mut self, color: Rgb);

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb, width: f64);

    fn fill_polygon(&mut self, points: &[Point], color: Rgb);

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Rgb);

    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// Draw text; `size` 1 is the small font, 2 the title font
    fn draw_text(&mut self, pos: Point, text: &str, size: u8);

    /// Present the back buffer
    fn swap_buffers(&mut self) -> io::Result<()>;

    /// Check for keypress (non-blocking)
    fn poll_key(&mut self) -> io::Result<Option<KeyCode>>;
}

/// Palette for the animation
pub mod colors {
    use super::{rgb, Rgb};

    // Wood
    pub const BROWN: Rgb = rgb(139, 69, 19);
    pub const DARK_BROWN: Rgb = rgb(101, 67, 33);

    // Foliage
    pub const LEAF_GREEN: Rgb = rgb(34, 139, 34);
    pub const LIGHT_GREEN: Rgb = rgb(50, 205, 50);

    // Ground
    pub const SOIL_BROWN: Rgb = rgb(90, 50, 20);

    // Seed body and its center stripe
    pub const SEED: Rgb = rgb(160, 82, 45);
    pub const SEED_STRIPE: Rgb = rgb(100, 50, 20);

    pub const PETAL_PINK: Rgb = rgb(255, 192, 203);
    pub const YELLOW: Rgb = rgb(255, 255, 0);
    pub const WHITE: Rgb = rgb(255, 255, 255);
}
