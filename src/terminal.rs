use crate::canvas::{colors, Canvas, Point, Rect, Rgb, SURFACE_HEIGHT, SURFACE_WIDTH};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

const TITLE: &str = "Animated Tree Life Cycle";

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '▀';

/// A single character cell as it appears on screen
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
}

#[derive(Clone, Copy)]
struct Glyph {
    ch: char,
    bold: bool,
}

/// Pixel back buffer with two pixels per terminal cell (top and bottom half).
///
/// Drawing calls take logical 800x600 coordinates and are scaled onto the
/// pixel grid; everything is clipped to the grid.
pub struct Raster {
    cols: usize,
    rows: usize,
    pixels: Vec<Rgb>,
    text: Vec<Option<Glyph>>,
}

impl Raster {
    pub fn new(cols: u16, rows: u16) -> Self {
        let cols = cols as usize;
        let rows = rows as usize;
        Self {
            cols,
            rows,
            pixels: vec![Rgb::default(); cols * rows * 2],
            text: vec![None; cols * rows],
        }
    }

    /// Pixel grid dimensions
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.cols, self.rows * 2)
    }

    fn scale_x(&self) -> f64 {
        self.cols as f64 / SURFACE_WIDTH
    }

    fn scale_y(&self) -> f64 {
        (self.rows * 2) as f64 / SURFACE_HEIGHT
    }

    fn to_pixel(&self, p: Point) -> (f64, f64) {
        (p.x * self.scale_x(), p.y * self.scale_y())
    }

    fn plot(&mut self, x: i64, y: i64, color: Rgb) {
        let (w, h) = self.pixel_size();
        if x >= 0 && (x as usize) < w && y >= 0 && (y as usize) < h {
            self.pixels[y as usize * w + x as usize] = color;
        }
    }

    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
        self.text.fill(None);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let (w, h) = self.pixel_size();
        let (left, top) = self.to_pixel(Point::new(rect.left.min(rect.right), rect.top.min(rect.bottom)));
        let (right, bottom) = self.to_pixel(Point::new(rect.left.max(rect.right), rect.top.max(rect.bottom)));

        let x0 = left.round().clamp(0.0, w as f64) as usize;
        let x1 = right.round().clamp(0.0, w as f64) as usize;
        let y0 = top.round().clamp(0.0, h as f64) as usize;
        let y1 = bottom.round().clamp(0.0, h as f64) as usize;

        for y in y0..y1 {
            self.pixels[y * w + x0..y * w + x1].fill(color);
        }
    }

    pub fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Rgb) {
        let (cx, cy) = self.to_pixel(center);
        let rx = rx * self.scale_x();
        let ry = ry * self.scale_y();
        self.fill_pixel_ellipse(cx, cy, rx, ry, color);
    }

    fn fill_pixel_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, color: Rgb) {
        // Sub-pixel shapes still leave a mark
        if rx < 0.5 || ry < 0.5 {
            self.plot(cx.floor() as i64, cy.floor() as i64, color);
            return;
        }

        let (w, h) = self.pixel_size();
        let x0 = (cx - rx).floor().max(0.0) as i64;
        let x1 = (cx + rx).ceil().min(w as f64) as i64;
        let y0 = (cy - ry).floor().max(0.0) as i64;
        let y1 = (cy + ry).ceil().min(h as f64) as i64;

        for y in y0..y1 {
            let dy = (y as f64 + 0.5 - cy) / ry;
            for x in x0..x1 {
                let dx = (x as f64 + 0.5 - cx) / rx;
                if dx * dx + dy * dy <= 1.0 {
                    self.plot(x, y, color);
                }
            }
        }
    }

    /// Even-odd scanline fill
    pub fn fill_polygon(&mut self, points: &[Point], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let pts: Vec<(f64, f64)> = points.iter().map(|p| self.to_pixel(*p)).collect();
        let (w, h) = self.pixel_size();

        let min_y = pts.iter().map(|p| p.1).fold(f64::MAX, f64::min).floor().max(0.0) as i64;
        let max_y = pts.iter().map(|p| p.1).fold(f64::MIN, f64::max).ceil().min(h as f64) as i64;

        let mut crossings: Vec<f64> = Vec::with_capacity(pts.len());
        for y in min_y..max_y {
            let sy = y as f64 + 0.5;
            crossings.clear();
            for i in 0..pts.len() {
                let (x0, y0) = pts[i];
                let (x1, y1) = pts[(i + 1) % pts.len()];
                if (y0 <= sy && y1 > sy) || (y1 <= sy && y0 > sy) {
                    crossings.push(x0 + (sy - y0) / (y1 - y0) * (x1 - x0));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for pair in crossings.chunks_exact(2) {
                let start = (pair[0] - 0.5).ceil().max(0.0) as i64;
                let end = (pair[1] - 0.5).floor().min(w as f64 - 1.0) as i64;
                for x in start..=end {
                    self.plot(x, y, color);
                }
            }
        }
    }

    /// Line stamped with discs when wide enough to span more than a pixel
    pub fn draw_line(&mut self, from: Point, to: Point, color: Rgb, width: f64) {
        let (x0, y0) = self.to_pixel(from);
        let (x1, y1) = self.to_pixel(to);
        let (w, h) = self.pixel_size();

        // Skip lines that cannot touch the grid
        let margin = width * self.scale_x();
        if (x0.max(x1) < -margin)
            || (y0.max(y1) < -margin)
            || (x0.min(x1) > w as f64 + margin)
            || (y0.min(y1) > h as f64 + margin)
        {
            return;
        }

        let radius = width * self.scale_x() / 2.0;
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            if radius < 0.75 {
                self.plot(x.floor() as i64, y.floor() as i64, color);
            } else {
                self.fill_pixel_ellipse(x, y, radius, radius, color);
            }
        }
    }

    /// Text snaps to the character grid; size 2 and up renders bold
    pub fn draw_text(&mut self, pos: Point, text: &str, size: u8) {
        let col = (pos.x * self.scale_x()).round() as i64;
        let row = (pos.y * self.scale_y() / 2.0).floor() as i64;
        if row < 0 || row as usize >= self.rows {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let x = col + i as i64;
            if x >= 0 && (x as usize) < self.cols {
                self.text[row as usize * self.cols + x as usize] = Some(Glyph { ch, bold: size >= 2 });
            }
        }
    }

    /// Collapse the pixel pairs and text layer into terminal cells
    pub fn cells(&self) -> Vec<Cell> {
        let w = self.cols;
        (0..self.rows)
            .flat_map(|row| (0..w).map(move |col| (row, col)))
            .map(|(row, col)| {
                let top = self.pixels[row * 2 * w + col];
                let bottom = self.pixels[(row * 2 + 1) * w + col];
                match self.text[row * w + col] {
                    Some(glyph) => Cell {
                        ch: glyph.ch,
                        fg: colors::WHITE,
                        bg: blend(top, bottom),
                        bold: glyph.bold,
                    },
                    None => Cell {
                        ch: HALF_BLOCK,
                        fg: top,
                        bg: bottom,
                        bold: false,
                    },
                }
            })
            .collect()
    }
}

fn blend(a: Rgb, b: Rgb) -> Rgb {
    let mid = |x: u8, y: u8| ((x as u16 + y as u16) / 2) as u8;
    Rgb {
        r: mid(a.r, b.r),
        g: mid(a.g, b.g),
        b: mid(a.b, b.b),
    }
}

/// Run `setup`; if it fails, run `undo` before handing back the setup error
fn undo_on_error<T>(
    setup: impl FnOnce() -> io::Result<T>,
    undo: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    setup().map_err(|e| {
        let _ = undo();
        e
    })
}

fn term_color(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

/// Crossterm-backed canvas drawing into the alternate screen
pub struct TerminalCanvas {
    width: u16,
    height: u16,
    back: Raster,
    /// What is currently on screen, for diffing
    front: Vec<Cell>,
}

impl TerminalCanvas {
    /// Initialize the terminal for drawing
    pub fn new() -> io::Result<Self> {
        let (width, height) = size()?;

        enable_raw_mode()?;
        undo_on_error(
            || execute!(stdout(), EnterAlternateScreen, Hide, SetTitle(TITLE), Clear(ClearType::All)),
            disable_raw_mode,
        )?;

        Ok(Self {
            width,
            height,
            back: Raster::new(width, height),
            front: Vec::new(),
        })
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u16, height: u16) -> io::Result<()> {
        self.width = width;
        self.height = height;
        self.back = Raster::new(width, height);
        self.front.clear();
        execute!(stdout(), Clear(ClearType::All))
    }

    /// Emit the cells that changed since the last frame
    fn render(&mut self) -> io::Result<()> {
        let cells = self.back.cells();
        let width = self.width as usize;
        let mut out = stdout();
        let mut pen: Option<(Rgb, Rgb, bool)> = None;

        for (i, cell) in cells.iter().enumerate() {
            if self.front.get(i) == Some(cell) {
                continue;
            }
            queue!(out, MoveTo((i % width) as u16, (i / width) as u16))?;

            let style = (cell.fg, cell.bg, cell.bold);
            if pen != Some(style) {
                queue!(
                    out,
                    SetAttribute(if cell.bold { Attribute::Bold } else { Attribute::NormalIntensity }),
                    SetForegroundColor(term_color(cell.fg)),
                    SetBackgroundColor(term_color(cell.bg))
                )?;
                pen = Some(style);
            }
            queue!(out, Print(cell.ch))?;
        }

        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        out.flush()?;
        self.front = cells;
        Ok(())
    }
}

impl Canvas for TerminalCanvas {
    fn set_background(&mut self, color: Rgb) {
        self.back.clear(color);
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb, width: f64) {
        self.back.draw_line(from, to, color, width);
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgb) {
        self.back.fill_polygon(points, color);
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Rgb) {
        self.back.fill_ellipse(center, rx, ry, color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.back.fill_rect(rect, color);
    }

    fn draw_text(&mut self, pos: Point, text: &str, size: u8) {
        self.back.draw_text(pos, text, size);
    }

    fn swap_buffers(&mut self) -> io::Result<()> {
        self.render()?;

        // Pick up a resize for the next frame
        let (width, height) = size()?;
        if (width, height) != (self.width, self.height) {
            self.resize(width, height)?;
        }
        Ok(())
    }

    /// Check for keypress (non-blocking)
    fn poll_key(&mut self) -> io::Result<Option<KeyCode>> {
        if poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = read()? {
                if key_event.kind == KeyEventKind::Press {
                    return Ok(Some(key_event.code));
                }
            }
        }
        Ok(None)
    }
}

impl Drop for TerminalCanvas {
    fn drop(&mut self) {
        let _ = execute!(stdout(), ResetColor, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}
