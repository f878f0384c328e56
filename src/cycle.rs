//! Fixed-cadence loop: poll input, tick the life cycle, compose and present
//! a frame, then sleep out the rest of the frame interval.

use crate::canvas::Canvas;
use crate::config::CycleConfig;
use crate::render::{draw_frame, SkyClock};
use crate::state::LifeCycle;
use crate::terminal::TerminalCanvas;
use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use std::io;
use std::time::Instant;
use tracing::info;

/// What a keypress asks the loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Exit,
    Restart,
}

pub fn control_for(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Control::Exit),
        KeyCode::Char(' ') => Some(Control::Restart),
        _ => None,
    }
}

/// Run the animation in the terminal until the user exits
pub fn run(config: CycleConfig) -> Result<()> {
    let mut canvas = TerminalCanvas::new().context("failed to initialize terminal canvas")?;
    let (cols, rows) = canvas.size();
    info!(cols, rows, fps = config.fps, "terminal canvas ready");

    let frames = run_loop(&mut canvas, &config).context("animation loop failed")?;
    info!(frames, "animation stopped");
    Ok(())
}

/// Drive any canvas until an exit key arrives. Returns the number of frames
/// presented.
pub fn run_loop<C: Canvas>(canvas: &mut C, config: &CycleConfig) -> io::Result<u64> {
    let seed = config.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0) // Fallback seed for misconfigured system clocks
    });
    info!(seed, "starting life cycle");

    let mut cycle = LifeCycle::new(seed);
    let mut sky = SkyClock::new();
    let frame_interval = config.frame_interval();
    let mut last = Instant::now();
    let mut frames = 0u64;

    loop {
        let frame_start = Instant::now();

        if let Some(code) = canvas.poll_key()? {
            match control_for(code) {
                Some(Control::Exit) => {
                    info!(frames, "exit requested");
                    break;
                }
                Some(Control::Restart) => {
                    info!("restart requested");
                    cycle.reset();
                }
                None => {}
            }
        }

        cycle.tick();

        let now = Instant::now();
        sky.advance(now - last);
        last = now;

        draw_frame(canvas, &cycle, &sky, config.hud);
        canvas.swap_buffers()?;
        frames += 1;

        if let Some(rest) = frame_interval.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::recording::{DrawCall, RecordingCanvas};

    fn fast_config() -> CycleConfig {
        CycleConfig {
            seed: Some(5),
            fps: 120,
            hud: true,
        }
    }

    #[test]
    fn key_mapping() {
        assert_eq!(control_for(KeyCode::Esc), Some(Control::Exit));
        assert_eq!(control_for(KeyCode::Char('q')), Some(Control::Exit));
        assert_eq!(control_for(KeyCode::Char(' ')), Some(Control::Restart));
        assert_eq!(control_for(KeyCode::Char('x')), None);
        assert_eq!(control_for(KeyCode::Enter), None);
    }

    #[test]
    fn exit_key_stops_before_drawing() {
        let mut canvas = RecordingCanvas::with_keys([Some(KeyCode::Esc)]);
        let frames = run_loop(&mut canvas, &fast_config()).unwrap();
        assert_eq!(frames, 0);
        assert_eq!(canvas.swaps, 0);
    }

    #[test]
    fn presents_one_frame_per_tick() {
        let mut canvas = RecordingCanvas::with_keys([None, None, None, Some(KeyCode::Esc)]);
        let frames = run_loop(&mut canvas, &fast_config()).unwrap();
        assert_eq!(frames, 3);
        assert_eq!(canvas.swaps, 3);
        assert!(canvas.calls.is_empty());
        assert!(matches!(canvas.presented.first(), Some(DrawCall::Background(_))));
    }

    #[test]
    fn restart_returns_to_germination() {
        // 30 ticks reaches the seedling phase; restart then shows phase 1 again
        let mut keys: Vec<Option<KeyCode>> = vec![None; 30];
        keys.push(Some(KeyCode::Char(' ')));
        keys.push(Some(KeyCode::Esc));
        let mut canvas = RecordingCanvas::with_keys(keys);
        run_loop(&mut canvas, &fast_config()).unwrap();

        let title = canvas.presented.iter().find_map(|c| match c {
            DrawCall::Text { text, size: 2, .. } => Some(text.clone()),
            _ => None,
        });
        assert_eq!(title.as_deref(), Some("Phase 1: Seed Germination"));
    }

    #[test]
    fn restart_mid_dispersal_drops_seed_and_camera() {
        use crate::canvas::{colors, Point, SURFACE_HEIGHT, SURFACE_WIDTH};
        use crate::phase::AnimationPhase;
        use crate::state::GROUND_LEVEL;

        const TICKS: usize = 120;

        // Same seed, same schedule: the loop is mid-fall when Space arrives
        let mut reference = LifeCycle::new(5);
        for _ in 0..TICKS {
            reference.tick();
        }
        assert_eq!(reference.phase(), AnimationPhase::Dispersal);
        assert!(reference.seeds().is_airborne());
        assert!(reference.camera().zoom > 1.0);

        let mut keys: Vec<Option<KeyCode>> = vec![None; TICKS];
        keys.push(Some(KeyCode::Char(' ')));
        keys.push(Some(KeyCode::Esc));
        let mut canvas = RecordingCanvas::with_keys(keys);
        let frames = run_loop(&mut canvas, &fast_config()).unwrap();
        assert_eq!(frames, TICKS as u64 + 1);

        let frame = &canvas.presented;
        let title = frame.iter().find_map(|c| match c {
            DrawCall::Text { text, size: 2, .. } => Some(text.as_str()),
            _ => None,
        });
        assert_eq!(title, Some("Phase 1: Seed Germination"));

        // Identity camera: the soil line sits at world ground level
        let soil_top = frame.iter().find_map(|c| match c {
            DrawCall::Rect { rect, color } if *color == colors::DARK_BROWN => Some(rect.top),
            _ => None,
        });
        assert_eq!(soil_top, Some(GROUND_LEVEL));

        // Only the buried seed is drawn, and nothing sits at screen center
        let center = Point::new(SURFACE_WIDTH / 2.0, SURFACE_HEIGHT / 2.0);
        let seeds: Vec<&Vec<Point>> = frame
            .iter()
            .filter_map(|c| match c {
                DrawCall::Polygon { points, .. } => Some(points),
                _ => None,
            })
            .collect();
        assert_eq!(seeds.len(), 1);
        let n = seeds[0].len() as f64;
        let cy = seeds[0].iter().map(|p| p.y).sum::<f64>() / n;
        assert!((cy - center.y).abs() > 100.0);
        assert!(!frame
            .iter()
            .any(|c| matches!(c, DrawCall::Line { color, .. } if *color == colors::BROWN)));
    }
}
