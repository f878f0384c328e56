use crate::settings::Settings;
use std::time::Duration;

pub const DEFAULT_FPS: u32 = 30;
const MAX_FPS: u32 = 120;

/// Runtime configuration for the animation loop
#[derive(Clone, Debug, PartialEq)]
pub struct CycleConfig {
    /// Leaf jitter seed; time-based when absent
    pub seed: Option<u64>,
    pub fps: u32,
    /// Show the phase caption and key hints
    pub hud: bool,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fps: DEFAULT_FPS,
            hud: true,
        }
    }
}

impl CycleConfig {
    /// Merge command-line values over the settings file. CLI wins.
    pub fn resolve(seed: Option<u64>, fps: Option<u32>, no_hud: bool, settings: &Settings) -> Self {
        let file = &settings.cycle;
        Self {
            seed: seed.or(file.seed),
            fps: fps.or(file.fps).unwrap_or(DEFAULT_FPS).clamp(1, MAX_FPS),
            hud: !no_hud && file.hud.unwrap_or(true),
        }
    }

    /// Target time per frame (33 ms at the default 30 Hz)
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.fps.max(1) as u64)
    }
}
