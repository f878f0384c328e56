//! Timed phase machine driving the life cycle.
//!
//! Durations are measured in accumulated timer units, not wall time. The
//! controller is a plain value: `advance` returns the next controller plus
//! the side effects the owner must apply.

/// Timer units added per scheduler tick
pub const TICK_STEP: u32 = 2;

const GERMINATION_TICKS: u32 = 40;
/// Seedling length; also the denominator of the seedling leaf progress
pub const SEEDLING_TICKS: u32 = 60;
const GROWTH_TICKS: u32 = 100;
const FLOWERING_TICKS: u32 = 25;
/// How long Dispersal holds on the landed seed before resetting
pub const DISPERSAL_SETTLE_TICKS: u32 = 90;
/// Reset length; also the camera zoom-out duration
pub const RESET_TICKS: u32 = 50;

/// Upper bound of the growth scale reached during the seedling phase
pub const SEEDLING_GROWTH_CAP: f64 = 0.15;
const SEEDLING_GROWTH_DIVISOR: f64 = 400.0;

/// Seedling timer value after which the tree starts fading in over the stem
const TREE_FADE_START: u32 = 50;
const TREE_FADE_TICKS: f64 = 10.0;

/// Stage of the life cycle. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Germination,
    Seedling,
    Growth,
    Flowering,
    Dispersal,
    Reset,
}

impl AnimationPhase {
    /// The phase that follows this one; Reset wraps to Germination
    pub fn next(self) -> Self {
        match self {
            Self::Germination => Self::Seedling,
            Self::Seedling => Self::Growth,
            Self::Growth => Self::Flowering,
            Self::Flowering => Self::Dispersal,
            Self::Dispersal => Self::Reset,
            Self::Reset => Self::Germination,
        }
    }

    /// HUD caption
    pub fn title(self) -> &'static str {
        match self {
            Self::Germination => "Phase 1: Seed Germination",
            Self::Seedling => "Phase 2: Seedling (Leaves)",
            Self::Growth => "Phase 3: Tree Growth",
            Self::Flowering => "Phase 4: Flowering",
            Self::Dispersal => "Phase 5: Seed Dispersal",
            Self::Reset => "Phase 6: Cycle Reset",
        }
    }
}

/// Growth state read by the branch generator and renderer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GrowthParameters {
    pub tree_growth_scale: f64,
    pub flower_scale: f64,
    pub show_flowers: bool,
}

/// Work the owner of the controller must carry out after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEffect {
    /// Release a seed from the flower anchor
    SpawnSeed,
    /// Reinitialize all animation state
    ResetCycle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseController {
    phase: AnimationPhase,
    timer: u32,
    /// Timer units spent in Dispersal since the seed landed
    settle: u32,
    growth: GrowthParameters,
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseController {
    pub fn new() -> Self {
        Self {
            phase: AnimationPhase::Germination,
            timer: 0,
            settle: 0,
            growth: GrowthParameters::default(),
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn growth(&self) -> GrowthParameters {
        self.growth
    }

    /// Advance the timer and apply the current phase's policy.
    ///
    /// `seed_airborne` is the dispersed seed's state after this tick's
    /// physics step; it only matters during Dispersal.
    pub fn advance(&self, tick_delta: u32, seed_airborne: bool) -> (Self, Vec<PhaseEffect>) {
        let mut next = *self;
        next.timer = self.timer.saturating_add(tick_delta);
        let t = next.timer;

        match next.phase {
            AnimationPhase::Germination => {
                if t < GERMINATION_TICKS {
                    next.growth.tree_growth_scale = 0.0;
                } else {
                    next = next.enter_next();
                }
            }
            AnimationPhase::Seedling => {
                if t < SEEDLING_TICKS {
                    next.growth.tree_growth_scale =
                        (t as f64 / SEEDLING_GROWTH_DIVISOR).min(SEEDLING_GROWTH_CAP);
                } else {
                    next = next.enter_next();
                }
            }
            AnimationPhase::Growth => {
                if t < GROWTH_TICKS {
                    next.growth.tree_growth_scale = SEEDLING_GROWTH_CAP
                        + ramp(t, GROWTH_TICKS) * (1.0 - SEEDLING_GROWTH_CAP);
                } else {
                    next.growth.tree_growth_scale = 1.0;
                    next.growth.show_flowers = true;
                    next = next.enter_next();
                }
            }
            AnimationPhase::Flowering => {
                if t < FLOWERING_TICKS {
                    next.growth.flower_scale = ramp(t, FLOWERING_TICKS);
                } else {
                    next.growth.flower_scale = 1.0;
                    return (next.enter_next(), vec![PhaseEffect::SpawnSeed]);
                }
            }
            AnimationPhase::Dispersal => {
                if !seed_airborne {
                    next.settle = next.settle.saturating_add(tick_delta);
                    if next.settle > DISPERSAL_SETTLE_TICKS {
                        next = next.enter_next();
                    }
                }
            }
            AnimationPhase::Reset => {
                if t < RESET_TICKS {
                    let fade = 1.0 - ramp(t, RESET_TICKS);
                    next.growth.tree_growth_scale = fade;
                    next.growth.flower_scale = fade;
                } else {
                    return (Self::new(), vec![PhaseEffect::ResetCycle]);
                }
            }
        }

        (next, Vec::new())
    }

    /// Multiplier applied to the tree while it morphs out of the seedling
    /// stem, or `None` when the tree is not drawn at all.
    pub fn tree_blend(&self) -> Option<f64> {
        match self.phase {
            AnimationPhase::Germination => None,
            AnimationPhase::Seedling if self.timer > TREE_FADE_START => {
                Some(((self.timer - TREE_FADE_START) as f64 / TREE_FADE_TICKS).min(1.0))
            }
            AnimationPhase::Seedling => None,
            _ => Some(1.0),
        }
    }

    fn enter_next(self) -> Self {
        Self {
            phase: self.phase.next(),
            timer: 0,
            settle: 0,
            growth: self.growth,
        }
    }
}

/// Linear 0..1 ramp over `duration` timer units, clamped
pub fn ramp(timer: u32, duration: u32) -> f64 {
    if duration == 0 {
        return 1.0;
    }
    (timer as f64 / duration as f64).clamp(0.0, 1.0)
}
