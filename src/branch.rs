//! Fractal branch generator.
//!
//! Produces the whole tree for one frame as flat lists of draw records in
//! world space. Uses an explicit stack instead of recursion; nodes are
//! visited in the same pre-order a recursive walk would use, so leaf jitter
//! drawn from a seeded RNG is reproducible.

use crate::canvas::{colors, Point, Rgb};
use rand::Rng;

/// Every node fans into these children: (angle offset, length factor)
const CHILDREN: [(f64, f64); 3] = [(-0.3, 0.7), (0.3, 0.7), (0.0, 0.56)];

/// Depth the progress formula is calibrated against
const PROGRESS_DEPTH_REFERENCE: f64 = 8.0;

/// Nodes deeper than this are drawn as wood, the rest as green twigs
const WOOD_DEPTH: u32 = 4;
/// Nodes at or below this depth may carry leaves
const LEAF_DEPTH: u32 = 5;
const DENSE_LEAF_DEPTH: u32 = 3;
const LEAF_JITTER: i32 = 5;
const LEAF_RADIUS: f64 = 4.0;

const MIN_SCALE: f64 = 0.1;
const LEAF_MIN_SCALE: f64 = 0.5;
const LEAF_MIN_PROGRESS: f64 = 0.8;
const FLOWER_MIN_SCALE: f64 = 0.8;
const FLOWER_MIN_PROGRESS: f64 = 0.9;

/// One drawn branch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchSegment {
    pub from: Point,
    pub to: Point,
    pub depth: u32,
    pub width: f64,
    pub color: Rgb,
}

/// A round leaf decoration near a branch tip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leaf {
    pub center: Point,
    pub radius: f64,
}

/// Output of one generation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeGeometry {
    pub segments: Vec<BranchSegment>,
    pub leaves: Vec<Leaf>,
    /// Flower centers, in generation order
    pub flowers: Vec<Point>,
    /// Rightmost outermost tip seen during the pass
    pub rightmost_tip: Option<Point>,
}

/// Where and how large the tree is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub origin: Point,
    pub trunk_length: f64,
    /// Radians, counter-clockwise from the +x axis (pi/2 grows straight up)
    pub initial_angle: f64,
    pub max_depth: u32,
    pub scale: f64,
    pub growth_progress: f64,
}

/// Flower gating shared by every node of a pass
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BranchGenerator {
    pub show_flowers: bool,
    pub flower_scale: f64,
}

struct BranchTask {
    start: Point,
    length: f64,
    angle: f64,
    depth: u32,
}

/// Visibility of a node at `depth` for the given overall growth
pub fn branch_progress(growth_progress: f64, depth: u32) -> f64 {
    (growth_progress * 10.0 - (PROGRESS_DEPTH_REFERENCE - depth as f64)).clamp(0.0, 1.0)
}

impl BranchGenerator {
    pub fn new(show_flowers: bool, flower_scale: f64) -> Self {
        Self {
            show_flowers,
            flower_scale,
        }
    }

    /// Generate the tree described by `params`
    pub fn generate<R: Rng>(&self, params: &TreeParams, rng: &mut R) -> TreeGeometry {
        let mut geometry = TreeGeometry::default();
        let scale = params.scale;
        if scale <= MIN_SCALE {
            return geometry;
        }

        let mut stack: Vec<BranchTask> = Vec::with_capacity(64);
        stack.push(BranchTask {
            start: params.origin,
            length: params.trunk_length,
            angle: params.initial_angle,
            depth: params.max_depth,
        });

        while let Some(task) = stack.pop() {
            if task.depth == 0 {
                continue;
            }

            let progress = branch_progress(params.growth_progress, task.depth);
            if progress <= 0.0 {
                continue;
            }

            let scaled_length = task.length * scale * progress;
            let end = Point::new(
                task.start.x + scaled_length * task.angle.cos(),
                task.start.y - scaled_length * task.angle.sin(),
            );

            if task.depth == 1 && geometry.rightmost_tip.map_or(true, |tip| end.x > tip.x) {
                geometry.rightmost_tip = Some(end);
            }

            let thickness = (task.depth as f64 * scale).floor();
            let (color, width) = if task.depth > WOOD_DEPTH {
                (colors::BROWN, thickness + 1.0)
            } else {
                (colors::LEAF_GREEN, thickness.max(1.0))
            };
            geometry.segments.push(BranchSegment {
                from: task.start,
                to: end,
                depth: task.depth,
                width,
                color,
            });

            if task.depth <= LEAF_DEPTH && scale > LEAF_MIN_SCALE && progress > LEAF_MIN_PROGRESS {
                let count = if task.depth <= DENSE_LEAF_DEPTH { 3 } else { 2 };
                for _ in 0..count {
                    let dx = rng.gen_range(-LEAF_JITTER..LEAF_JITTER);
                    let dy = rng.gen_range(-LEAF_JITTER..LEAF_JITTER);
                    geometry.leaves.push(Leaf {
                        center: Point::new(end.x + dx as f64, end.y + dy as f64),
                        radius: LEAF_RADIUS * scale,
                    });
                }
            }

            if task.depth == 1
                && self.show_flowers
                && self.flower_scale > 0.0
                && scale > FLOWER_MIN_SCALE
                && progress > FLOWER_MIN_PROGRESS
            {
                geometry.flowers.push(end);
            }

            // Reversed so the first child is popped first
            for &(offset, factor) in CHILDREN.iter().rev() {
                stack.push(BranchTask {
                    start: end,
                    length: task.length * factor,
                    angle: task.angle + offset,
                    depth: task.depth - 1,
                });
            }
        }

        geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::FRAC_PI_2;

    fn params(scale: f64, growth: f64) -> TreeParams {
        TreeParams {
            origin: Point::new(400.0, 480.0),
            trunk_length: 150.0,
            initial_angle: FRAC_PI_2,
            max_depth: 8,
            scale,
            growth_progress: growth,
        }
    }

    fn nodes_at(max_depth: u32, depth: u32) -> usize {
        3usize.pow(max_depth - depth)
    }

    #[test]
    fn no_growth_emits_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = BranchGenerator::new(true, 1.0).generate(&params(1.0, 0.0), &mut rng);
        assert!(geometry.segments.is_empty());
        assert!(geometry.leaves.is_empty());
        assert!(geometry.flowers.is_empty());
        assert_eq!(geometry.rightmost_tip, None);
    }

    #[test]
    fn tiny_scale_emits_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = BranchGenerator::default().generate(&params(0.1, 1.0), &mut rng);
        assert!(geometry.segments.is_empty());
    }

    #[test]
    fn full_growth_reaches_outermost_depth() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = BranchGenerator::default().generate(&params(1.0, 1.0), &mut rng);

        let total: usize = (1..=8).map(|d| nodes_at(8, d)).sum();
        assert_eq!(geometry.segments.len(), total);
        assert_eq!(
            geometry.segments.iter().filter(|s| s.depth == 1).count(),
            nodes_at(8, 1)
        );
        assert!(branch_progress(1.0, 1) > 0.0);
    }

    #[test]
    fn partial_growth_grows_outward() {
        let mut rng = StdRng::seed_from_u64(1);
        // Progress: depth 8 -> 1.0, depth 7 -> 0.5, depth 6 -> 0
        let geometry = BranchGenerator::default().generate(&params(1.0, 0.15), &mut rng);
        assert_eq!(geometry.segments.len(), 4);
        assert!(geometry.segments.iter().all(|s| s.depth >= 7));
    }

    #[test]
    fn trunk_grows_straight_up() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = BranchGenerator::default().generate(&params(1.0, 1.0), &mut rng);
        let trunk = geometry.segments[0];
        assert_eq!(trunk.depth, 8);
        assert!((trunk.to.x - 400.0).abs() < 1e-9);
        assert!((trunk.to.y - 330.0).abs() < 1e-9);
        assert_eq!(trunk.color, colors::BROWN);
        assert_eq!(trunk.width, 9.0);
    }

    #[test]
    fn children_follow_parent_in_preorder() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = BranchGenerator::default().generate(&params(1.0, 1.0), &mut rng);
        let trunk = geometry.segments[0];
        let first_child = geometry.segments[1];
        assert_eq!(first_child.depth, 7);
        assert_eq!(first_child.from, trunk.to);
        // angle pi/2 - 0.3 leans right
        assert!(first_child.to.x > trunk.to.x);
        let expected_len = 150.0 * 0.7;
        let len = ((first_child.to.x - first_child.from.x).powi(2)
            + (first_child.to.y - first_child.from.y).powi(2))
        .sqrt();
        assert!((len - expected_len).abs() < 1e-9);
    }

    #[test]
    fn rightmost_tip_is_max_outermost_end() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = BranchGenerator::default().generate(&params(1.0, 1.0), &mut rng);
        let max_x = geometry
            .segments
            .iter()
            .filter(|s| s.depth == 1)
            .map(|s| s.to.x)
            .fold(f64::MIN, f64::max);
        let tip = geometry.rightmost_tip.unwrap();
        assert_eq!(tip.x, max_x);
        assert!(geometry
            .segments
            .iter()
            .any(|s| s.depth == 1 && s.to == tip));
    }

    #[test]
    fn flowers_only_on_outermost_tips_when_enabled() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = BranchGenerator::new(true, 0.5).generate(&params(1.0, 1.0), &mut rng);
        assert_eq!(geometry.flowers.len(), nodes_at(8, 1));
        let tips: Vec<Point> = geometry
            .segments
            .iter()
            .filter(|s| s.depth == 1)
            .map(|s| s.to)
            .collect();
        assert_eq!(geometry.flowers, tips);

        let mut rng = StdRng::seed_from_u64(1);
        let hidden = BranchGenerator::new(false, 1.0).generate(&params(1.0, 1.0), &mut rng);
        assert!(hidden.flowers.is_empty());

        let mut rng = StdRng::seed_from_u64(1);
        let closed = BranchGenerator::new(true, 0.0).generate(&params(1.0, 1.0), &mut rng);
        assert!(closed.flowers.is_empty());

        let mut rng = StdRng::seed_from_u64(1);
        let small = BranchGenerator::new(true, 1.0).generate(&params(0.8, 1.0), &mut rng);
        assert!(small.flowers.is_empty());
    }

    #[test]
    fn leaves_counted_per_depth() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = BranchGenerator::default().generate(&params(1.0, 1.0), &mut rng);
        let expected: usize = (1..=LEAF_DEPTH)
            .map(|d| nodes_at(8, d) * if d <= DENSE_LEAF_DEPTH { 3 } else { 2 })
            .sum();
        assert_eq!(geometry.leaves.len(), expected);
        assert!(geometry.leaves.iter().all(|l| (l.radius - 4.0).abs() < 1e-9));
    }

    #[test]
    fn no_leaves_on_small_trees() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = BranchGenerator::default().generate(&params(0.5, 1.0), &mut rng);
        assert!(!geometry.segments.is_empty());
        assert!(geometry.leaves.is_empty());
    }

    #[test]
    fn leaf_jitter_is_bounded_and_reproducible() {
        let generator = BranchGenerator::default();
        let a = generator.generate(&params(1.0, 1.0), &mut StdRng::seed_from_u64(42));
        let b = generator.generate(&params(1.0, 1.0), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);

        let ends: Vec<Point> = a.segments.iter().filter(|s| s.depth <= LEAF_DEPTH).map(|s| s.to).collect();
        for leaf in &a.leaves {
            assert!(ends.iter().any(|e| {
                (leaf.center.x - e.x).abs() <= 5.0 && (leaf.center.y - e.y).abs() <= 5.0
            }));
        }
    }

    #[test]
    fn branch_progress_is_clamped() {
        assert_eq!(branch_progress(0.0, 8), 0.0);
        assert_eq!(branch_progress(1.0, 8), 1.0);
        assert_eq!(branch_progress(0.75, 1), 0.5);
        assert_eq!(branch_progress(5.0, 1), 1.0);
    }
}
