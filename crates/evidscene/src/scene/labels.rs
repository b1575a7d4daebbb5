//! Greedy floating-label stacking.
//!
//! Labels are placed in input order. A candidate collides with a placed
//! label when both its horizontal and vertical separation fall below the
//! thresholds; it then moves up one label height and is re-checked against
//! every placed label. First-placed labels never move, so the result is
//! order dependent and not globally optimal. Worst case O(n²) per call.

use nalgebra::Point3;

use crate::error::{Error, Result};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LabelStackConfig {
    /// Vertical gap between a box's top edge and its label.
    pub gap: f64,
    /// Labels closer than this horizontally may collide.
    pub horizontal_threshold: f64,
    /// Label height: vertical collision threshold and upward step.
    pub label_height: f64,
}

impl Default for LabelStackConfig {
    fn default() -> Self {
        Self {
            gap: 0.2,
            horizontal_threshold: 0.5,
            label_height: 0.3,
        }
    }
}

impl LabelStackConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.label_height.is_finite() && self.label_height > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "label height must be positive, got {}",
                self.label_height
            )));
        }
        if !(self.horizontal_threshold.is_finite() && self.horizontal_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "horizontal label threshold must be non-negative, got {}",
                self.horizontal_threshold
            )));
        }
        if !self.gap.is_finite() {
            return Err(Error::InvalidConfig("label gap must be finite".into()));
        }
        Ok(())
    }
}

/// Final position of one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    /// Proposed position before collision resolution.
    pub initial: Point3<f64>,
    /// Collision-free position.
    pub position: Point3<f64>,
    /// Number of upward steps taken.
    pub steps: u32,
}

impl LabelPlacement {
    pub fn was_shifted(&self) -> bool {
        self.steps > 0
    }
}

#[derive(Debug, Clone, Copy)]
struct PlacedLabel {
    position: Point3<f64>,
    base_y: f64,
    steps: u32,
}

/// Placement ledger for one projection pass.
#[derive(Debug)]
pub struct LabelStacker<'a> {
    config: &'a LabelStackConfig,
    placed: Vec<PlacedLabel>,
}

impl<'a> LabelStacker<'a> {
    pub fn new(config: &'a LabelStackConfig) -> Self {
        Self {
            config,
            placed: Vec::new(),
        }
    }

    /// Resolve `initial` against all placed labels and record the result.
    ///
    /// Each placed label can block at most two consecutive steps, so the
    /// search ends within `2n + 1` steps. It also ends, leaving the overlap
    /// in place, once a step no longer changes `y` in f64.
    pub fn place(&mut self, initial: Point3<f64>) -> LabelPlacement {
        let step = self.config.label_height;
        let limit = 2 * self.placed.len() as u32 + 1;
        let mut position = initial;
        let mut steps = 0u32;
        if step > 0.0 {
            while self.collides(&position, initial.y, steps) {
                let next_y = initial.y + f64::from(steps + 1) * step;
                if steps >= limit || next_y == position.y {
                    tracing::warn!(
                        "Label at ({:.3}, {:.3}) could not be separated after {} steps",
                        position.x,
                        position.y,
                        steps
                    );
                    break;
                }
                steps += 1;
                position.y = next_y;
            }
        }
        self.placed.push(PlacedLabel {
            position,
            base_y: initial.y,
            steps,
        });
        LabelPlacement {
            initial,
            position,
            steps,
        }
    }

    pub fn placed(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.placed.iter().map(|p| p.position)
    }

    fn collides(&self, candidate: &Point3<f64>, base_y: f64, steps: u32) -> bool {
        let h = self.config.horizontal_threshold;
        let v = self.config.label_height;
        self.placed.iter().any(|p| {
            if (candidate.x - p.position.x).abs() >= h {
                return false;
            }
            // Same base: whole steps apart, whatever `base + k * v` rounds to.
            if p.base_y == base_y {
                return p.steps == steps;
            }
            (candidate.y - p.position.y).abs() < v
        })
    }
}

/// Stack a batch of proposed label positions in order.
pub fn stack_labels(initial: &[Point3<f64>], config: &LabelStackConfig) -> Vec<LabelPlacement> {
    let mut stacker = LabelStacker::new(config);
    initial.iter().map(|&p| stacker.place(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn cfg(h: f64, step: f64) -> LabelStackConfig {
        LabelStackConfig {
            gap: 0.2,
            horizontal_threshold: h,
            label_height: step,
        }
    }

    #[test]
    fn identical_labels_stack_upward_in_order() {
        let initial = [Point3::new(0.0, 1.0, -3.0); 3];
        let out = stack_labels(&initial, &cfg(0.5, 0.3));
        let ys: Vec<f64> = out.iter().map(|p| p.position.y).collect();
        assert_relative_eq!(ys[0], 1.0);
        assert_relative_eq!(ys[1], 1.3, epsilon = 1e-12);
        assert_relative_eq!(ys[2], 1.6, epsilon = 1e-12);
        assert_eq!(out.iter().map(|p| p.steps).collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    fn horizontally_separated_labels_do_not_move() {
        let initial = [Point3::new(0.0, 1.0, 0.0), Point3::new(0.6, 1.0, 0.0)];
        let out = stack_labels(&initial, &cfg(0.5, 0.3));
        assert!(!out[1].was_shifted());
    }

    #[test]
    fn shifted_label_rechecks_all_placed() {
        // Second label moves off the first straight into the third's slot.
        let initial = [
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 1.3, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let out = stack_labels(&initial, &cfg(0.5, 0.3));
        assert!(!out[1].was_shifted());
        assert_relative_eq!(out[2].position.y, 1.6, epsilon = 1e-12);
        assert_eq!(out[2].steps, 2);
    }

    #[test]
    fn first_label_never_moves() {
        let initial = [Point3::new(2.0, -1.0, 0.0), Point3::new(2.0, -1.1, 0.0)];
        let out = stack_labels(&initial, &cfg(0.5, 0.3));
        assert_eq!(out[0].position, initial[0]);
        assert!(out[1].position.y > initial[0].y);
    }

    #[test]
    fn random_layouts_are_collision_free() {
        let config = LabelStackConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let initial: Vec<Point3<f64>> = (0..40)
                .map(|_| Point3::new(rng.gen_range(-2.0..2.0), rng.gen_range(0.0..2.0), -3.0))
                .collect();
            let out = stack_labels(&initial, &config);
            for (i, a) in out.iter().enumerate() {
                for b in &out[i + 1..] {
                    let dx = (a.position.x - b.position.x).abs();
                    let dy = (a.position.y - b.position.y).abs();
                    assert!(
                        dx >= config.horizontal_threshold - 1e-6 || dy >= config.label_height - 1e-6,
                        "labels overlap: {a:?} {b:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn near_threshold_separation_still_collides() {
        let initial = [Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 1.3 - 5e-10, 0.0)];
        let out = stack_labels(&initial, &cfg(0.5, 0.3));
        assert!(out[1].was_shifted());
        assert!(out[1].position.y - out[0].position.y >= 0.3);

        let initial = [Point3::new(0.0, 1.0, 0.0), Point3::new(0.5 - 5e-10, 1.0, 0.0)];
        assert!(stack_labels(&initial, &cfg(0.5, 0.3))[1].was_shifted());
    }

    #[test]
    fn separation_at_threshold_is_clear() {
        let initial = [Point3::new(0.0, 1.0, 0.0), Point3::new(0.5, 1.0, 0.0)];
        assert!(!stack_labels(&initial, &cfg(0.5, 0.3))[1].was_shifted());
    }

    #[test]
    fn unresolvable_height_terminates() {
        // 1e17 + 0.3 == 1e17 in f64: stepping cannot make progress.
        let initial = [Point3::new(0.0, 1e17, 0.0); 3];
        let out = stack_labels(&initial, &cfg(0.5, 0.3));
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|p| p.position.y == 1e17));
    }

    #[test]
    fn non_positive_height_rejected() {
        assert!(cfg(0.5, 0.0).validate().is_err());
        assert!(LabelStackConfig::default().validate().is_ok());
    }
}
