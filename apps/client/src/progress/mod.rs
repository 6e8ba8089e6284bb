//! Progress Simulation: cosmetic feedback while the analyzer works.
//!
//! The analyzer exposes no progress channel, so the value here is an approximation
//! with no backing truth. The simulator itself is a plain state machine
//! (`Idle → Running → Settling → Idle`); ticks are delivered by whoever owns it
//! (the session's ticker task in production, the test directly in unit tests), and
//! randomness comes from an injected `RandomSource`.

pub mod milestones;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

pub use milestones::{active_label, project_milestones, Milestone, MilestoneStatus};

/// Ticks stop advancing once the value reaches this plateau.
pub const PLATEAU: f64 = 90.0;
/// Ticks never push the value past this point, so the plateau itself is only
/// crossed by `complete()`.
pub const TICK_CEILING: f64 = 89.5;
/// Upper bound (exclusive) of a single tick's increment.
pub const MAX_INCREMENT: f64 = 15.0;
pub const COMPLETE: f64 = 100.0;

/// Uniform draws for the simulator. Injected so tests are deterministic.
pub trait RandomSource: Send {
    /// Returns a value drawn uniformly from `[0, upper)`.
    fn sample(&mut self, upper: f64) -> f64;
}

/// Production random source backed by a seeded `StdRng`.
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn sample(&mut self, upper: f64) -> f64 {
        if upper <= 0.0 {
            return 0.0;
        }
        self.0.gen_range(0.0..upper)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressPhase {
    Idle,
    Running { value: f64 },
    /// The request settled; the bar shows 100% until the display hold ends.
    Settling,
}

#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    phase: ProgressPhase,
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSimulator {
    pub fn new() -> Self {
        Self {
            phase: ProgressPhase::Idle,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> ProgressPhase {
        self.phase
    }

    /// Current value, or `None` once the value has been discarded.
    pub fn value(&self) -> Option<f64> {
        match self.phase {
            ProgressPhase::Idle => None,
            ProgressPhase::Running { value } => Some(value),
            ProgressPhase::Settling => Some(COMPLETE),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, ProgressPhase::Running { .. })
    }

    pub fn is_idle(&self) -> bool {
        self.phase == ProgressPhase::Idle
    }

    /// Starts a fresh run at 0. A run already in progress is replaced.
    pub fn start(&mut self) {
        if !self.is_idle() {
            debug!("Progress simulator restarted while {:?}", self.phase);
        }
        self.phase = ProgressPhase::Running { value: 0.0 };
    }

    /// Advances a running simulation by one tick. Returns the new value, or `None`
    /// when the simulator is not running (late ticks are inert).
    pub fn tick(&mut self, random: &mut dyn RandomSource) -> Option<f64> {
        let ProgressPhase::Running { value } = self.phase else {
            return None;
        };
        if value >= PLATEAU {
            return Some(value);
        }
        let next = (value + random.sample(MAX_INCREMENT)).min(TICK_CEILING).max(value);
        self.phase = ProgressPhase::Running { value: next };
        Some(next)
    }

    /// Finishes the run: the value jumps to 100 and stays there until
    /// `finish_hold`. Returns false if nothing was running.
    pub fn complete(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = ProgressPhase::Settling;
        true
    }

    /// Ends the display hold after `complete`.
    pub fn finish_hold(&mut self) -> bool {
        if self.phase != ProgressPhase::Settling {
            return false;
        }
        self.phase = ProgressPhase::Idle;
        true
    }

    /// Abrupt cancellation: discards the value with no hold.
    pub fn stop(&mut self) {
        self.phase = ProgressPhase::Idle;
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Sequence;
    use super::*;

    fn running(random: &mut dyn RandomSource, ticks: usize) -> ProgressSimulator {
        let mut sim = ProgressSimulator::new();
        sim.start();
        for _ in 0..ticks {
            sim.tick(random);
        }
        sim
    }

    #[test]
    fn test_start_begins_at_zero() {
        let mut sim = ProgressSimulator::new();
        assert_eq!(sim.value(), None);
        sim.start();
        assert_eq!(sim.value(), Some(0.0));
    }

    #[test]
    fn test_ticks_advance_by_sampled_increment() {
        let mut random = Sequence::new(&[14.0, 14.0, 14.0]);
        let sim = running(&mut random, 3);
        assert_eq!(sim.value(), Some(42.0));
    }

    #[test]
    fn test_ticks_clamp_below_plateau() {
        let mut random = Sequence::constant(14.5);
        let mut sim = running(&mut random, 6);
        assert_eq!(sim.value(), Some(87.0));
        assert_eq!(sim.tick(&mut random), Some(TICK_CEILING));
        for _ in 0..20 {
            assert_eq!(sim.tick(&mut random), Some(TICK_CEILING));
        }
        assert!(sim.value().unwrap() < PLATEAU);
    }

    #[test]
    fn test_tick_at_plateau_is_noop() {
        let mut sim = ProgressSimulator {
            phase: ProgressPhase::Running { value: PLATEAU },
        };
        assert_eq!(sim.tick(&mut Sequence::constant(10.0)), Some(PLATEAU));
        assert_eq!(sim.value(), Some(PLATEAU));
    }

    #[test]
    fn test_seeded_random_is_non_decreasing_and_bounded() {
        let mut random = StdRandom::seeded(7);
        let mut sim = ProgressSimulator::new();
        sim.start();
        let mut previous = 0.0;
        for _ in 0..200 {
            let value = sim.tick(&mut random).unwrap();
            assert!(value >= previous, "{value} < {previous}");
            assert!(value < PLATEAU, "{value} reached the plateau");
            previous = value;
        }
    }

    #[test]
    fn test_std_random_stays_in_range() {
        let mut random = StdRandom::seeded(42);
        for _ in 0..1_000 {
            let v = random.sample(MAX_INCREMENT);
            assert!((0.0..MAX_INCREMENT).contains(&v), "{v}");
        }
        assert_eq!(random.sample(0.0), 0.0);
    }

    #[test]
    fn test_complete_jumps_to_hundred_then_holds() {
        let mut random = Sequence::constant(5.0);
        let mut sim = running(&mut random, 4);
        assert!(sim.complete());
        assert_eq!(sim.value(), Some(COMPLETE));
        assert_eq!(sim.phase(), ProgressPhase::Settling);
        // Ticks during the hold change nothing.
        assert_eq!(sim.tick(&mut random), None);
        assert_eq!(sim.value(), Some(COMPLETE));
        assert!(sim.finish_hold());
        assert!(sim.is_idle());
        assert_eq!(sim.value(), None);
    }

    #[test]
    fn test_complete_when_idle_is_rejected() {
        let mut sim = ProgressSimulator::new();
        assert!(!sim.complete());
        assert!(!sim.finish_hold());
    }

    #[test]
    fn test_stop_discards_without_hold() {
        let mut random = Sequence::constant(5.0);
        let mut sim = running(&mut random, 2);
        sim.stop();
        assert!(sim.is_idle());
        assert_eq!(sim.tick(&mut random), None);
        assert_eq!(sim.value(), None);
    }

    #[test]
    fn test_restart_replaces_stale_run() {
        let mut random = Sequence::constant(10.0);
        let mut sim = running(&mut random, 3);
        sim.start();
        assert_eq!(sim.value(), Some(0.0));
    }
}
