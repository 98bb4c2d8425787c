//! Quiz Rapids - progression core for a physics course racer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (checkpoints, respawn, hazards, quiz gates)
//! - `config`: Data-driven course description
//! - `error`: Course loading/validation errors

pub mod config;
pub mod error;
pub mod sim;

pub use config::CourseConfig;
pub use error::ConfigError;

use rand::{Rng, RngCore};

/// Course tuning constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Time the player is held at the respawn pose before physics resumes
    pub const RESPAWN_SETTLE_SECS: f32 = 1.5;
    /// Player falling below this height respawns them
    pub const FALL_THRESHOLD: f32 = -10.0;
    /// Default time budget between checkpoints
    pub const CHECKPOINT_TIME_LIMIT: f32 = 30.0;

    /// Identity tag for the player in trigger events
    pub const PLAYER_TAG: &str = "Player";
    /// Identity tag for trap colliders
    pub const TRAP_TAG: &str = "Trap";

    /// Hazard defaults
    pub const HAZARD_POOL_SIZE: usize = 20;
    pub const HAZARD_LIFETIME: f32 = 30.0;
    pub const HAZARD_DESPAWN_DEPTH: f32 = 200.0;
    pub const HAZARD_FORWARD_FORCE: f32 = 10.0;

    /// Extra gate pairs spawned beyond what fits on the segment
    pub const EXTRA_GATE_PAIRS: usize = 3;

    /// Upper bound on gate pairs in one chain, extras included
    pub const MAX_GATE_PAIRS: usize = 256;

    /// Linear obstacle reverses when this close to its target
    pub const OBSTACLE_ARRIVE_EPSILON: f32 = 0.1;
}

/// Uniform sample in `[min, max]`, collapsing to `min` for empty/inverted ranges
#[inline]
pub fn sample_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Whole seconds for a countdown readout (rounded up, never negative)
#[inline]
pub fn ceil_seconds(remaining: f32) -> u32 {
    remaining.max(0.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_sample_range_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let v = sample_range(&mut rng, 2.0, 5.0);
            assert!((2.0..=5.0).contains(&v));
        }
    }

    #[test]
    fn test_sample_range_degenerate() {
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(sample_range(&mut rng, 3.0, 3.0), 3.0);
        assert_eq!(sample_range(&mut rng, 4.0, 1.0), 4.0);
    }

    #[test]
    fn test_ceil_seconds() {
        assert_eq!(ceil_seconds(29.1), 30);
        assert_eq!(ceil_seconds(30.0), 30);
        assert_eq!(ceil_seconds(0.0), 0);
        assert_eq!(ceil_seconds(-2.5), 0);
    }
}
