//! Course description
//!
//! Everything placed in a level (checkpoints, spawners, obstacles, gate chains)
//! as plain serde data, loaded from JSON. Components reference checkpoints by
//! their index in `checkpoints`.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::checkpoint::CheckpointId;
use crate::sim::gating::CheckpointGating;
use crate::sim::obstacle::ObstacleMotion;
use crate::sim::question::QuestionContent;

/// Top-level course description
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CourseConfig {
    /// Seed for spawn timing/placement
    pub seed: u64,
    pub progression: ProgressionConfig,
    /// Checkpoints in course order
    pub checkpoints: Vec<CheckpointConfig>,
    pub spawners: Vec<SpawnerConfig>,
    pub obstacles: Vec<ObstacleConfig>,
    pub gate_chains: Vec<GateChainConfig>,
    pub tutorials: Vec<TutorialConfig>,
}

/// Timer, fall and respawn tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Player below this height respawns
    pub fall_threshold: f32,
    /// Seconds held at the respawn pose
    pub respawn_settle_secs: f32,
    /// Tag identifying the player in trigger events
    pub player_tag: String,
    /// Tag identifying trap colliders
    pub trap_tag: String,
    /// Make the first checkpoint current when the course starts
    pub start_at_first_checkpoint: bool,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            fall_threshold: FALL_THRESHOLD,
            respawn_settle_secs: RESPAWN_SETTLE_SECS,
            player_tag: PLAYER_TAG.to_string(),
            trap_tag: TRAP_TAG.to_string(),
            start_at_first_checkpoint: true,
        }
    }
}

/// One checkpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Respawn position
    pub position: Vec3,
    /// Respawn orientation
    pub rotation: Quat,
    /// Seconds to reach the next checkpoint
    pub time_limit: f32,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            time_limit: CHECKPOINT_TIME_LIMIT,
        }
    }
}

/// Hazard spawner placement and tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Spawner center
    pub position: Vec3,
    /// World-space width of the spawner footprint along X
    pub footprint_width: f32,
    /// Scales the horizontal release range
    pub horizontal_range_multiplier: f32,
    pub min_spawn_time: f32,
    pub max_spawn_time: f32,
    pub min_height_offset: f32,
    pub max_height_offset: f32,
    /// Hazards allocated up front
    pub pool_size: usize,
    /// Allocate more when the pool runs dry
    pub can_grow: bool,
    /// Seconds before a released hazard is retired
    pub lifetime: f32,
    /// Distance below the spawner at which a hazard is retired
    pub despawn_depth: f32,
    /// Constant push along -Z on active hazards
    pub forward_force: f32,
    pub start_checkpoints: Vec<u32>,
    pub end_checkpoints: Vec<u32>,
    pub active_by_default: bool,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            footprint_width: 1.0,
            horizontal_range_multiplier: 1.0,
            min_spawn_time: 2.0,
            max_spawn_time: 5.0,
            min_height_offset: 2.0,
            max_height_offset: 10.0,
            pool_size: HAZARD_POOL_SIZE,
            can_grow: true,
            lifetime: HAZARD_LIFETIME,
            despawn_depth: HAZARD_DESPAWN_DEPTH,
            forward_force: HAZARD_FORWARD_FORCE,
            start_checkpoints: Vec::new(),
            end_checkpoints: Vec::new(),
            active_by_default: false,
        }
    }
}

/// Moving obstacle placement and tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObstacleConfig {
    pub position: Vec3,
    pub move_speed: f32,
    /// Travel to each side of `position`
    pub move_distance: f32,
    pub start_moving_right: bool,
    pub motion: ObstacleMotion,
    pub start_checkpoints: Vec<u32>,
    pub end_checkpoints: Vec<u32>,
    pub active_by_default: bool,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            move_speed: 3.0,
            move_distance: 5.0,
            start_moving_right: true,
            motion: ObstacleMotion::Smooth { multiplier: 1.0 },
            start_checkpoints: Vec::new(),
            end_checkpoints: Vec::new(),
            active_by_default: false,
        }
    }
}

/// Quiz gate chain along a slope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateChainConfig {
    pub slope_start: Vec3,
    pub slope_end: Vec3,
    /// Distance between consecutive gate pairs
    pub spacing: f32,
    /// Conveyor speed along the slope
    pub movement_speed: f32,
    /// Question bank, handed out round-robin
    pub questions: Vec<QuestionContent>,
    pub start_checkpoints: Vec<u32>,
    pub end_checkpoints: Vec<u32>,
    pub active_by_default: bool,
}

impl Default for GateChainConfig {
    fn default() -> Self {
        Self {
            slope_start: Vec3::ZERO,
            slope_end: Vec3::new(0.0, 0.0, 100.0),
            spacing: 15.0,
            movement_speed: 5.0,
            questions: Vec::new(),
            start_checkpoints: Vec::new(),
            end_checkpoints: Vec::new(),
            active_by_default: false,
        }
    }
}

/// Tutorial gate in front of a chain
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TutorialConfig {
    /// Only the first question is used
    pub questions: Vec<QuestionContent>,
    /// Index into `gate_chains` started on success
    pub unlocks_chain: Option<usize>,
}

fn gating(start: &[u32], end: &[u32], active_by_default: bool) -> CheckpointGating {
    CheckpointGating::new(
        start.iter().copied().map(CheckpointId).collect(),
        end.iter().copied().map(CheckpointId).collect(),
        active_by_default,
    )
}

impl SpawnerConfig {
    pub fn gating(&self) -> CheckpointGating {
        gating(&self.start_checkpoints, &self.end_checkpoints, self.active_by_default)
    }
}

impl ObstacleConfig {
    pub fn gating(&self) -> CheckpointGating {
        gating(&self.start_checkpoints, &self.end_checkpoints, self.active_by_default)
    }
}

impl GateChainConfig {
    pub fn gating(&self) -> CheckpointGating {
        gating(&self.start_checkpoints, &self.end_checkpoints, self.active_by_default)
    }

    /// Pairs this chain pre-spawns: `ceil(len / spacing)` plus the extras.
    /// Not finite when the spacing is degenerate.
    pub fn pair_count(&self) -> f32 {
        ((self.slope_end - self.slope_start).length() / self.spacing).ceil()
            + EXTRA_GATE_PAIRS as f32
    }

    fn check_size(&self, chain: usize) -> Result<(), ConfigError> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(ConfigError::InvalidSpacing {
                chain,
                spacing: self.spacing,
            });
        }
        let needed = self.pair_count();
        if !needed.is_finite() || needed > MAX_GATE_PAIRS as f32 {
            return Err(ConfigError::TooManyGates {
                chain,
                needed,
                max: MAX_GATE_PAIRS,
            });
        }
        Ok(())
    }
}

impl CourseConfig {
    /// Parse a course from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    /// Load and validate a course file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = Self::from_json_str(&json)?;
        config.validate()?;
        log::info!(
            "Loaded course from {} ({} checkpoints)",
            path.display(),
            config.checkpoints.len()
        );
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Parse)
    }

    /// Check cross references, ranges and gate chain sizes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let count = self.checkpoints.len() as u32;
        let check_refs = |owner: String, gating: &CheckpointGating| {
            match gating.referenced().find(|id| id.0 >= count) {
                Some(id) => Err(ConfigError::UnknownCheckpoint { owner, index: id.0 }),
                None => Ok(()),
            }
        };
        let check_range = |field: String, min: f32, max: f32| {
            if min > max {
                Err(ConfigError::InvalidRange { field, min, max })
            } else {
                Ok(())
            }
        };

        for (i, s) in self.spawners.iter().enumerate() {
            check_refs(format!("spawner {}", i), &s.gating())?;
            check_range(
                format!("spawner {} spawn time", i),
                s.min_spawn_time,
                s.max_spawn_time,
            )?;
            check_range(
                format!("spawner {} height offset", i),
                s.min_height_offset,
                s.max_height_offset,
            )?;
        }
        for (i, o) in self.obstacles.iter().enumerate() {
            check_refs(format!("obstacle {}", i), &o.gating())?;
        }
        for (i, g) in self.gate_chains.iter().enumerate() {
            check_refs(format!("gate chain {}", i), &g.gating())?;
            g.check_size(i)?;
        }
        for (i, t) in self.tutorials.iter().enumerate() {
            if let Some(index) = t.unlocks_chain {
                if index >= self.gate_chains.len() {
                    return Err(ConfigError::UnknownChain { tutorial: i, index });
                }
            }
        }
        Ok(())
    }

    /// Small sample course: start, hazard slope, quiz slope, finish
    pub fn demo() -> Self {
        let checkpoint = |z: f32, time_limit: f32| CheckpointConfig {
            position: Vec3::new(0.0, 1.0, z),
            rotation: Quat::IDENTITY,
            time_limit,
        };

        Self {
            seed: 2024,
            progression: ProgressionConfig::default(),
            checkpoints: vec![
                checkpoint(0.0, 30.0),
                checkpoint(60.0, 25.0),
                checkpoint(160.0, 40.0),
                checkpoint(300.0, 30.0),
            ],
            spawners: vec![SpawnerConfig {
                position: Vec3::new(0.0, 20.0, 90.0),
                footprint_width: 12.0,
                min_spawn_time: 1.0,
                max_spawn_time: 2.5,
                pool_size: 8,
                can_grow: false,
                start_checkpoints: vec![1],
                end_checkpoints: vec![2],
                ..Default::default()
            }],
            obstacles: vec![ObstacleConfig {
                position: Vec3::new(0.0, 1.0, 110.0),
                motion: ObstacleMotion::Linear,
                start_checkpoints: vec![1],
                end_checkpoints: vec![3],
                ..Default::default()
            }],
            gate_chains: vec![GateChainConfig {
                slope_start: Vec3::new(0.0, 0.0, 280.0),
                slope_end: Vec3::new(0.0, 0.0, 180.0),
                spacing: 20.0,
                movement_speed: 4.0,
                questions: vec![
                    QuestionContent::new("Water boils at 100C at sea level", "True", "False", true),
                    QuestionContent::new("Sound travels faster than light", "True", "False", false),
                    QuestionContent::new("Rust has a garbage collector", "True", "False", false),
                ],
                start_checkpoints: vec![2],
                end_checkpoints: vec![3],
                ..Default::default()
            }],
            tutorials: vec![TutorialConfig {
                questions: vec![QuestionContent::new(
                    "Drive through the door with the right answer. Ready?",
                    "Yes",
                    "No",
                    true,
                )],
                unlocks_chain: Some(0),
            }],
        }
    }
}
