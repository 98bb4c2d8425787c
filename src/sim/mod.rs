//! Deterministic course simulation
//!
//! All progression logic lives here. This module must stay deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (registration order for subscribers)
//! - No engine or rendering dependencies; bodies and displays are traits

pub mod body;
pub mod checkpoint;
pub mod course;
pub mod gates;
pub mod gating;
pub mod hazard;
pub mod obstacle;
pub mod progression;
pub mod question;
pub mod schedule;
pub mod tutorial;

pub use body::{Motion, Pose, RigidBody, SimpleBody};
pub use checkpoint::{Checkpoint, CheckpointId, CheckpointTrack};
pub use course::{Course, CourseEvent, Subscriber, Zone};
pub use gates::{ChainId, ChainState, Choice, ChoiceOutcome, GateChain, GateEvent, GatePair, PairId};
pub use gating::{CheckpointGated, CheckpointGating, GateResponse};
pub use hazard::{Hazard, HazardEvent, HazardId, HazardSpawner, RetireReason, SpawnerId};
pub use obstacle::{MovingObstacle, ObstacleId, ObstacleMotion};
pub use progression::{ProgressionCoordinator, ProgressionEvent, RespawnCause, RespawnState};
pub use question::{Prompt, PromptBoard, QuestionBank, QuestionContent, QuestionDisplay, Side};
pub use schedule::{TaskId, TaskQueue};
pub use tutorial::{TutorialGate, TutorialId};
