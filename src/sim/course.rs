//! Course orchestration
//!
//! Owns the progression coordinator and every checkpoint-gated component,
//! routes trigger-zone events from the host, and delivers checkpoint
//! notifications to subscribers in registration order. Everything a view layer
//! needs to react to ends up in the [`CourseEvent`] log.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Pose, RigidBody};
use super::checkpoint::{CheckpointId, CheckpointTrack};
use super::gates::{ChainId, ChainState, ChoiceOutcome, GateChain, GateEvent, PairId};
use super::gating::CheckpointGated;
use super::hazard::{HazardEvent, HazardId, HazardSpawner, RetireReason, SpawnerId};
use super::obstacle::{MovingObstacle, ObstacleId};
use super::progression::{ProgressionCoordinator, ProgressionEvent, RespawnCause};
use super::question::{QuestionBank, QuestionDisplay, Side};
use super::tutorial::{TutorialGate, TutorialId};
use crate::config::{
    CourseConfig, GateChainConfig, ObstacleConfig, SpawnerConfig, TutorialConfig,
};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::ConfigError;

/// A checkpoint-changed subscriber, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscriber {
    Spawner(SpawnerId),
    Obstacle(ObstacleId),
    Chain(ChainId),
}

/// A trigger volume the host reports enter/exit for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Checkpoint(CheckpointId),
    /// Frame trigger of a gate pair
    GateFrame { chain: ChainId, pair: PairId },
    /// One door of a gate pair
    GateDoor {
        chain: ChainId,
        pair: PairId,
        side: Side,
    },
    TutorialFrame(TutorialId),
    TutorialDoor { tutorial: TutorialId, side: Side },
}

/// Everything that happened on the course, in order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CourseEvent {
    CheckpointChanged(CheckpointId),
    RespawnStarted {
        checkpoint: CheckpointId,
        cause: RespawnCause,
    },
    RespawnFinished(CheckpointId),
    HazardReleased {
        spawner: SpawnerId,
        hazard: HazardId,
        position: Vec3,
    },
    HazardRetired {
        spawner: SpawnerId,
        hazard: HazardId,
        reason: RetireReason,
    },
    ChainStateChanged {
        chain: ChainId,
        state: ChainState,
    },
    GateAnswered {
        chain: ChainId,
        pair: PairId,
    },
    GateMissed {
        chain: ChainId,
        pair: PairId,
    },
    PairRecycled {
        chain: ChainId,
        pair: PairId,
    },
    TutorialCompleted(TutorialId),
}

/// A playable course: player progression plus gated hazards and quizzes
#[derive(Debug)]
pub struct Course<B: RigidBody, D: QuestionDisplay> {
    progression: ProgressionCoordinator<B>,
    display: D,
    rng: Pcg32,
    spawners: Vec<HazardSpawner>,
    obstacles: Vec<MovingObstacle>,
    chains: Vec<GateChain>,
    tutorials: Vec<TutorialGate>,
    subscribers: Vec<Subscriber>,
    player_tag: String,
    trap_tag: String,
    start_at_first_checkpoint: bool,
    /// Unsimulated time carried between frames
    accumulator: f32,
    events: Vec<CourseEvent>,
}

impl<B: RigidBody, D: QuestionDisplay> Course<B, D> {
    /// Build a course from its description. `player` may be absent, in which
    /// case progression stays inert.
    pub fn from_config(
        config: &CourseConfig,
        player: Option<B>,
        display: D,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut track = CheckpointTrack::new();
        for checkpoint in &config.checkpoints {
            track.push(
                Pose::new(checkpoint.position, checkpoint.rotation),
                checkpoint.time_limit,
            );
        }

        let mut course = Self {
            progression: ProgressionCoordinator::new(player, track, &config.progression),
            display,
            rng: Pcg32::seed_from_u64(config.seed),
            spawners: Vec::with_capacity(config.spawners.len()),
            obstacles: Vec::with_capacity(config.obstacles.len()),
            chains: Vec::with_capacity(config.gate_chains.len()),
            tutorials: Vec::with_capacity(config.tutorials.len()),
            subscribers: Vec::new(),
            player_tag: config.progression.player_tag.clone(),
            trap_tag: config.progression.trap_tag.clone(),
            start_at_first_checkpoint: config.progression.start_at_first_checkpoint,
            accumulator: 0.0,
            events: Vec::new(),
        };

        for spawner in &config.spawners {
            course.add_spawner(spawner);
        }
        for obstacle in &config.obstacles {
            course.add_obstacle(obstacle);
        }
        for chain in &config.gate_chains {
            course.add_gate_chain(chain);
        }
        for tutorial in &config.tutorials {
            course.add_tutorial(tutorial);
        }

        log::info!(
            "Course built: {} checkpoints, {} spawners, {} obstacles, {} gate chains",
            config.checkpoints.len(),
            course.spawners.len(),
            course.obstacles.len(),
            course.chains.len()
        );
        Ok(course)
    }

    /// Begin play at the first checkpoint
    pub fn start(&mut self) {
        if self.start_at_first_checkpoint && !self.progression.track().is_empty() {
            self.set_checkpoint(CheckpointId(0));
        }
    }

    pub fn add_spawner(&mut self, config: &SpawnerConfig) -> SpawnerId {
        let id = SpawnerId(self.spawners.len());
        self.spawners
            .push(HazardSpawner::new(id, config, config.gating()));
        self.register(Subscriber::Spawner(id));
        id
    }

    pub fn add_obstacle(&mut self, config: &ObstacleConfig) -> ObstacleId {
        let id = ObstacleId(self.obstacles.len());
        self.obstacles
            .push(MovingObstacle::new(id, config, config.gating()));
        self.register(Subscriber::Obstacle(id));
        id
    }

    pub fn add_gate_chain(&mut self, config: &GateChainConfig) -> ChainId {
        let id = ChainId(self.chains.len());
        let bank = QuestionBank::new(config.questions.clone());
        self.chains
            .push(GateChain::new(id, config, config.gating(), bank));
        self.register(Subscriber::Chain(id));
        id
    }

    pub fn add_tutorial(&mut self, config: &TutorialConfig) -> TutorialId {
        let id = TutorialId(self.tutorials.len());
        let bank = QuestionBank::new(config.questions.clone());
        self.tutorials
            .push(TutorialGate::new(id, &bank, config.unlocks_chain.map(ChainId)));
        id
    }

    /// Subscribe to checkpoint changes. A late subscriber is synced to the
    /// current checkpoint right away.
    fn register(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
        if let Some(current) = self.progression.current_checkpoint_id() {
            self.notify(subscriber, current);
            self.collect_component_events();
        }
    }

    fn notify(&mut self, subscriber: Subscriber, checkpoint: CheckpointId) {
        let display: &mut dyn QuestionDisplay = &mut self.display;
        match subscriber {
            Subscriber::Spawner(id) => {
                if let Some(spawner) = self.spawners.get_mut(id.0) {
                    spawner.on_checkpoint_changed(checkpoint, display);
                }
            }
            Subscriber::Obstacle(id) => {
                if let Some(obstacle) = self.obstacles.get_mut(id.0) {
                    obstacle.on_checkpoint_changed(checkpoint, display);
                }
            }
            Subscriber::Chain(id) => {
                if let Some(chain) = self.chains.get_mut(id.0) {
                    chain.on_checkpoint_changed(checkpoint, display);
                }
            }
        }
    }

    /// Deliver queued progression notifications to every subscriber
    fn flush(&mut self) {
        for event in self.progression.drain_events() {
            match event {
                ProgressionEvent::CheckpointChanged(id) => {
                    self.events.push(CourseEvent::CheckpointChanged(id));
                    for index in 0..self.subscribers.len() {
                        let subscriber = self.subscribers[index];
                        self.notify(subscriber, id);
                    }
                }
                ProgressionEvent::RespawnStarted { checkpoint, cause } => {
                    self.events
                        .push(CourseEvent::RespawnStarted { checkpoint, cause });
                }
                ProgressionEvent::RespawnFinished(id) => {
                    self.events.push(CourseEvent::RespawnFinished(id));
                }
            }
        }
        self.collect_component_events();
    }

    fn collect_component_events(&mut self) {
        for spawner in &mut self.spawners {
            let origin = spawner.id();
            for event in spawner.drain_events() {
                self.events.push(match event {
                    HazardEvent::Released { hazard, position } => CourseEvent::HazardReleased {
                        spawner: origin,
                        hazard,
                        position,
                    },
                    HazardEvent::Retired { hazard, reason } => CourseEvent::HazardRetired {
                        spawner: origin,
                        hazard,
                        reason,
                    },
                });
            }
        }
        for chain in &mut self.chains {
            let owner = chain.id();
            for event in chain.drain_events() {
                self.events.push(match event {
                    GateEvent::StateChanged(state) => CourseEvent::ChainStateChanged {
                        chain: owner,
                        state,
                    },
                    GateEvent::Answered(pair) => CourseEvent::GateAnswered { chain: owner, pair },
                    GateEvent::Missed(pair) => CourseEvent::GateMissed { chain: owner, pair },
                    GateEvent::Recycled(pair) => CourseEvent::PairRecycled { chain: owner, pair },
                });
            }
        }
    }

    /// Make `id` current and notify subscribers
    pub fn set_checkpoint(&mut self, id: CheckpointId) -> bool {
        let changed = self.progression.set_checkpoint(id);
        self.flush();
        changed
    }

    /// Send the player back to the current checkpoint
    pub fn request_respawn(&mut self) -> bool {
        let started = self.progression.request_respawn();
        self.flush();
        started
    }

    /// Advance one fixed step
    pub fn tick(&mut self, dt: f32) {
        self.progression.tick(dt);
        self.flush();

        for spawner in &mut self.spawners {
            spawner.tick(dt, &mut self.rng);
        }
        for obstacle in &mut self.obstacles {
            obstacle.tick(dt);
        }
        for chain in &mut self.chains {
            chain.tick(dt, &mut self.display);
        }
        self.collect_component_events();
    }

    /// Advance by a variable frame time in fixed steps. Returns the number of
    /// steps taken.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.tick(SIM_DT);
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }

    fn is_player(&self, tag: &str) -> bool {
        tag == self.player_tag
    }

    /// Entity with `tag` entered `zone`
    pub fn zone_entered(&mut self, tag: &str, zone: Zone) {
        if !self.is_player(tag) {
            return;
        }

        match zone {
            Zone::Checkpoint(id) => {
                self.progression.pass_checkpoint_zone(id);
                self.flush();
            }
            Zone::GateFrame { chain, pair } => {
                if let Some(chain) = self.chains.get_mut(chain.0) {
                    chain.set_current_question(pair, &mut self.display);
                }
            }
            Zone::GateDoor { chain, pair, side } => {
                let outcome = match self.chains.get_mut(chain.0) {
                    Some(chain) => chain.choose(pair, side, &mut self.display),
                    None => ChoiceOutcome::Ignored,
                };
                self.collect_component_events();
                if outcome == ChoiceOutcome::Incorrect {
                    self.request_respawn();
                }
            }
            Zone::TutorialFrame(id) => {
                if let Some(tutorial) = self.tutorials.get(id.0) {
                    tutorial.enter(&mut self.display);
                }
            }
            Zone::TutorialDoor { tutorial, side } => {
                self.choose_tutorial(tutorial, side);
            }
        }
    }

    /// Entity with `tag` left `zone`
    pub fn zone_exited(&mut self, tag: &str, zone: Zone) {
        if !self.is_player(tag) {
            return;
        }

        match zone {
            Zone::GateFrame { chain, pair } => {
                if let Some(chain) = self.chains.get_mut(chain.0) {
                    chain.clear_current_question(pair, &mut self.display);
                }
            }
            Zone::TutorialFrame(id) => {
                if let Some(tutorial) = self.tutorials.get(id.0) {
                    tutorial.exit(&mut self.display);
                }
            }
            _ => {}
        }
    }

    fn choose_tutorial(&mut self, id: TutorialId, side: Side) {
        let Some(tutorial) = self.tutorials.get_mut(id.0) else {
            return;
        };
        match tutorial.choose(side, &mut self.display) {
            ChoiceOutcome::Correct => {
                self.events.push(CourseEvent::TutorialCompleted(id));
                if let Some(chain) = tutorial.unlocks() {
                    self.activate_chain(chain);
                }
            }
            ChoiceOutcome::Incorrect => {
                self.request_respawn();
            }
            _ => {}
        }
    }

    /// Two tagged entities touched. A player/trap contact requests a respawn.
    pub fn contact(&mut self, a: &str, b: &str) -> bool {
        let trap = |tag: &str| tag == self.trap_tag;
        let hit = (self.is_player(a) && trap(b)) || (self.is_player(b) && trap(a));
        if hit {
            self.request_respawn()
        } else {
            false
        }
    }

    /// Start an armed gate chain
    pub fn activate_chain(&mut self, id: ChainId) -> bool {
        let started = self
            .chains
            .get_mut(id.0)
            .is_some_and(|chain| chain.activate_chain());
        self.collect_component_events();
        started
    }

    /// Take the event log in emission order
    pub fn drain_events(&mut self) -> Vec<CourseEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn progression(&self) -> &ProgressionCoordinator<B> {
        &self.progression
    }

    pub fn player(&self) -> Option<&B> {
        self.progression.player()
    }

    pub fn player_mut(&mut self) -> Option<&mut B> {
        self.progression.player_mut()
    }

    /// Tag the host must report for the player in zone events
    pub fn player_tag(&self) -> &str {
        &self.player_tag
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn subscribers(&self) -> &[Subscriber] {
        &self.subscribers
    }

    pub fn spawner(&self, id: SpawnerId) -> Option<&HazardSpawner> {
        self.spawners.get(id.0)
    }

    pub fn spawners(&self) -> &[HazardSpawner] {
        &self.spawners
    }

    /// Mutable spawner access for physics sync and manual releases
    pub fn spawners_mut(&mut self) -> &mut [HazardSpawner] {
        &mut self.spawners
    }

    /// Release a hazard from `id` immediately
    pub fn release_now(&mut self, id: SpawnerId) -> Option<HazardId> {
        let spawner = self.spawners.get_mut(id.0)?;
        let released = spawner.release_now(&mut self.rng);
        self.collect_component_events();
        released
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&MovingObstacle> {
        self.obstacles.get(id.0)
    }

    pub fn obstacles(&self) -> &[MovingObstacle] {
        &self.obstacles
    }

    pub fn chain(&self, id: ChainId) -> Option<&GateChain> {
        self.chains.get(id.0)
    }

    pub fn chains(&self) -> &[GateChain] {
        &self.chains
    }

    pub fn tutorial(&self, id: TutorialId) -> Option<&TutorialGate> {
        self.tutorials.get(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckpointConfig, ProgressionConfig};
    use crate::sim::body::SimpleBody;
    use crate::sim::question::{PromptBoard, QuestionContent};
    use glam::Quat;

    type TestCourse = Course<SimpleBody, PromptBoard>;

    fn checkpoint(x: f32, time_limit: f32) -> CheckpointConfig {
        CheckpointConfig {
            position: Vec3::new(x, 1.0, 0.0),
            rotation: Quat::IDENTITY,
            time_limit,
        }
    }

    fn base_config() -> CourseConfig {
        CourseConfig {
            seed: 7,
            checkpoints: vec![checkpoint(0.0, 30.0), checkpoint(50.0, 20.0)],
            ..Default::default()
        }
    }

    fn build(config: &CourseConfig) -> TestCourse {
        let player = SimpleBody::new(Pose::at(Vec3::new(3.0, 1.0, 3.0)));
        Course::from_config(config, Some(player), PromptBoard::default()).unwrap()
    }

    fn respawns(events: &[CourseEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, CourseEvent::RespawnStarted { .. }))
            .count()
    }

    fn quiz_chain(start: Vec<u32>) -> GateChainConfig {
        GateChainConfig {
            slope_start: Vec3::ZERO,
            slope_end: Vec3::new(0.0, 0.0, -40.0),
            spacing: 10.0,
            movement_speed: 1.0,
            questions: vec![
                QuestionContent::new("A is right", "a", "b", true),
                QuestionContent::new("B is right", "a", "b", false),
            ],
            start_checkpoints: start,
            ..Default::default()
        }
    }

    #[test]
    fn test_timer_expiry_respawns_once() {
        let config = CourseConfig {
            progression: ProgressionConfig {
                start_at_first_checkpoint: false,
                ..Default::default()
            },
            ..base_config()
        };
        let mut course = build(&config);
        course.start();
        assert!(course.progression().current_checkpoint_id().is_none());

        assert!(course.set_checkpoint(CheckpointId(0)));
        assert_eq!(course.progression().remaining_time(), 30.0);
        assert!(course.progression().timer_running());

        for _ in 0..31 {
            course.tick(1.0);
        }
        let events = course.drain_events();
        assert_eq!(respawns(&events), 1);
        assert_eq!(
            course.player().unwrap().pose().position,
            Vec3::new(0.0, 1.0, 0.0)
        );
    }

    #[test]
    fn test_quiz_answers_and_miss() {
        let mut config = base_config();
        config.gate_chains = vec![quiz_chain(vec![0])];
        let mut course = build(&config);
        course.start();
        let chain = ChainId(0);
        assert!(course.activate_chain(chain));

        // Pair 0 expects the left door
        let first = Zone::GateDoor {
            chain,
            pair: PairId(0),
            side: Side::Left,
        };
        course.zone_entered("Player", first);
        let pair = course.chain(chain).unwrap().pair(PairId(0)).unwrap();
        assert!(pair.answered);
        assert!(!pair.frame_active);
        assert_eq!(respawns(&course.drain_events()), 0);

        // Pair 1 expects the right door
        let wrong = Zone::GateDoor {
            chain,
            pair: PairId(1),
            side: Side::Left,
        };
        course.zone_entered("Player", wrong);
        course.zone_entered("Player", wrong);
        let events = course.drain_events();
        assert_eq!(respawns(&events), 1);
        assert!(events.contains(&CourseEvent::GateMissed {
            chain,
            pair: PairId(1)
        }));
    }

    #[test]
    fn test_exhausted_pool_caps_releases() {
        let mut config = base_config();
        config.spawners = vec![SpawnerConfig {
            pool_size: 2,
            can_grow: false,
            start_checkpoints: vec![0],
            ..Default::default()
        }];
        let mut course = build(&config);
        course.start();
        let id = SpawnerId(0);
        assert!(course.spawner(id).unwrap().is_spawning());

        assert!(course.release_now(id).is_some());
        assert!(course.release_now(id).is_some());
        assert!(course.release_now(id).is_none());

        let spawner = course.spawner(id).unwrap();
        assert_eq!(spawner.active_count(), 2);
        assert_eq!(spawner.available(), 0);
    }

    #[test]
    fn test_start_notifies_subscribers_in_order() {
        let mut config = base_config();
        config.spawners = vec![SpawnerConfig {
            start_checkpoints: vec![0],
            ..Default::default()
        }];
        config.obstacles = vec![ObstacleConfig {
            start_checkpoints: vec![0],
            end_checkpoints: vec![1],
            ..Default::default()
        }];
        let mut course = build(&config);
        assert_eq!(
            course.subscribers(),
            &[
                Subscriber::Spawner(SpawnerId(0)),
                Subscriber::Obstacle(ObstacleId(0))
            ]
        );

        course.start();
        assert!(course.spawner(SpawnerId(0)).unwrap().is_spawning());
        assert!(course.obstacle(ObstacleId(0)).unwrap().is_moving());

        course.set_checkpoint(CheckpointId(1));
        assert!(!course.obstacle(ObstacleId(0)).unwrap().is_moving());
        // Spawner has no end set and keeps going
        assert!(course.spawner(SpawnerId(0)).unwrap().is_spawning());
    }

    #[test]
    fn test_late_subscriber_synced() {
        let mut course = build(&base_config());
        course.start();
        let id = course.add_obstacle(&ObstacleConfig {
            start_checkpoints: vec![0],
            ..Default::default()
        });
        assert!(course.obstacle(id).unwrap().is_moving());
    }

    #[test]
    fn test_checkpoint_zone_only_for_player() {
        let config = CourseConfig {
            progression: ProgressionConfig {
                start_at_first_checkpoint: false,
                ..Default::default()
            },
            ..base_config()
        };
        let mut course = build(&config);

        course.zone_entered("Rock", Zone::Checkpoint(CheckpointId(1)));
        assert!(course.progression().current_checkpoint_id().is_none());

        course.zone_entered("Player", Zone::Checkpoint(CheckpointId(1)));
        assert_eq!(
            course.progression().current_checkpoint_id(),
            Some(CheckpointId(1))
        );
        assert_eq!(course.progression().remaining_time(), 20.0);
    }

    #[test]
    fn test_trap_contact_respawns() {
        let mut course = build(&base_config());
        course.start();
        assert!(!course.contact("Player", "Wall"));
        assert!(course.contact("Trap", "Player"));
        assert!(!course.contact("Player", "Trap"));
        assert!(course.progression().is_respawning());
    }

    #[test]
    fn test_respawn_rebroadcast_rederives_gating() {
        let mut config = base_config();
        config.obstacles = vec![ObstacleConfig {
            start_checkpoints: vec![0],
            ..Default::default()
        }];
        let mut course = build(&config);
        course.start();
        course.request_respawn();
        course.drain_events();

        for _ in 0..2 {
            course.tick(1.0);
        }
        let events = course.drain_events();
        let finished = events
            .iter()
            .position(|e| *e == CourseEvent::RespawnFinished(CheckpointId(0)))
            .unwrap();
        assert_eq!(
            events[finished + 1],
            CourseEvent::CheckpointChanged(CheckpointId(0))
        );
        assert!(course.obstacle(ObstacleId(0)).unwrap().is_moving());
    }

    #[test]
    fn test_tutorial_unlocks_chain() {
        let mut config = base_config();
        config.gate_chains = vec![quiz_chain(vec![0])];
        config.tutorials = vec![TutorialConfig {
            questions: vec![QuestionContent::new("Ready?", "Yes", "No", true)],
            unlocks_chain: Some(0),
        }];
        let mut course = build(&config);
        course.start();
        let tutorial = TutorialId(0);

        course.zone_entered("Player", Zone::TutorialFrame(tutorial));
        assert_eq!(course.display().prompt(), Some("Ready?"));

        course.zone_entered(
            "Player",
            Zone::TutorialDoor {
                tutorial,
                side: Side::Right,
            },
        );
        assert!(course.progression().is_respawning());
        assert_eq!(
            course.chain(ChainId(0)).unwrap().state(),
            ChainState::Armed
        );

        course.zone_entered(
            "Player",
            Zone::TutorialDoor {
                tutorial,
                side: Side::Left,
            },
        );
        assert!(course.display().visible.is_none());
        assert_eq!(
            course.chain(ChainId(0)).unwrap().state(),
            ChainState::Running
        );
        assert!(
            course
                .drain_events()
                .contains(&CourseEvent::TutorialCompleted(tutorial))
        );
    }

    #[test]
    fn test_gate_frame_prompt_routing() {
        let mut config = base_config();
        config.gate_chains = vec![quiz_chain(vec![0])];
        let mut course = build(&config);
        course.start();
        course.activate_chain(ChainId(0));

        let frame = |pair| Zone::GateFrame {
            chain: ChainId(0),
            pair: PairId(pair),
        };
        course.zone_entered("Player", frame(0));
        course.zone_entered("Player", frame(1));
        course.zone_exited("Player", frame(0));
        assert_eq!(course.display().prompt(), Some("B is right"));
        course.zone_exited("Player", frame(1));
        assert!(course.display().visible.is_none());
    }

    #[test]
    fn test_no_player_course_is_inert() {
        let mut config = base_config();
        config.spawners = vec![SpawnerConfig {
            start_checkpoints: vec![0],
            ..Default::default()
        }];
        let mut course: TestCourse =
            Course::from_config(&config, None, PromptBoard::default()).unwrap();
        course.start();
        course.tick(1.0);
        assert!(course.progression().current_checkpoint_id().is_none());
        assert!(!course.spawner(SpawnerId(0)).unwrap().is_spawning());
        assert!(!course.request_respawn());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = base_config();
        config.obstacles = vec![ObstacleConfig {
            start_checkpoints: vec![5],
            ..Default::default()
        }];
        let built: Result<TestCourse, _> =
            Course::from_config(&config, None, PromptBoard::default());
        assert!(matches!(built, Err(ConfigError::UnknownCheckpoint { .. })));
    }

    #[test]
    fn test_advance_runs_fixed_steps() {
        let mut course = build(&base_config());
        course.start();
        assert_eq!(course.advance(SIM_DT * 3.5), 3);
        assert_eq!(course.advance(SIM_DT * 0.6), 1);
        assert!(course.advance(10.0) <= MAX_SUBSTEPS);
    }
}
