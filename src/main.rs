//! Quiz Rapids headless driver
//!
//! Runs a scripted player down a course at the fixed timestep and logs the
//! course event stream. Pass a course JSON path to run something other than
//! the built-in demo; set `RUST_LOG=debug` for more detail.

use glam::Vec3;

use quiz_rapids::consts::SIM_DT;
use quiz_rapids::sim::{
    ChainId, ChainState, CheckpointId, Course, CourseEvent, Pose, PromptBoard, RigidBody,
    SimpleBody, TutorialId, Zone,
};
use quiz_rapids::{ConfigError, CourseConfig};

/// Scripted driving speed along +Z
const DRIVE_SPEED: f32 = 8.0;
/// Gravity for released hazards
const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);
/// Give up after this much simulated time
const MAX_SECONDS: f32 = 180.0;
/// Door picked wrong on purpose, to show a quiz respawn
const WRONG_ANSWER_AT: usize = 2;

fn load_course() -> Result<CourseConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => CourseConfig::load(std::path::Path::new(&path)),
        None => {
            log::info!("No course file given, using the demo course");
            let config = CourseConfig::demo();
            config.validate()?;
            Ok(config)
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Quiz Rapids (headless) starting...");

    let config = match load_course() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load course: {}", e);
            std::process::exit(1);
        }
    };

    let start = config
        .checkpoints
        .first()
        .map_or(Vec3::ZERO, |c| c.position);
    let player = SimpleBody::new(Pose::at(start));
    let mut course = match Course::from_config(&config, Some(player), PromptBoard::default()) {
        Ok(course) => course,
        Err(e) => {
            log::error!("Invalid course: {}", e);
            std::process::exit(1);
        }
    };
    course.start();

    let checkpoint_z: Vec<f32> = config.checkpoints.iter().map(|c| c.position.z).collect();
    let last_checkpoint = CheckpointId(checkpoint_z.len().saturating_sub(1) as u32);
    let mut gates_reached = 0usize;
    let mut elapsed = 0.0f32;
    let mut respawns = 0u32;

    while elapsed < MAX_SECONDS {
        drive_player(&mut course);
        cross_checkpoints(&mut course, &checkpoint_z);
        take_tutorials(&mut course);
        gates_reached = answer_gates(&mut course, gates_reached);

        course.tick(SIM_DT);
        for spawner in course.spawners_mut() {
            for body in spawner.active_bodies_mut() {
                body.integrate(SIM_DT, GRAVITY);
            }
        }
        elapsed += SIM_DT;

        for event in course.drain_events() {
            if matches!(event, CourseEvent::RespawnStarted { .. }) {
                respawns += 1;
            }
            log_event(elapsed, &event);
        }

        if course.progression().current_checkpoint_id() == Some(last_checkpoint)
            && !course.progression().is_respawning()
        {
            log::info!("Course finished in {:.1}s", elapsed);
            break;
        }
    }

    println!(
        "finished={} time={:.1}s respawns={} gates_reached={}",
        course.progression().current_checkpoint_id() == Some(last_checkpoint),
        elapsed,
        respawns,
        gates_reached
    );
}

fn drive_player(course: &mut Course<SimpleBody, PromptBoard>) {
    if let Some(player) = course.player_mut() {
        if !player.is_kinematic() {
            player.set_linear_velocity(Vec3::new(0.0, 0.0, DRIVE_SPEED));
        }
        player.integrate(SIM_DT, Vec3::ZERO);
    }
}

fn cross_checkpoints(course: &mut Course<SimpleBody, PromptBoard>, checkpoint_z: &[f32]) {
    let Some(z) = course.player().map(|p| p.pose().position.z) else {
        return;
    };
    for (index, &cz) in checkpoint_z.iter().enumerate() {
        let id = CheckpointId(index as u32);
        if z >= cz && course.progression().track().is_armed(id) {
            let tag = course.player_tag().to_string();
            course.zone_entered(&tag, Zone::Checkpoint(id));
        }
    }
}

fn take_tutorials(course: &mut Course<SimpleBody, PromptBoard>) {
    let tag = course.player_tag().to_string();
    let mut index = 0;
    while let Some(tutorial) = course.tutorial(TutorialId(index)) {
        let id = tutorial.id();
        let ready = tutorial.is_active()
            && tutorial
                .unlocks()
                .and_then(|chain| course.chain(chain))
                .is_some_and(|chain| chain.state() == ChainState::Armed);
        let side = tutorial.question().map(|q| q.correct_side());
        if let (true, Some(side)) = (ready, side) {
            course.zone_entered(&tag, Zone::TutorialFrame(id));
            course.zone_entered(&tag, Zone::TutorialDoor { tutorial: id, side });
        }
        index += 1;
    }
}

/// Drive through any gate frame the player is level with. Returns the running
/// count of gates reached.
fn answer_gates(course: &mut Course<SimpleBody, PromptBoard>, mut reached: usize) -> usize {
    let Some(z) = course.player().map(|p| p.pose().position.z) else {
        return reached;
    };
    if course.progression().is_respawning() {
        return reached;
    }

    let tag = course.player_tag().to_string();
    let mut hits = Vec::new();
    for (index, chain) in course.chains().iter().enumerate() {
        for pair in chain.pairs() {
            if pair.frame_active && !pair.answered && (pair.frame_position.z - z).abs() < 0.5 {
                hits.push((ChainId(index), pair.id, pair.question.correct_side()));
            }
        }
    }

    for (chain, pair, correct) in hits {
        course.zone_entered(&tag, Zone::GateFrame { chain, pair });
        let side = if reached == WRONG_ANSWER_AT {
            correct.other()
        } else {
            correct
        };
        course.zone_entered(&tag, Zone::GateDoor { chain, pair, side });
        course.zone_exited(&tag, Zone::GateFrame { chain, pair });
        reached += 1;
    }
    reached
}

fn log_event(time: f32, event: &CourseEvent) {
    match event {
        CourseEvent::HazardReleased { .. } | CourseEvent::HazardRetired { .. } => {
            log::debug!("[{:6.2}] {:?}", time, event)
        }
        CourseEvent::PairRecycled { .. } => log::debug!("[{:6.2}] {:?}", time, event),
        _ => log::info!("[{:6.2}] {:?}", time, event),
    }
}
