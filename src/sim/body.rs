//! Physical body interface
//!
//! The rigid-body engine lives outside this crate. Everything here talks to it
//! through [`RigidBody`]; [`SimpleBody`] is a minimal in-process implementation
//! used by the headless demo and by tests.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World position and orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at a position with identity rotation
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Linear and angular velocity captured at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub linear: Vec3,
    pub angular: Vec3,
}

/// Control surface of a physics-engine body
pub trait RigidBody {
    fn pose(&self) -> Pose;
    fn set_pose(&mut self, pose: Pose);

    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, velocity: Vec3);

    /// Kinematic bodies are not moved by force integration
    fn is_kinematic(&self) -> bool;
    fn set_kinematic(&mut self, kinematic: bool);

    fn apply_force(&mut self, force: Vec3);
    fn apply_torque(&mut self, torque: Vec3);

    /// Current velocities
    fn motion(&self) -> Motion {
        Motion {
            linear: self.linear_velocity(),
            angular: self.angular_velocity(),
        }
    }

    /// Zero both velocities
    fn halt(&mut self) {
        self.set_linear_velocity(Vec3::ZERO);
        self.set_angular_velocity(Vec3::ZERO);
    }
}

/// Point-mass body with explicit Euler integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleBody {
    pub pose: Pose,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub kinematic: bool,
    pub mass: f32,
    /// Force accumulated since the last integration step
    #[serde(skip)]
    pub force: Vec3,
    #[serde(skip)]
    pub torque: Vec3,
}

impl Default for SimpleBody {
    fn default() -> Self {
        Self::new(Pose::default())
    }
}

impl SimpleBody {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            kinematic: false,
            mass: 1.0,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
        }
    }

    /// Advance by `dt` under `gravity`, consuming accumulated force/torque
    pub fn integrate(&mut self, dt: f32, gravity: Vec3) {
        let force = std::mem::take(&mut self.force);
        let torque = std::mem::take(&mut self.torque);
        if self.kinematic {
            return;
        }

        let inv_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
        self.linear_velocity += (gravity + force * inv_mass) * dt;
        self.angular_velocity += torque * inv_mass * dt;
        self.pose.position += self.linear_velocity * dt;

        let spin = self.angular_velocity * dt;
        if spin.length_squared() > 0.0 {
            self.pose.rotation = (Quat::from_scaled_axis(spin) * self.pose.rotation).normalize();
        }
    }
}

impl RigidBody for SimpleBody {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }

    fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }

    fn apply_force(&mut self, force: Vec3) {
        self.force += force;
    }

    fn apply_torque(&mut self, torque: Vec3) {
        self.torque += torque;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_falls_under_gravity() {
        let mut body = SimpleBody::new(Pose::at(Vec3::new(0.0, 10.0, 0.0)));
        body.integrate(1.0, Vec3::new(0.0, -9.8, 0.0));
        assert!(body.pose.position.y < 10.0);
        assert!(body.linear_velocity.y < 0.0);
    }

    #[test]
    fn test_kinematic_ignores_force() {
        let mut body = SimpleBody::default();
        body.set_kinematic(true);
        body.apply_force(Vec3::new(100.0, 0.0, 0.0));
        body.integrate(1.0, Vec3::new(0.0, -9.8, 0.0));
        assert_eq!(body.pose.position, Vec3::ZERO);
        assert_eq!(body.linear_velocity, Vec3::ZERO);
        // Force is consumed even while kinematic
        assert_eq!(body.force, Vec3::ZERO);
    }

    #[test]
    fn test_halt_zeroes_motion() {
        let mut body = SimpleBody::default();
        body.set_linear_velocity(Vec3::ONE);
        body.set_angular_velocity(Vec3::X);
        body.halt();
        assert_eq!(body.motion(), Motion::default());
    }
}
