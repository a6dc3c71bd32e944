use glam::DVec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::collision::shapes::Shape;
use crate::config::{
    DEFAULT_SLEEP_CORRECTION_QUIET, DEFAULT_SLEEP_IMPULSE_QUIET, DEFAULT_SLEEP_TIME,
    DEFAULT_SLEEP_VEL_THRESHOLD,
};
use crate::core::material::Material;
use crate::core::store::BodyId;

/// Smoothing factor of the |v| running average used by the sleep
/// controller. Larger reacts faster.
const VEL_EMA_ALPHA: f64 = 0.2;

/// World-level sleep tuning shared by every body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SleepParams {
    /// Average speed below which a body counts as still (m/s).
    pub vel_threshold: f64,
    /// Continuous quiet time required before sleeping (s).
    pub time_to_sleep: f64,
    /// Largest per-step impulse still considered quiet (Ns).
    pub impulse_quiet: f64,
    /// Largest per-step positional correction still considered quiet (m).
    pub correction_quiet: f64,
}

impl Default for SleepParams {
    fn default() -> Self {
        Self {
            vel_threshold: DEFAULT_SLEEP_VEL_THRESHOLD,
            time_to_sleep: DEFAULT_SLEEP_TIME,
            impulse_quiet: DEFAULT_SLEEP_IMPULSE_QUIET,
            correction_quiet: DEFAULT_SLEEP_CORRECTION_QUIET,
        }
    }
}

/// A simulated body: kinematic state, mass, collision shape, material, and
/// the per-step activity bookkeeping the sleep system reads.
///
/// A body with zero mass is static: it is never integrated and contact
/// impulses skip it.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub(crate) id: BodyId,
    position: DVec3,
    velocity: DVec3,
    force_accum: DVec3,
    mass: f64,
    inv_mass: f64,
    shape: Shape,
    material: Material,
    can_sleep: bool,
    sleeping: bool,
    sleep_timer: f64,
    vel_avg: f64,
    had_contact: bool,
    max_impulse: f64,
    max_correction: f64,
}

impl RigidBody {
    /// Creates a body at `position`. A mass of zero makes it static.
    pub fn new(position: DVec3, mass: f64, shape: Shape) -> Self {
        let mass = mass.max(0.0);
        let inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        Self {
            id: BodyId::INVALID,
            position,
            velocity: DVec3::ZERO,
            force_accum: DVec3::ZERO,
            mass,
            inv_mass,
            shape,
            material: Material::default(),
            can_sleep: true,
            sleeping: false,
            sleep_timer: 0.0,
            vel_avg: 0.0,
            had_contact: false,
            max_impulse: 0.0,
            max_correction: 0.0,
        }
    }

    pub fn builder(shape: Shape) -> RigidBodyBuilder {
        RigidBodyBuilder::new(shape)
    }

    /// Id assigned by the world at insertion.
    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn set_position(&mut self, p: DVec3) {
        self.position = p;
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, v: DVec3) {
        self.velocity = v;
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material.sanitize();
    }

    pub fn restitution(&self) -> f64 {
        self.material.restitution
    }

    pub fn set_restitution(&mut self, r: f64) {
        self.material.restitution = r.clamp(0.0, 1.0);
    }

    pub fn friction_static(&self) -> f64 {
        self.material.friction_static
    }

    pub fn set_friction_static(&mut self, mu_s: f64) {
        self.material.friction_static = mu_s.max(0.0);
    }

    pub fn friction_dynamic(&self) -> f64 {
        self.material.friction_dynamic
    }

    pub fn set_friction_dynamic(&mut self, mu_k: f64) {
        self.material.friction_dynamic = mu_k.max(0.0);
    }

    pub fn linear_damping(&self) -> f64 {
        self.material.linear_damping
    }

    pub fn set_linear_damping(&mut self, damping: f64) {
        self.material.linear_damping = damping.max(0.0);
    }

    /// Accumulates a force to be applied at the next integration.
    pub fn add_force(&mut self, f: DVec3) {
        self.force_accum += f;
    }

    pub fn clear_forces(&mut self) {
        self.force_accum = DVec3::ZERO;
    }

    pub fn force_accum(&self) -> DVec3 {
        self.force_accum
    }

    pub fn can_sleep(&self) -> bool {
        self.can_sleep
    }

    /// Disabling sleep also wakes the body.
    pub fn set_can_sleep(&mut self, can_sleep: bool) {
        self.can_sleep = can_sleep;
        if !can_sleep {
            self.sleeping = false;
        }
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Wakes the body immediately. Idempotent.
    pub fn wake_up(&mut self) {
        self.sleeping = false;
        self.sleep_timer = 0.0;
    }

    /// Zeroes the activity markers at the top of a substep.
    pub fn reset_step_activity(&mut self) {
        self.had_contact = false;
        self.max_impulse = 0.0;
        self.max_correction = 0.0;
    }

    pub fn mark_contact(&mut self) {
        self.had_contact = true;
    }

    /// Records an impulse magnitude; only the per-step maximum is kept.
    pub fn accumulate_impulse(&mut self, j_mag: f64) {
        if j_mag > self.max_impulse {
            self.max_impulse = j_mag;
        }
    }

    /// Records a positional correction; only the per-step maximum is kept.
    pub fn accumulate_correction(&mut self, corr_mag: f64) {
        if corr_mag > self.max_correction {
            self.max_correction = corr_mag;
        }
    }

    pub fn had_contact_this_step(&self) -> bool {
        self.had_contact
    }

    pub fn max_impulse_this_step(&self) -> f64 {
        self.max_impulse
    }

    pub fn max_correction_this_step(&self) -> f64 {
        self.max_correction
    }

    /// Smoothed |v| the sleep controller compares against its threshold.
    pub fn vel_avg(&self) -> f64 {
        self.vel_avg
    }

    pub fn sleep_timer(&self) -> f64 {
        self.sleep_timer
    }

    /// Advances the sleep controller after a substep has been resolved.
    ///
    /// The body sleeps once it has been supported (contact), slow (|v|
    /// average under the threshold), and quiet (impulses and corrections
    /// under the quiet thresholds) for `time_to_sleep` continuously. Any
    /// disqualifier resets the timer and wakes the body.
    pub fn update_sleep(&mut self, dt: f64, params: &SleepParams) {
        if !self.can_sleep || self.is_static() {
            self.sleep_timer = 0.0;
            self.sleeping = false;
            self.vel_avg = 0.0;
            return;
        }

        let speed = self.velocity.length();
        if self.vel_avg == 0.0 {
            self.vel_avg = speed;
        }
        self.vel_avg = VEL_EMA_ALPHA * speed + (1.0 - VEL_EMA_ALPHA) * self.vel_avg;

        let quiet_velocity = self.vel_avg < params.vel_threshold;
        let quiet_contacts =
            self.max_impulse <= params.impulse_quiet && self.max_correction <= params.correction_quiet;

        if self.had_contact && quiet_velocity && quiet_contacts {
            self.sleep_timer += dt;
            if self.sleep_timer >= params.time_to_sleep {
                if !self.sleeping {
                    debug!("body {:?} fell asleep", self.id);
                }
                self.sleeping = true;
                self.velocity = DVec3::ZERO;
            }
        } else {
            self.sleep_timer = 0.0;
            self.sleeping = false;
        }
    }
}

/// Builder for bodies with non-default material or initial velocity.
pub struct RigidBodyBuilder {
    body: RigidBody,
}

impl RigidBodyBuilder {
    pub fn new(shape: Shape) -> Self {
        Self {
            body: RigidBody::new(DVec3::ZERO, 1.0, shape),
        }
    }

    pub fn position(mut self, position: DVec3) -> Self {
        self.body.position = position;
        self
    }

    /// Zero mass makes the body static.
    pub fn mass(mut self, mass: f64) -> Self {
        self.body.mass = mass.max(0.0);
        self.body.inv_mass = if self.body.mass > 0.0 { 1.0 / self.body.mass } else { 0.0 };
        self
    }

    pub fn velocity(mut self, velocity: DVec3) -> Self {
        self.body.velocity = velocity;
        self
    }

    pub fn material(mut self, material: Material) -> Self {
        self.body.material = material.sanitize();
        self
    }

    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.body.can_sleep = can_sleep;
        self
    }

    pub fn build(self) -> RigidBody {
        self.body
    }
}
