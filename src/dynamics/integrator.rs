use glam::DVec3;

use crate::core::rigidbody::RigidBody;
use crate::core::store::BodyStore;

/// Semi-implicit Euler integration with exponential linear damping.
pub struct Integrator;

impl Integrator {
    /// Advances one body by `dt`: accumulated force plus gravity into the
    /// velocity, damping decay, then position. Static and sleeping bodies
    /// only shed their accumulated forces.
    pub fn integrate(body: &mut RigidBody, gravity: DVec3, dt: f64) {
        if body.is_static() || body.is_sleeping() {
            body.clear_forces();
            return;
        }

        let acc = body.force_accum() * body.inv_mass() + gravity;

        let mut velocity = body.velocity() + acc * dt;
        velocity *= (-body.linear_damping() * dt).exp();

        body.set_velocity(velocity);
        body.set_position(body.position() + velocity * dt);
        body.clear_forces();
    }

    /// Integrates every body in the store.
    pub fn step(bodies: &mut BodyStore, gravity: DVec3, dt: f64) {
        for body in bodies.iter_mut() {
            Self::integrate(body, gravity, dt);
        }
    }
}
