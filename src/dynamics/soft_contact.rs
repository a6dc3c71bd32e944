//! Resting sphere–plane stabilization.
//!
//! A sphere settling on a plane spends most of its life within a fraction
//! of a millimetre of the surface, where normal impulses only produce
//! jitter. These routines handle that regime without a manifold: snap the
//! sphere onto the surface, kill the normal velocity component, and apply
//! friction against the gravity support impulse.

use crate::collision::shapes::Shape;
use crate::core::rigidbody::RigidBody;
use crate::dynamics::solver::ContactSolver;

/// Gap (m) within which a sphere counts as resting on a plane.
const CONTACT_EPS: f64 = 5e-3;

/// Largest surface error (m) corrected silently by the post-solve snap.
const SNAP_EPS: f64 = 1e-3;

/// Largest normal speed (m/s) zeroed silently by the post-solve snap.
const NORMAL_VEL_EPS: f64 = 2e-3;

impl ContactSolver {
    /// Stabilizes a sphere hovering at a plane surface when no manifold
    /// exists. Marks contact on both bodies, snaps the sphere exactly onto
    /// the surface, always zeroes its normal velocity component, and runs
    /// Coulomb friction against the support impulse alone. Never applies a
    /// normal impulse; the static-friction branch never wakes anyone.
    ///
    /// Returns whether the pair was close enough to treat as resting.
    pub fn soft_contact_sphere_plane(
        &self,
        sphere: &mut RigidBody,
        plane_body: &mut RigidBody,
    ) -> bool {
        let (Shape::Sphere { radius }, Shape::Plane { normal: n, d }) =
            (*sphere.shape(), *plane_body.shape())
        else {
            return false;
        };

        let dist = n.dot(sphere.position()) - d;
        let gap = (radius - dist).abs();
        if gap > CONTACT_EPS {
            return false;
        }

        sphere.mark_contact();
        plane_body.mark_contact();

        // snap exactly onto the surface
        let err = radius - dist;
        if err != 0.0 && !sphere.is_static() {
            sphere.set_position(sphere.position() + n * err);
            sphere.accumulate_correction(err.abs());
            plane_body.accumulate_correction(err.abs());
        }

        // kill the normal component outright so the contact stops breathing
        let v_n = sphere.velocity().dot(n);
        if v_n != 0.0 && !sphere.is_static() {
            sphere.set_velocity(sphere.velocity() - n * v_n);
        }

        // Coulomb friction against the support impulse; there is no normal
        // impulse in this regime
        let rv = sphere.velocity() - plane_body.velocity();
        let rv_t = rv - n * rv.dot(n);
        let tangent_speed = rv_t.length();
        if tangent_speed > 1e-9 {
            let inv_mass_sum = sphere.inv_mass() + plane_body.inv_mass();
            if inv_mass_sum > 0.0 {
                let t = rv_t / tangent_speed;

                let mu_s = 0.5 * (sphere.friction_static() + plane_body.friction_static());
                let mu_k = 0.5 * (sphere.friction_dynamic() + plane_body.friction_dynamic());

                let j_support =
                    (sphere.mass() + plane_body.mass()) * self.gravity().dot(n).abs() * self.current_dt();
                let jt_ideal = -rv.dot(t) / inv_mass_sum;
                let max_static = mu_s * j_support;

                if jt_ideal.abs() <= max_static {
                    // static friction: cancel the tangential velocity, stay quiet
                    if !sphere.is_static() {
                        sphere.set_velocity(sphere.velocity() + t * jt_ideal * sphere.inv_mass());
                    }
                    sphere.accumulate_impulse(jt_ideal.abs());
                    plane_body.accumulate_impulse(jt_ideal.abs());
                } else {
                    // kinetic friction: μk · support, opposite the motion
                    let jt_mag = mu_k * j_support;
                    if !sphere.is_static() {
                        sphere.set_velocity(sphere.velocity() - t * jt_mag * sphere.inv_mass());
                    }
                    sphere.accumulate_impulse(jt_mag);
                    plane_body.accumulate_impulse(jt_mag);

                    if jt_mag > self.config().wake_impulse_threshold {
                        sphere.wake_up();
                        plane_body.wake_up();
                    }
                }
            }
        }

        true
    }

    /// Post-resolve stabilization of an already-colliding sphere–plane
    /// pair: a short-range snap and a small normal-velocity cutoff, both
    /// silent (nothing wakes).
    pub(crate) fn stabilize_sphere_plane(sphere: &mut RigidBody, plane_body: &mut RigidBody) {
        let (Shape::Sphere { radius }, Shape::Plane { normal: n, d }) =
            (*sphere.shape(), *plane_body.shape())
        else {
            return;
        };

        sphere.mark_contact();
        plane_body.mark_contact();

        if sphere.is_static() {
            return;
        }

        let dist = n.dot(sphere.position()) - d;
        let err = radius - dist;

        if err.abs() < SNAP_EPS {
            sphere.set_position(sphere.position() + n * err);
            sphere.accumulate_correction(err.abs());
            plane_body.accumulate_correction(err.abs());
        }

        let v_n = sphere.velocity().dot(n);
        if v_n.abs() < NORMAL_VEL_EPS {
            sphere.set_velocity(sphere.velocity() - n * v_n);
        }
    }
}
