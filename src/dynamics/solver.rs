use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::collision::contact::Manifold;
use crate::collision::shapes::Shape;
use crate::config::{
    DEFAULT_CORRECTION_PERCENT, DEFAULT_CORRECTION_SLOP, DEFAULT_FIXED_TIME_STEP, DEFAULT_GRAVITY,
    DEFAULT_NORMAL_IMPULSE_VSLOP, DEFAULT_WAKE_CORRECTION_THRESHOLD, DEFAULT_WAKE_IMPULSE_THRESHOLD,
};
use crate::core::store::BodyStore;

/// Tunable constants of the contact solver. Owned per world, so worlds
/// running in parallel tests never share state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Fraction of residual penetration removed per resolve, in [0, 1].
    pub correction_percent: f64,
    /// Penetration depth ignored by positional correction (m).
    pub correction_slop: f64,
    /// Closing-speed deadband below which no normal impulse fires (m/s).
    pub normal_impulse_vslop: f64,
    /// Impulse magnitude above which a sleeping body wakes (Ns).
    pub wake_impulse_threshold: f64,
    /// Correction magnitude above which a sleeping body wakes (m).
    pub wake_correction_threshold: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            correction_percent: DEFAULT_CORRECTION_PERCENT,
            correction_slop: DEFAULT_CORRECTION_SLOP,
            normal_impulse_vslop: DEFAULT_NORMAL_IMPULSE_VSLOP,
            wake_impulse_threshold: DEFAULT_WAKE_IMPULSE_THRESHOLD,
            wake_correction_threshold: DEFAULT_WAKE_CORRECTION_THRESHOLD,
        }
    }
}

/// Impulse-based contact solver: normal impulse with a velocity slop,
/// Coulomb friction in the tangent plane, and positional correction.
///
/// Gravity and the current substep length feed the friction support term
/// that keeps resting stacks from creeping.
#[derive(Debug, Clone)]
pub struct ContactSolver {
    config: SolverConfig,
    gravity: DVec3,
    current_dt: f64,
}

impl Default for ContactSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactSolver {
    pub fn new() -> Self {
        Self {
            config: SolverConfig::default(),
            gravity: DVec3::from_array(DEFAULT_GRAVITY),
            current_dt: DEFAULT_FIXED_TIME_STEP,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Sets the positional correction parameters: `percent` is clamped into
    /// [0, 1], `slop` to ≥ 0.
    pub fn set_position_correction(&mut self, percent: f64, slop: f64) {
        self.config.correction_percent = percent.clamp(0.0, 1.0);
        self.config.correction_slop = slop.max(0.0);
    }

    pub fn set_normal_impulse_vslop(&mut self, vslop: f64) {
        self.config.normal_impulse_vslop = vslop.max(0.0);
    }

    /// Sets the minimum impulse (Ns) and correction (m) that wake a body.
    pub fn set_wake_thresholds(&mut self, impulse: f64, correction: f64) {
        self.config.wake_impulse_threshold = impulse.max(0.0);
        self.config.wake_correction_threshold = correction.max(0.0);
    }

    pub fn set_gravity(&mut self, gravity: DVec3) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> DVec3 {
        self.gravity
    }

    /// Publishes the current substep length used by the support term.
    pub fn set_current_dt(&mut self, dt: f64) {
        self.current_dt = dt.max(1e-8);
    }

    pub fn current_dt(&self) -> f64 {
        self.current_dt
    }

    /// Resolves one manifold. The manifold normal must point from `b`
    /// toward `a`. Marks contact on both bodies, then applies the normal
    /// impulse, Coulomb friction, positional correction, and the resting
    /// stabilizer for sphere–plane pairs.
    pub fn resolve(&self, bodies: &mut BodyStore, m: &Manifold) {
        let Some((a, b)) = bodies.get2_mut(m.a, m.b) else {
            return;
        };
        let n = m.normal;

        let inv_mass_sum = a.inv_mass() + b.inv_mass();
        if inv_mass_sum == 0.0 {
            return;
        }

        a.mark_contact();
        b.mark_contact();

        // (1) normal impulse, only when the bodies close faster than the slop
        let rv = a.velocity() - b.velocity();
        let vel_along_normal = rv.dot(n);

        let mut j_normal = 0.0;
        if vel_along_normal < -self.config.normal_impulse_vslop {
            let e = a.restitution().min(b.restitution());
            j_normal = -(1.0 + e) * vel_along_normal / inv_mass_sum;

            let impulse = n * j_normal;
            if !a.is_static() {
                a.set_velocity(a.velocity() + impulse * a.inv_mass());
            }
            if !b.is_static() {
                b.set_velocity(b.velocity() - impulse * b.inv_mass());
            }

            let j_mag = j_normal.abs();
            a.accumulate_impulse(j_mag);
            b.accumulate_impulse(j_mag);
            if j_mag > self.config.wake_impulse_threshold {
                a.wake_up();
                b.wake_up();
            }
        }

        // (2) Coulomb friction in the tangent plane
        let rv = a.velocity() - b.velocity();
        let rv_t = rv - n * rv.dot(n);
        let tangent_speed = rv_t.length();

        if tangent_speed > 1e-9 {
            let t = rv_t / tangent_speed;

            let mu_s = 0.5 * (a.friction_static() + b.friction_static());
            let mu_k = 0.5 * (a.friction_dynamic() + b.friction_dynamic());

            let jt_ideal = -rv.dot(t) / inv_mass_sum;

            // resting contacts see no normal impulse, so static friction
            // works against a support impulse ~ (m_a + m_b)·|g·n|·dt
            let j_support = (a.mass() + b.mass()) * self.gravity.dot(n).abs() * self.current_dt;
            let j_n_eff = j_normal.abs() + j_support;
            let max_static = mu_s * j_n_eff;

            if jt_ideal.abs() <= max_static {
                // static friction: cancel the tangential motion, never wake
                let impulse = t * jt_ideal;
                if !a.is_static() {
                    a.set_velocity(a.velocity() + impulse * a.inv_mass());
                }
                if !b.is_static() {
                    b.set_velocity(b.velocity() - impulse * b.inv_mass());
                }

                a.accumulate_impulse(jt_ideal.abs());
                b.accumulate_impulse(jt_ideal.abs());
            } else {
                // kinetic friction: fixed magnitude, opposite the motion
                let jt_mag = mu_k * j_n_eff;
                let impulse = t * -jt_mag;
                if !a.is_static() {
                    a.set_velocity(a.velocity() + impulse * a.inv_mass());
                }
                if !b.is_static() {
                    b.set_velocity(b.velocity() - impulse * b.inv_mass());
                }

                a.accumulate_impulse(jt_mag);
                b.accumulate_impulse(jt_mag);
                if jt_mag > self.config.wake_impulse_threshold {
                    a.wake_up();
                    b.wake_up();
                }
            }
        }

        // (3) positional correction, always
        let corr_mag = (m.penetration - self.config.correction_slop).max(0.0) / inv_mass_sum
            * self.config.correction_percent;

        a.accumulate_correction(corr_mag);
        b.accumulate_correction(corr_mag);
        if corr_mag > self.config.wake_correction_threshold {
            a.wake_up();
            b.wake_up();
        }

        let correction = n * corr_mag;
        if !a.is_static() {
            a.set_position(a.position() + correction * a.inv_mass());
        }
        if !b.is_static() {
            b.set_position(b.position() - correction * b.inv_mass());
        }

        // (4) resting stabilization for sphere–plane pairs, in either order
        let a_sphere_on_plane = matches!(a.shape(), Shape::Sphere { .. })
            && matches!(b.shape(), Shape::Plane { .. });
        let b_sphere_on_plane = matches!(b.shape(), Shape::Sphere { .. })
            && matches!(a.shape(), Shape::Plane { .. });
        if a_sphere_on_plane {
            Self::stabilize_sphere_plane(a, b);
        } else if b_sphere_on_plane {
            Self::stabilize_sphere_plane(b, a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::narrowphase;
    use crate::core::rigidbody::RigidBody;
    use crate::core::store::BodyId;

    fn two_spheres(va: DVec3, vb: DVec3) -> (BodyStore, BodyId, BodyId) {
        let mut bodies = BodyStore::new();
        let mut a = RigidBody::new(DVec3::ZERO, 1.0, Shape::sphere(0.5));
        a.set_velocity(va);
        a.set_restitution(1.0);
        let mut b = RigidBody::new(DVec3::new(0.9, 0.0, 0.0), 1.0, Shape::sphere(0.5));
        b.set_velocity(vb);
        b.set_restitution(1.0);
        let ia = bodies.insert(a);
        let ib = bodies.insert(b);
        (bodies, ia, ib)
    }

    #[test]
    fn head_on_impulse_reflects_closing_velocity() {
        let (mut bodies, ia, ib) = two_spheres(DVec3::new(1.0, 0.0, 0.0), DVec3::new(-1.0, 0.0, 0.0));
        let manifold = {
            let (a, b) = (bodies.get(ia).unwrap(), bodies.get(ib).unwrap());
            narrowphase::collide(a, b).expect("spheres overlap")
        };

        let solver = ContactSolver::new();
        solver.resolve(&mut bodies, &manifold);

        // equal masses, e = 1: velocities swap
        let va = bodies.get(ia).unwrap().velocity();
        let vb = bodies.get(ib).unwrap().velocity();
        assert!((va.x - -1.0).abs() < 1e-9, "va was {va}");
        assert!((vb.x - 1.0).abs() < 1e-9, "vb was {vb}");
    }

    #[test]
    fn separating_bodies_receive_no_normal_impulse() {
        let (mut bodies, ia, ib) = two_spheres(DVec3::new(-1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0));
        let manifold = {
            let (a, b) = (bodies.get(ia).unwrap(), bodies.get(ib).unwrap());
            narrowphase::collide(a, b).expect("spheres overlap")
        };

        let solver = ContactSolver::new();
        solver.resolve(&mut bodies, &manifold);

        // already separating: velocities untouched by the normal stage, and
        // there is no tangential motion either
        assert_eq!(bodies.get(ia).unwrap().velocity(), DVec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bodies.get(ib).unwrap().velocity(), DVec3::new(1.0, 0.0, 0.0));
        // the overlap still gets corrected positionally
        assert!(bodies.get(ia).unwrap().position().x < 0.0);
        assert!(bodies.get(ib).unwrap().position().x > 0.9);
    }

    #[test]
    fn two_static_bodies_are_skipped() {
        let mut bodies = BodyStore::new();
        let ia = bodies.insert(RigidBody::new(DVec3::ZERO, 0.0, Shape::cuboid(DVec3::ONE)));
        let ib = bodies.insert(RigidBody::new(DVec3::new(0.5, 0.0, 0.0), 0.0, Shape::cuboid(DVec3::ONE)));
        let manifold = {
            let (a, b) = (bodies.get(ia).unwrap(), bodies.get(ib).unwrap());
            narrowphase::collide(a, b).expect("boxes overlap")
        };

        let solver = ContactSolver::new();
        solver.resolve(&mut bodies, &manifold);

        assert_eq!(bodies.get(ia).unwrap().position(), DVec3::ZERO);
        assert!(!bodies.get(ia).unwrap().had_contact_this_step(), "skip happens before marking");
    }

    #[test]
    fn correction_only_moves_the_dynamic_body() {
        let mut bodies = BodyStore::new();
        let plane = bodies.insert(RigidBody::new(DVec3::ZERO, 0.0, Shape::ground_y0()));
        let mut ball = RigidBody::new(DVec3::new(0.0, 0.1, 0.0), 1.0, Shape::sphere(0.25));
        ball.set_velocity(DVec3::ZERO);
        let ball = bodies.insert(ball);

        let manifold = {
            let (a, b) = (bodies.get(ball).unwrap(), bodies.get(plane).unwrap());
            narrowphase::collide(a, b).expect("sphere is buried in the plane")
        };

        let solver = ContactSolver::new();
        solver.resolve(&mut bodies, &manifold);

        assert_eq!(bodies.get(plane).unwrap().position(), DVec3::ZERO);
        assert!(
            bodies.get(ball).unwrap().position().y > 0.1,
            "correction must push the sphere out"
        );
    }

    #[test]
    fn big_impulse_wakes_a_sleeping_body() {
        let (mut bodies, ia, ib) = two_spheres(DVec3::new(2.0, 0.0, 0.0), DVec3::ZERO);
        // force b asleep, then hit it
        {
            let b = bodies.get_mut(ib).unwrap();
            b.set_velocity(DVec3::ZERO);
            let params = crate::core::rigidbody::SleepParams {
                time_to_sleep: 0.0,
                ..Default::default()
            };
            b.mark_contact();
            b.update_sleep(1.0, &params);
            assert!(b.is_sleeping());
        }

        let manifold = {
            let (a, b) = (bodies.get(ia).unwrap(), bodies.get(ib).unwrap());
            narrowphase::collide(a, b).expect("spheres overlap")
        };
        let solver = ContactSolver::new();
        solver.resolve(&mut bodies, &manifold);

        assert!(!bodies.get(ib).unwrap().is_sleeping());
        assert!(bodies.get(ib).unwrap().velocity().x > 0.0);
    }

    #[test]
    fn static_friction_cancels_slow_tangential_drift() {
        let mut bodies = BodyStore::new();
        let plane = bodies.insert(RigidBody::new(DVec3::ZERO, 0.0, Shape::ground_y0()));
        let mut ball = RigidBody::new(DVec3::new(0.0, 0.24, 0.0), 1.0, Shape::sphere(0.25));
        // creeping sideways far slower than static friction can hold
        ball.set_velocity(DVec3::new(1e-4, 0.0, 0.0));
        let ball = bodies.insert(ball);

        let manifold = {
            let (a, b) = (bodies.get(ball).unwrap(), bodies.get(plane).unwrap());
            narrowphase::collide(a, b).expect("sphere penetrates past the resting slop")
        };
        let solver = ContactSolver::new();
        solver.resolve(&mut bodies, &manifold);

        let v = bodies.get(ball).unwrap().velocity();
        assert!(v.x.abs() < 1e-12, "tangential drift should be cancelled, vx = {}", v.x);
        assert!(!bodies.get(ball).unwrap().is_sleeping());
    }

    #[test]
    fn setters_clamp_their_inputs() {
        let mut solver = ContactSolver::new();
        solver.set_position_correction(1.8, -0.5);
        assert_eq!(solver.config().correction_percent, 1.0);
        assert_eq!(solver.config().correction_slop, 0.0);

        solver.set_normal_impulse_vslop(-1.0);
        assert_eq!(solver.config().normal_impulse_vslop, 0.0);

        solver.set_wake_thresholds(-1.0, -2.0);
        assert_eq!(solver.config().wake_impulse_threshold, 0.0);
        assert_eq!(solver.config().wake_correction_threshold, 0.0);

        solver.set_current_dt(0.0);
        assert!(solver.current_dt() >= 1e-8);
    }
}
