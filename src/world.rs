use glam::DVec3;
use log::{debug, trace};

use crate::collision::broadphase::UniformGridBroadphase;
use crate::collision::shapes::Shape;
use crate::collision::{bounds, narrowphase};
use crate::config::{
    DEFAULT_FIXED_TIME_STEP, DEFAULT_GRAVITY, DEFAULT_SOLVER_ITERATIONS, DEFAULT_SUBSTEPS,
    MAX_DELTA_TIME, MAX_FIXED_STEPS_PER_UPDATE,
};
use crate::core::rigidbody::{RigidBody, SleepParams};
use crate::core::store::{BodyId, BodyStore};
use crate::dynamics::integrator::Integrator;
use crate::dynamics::solver::ContactSolver;
use crate::utils::logging::StepTimer;

/// The simulation container: owns the bodies, the contact solver, the
/// optional broadphase, and the fixed-timestep accumulator.
///
/// `update` consumes wall-clock time and advances whole fixed steps;
/// `step` advances exactly one substep. Stepping is single-threaded and
/// synchronous; outside of it the caller may mutate bodies freely.
pub struct World {
    bodies: BodyStore,
    gravity: DVec3,
    fixed_time_step: f64,
    accumulator: f64,
    substeps: u32,
    solver_iterations: u32,
    broadphase: Option<UniformGridBroadphase>,
    solver: ContactSolver,
    sleep: SleepParams,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            bodies: BodyStore::new(),
            gravity: DVec3::from_array(DEFAULT_GRAVITY),
            fixed_time_step: DEFAULT_FIXED_TIME_STEP,
            accumulator: 0.0,
            substeps: DEFAULT_SUBSTEPS,
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            broadphase: None,
            solver: ContactSolver::new(),
            sleep: SleepParams::default(),
        }
    }

    /// Sets the world gravity; the solver sees the same vector for its
    /// friction support term.
    pub fn set_gravity(&mut self, gravity: DVec3) {
        self.gravity = gravity;
        self.solver.set_gravity(gravity);
    }

    pub fn gravity(&self) -> DVec3 {
        self.gravity
    }

    /// Fixed step length in seconds, clamped to ≥ 1 µs.
    pub fn set_fixed_time_step(&mut self, step: f64) {
        self.fixed_time_step = step.max(1e-6);
    }

    pub fn fixed_time_step(&self) -> f64 {
        self.fixed_time_step
    }

    /// Substeps per fixed step. More substeps reduce penetration and jitter
    /// at impact for extra CPU cost.
    pub fn set_substeps(&mut self, substeps: u32) {
        self.substeps = substeps.max(1);
    }

    /// Contact solver iterations per substep. More iterations stabilize
    /// stacks.
    pub fn set_solver_iterations(&mut self, iterations: u32) {
        self.solver_iterations = iterations.max(1);
    }

    /// Installs a broadphase, or `None` to fall back to brute-force
    /// all-pairs candidate generation.
    pub fn set_broadphase(&mut self, broadphase: Option<UniformGridBroadphase>) {
        self.broadphase = broadphase;
    }

    pub fn set_sleep_vel_threshold(&mut self, v: f64) {
        self.sleep.vel_threshold = v.max(0.0);
    }

    pub fn set_sleep_time(&mut self, seconds: f64) {
        self.sleep.time_to_sleep = seconds.max(0.0);
    }

    /// Sets the per-step impulse (Ns) and correction (m) ceilings under
    /// which a contact still counts as quiet for the sleep system.
    pub fn set_sleep_quiet_thresholds(&mut self, impulse: f64, correction: f64) {
        self.sleep.impulse_quiet = impulse.max(0.0);
        self.sleep.correction_quiet = correction.max(0.0);
    }

    pub fn sleep_params(&self) -> &SleepParams {
        &self.sleep
    }

    pub fn solver(&self) -> &ContactSolver {
        &self.solver
    }

    /// Mutable access to the solver tunables (correction, velocity slop,
    /// wake thresholds).
    pub fn solver_mut(&mut self) -> &mut ContactSolver {
        &mut self.solver
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        self.bodies.insert(body)
    }

    pub fn bodies(&self) -> &BodyStore {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id)
    }

    /// Dynamic sphere of the given radius and mass centered at `pos`.
    pub fn dynamic_sphere(pos: DVec3, radius: f64, mass: f64) -> RigidBody {
        RigidBody::builder(Shape::sphere(radius))
            .position(pos)
            .mass(mass)
            .build()
    }

    /// Immovable plane n·x = d.
    pub fn static_plane(normal: DVec3, d: f64) -> RigidBody {
        RigidBody::builder(Shape::plane(normal, d)).mass(0.0).build()
    }

    /// Dynamic axis-aligned box centered at `pos`.
    pub fn dynamic_box(pos: DVec3, half_extents: DVec3, mass: f64) -> RigidBody {
        RigidBody::builder(Shape::cuboid(half_extents))
            .position(pos)
            .mass(mass)
            .build()
    }

    /// Consumes wall-clock `delta_time` and advances whole fixed steps.
    ///
    /// The delta is clamped and at most [`MAX_FIXED_STEPS_PER_UPDATE`]
    /// fixed steps run per call; if the cap is hit the leftover time is
    /// dropped so a stalled frame cannot spiral into ever-longer updates.
    pub fn update(&mut self, delta_time: f64) {
        let timer = StepTimer::start();
        self.accumulator += delta_time.min(MAX_DELTA_TIME);

        let mut steps = 0;
        while self.accumulator >= self.fixed_time_step && steps < MAX_FIXED_STEPS_PER_UPDATE {
            let sub_dt = self.fixed_time_step / self.substeps as f64;
            for _ in 0..self.substeps {
                self.step(sub_dt);
            }
            self.accumulator -= self.fixed_time_step;
            steps += 1;
        }

        if steps == MAX_FIXED_STEPS_PER_UPDATE {
            debug!(
                "fixed-step cap hit, dropping {:.3} s of accumulated time",
                self.accumulator
            );
            self.accumulator = 0.0;
        }

        timer.finish(steps as f64 * self.fixed_time_step, steps);
    }

    /// Advances one substep: reset activity, integrate, build candidate
    /// pairs, stabilize resting sphere–plane contacts, iterate the contact
    /// solver, then update every sleep timer.
    pub fn step(&mut self, dt: f64) {
        self.solver.set_current_dt(dt);

        for body in self.bodies.iter_mut() {
            body.reset_step_activity();
        }

        Integrator::step(&mut self.bodies, self.gravity, dt);

        let candidates = self.collect_candidate_pairs();
        trace!(
            "substep dt={dt:.6}: {} candidate pairs over {} bodies",
            candidates.len(),
            self.bodies.len()
        );

        // resting sphere–plane stabilization runs before any impulses
        for &(ia, ib) in &candidates {
            let sphere_first = {
                let (Some(a), Some(b)) = (self.bodies.get(ia), self.bodies.get(ib)) else {
                    continue;
                };
                if a.is_sleeping() && b.is_sleeping() {
                    continue;
                }
                match (a.shape(), b.shape()) {
                    (Shape::Sphere { .. }, Shape::Plane { .. }) => true,
                    (Shape::Plane { .. }, Shape::Sphere { .. }) => false,
                    _ => continue,
                }
            };

            let (sphere_id, plane_id) = if sphere_first { (ia, ib) } else { (ib, ia) };
            if let Some((sphere, plane)) = self.bodies.get2_mut(sphere_id, plane_id) {
                self.solver.soft_contact_sphere_plane(sphere, plane);
            }
        }

        for _ in 0..self.solver_iterations {
            for &(ia, ib) in &candidates {
                let manifold = {
                    let (Some(a), Some(b)) = (self.bodies.get(ia), self.bodies.get(ib)) else {
                        continue;
                    };
                    if a.is_sleeping() && b.is_sleeping() {
                        continue;
                    }
                    narrowphase::collide(a, b)
                };

                if let Some(manifold) = manifold {
                    self.solver.resolve(&mut self.bodies, &manifold);
                }
            }
        }

        for body in self.bodies.iter_mut() {
            body.update_sleep(dt, &self.sleep);
        }
    }

    /// Builds the candidate pair list: broadphase pairs plus one pair per
    /// (non-plane body, plane) combination, or brute-force all pairs when
    /// no broadphase is installed. Order depends only on body insertion
    /// order and grid traversal order.
    fn collect_candidate_pairs(&mut self) -> Vec<(BodyId, BodyId)> {
        let bodies = &self.bodies;
        if let Some(grid) = self.broadphase.as_mut() {
            grid.clear();
            for body in bodies.iter() {
                if let Some((min, max)) = bounds::compute(body) {
                    grid.insert(body.id(), min, max);
                }
            }
            let mut pairs = grid.compute_pairs();

            // planes never enter the grid; pair every other body with them
            let planes: Vec<BodyId> = bodies
                .iter()
                .filter(|b| b.shape().is_plane())
                .map(|b| b.id())
                .collect();
            for body in bodies.iter() {
                if body.shape().is_plane() {
                    continue;
                }
                for &plane in &planes {
                    pairs.push((body.id(), plane));
                }
            }

            pairs
        } else {
            let n = self.bodies.len() as u32;
            let mut pairs = Vec::with_capacity((n.saturating_sub(1) as usize * n as usize) / 2);
            for i in 0..n {
                for j in (i + 1)..n {
                    pairs.push((BodyId(i), BodyId(j)));
                }
            }
            pairs
        }
    }

    /// Zeroes the fixed-step accumulator. Useful when pausing/unpausing or
    /// after a clock jump.
    pub fn reset_accumulator(&mut self) {
        self.accumulator = 0.0;
    }

    /// Fraction (0..1) of a fixed step accumulated since the last step ran,
    /// for render-side interpolation.
    pub fn interpolation_alpha(&self) -> f64 {
        if self.fixed_time_step <= 0.0 {
            return 0.0;
        }
        (self.accumulator / self.fixed_time_step).clamp(0.0, 1.0)
    }
}
