//! impulse3d – an impulse-based 3D rigid-body physics engine for spheres,
//! axis-aligned boxes, and infinite planes.
//!
//! Per fixed substep the world resets activity markers, integrates awake
//! bodies (semi-implicit Euler with exponential damping), builds candidate
//! pairs (uniform grid plus dynamic×plane augmentation), stabilizes resting
//! sphere–plane contacts, runs the iterative impulse solver with Coulomb
//! friction and positional correction, and advances the sleep controller.
//! Stepping is single-threaded and deterministic for a fixed body insertion
//! order.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod utils;
pub mod world;

pub use glam::DVec3;

pub use crate::collision::broadphase::UniformGridBroadphase;
pub use crate::collision::contact::Manifold;
pub use crate::collision::shapes::Shape;
pub use crate::core::material::Material;
pub use crate::core::rigidbody::{RigidBody, RigidBodyBuilder, SleepParams};
pub use crate::core::store::{BodyId, BodyStore};
pub use crate::dynamics::integrator::Integrator;
pub use crate::dynamics::solver::{ContactSolver, SolverConfig};
pub use crate::world::World;
