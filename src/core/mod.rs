//! Core types describing bodies and their shared data.

pub mod material;
pub mod rigidbody;
pub mod store;

pub use material::Material;
pub use rigidbody::{RigidBody, RigidBodyBuilder, SleepParams};
pub use store::{BodyId, BodyStore};
