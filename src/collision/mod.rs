//! Collision detection: shapes, world-space bounds, the uniform-grid
//! broadphase, and the shape-pair narrowphase.

pub mod bounds;
pub mod broadphase;
pub mod contact;
pub mod narrowphase;
pub mod shapes;

pub use broadphase::UniformGridBroadphase;
pub use contact::Manifold;
pub use shapes::Shape;
