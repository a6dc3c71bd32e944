//! Global default constants for the engine.

/// Default gravity vector applied in the world (Y-up).
pub const DEFAULT_GRAVITY: [f64; 3] = [0.0, -9.81, 0.0];

/// Default fixed simulation timestep (in seconds). 120 Hz.
pub const DEFAULT_FIXED_TIME_STEP: f64 = 1.0 / 120.0;

/// Default number of substeps per fixed step.
pub const DEFAULT_SUBSTEPS: u32 = 1;

/// Number of contact solver iterations performed per substep.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 4;

/// Largest wall-clock delta accepted by `World::update` (s). Anything above
/// is discarded so a stalled frame cannot snowball into a catch-up spiral.
pub const MAX_DELTA_TIME: f64 = 0.25;

/// Fixed steps allowed per `World::update` call before excess time is dropped.
pub const MAX_FIXED_STEPS_PER_UPDATE: u32 = 8;

/// Default restitution of a new body.
pub const DEFAULT_RESTITUTION: f64 = 0.4;

/// Default static friction coefficient.
pub const DEFAULT_FRICTION_STATIC: f64 = 0.6;

/// Default kinetic friction coefficient.
pub const DEFAULT_FRICTION_DYNAMIC: f64 = 0.4;

/// Default linear damping rate (s⁻¹).
pub const DEFAULT_LINEAR_DAMPING: f64 = 0.05;

/// Fraction of residual penetration removed per positional correction.
pub const DEFAULT_CORRECTION_PERCENT: f64 = 0.95;

/// Penetration depth ignored by positional correction (m).
pub const DEFAULT_CORRECTION_SLOP: f64 = 5e-4;

/// Closing-speed deadband below which no normal impulse is applied (m/s).
pub const DEFAULT_NORMAL_IMPULSE_VSLOP: f64 = 2e-3;

/// Smallest impulse magnitude that wakes a sleeping body (Ns).
pub const DEFAULT_WAKE_IMPULSE_THRESHOLD: f64 = 1e-3;

/// Smallest positional correction that wakes a sleeping body (m).
pub const DEFAULT_WAKE_CORRECTION_THRESHOLD: f64 = 1e-3;

/// Average speed below which a body counts as still (m/s).
pub const DEFAULT_SLEEP_VEL_THRESHOLD: f64 = 0.05;

/// Continuous quiet time required before a body falls asleep (s).
pub const DEFAULT_SLEEP_TIME: f64 = 0.5;

/// Largest per-step impulse still considered quiet by the sleep system (Ns).
pub const DEFAULT_SLEEP_IMPULSE_QUIET: f64 = 1e-2;

/// Largest per-step positional correction still considered quiet (m).
pub const DEFAULT_SLEEP_CORRECTION_QUIET: f64 = 2e-3;
