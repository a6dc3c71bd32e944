use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_FRICTION_DYNAMIC, DEFAULT_FRICTION_STATIC, DEFAULT_LINEAR_DAMPING, DEFAULT_RESTITUTION,
};

/// Surface and damping coefficients of a body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Normal velocity reflection, in [0, 1].
    pub restitution: f64,
    pub friction_static: f64,
    pub friction_dynamic: f64,
    /// Linear velocity decay rate (s⁻¹). 0.1 means roughly 10%/s.
    pub linear_damping: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: DEFAULT_RESTITUTION,
            friction_static: DEFAULT_FRICTION_STATIC,
            friction_dynamic: DEFAULT_FRICTION_DYNAMIC,
            linear_damping: DEFAULT_LINEAR_DAMPING,
        }
    }
}

impl Material {
    pub fn rubber() -> Self {
        Self {
            restitution: 0.8,
            friction_static: 1.1,
            friction_dynamic: 0.9,
            linear_damping: 0.05,
        }
    }

    pub fn steel() -> Self {
        Self {
            restitution: 0.35,
            friction_static: 0.55,
            friction_dynamic: 0.42,
            linear_damping: 0.03,
        }
    }

    pub fn ice() -> Self {
        Self {
            restitution: 0.05,
            friction_static: 0.05,
            friction_dynamic: 0.02,
            linear_damping: 0.01,
        }
    }

    /// Clamps every coefficient into its valid range.
    pub(crate) fn sanitize(mut self) -> Self {
        self.restitution = self.restitution.clamp(0.0, 1.0);
        self.friction_static = self.friction_static.max(0.0);
        self.friction_dynamic = self.friction_dynamic.max(0.0);
        self.linear_damping = self.linear_damping.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_out_of_range_coefficients() {
        let m = Material {
            restitution: 1.7,
            friction_static: -0.2,
            friction_dynamic: -1.0,
            linear_damping: -0.5,
        }
        .sanitize();

        assert_eq!(m.restitution, 1.0);
        assert_eq!(m.friction_static, 0.0);
        assert_eq!(m.friction_dynamic, 0.0);
        assert_eq!(m.linear_damping, 0.0);
    }

    #[test]
    fn presets_are_already_in_range() {
        for m in [Material::default(), Material::rubber(), Material::steel(), Material::ice()] {
            let s = m.sanitize();
            assert_eq!(s.restitution, m.restitution);
            assert_eq!(s.friction_static, m.friction_static);
        }
    }
}
