use serde::Deserialize;

/// Numerical tolerances used while tracing.
///
/// The two values are independent. `lift_epsilon` offsets a hit point along
/// its normal before a shadow or reflection ray leaves it. `shadow_tolerance`
/// decides when an occluder sits "at" the light sample rather than in front
/// of it. Both should be chosen relative to the scene's coordinate scale.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tolerances {
    pub lift_epsilon: f64,
    pub shadow_tolerance: f64,
}

impl Tolerances {
    pub const DEFAULT_LIFT_EPSILON: f64 = 1e-6;
    pub const DEFAULT_SHADOW_TOLERANCE: f64 = 1e-12;

    /// Tolerance for "parallel" and barycentric edge tests inside primitives.
    pub const INTERSECTION_EPSILON: f64 = 1e-12;
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            lift_epsilon: Self::DEFAULT_LIFT_EPSILON,
            shadow_tolerance: Self::DEFAULT_SHADOW_TOLERANCE,
        }
    }
}
