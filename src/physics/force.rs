//! Piecewise particle-life force law.
//!
//! Below `min_distance` every pair repels, whatever the matrix says. Past it
//! the force ramps linearly up to the matrix coefficient and back down to
//! zero, the reach of the ramp scaling with `|coefficient|`:
//!
//! ```text
//! force
//!   ^            coefficient
//!   |               /\
//!   |              /  \
//! 0 +------+------/----\---------> distance
//!   |     /  min    mid  relevant
//!   |    /
//!   |   /  repulsion
//! ```

/// Coefficients are expected to lie in `[-10, 10]`; this maps them onto the
/// fraction of `max_interaction_distance` they reach.
pub const COEFFICIENT_REACH_SCALE: f64 = 0.1;

/// Distance past which a pair with this coefficient no longer interacts,
/// short-range repulsion aside.
pub fn relevant_distance(coefficient: f64, max_interaction_distance: f64) -> f64 {
    max_interaction_distance * coefficient.abs() * COEFFICIENT_REACH_SCALE
}

/// Distance at which the force equals the coefficient.
pub fn mid_distance(coefficient: f64, min_distance: f64, max_interaction_distance: f64) -> f64 {
    (min_distance + relevant_distance(coefficient, max_interaction_distance)) / 2.0
}

/// Scalar force along the direction from the acting particle to the other.
/// Positive attracts, negative repels. `distance` must be strictly positive.
pub fn force(
    distance: f64,
    coefficient: f64,
    min_distance: f64,
    max_interaction_distance: f64,
) -> f64 {
    let relevant = relevant_distance(coefficient, max_interaction_distance);
    let mid = (min_distance + relevant) / 2.0;

    if distance <= min_distance {
        2.0 * (distance - 2.0 * min_distance)
    } else if distance <= mid {
        // ratio first so the peak lands exactly on the coefficient
        coefficient * ((distance - min_distance) / (mid - min_distance))
    } else if distance <= relevant {
        coefficient - coefficient * ((distance - mid) / (relevant - mid))
    } else {
        0.0
    }
}

/// Force law with its two distance parameters bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceLaw {
    pub min_distance: f64,
    pub max_interaction_distance: f64,
}

impl ForceLaw {
    pub fn new(min_distance: f64, max_interaction_distance: f64) -> Self {
        Self {
            min_distance,
            max_interaction_distance,
        }
    }

    #[inline]
    pub fn force(&self, distance: f64, coefficient: f64) -> f64 {
        force(
            distance,
            coefficient,
            self.min_distance,
            self.max_interaction_distance,
        )
    }

    pub fn mid_distance(&self, coefficient: f64) -> f64 {
        mid_distance(coefficient, self.min_distance, self.max_interaction_distance)
    }

    pub fn relevant_distance(&self, coefficient: f64) -> f64 {
        relevant_distance(coefficient, self.max_interaction_distance)
    }
}

impl Default for ForceLaw {
    fn default() -> Self {
        Self::new(6.0, 100.0)
    }
}
