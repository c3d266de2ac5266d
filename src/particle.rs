use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

pub type Position = Vector2<f64>;
pub type Velocity = Vector2<f64>;
pub type Acceleration = Vector2<f64>;

/// Species of a particle. Indexes rows and columns of the attraction matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(u8);

impl Category {
    /// Largest number of categories a matrix can be indexed with.
    pub const MAX_COUNT: usize = u8::MAX as usize + 1;

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Builds a category from a matrix index, `None` if it does not fit.
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().map(Self)
    }
}

/// Display names used by the original five-species scene.
pub const DEFAULT_CATEGORY_NAMES: [&str; 5] = ["Red", "Green", "Blue", "Yellow", "Purple"];

/// Axis-aligned simulation area, `origin` being the minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub origin: [f64; 2],
    pub size: [f64; 2],
}

impl Bounds {
    pub fn new(origin: [f64; 2], size: [f64; 2]) -> Self {
        Self { origin, size }
    }

    pub fn min(&self) -> Position {
        Position::new(self.origin[0], self.origin[1])
    }

    pub fn max(&self) -> Position {
        Position::new(self.origin[0] + self.size[0], self.origin[1] + self.size[1])
    }

    pub fn contains(&self, position: &Position) -> bool {
        let (min, max) = (self.min(), self.max());
        position.x >= min.x && position.x <= max.x && position.y >= min.y && position.y <= max.y
    }

    pub fn center(&self) -> Position {
        (self.min() + self.max()) * 0.5
    }
}

impl Default for Bounds {
    fn default() -> Self {
        // Screen area right of the 300px side panel.
        Self {
            origin: [300.0, 0.0],
            size: [900.0, 600.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    pub position: Position,
    pub velocity: Velocity,
    /// Recomputed every tick, no memory across ticks.
    pub acceleration: Acceleration,
    pub category: Category,
}

impl ParticleState {
    /// A particle at rest.
    pub fn new(position: Position, category: Category) -> Self {
        Self {
            position,
            velocity: Velocity::zeros(),
            acceleration: Acceleration::zeros(),
            category,
        }
    }

    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        self.velocity = velocity;
        self
    }

    /// Velocity update, friction, per-axis speed clamp, position update and
    /// boundary reflection, in that order.
    pub fn integrate(&mut self, dt: f64, friction: f64, max_velocity: f64, bounds: &Bounds) {
        self.velocity += self.acceleration * dt;
        self.velocity *= 1.0 - friction;

        self.velocity.x = self.velocity.x.clamp(-max_velocity, max_velocity);
        self.velocity.y = self.velocity.y.clamp(-max_velocity, max_velocity);

        self.position += self.velocity * dt;

        self.reflect(bounds);
    }

    /// Clamps each axis into `bounds` and negates that axis' velocity when it
    /// was out. No restitution, no overshoot correction.
    pub fn reflect(&mut self, bounds: &Bounds) {
        let (min, max) = (bounds.min(), bounds.max());

        for axis in 0..2 {
            if self.position[axis] > max[axis] {
                self.position[axis] = max[axis];
                self.velocity[axis] = -self.velocity[axis];
            }
            if self.position[axis] < min[axis] {
                self.position[axis] = min[axis];
                self.velocity[axis] = -self.velocity[axis];
            }
        }
    }
}
