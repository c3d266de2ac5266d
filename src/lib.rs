//! Particle life on the CPU.
//!
//! Particles of a few categories push and pull each other according to an
//! asymmetric attraction matrix. [`physics::Simulation::tick`] advances the
//! whole population by one step; rendering and input live elsewhere.

pub mod app_settings;
pub mod error;
pub mod particle;
pub mod physics;
pub mod time_control;

pub use app_settings::{AppSettings, MatrixKind, SimulationSettings, TimeSettings};
pub use error::{ConfigError, Error};
pub use particle::{Bounds, Category, ParticleState, Position, Velocity};
pub use physics::force::ForceLaw;
pub use physics::matrix::{AttractionMatrix, DiagonalPolicy};
pub use physics::{Body, Simulation, Snapshot};
pub use time_control::TimeController;
