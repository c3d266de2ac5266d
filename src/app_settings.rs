use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::particle::{Bounds, Category};
use crate::physics::matrix::{
    ChainsMatrixGenerator, DiagonalPolicy, MatrixGenerator, PresetMatrixGenerator,
    RandomMatrixGenerator, SnakesMatrixGenerator, SymmetryMatrixGenerator, ZeroMatrixGenerator,
};
use crate::physics::setters::Placement;

/// Everything the simulation core needs at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of particle species, also the attraction matrix dimension
    pub category_count: usize,
    /// Number of particles spawned on (re)start
    pub particle_count: usize,
    /// Area particles are kept in by reflection
    pub bounds: Bounds,
    /// Below this distance every pair repels
    pub min_distance: f64,
    /// Pairs further apart than this never interact
    pub max_interaction_distance: f64,
    /// Fraction of velocity lost per tick, in `[0, 1)`
    pub friction: f64,
    /// Per-axis speed limit
    pub max_velocity: f64,
    /// Generated coefficients lie in `[-max_force, max_force]`
    pub max_force: f64,
    /// How random matrices treat same-category cells
    pub diagonal: DiagonalPolicy,
    /// Generator used for the initial matrix and for regeneration
    pub generator: MatrixKind,
    /// Explicit table used for the initial matrix instead of the generator
    pub matrix: Option<Vec<Vec<f64>>>,
    /// Initial particle layout
    pub placement: Placement,
    /// Seed for placement and matrix generation; random when absent
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            category_count: 5,
            particle_count: 800,
            bounds: Bounds::default(),
            min_distance: 6.0,
            max_interaction_distance: 100.0,
            friction: 0.01,
            max_velocity: 500.0,
            max_force: 10.0,
            diagonal: DiagonalPolicy::Uniform,
            generator: MatrixKind::Random,
            matrix: None,
            placement: Placement::Random,
            seed: None,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

impl SimulationSettings {
    /// Checks every scalar field. Matrix shape is checked when the matrix is
    /// built, since it may come from a generator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.category_count == 0 || self.category_count > Category::MAX_COUNT {
            return Err(ConfigError::CategoryCount {
                actual: self.category_count,
                max: Category::MAX_COUNT,
            });
        }

        positive("min_distance", self.min_distance)?;
        positive("max_interaction_distance", self.max_interaction_distance)?;
        if self.min_distance >= self.max_interaction_distance {
            return Err(ConfigError::DistanceOrder {
                min_distance: self.min_distance,
                max_interaction_distance: self.max_interaction_distance,
            });
        }

        if !(0.0..1.0).contains(&self.friction) {
            return Err(ConfigError::Friction(self.friction));
        }
        positive("max_velocity", self.max_velocity)?;
        positive("max_force", self.max_force)?;

        for (field, value) in [("origin.x", self.bounds.origin[0]), ("origin.y", self.bounds.origin[1])] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteBounds { field, value });
            }
        }
        positive("bounds.size.x", self.bounds.size[0])?;
        positive("bounds.size.y", self.bounds.size[1])?;

        if self.matrix.is_none() && self.generator == MatrixKind::Preset && self.category_count != 5 {
            return Err(ConfigError::MatrixDimension {
                dimension: 5,
                category_count: self.category_count,
            });
        }

        Ok(())
    }

    pub fn matrix_generator(&self) -> Box<dyn MatrixGenerator> {
        self.generator.generator(self.max_force, self.diagonal)
    }
}

/// Matrix generator selectable from the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixKind {
    #[default]
    Random,
    Symmetry,
    Chains,
    Snakes,
    Zero,
    /// Fixed five-species chain
    Preset,
}

impl MatrixKind {
    pub fn generator(self, max_force: f64, diagonal: DiagonalPolicy) -> Box<dyn MatrixGenerator> {
        match self {
            MatrixKind::Random => Box::new(RandomMatrixGenerator { max_force, diagonal }),
            MatrixKind::Symmetry => Box::new(SymmetryMatrixGenerator { max_force, diagonal }),
            MatrixKind::Chains => Box::new(ChainsMatrixGenerator { max_force }),
            MatrixKind::Snakes => Box::new(SnakesMatrixGenerator { max_force }),
            MatrixKind::Zero => Box::new(ZeroMatrixGenerator),
            MatrixKind::Preset => Box::new(PresetMatrixGenerator),
        }
    }
}

/// Driver-side clock settings: the simulation itself only sees `dt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSettings {
    /// Frame delta in seconds before scaling
    pub time_step: f64,
    /// Selectable time multipliers
    pub scale_steps: Vec<f64>,
    /// Index into `scale_steps` used at start and on reset
    pub default_scale_index: usize,
    /// Start paused
    pub paused: bool,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            scale_steps: vec![0.2, 0.5, 1.0, 1.2, 1.5, 2.0, 3.0, 5.0, 10.0, 20.0],
            default_scale_index: 2,
            paused: false,
        }
    }
}

/// Application settings, one table per concern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub simulation: SimulationSettings,
    pub time: TimeSettings,
}

impl AppSettings {
    pub const SETTINGS_FILE: &'static str = "settings.toml";

    /// Loads settings from `path`, or returns default settings if the file doesn't exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Self::from_toml(&contents)
        } else {
            log::warn!("{} not found, using default settings", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: AppSettings = toml::from_str(contents)?;
        Ok(settings)
    }
}
