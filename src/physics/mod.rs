pub mod force;
pub mod matrix;
pub mod setters;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::app_settings::SimulationSettings;
use crate::error::ConfigError;
use crate::particle::{Acceleration, Bounds, Category, ParticleState, Position};

use self::force::ForceLaw;
use self::matrix::{AttractionMatrix, MatrixGenerator};
use self::setters::PositionSetter;

/// What the force pass reads of another particle, and what renderers read
/// of every particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Position,
    pub category: Category,
}

impl From<&ParticleState> for Body {
    fn from(particle: &ParticleState) -> Self {
        Self {
            position: particle.position,
            category: particle.category,
        }
    }
}

pub struct Snapshot {
    pub bodies: Vec<Body>,
    pub category_counts: Vec<usize>,
    pub particle_count: usize,
    pub mean_speed: f64,
    pub ticks: u64,
}

/// Sum of the forces `frame` exerts on a particle of `category` at
/// `position`. Entries sharing its position are skipped, which covers the
/// particle itself.
pub fn accumulate_force(
    position: Position,
    category: Category,
    frame: &[Body],
    matrix: &AttractionMatrix,
    law: &ForceLaw,
) -> Acceleration {
    let mut total = Acceleration::zeros();
    for other in frame {
        if other.position == position {
            continue;
        }

        let delta = other.position - position;
        let distance = delta.norm();
        if distance > law.max_interaction_distance {
            continue;
        }

        let direction = delta / distance;
        let coefficient = matrix.lookup(category, other.category);
        total += direction * law.force(distance, coefficient);
    }
    total
}

pub struct Simulation {
    particles: Vec<ParticleState>,
    settings: SimulationSettings,
    matrix: AttractionMatrix,
    law: ForceLaw,
    rng: StdRng,
    seed: u64,
    position_setter: Box<dyn PositionSetter>,
    matrix_generator: Box<dyn MatrixGenerator>,
    // previous tick's positions, reused between ticks
    frame: Vec<Body>,
    ticks: u64,
}

impl Simulation {
    /// Validates `settings`, builds the initial matrix and spawns
    /// `particle_count` particles at rest.
    pub fn new(settings: SimulationSettings) -> Result<Self, ConfigError> {
        let mut simulation = Self::empty(settings)?;
        simulation.respawn();
        info!(
            "spawned {} particles in {} categories (seed {})",
            simulation.particles.len(),
            simulation.matrix.size(),
            simulation.seed
        );
        Ok(simulation)
    }

    /// Starts a run from explicit state instead of spawning particles.
    /// `settings.matrix` and `settings.particle_count` are ignored.
    pub fn with_particles(
        settings: SimulationSettings,
        matrix: AttractionMatrix,
        particles: Vec<ParticleState>,
    ) -> Result<Self, ConfigError> {
        let settings = SimulationSettings {
            matrix: None,
            ..settings
        };
        let mut simulation = Self::empty(settings)?;
        simulation.set_matrix(matrix)?;
        check_categories(&particles, simulation.category_count())?;
        simulation.settings.particle_count = particles.len();
        simulation.particles = particles;
        Ok(simulation)
    }

    fn empty(settings: SimulationSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let matrix_generator = settings.matrix_generator();

        let matrix = match &settings.matrix {
            Some(table) => AttractionMatrix::from_explicit(table.clone())?,
            None => matrix_generator.generate(settings.category_count, &mut rng),
        };
        check_dimension(&matrix, settings.category_count)?;

        Ok(Self {
            particles: Vec::new(),
            law: ForceLaw::new(settings.min_distance, settings.max_interaction_distance),
            position_setter: settings.placement.setter(),
            matrix_generator,
            matrix,
            rng,
            seed,
            settings,
            frame: Vec::new(),
            ticks: 0,
        })
    }

    /// Advances the run by `dt`: a force pass over the previous positions,
    /// then an integration pass. Pausing and time scaling are up to the
    /// caller.
    pub fn tick(&mut self, dt: f64) {
        debug_assert!(dt >= 0.0, "negative tick delta {dt}");

        self.frame.clear();
        self.frame.extend(self.particles.iter().map(Body::from));

        let frame = &self.frame;
        let matrix = &self.matrix;
        let law = &self.law;

        // Force pass: every particle reads the same frozen frame and writes
        // only its own acceleration.
        let chunk_size = (self.particles.len() / num_cpus::get()).max(1);
        self.particles.par_chunks_mut(chunk_size).for_each(|chunk| {
            for particle in chunk {
                particle.acceleration =
                    accumulate_force(particle.position, particle.category, frame, matrix, law);
            }
        });

        // Integration pass, only after every acceleration is final.
        let friction = self.settings.friction;
        let max_velocity = self.settings.max_velocity;
        let bounds = self.settings.bounds;
        self.particles.par_iter_mut().for_each(|particle| {
            particle.integrate(dt, friction, max_velocity, &bounds);
        });

        self.ticks += 1;
        trace!("tick {} done (dt {dt})", self.ticks);
    }

    /// Discards all particles and spawns `particle_count` fresh ones.
    pub fn respawn(&mut self) {
        let count = self.settings.particle_count;
        let category_count = self.category_count();

        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let category = random_category(&mut self.rng, category_count);
            let mut position = Position::zeros();
            self.position_setter.set_position(
                &mut position,
                category,
                category_count,
                &self.settings.bounds,
                &mut self.rng,
            );
            self.particles.push(ParticleState::new(position, category));
        }
        debug!("respawned {count} particles");
    }

    pub fn set_particle_count(&mut self, count: usize) {
        self.settings.particle_count = count;
        self.respawn();
    }

    /// New matrix of the same size from the configured generator.
    pub fn regenerate_matrix(&mut self) {
        let size = self.category_count();
        let matrix = self.matrix_generator.generate(size, &mut self.rng);
        debug_assert_eq!(matrix.size(), size);
        self.matrix = matrix;
        info!("regenerated attraction matrix:\n{}", self.matrix);
    }

    /// Swaps the whole matrix. Its dimension must match the category count.
    pub fn set_matrix(&mut self, matrix: AttractionMatrix) -> Result<(), ConfigError> {
        check_dimension(&matrix, self.category_count())?;
        self.matrix = matrix;
        Ok(())
    }

    /// Changes the number of categories: regenerates the matrix at the new
    /// size and gives particles of removed categories a random new one.
    pub fn set_category_count(&mut self, category_count: usize) -> Result<(), ConfigError> {
        let mut settings = self.settings.clone();
        settings.category_count = category_count;
        settings.matrix = None;
        settings.validate()?;
        self.settings = settings;

        self.regenerate_matrix();
        for particle in &mut self.particles {
            if particle.category.index() >= category_count {
                particle.category = random_category(&mut self.rng, category_count);
            }
        }
        Ok(())
    }

    pub fn particles(&self) -> &[ParticleState] {
        &self.particles
    }

    /// Position and category of every particle, in storage order.
    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.particles.iter().map(Body::from)
    }

    pub fn matrix(&self) -> &AttractionMatrix {
        &self.matrix
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn bounds(&self) -> &Bounds {
        &self.settings.bounds
    }

    pub fn force_law(&self) -> &ForceLaw {
        &self.law
    }

    pub fn category_count(&self) -> usize {
        self.settings.category_count
    }

    /// Seed the run's generator was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn category_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.category_count()];
        for particle in &self.particles {
            counts[particle.category.index()] += 1;
        }
        counts
    }

    pub fn mean_speed(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(|p| p.velocity.norm()).sum::<f64>() / self.particles.len() as f64
    }

    pub fn take_snapshot(&self) -> Snapshot {
        Snapshot {
            bodies: self.bodies().collect(),
            category_counts: self.category_counts(),
            particle_count: self.particles.len(),
            mean_speed: self.mean_speed(),
            ticks: self.ticks,
        }
    }
}

fn random_category(rng: &mut StdRng, category_count: usize) -> Category {
    // category_count is validated to fit in a u8 index
    Category::new(rng.gen_range(0..category_count) as u8)
}

fn check_dimension(matrix: &AttractionMatrix, category_count: usize) -> Result<(), ConfigError> {
    if matrix.size() != category_count {
        return Err(ConfigError::MatrixDimension {
            dimension: matrix.size(),
            category_count,
        });
    }
    Ok(())
}

fn check_categories(particles: &[ParticleState], category_count: usize) -> Result<(), ConfigError> {
    match particles
        .iter()
        .position(|p| p.category.index() >= category_count)
    {
        Some(index) => Err(ConfigError::ParticleCategory {
            index,
            category: particles[index].category.index(),
            category_count,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Velocity;

    fn settings() -> SimulationSettings {
        SimulationSettings {
            category_count: 3,
            particle_count: 50,
            bounds: Bounds::new([0.0, 0.0], [200.0, 100.0]),
            seed: Some(1234),
            ..SimulationSettings::default()
        }
    }

    #[test]
    fn new_spawns_resting_particles_inside_bounds() {
        let sim = Simulation::new(settings()).unwrap();
        assert_eq!(sim.particles().len(), 50);
        assert_eq!(sim.matrix().size(), 3);
        for p in sim.particles() {
            assert!(sim.bounds().contains(&p.position));
            assert_eq!(p.velocity, Velocity::zeros());
            assert!(p.category.index() < 3);
        }
        assert_eq!(sim.category_counts().iter().sum::<usize>(), 50);
    }

    #[test]
    fn explicit_matrix_must_match_category_count() {
        let bad = SimulationSettings {
            matrix: Some(vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
            ..settings()
        };
        assert!(matches!(
            Simulation::new(bad),
            Err(ConfigError::MatrixDimension {
                dimension: 2,
                category_count: 3
            })
        ));

        let ragged = SimulationSettings {
            matrix: Some(vec![vec![1.0, 0.0, 0.0], vec![0.0], vec![0.0, 0.0, 0.0]]),
            ..settings()
        };
        assert!(matches!(
            Simulation::new(ragged),
            Err(ConfigError::NonSquareMatrix { row: 1, .. })
        ));
    }

    #[test]
    fn set_matrix_rejects_wrong_size() {
        let mut sim = Simulation::new(settings()).unwrap();
        assert!(sim.set_matrix(AttractionMatrix::zeros(4)).is_err());
        assert!(sim.set_matrix(AttractionMatrix::zeros(3)).is_ok());
        assert_eq!(sim.matrix(), &AttractionMatrix::zeros(3));
    }

    #[test]
    fn with_particles_rejects_unknown_categories() {
        let particles = vec![ParticleState::new(Position::new(1.0, 1.0), Category::new(3))];
        let err = Simulation::with_particles(settings(), AttractionMatrix::zeros(3), particles)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigError::ParticleCategory {
                index: 0,
                category: 3,
                category_count: 3
            }
        );
    }

    #[test]
    fn zero_particles_tick_fine() {
        let mut sim = Simulation::new(SimulationSettings {
            particle_count: 0,
            ..settings()
        })
        .unwrap();
        sim.tick(0.016);
        assert_eq!(sim.ticks(), 1);
        assert_eq!(sim.mean_speed(), 0.0);
    }

    #[test]
    fn category_count_change_resizes_matrix_and_remaps() {
        let mut sim = Simulation::new(settings()).unwrap();
        sim.set_category_count(2).unwrap();
        assert_eq!(sim.matrix().size(), 2);
        assert!(sim.particles().iter().all(|p| p.category.index() < 2));
        assert_eq!(sim.category_counts().len(), 2);

        sim.set_category_count(7).unwrap();
        assert_eq!(sim.matrix().size(), 7);
        assert!(sim.set_category_count(0).is_err());
        assert_eq!(sim.category_count(), 7);
    }

    #[test]
    fn set_particle_count_respawns() {
        let mut sim = Simulation::new(settings()).unwrap();
        sim.set_particle_count(10);
        assert_eq!(sim.particles().len(), 10);
        assert_eq!(sim.take_snapshot().particle_count, 10);
    }

    #[test]
    fn coincident_particles_are_skipped() {
        let law = ForceLaw::default();
        let matrix = AttractionMatrix::preset();
        let here = Position::new(10.0, 10.0);
        let frame = vec![
            Body {
                position: here,
                category: Category::new(0),
            },
            Body {
                position: here,
                category: Category::new(1),
            },
        ];
        assert_eq!(
            accumulate_force(here, Category::new(0), &frame, &matrix, &law),
            Acceleration::zeros()
        );
    }

    #[test]
    fn far_particles_are_ignored() {
        let law = ForceLaw::default();
        let matrix = AttractionMatrix::preset();
        let frame = vec![Body {
            position: Position::new(100.5, 0.0),
            category: Category::new(0),
        }];
        assert_eq!(
            accumulate_force(Position::zeros(), Category::new(0), &frame, &matrix, &law),
            Acceleration::zeros()
        );
    }
}
