use std::fmt;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::particle::Category;

/// Square table of force coefficients. `lookup(i, j)` is the force felt by
/// a particle of category `i` due to one of category `j`; the table is not
/// symmetric in general.
#[derive(Debug, Clone, PartialEq)]
pub struct AttractionMatrix {
    data: Vec<f64>,
    size: usize,
}

impl AttractionMatrix {
    /// All-zero matrix: particles only feel short-range repulsion.
    pub fn zeros(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Validates that `table` is square and takes it as-is.
    pub fn from_explicit(table: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
        let size = table.len();
        if size == 0 {
            return Err(ConfigError::EmptyMatrix);
        }
        if size > Category::MAX_COUNT {
            return Err(ConfigError::CategoryCount {
                actual: size,
                max: Category::MAX_COUNT,
            });
        }

        let mut data = Vec::with_capacity(size * size);
        for (row, values) in table.into_iter().enumerate() {
            if values.len() != size {
                return Err(ConfigError::NonSquareMatrix {
                    row,
                    actual: values.len(),
                    expected: size,
                });
            }
            data.extend(values);
        }

        Ok(Self { data, size })
    }

    /// Every cell drawn uniformly from `[-max_force, max_force]` and rounded
    /// to one decimal.
    pub fn generate_random(
        size: usize,
        max_force: f64,
        diagonal: DiagonalPolicy,
        rng: &mut dyn RngCore,
    ) -> Self {
        let mut matrix = Self::zeros(size);
        for i in 0..size {
            for j in 0..size {
                let value = random_coefficient(max_force, rng);
                let value = if i == j { diagonal.apply(value) } else { value };
                matrix.set(i, j, value);
            }
        }
        matrix
    }

    /// The hand-tuned five-species chain: each species chases the next one
    /// and flees the one after.
    pub fn preset() -> Self {
        let table = [
            [10.0, -10.0, 10.0, 0.0, 0.0],
            [0.0, 10.0, -10.0, 10.0, 0.0],
            [0.0, 0.0, 10.0, -10.0, 10.0],
            [10.0, 0.0, 0.0, 10.0, -10.0],
            [-10.0, 10.0, 0.0, 0.0, 10.0],
        ];
        Self {
            data: table.iter().flatten().copied().collect(),
            size: table.len(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn lookup(&self, i: Category, j: Category) -> f64 {
        self.get(i.index(), j.index())
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.size + j] = value;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.size.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

impl fmt::Display for AttractionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{value:>6.1}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn random_coefficient(max_force: f64, rng: &mut dyn RngCore) -> f64 {
    let value: f64 = rng.gen_range(-max_force..=max_force);
    ((value * 10.0).round() / 10.0).clamp(-max_force, max_force)
}

/// How same-category (diagonal) cells are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagonalPolicy {
    /// Same distribution as every other cell.
    #[default]
    Uniform,
    /// Diagonal forced non-negative, so species tend to clump together.
    Attractive,
}

impl DiagonalPolicy {
    fn apply(self, value: f64) -> f64 {
        match self {
            DiagonalPolicy::Uniform => value,
            DiagonalPolicy::Attractive => value.abs(),
        }
    }
}

pub trait MatrixGenerator: Send + Sync {
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> AttractionMatrix;
}

pub struct RandomMatrixGenerator {
    pub max_force: f64,
    pub diagonal: DiagonalPolicy,
}

impl MatrixGenerator for RandomMatrixGenerator {
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> AttractionMatrix {
        AttractionMatrix::generate_random(size, self.max_force, self.diagonal, rng)
    }
}

pub struct SymmetryMatrixGenerator {
    pub max_force: f64,
    pub diagonal: DiagonalPolicy,
}

impl MatrixGenerator for SymmetryMatrixGenerator {
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> AttractionMatrix {
        let mut matrix = AttractionMatrix::generate_random(size, self.max_force, self.diagonal, rng);
        for i in 0..size {
            for j in i..size {
                let value = matrix.get(j, i);
                matrix.set(i, j, value);
            }
        }
        matrix
    }
}

pub struct ChainsMatrixGenerator {
    pub max_force: f64,
}

impl MatrixGenerator for ChainsMatrixGenerator {
    fn generate(&self, size: usize, _rng: &mut dyn RngCore) -> AttractionMatrix {
        let mut matrix = AttractionMatrix::zeros(size);
        for i in 0..size {
            for j in 0..size {
                if j == i || j == (i + 1) % size || j == (i + size - 1) % size {
                    matrix.set(i, j, self.max_force);
                } else {
                    matrix.set(i, j, -self.max_force);
                }
            }
        }
        matrix
    }
}

pub struct SnakesMatrixGenerator {
    pub max_force: f64,
}

impl MatrixGenerator for SnakesMatrixGenerator {
    fn generate(&self, size: usize, _rng: &mut dyn RngCore) -> AttractionMatrix {
        let mut matrix = AttractionMatrix::zeros(size);
        for i in 0..size {
            matrix.set(i, i, self.max_force);
            matrix.set(i, (i + 1) % size, self.max_force * 0.2);
        }
        matrix
    }
}

pub struct ZeroMatrixGenerator;

impl MatrixGenerator for ZeroMatrixGenerator {
    fn generate(&self, size: usize, _rng: &mut dyn RngCore) -> AttractionMatrix {
        AttractionMatrix::zeros(size)
    }
}

/// Ignores the requested size; only valid for five categories.
pub struct PresetMatrixGenerator;

impl MatrixGenerator for PresetMatrixGenerator {
    fn generate(&self, _size: usize, _rng: &mut dyn RngCore) -> AttractionMatrix {
        AttractionMatrix::preset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_cells_stay_in_range_and_are_rounded() {
        let mut rng = StdRng::seed_from_u64(7);
        for max_force in [10.0, 1.0, 0.25] {
            let matrix =
                AttractionMatrix::generate_random(6, max_force, DiagonalPolicy::Uniform, &mut rng);
            for row in matrix.rows() {
                for &value in row {
                    assert!((-max_force..=max_force).contains(&value), "{value}");
                    let tenths = value * 10.0;
                    assert!((tenths - tenths.round()).abs() < 1e-9 || value.abs() == max_force);
                }
            }
        }
    }

    #[test]
    fn regenerating_with_new_size_resizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let generator = RandomMatrixGenerator {
            max_force: 10.0,
            diagonal: DiagonalPolicy::Uniform,
        };
        assert_eq!(generator.generate(5, &mut rng).size(), 5);
        let bigger = generator.generate(9, &mut rng);
        assert_eq!(bigger.size(), 9);
        assert_eq!(bigger.rows().count(), 9);
        assert!(bigger.rows().all(|row| row.len() == 9));
    }

    #[test]
    fn attractive_diagonal_is_non_negative() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let matrix =
                AttractionMatrix::generate_random(5, 10.0, DiagonalPolicy::Attractive, &mut rng);
            assert!((0..5).all(|i| matrix.get(i, i) >= 0.0));
        }
    }

    #[test]
    fn same_seed_same_matrix() {
        let a = AttractionMatrix::generate_random(
            5,
            10.0,
            DiagonalPolicy::Uniform,
            &mut StdRng::seed_from_u64(99),
        );
        let b = AttractionMatrix::generate_random(
            5,
            10.0,
            DiagonalPolicy::Uniform,
            &mut StdRng::seed_from_u64(99),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn explicit_table_is_kept_as_is() {
        let table = vec![vec![1.0, -2.0], vec![3.5, 0.0]];
        let matrix = AttractionMatrix::from_explicit(table.clone()).unwrap();
        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.lookup(Category::new(0), Category::new(1)), -2.0);
        assert_eq!(matrix.lookup(Category::new(1), Category::new(0)), 3.5);
        assert_eq!(matrix.to_rows(), table);
        assert!(!matrix.is_symmetric());
    }

    #[test]
    fn non_square_table_is_rejected() {
        let err = AttractionMatrix::from_explicit(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonSquareMatrix {
                row: 1,
                actual: 1,
                expected: 2
            }
        );
        assert_eq!(
            AttractionMatrix::from_explicit(Vec::new()).unwrap_err(),
            ConfigError::EmptyMatrix
        );
    }

    #[test]
    fn symmetry_generator_mirrors() {
        let matrix = SymmetryMatrixGenerator {
            max_force: 10.0,
            diagonal: DiagonalPolicy::Uniform,
        }
        .generate(6, &mut StdRng::seed_from_u64(5));
        assert!(matrix.is_symmetric());
    }

    #[test]
    fn chains_generator_links_neighbours() {
        let matrix = ChainsMatrixGenerator { max_force: 10.0 }.generate(5, &mut StdRng::seed_from_u64(0));
        assert_eq!(matrix.get(0, 1), 10.0);
        assert_eq!(matrix.get(0, 4), 10.0);
        assert_eq!(matrix.get(0, 2), -10.0);
    }

    #[test]
    fn preset_is_five_by_five() {
        let matrix = AttractionMatrix::preset();
        assert_eq!(matrix.size(), 5);
        assert_eq!(matrix.get(4, 0), -10.0);
    }

    #[test]
    fn display_prints_one_row_per_line() {
        let text = AttractionMatrix::preset().to_string();
        assert_eq!(text.lines().count(), 5);
        assert!(text.lines().next().unwrap().contains("-10.0"));
    }
}
