use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{AddAssign, Sub};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Both samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn gaussian<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / rows)).
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    ///
    /// Shape: (rows, cols). Weights multiply a row vector from the left, so
    /// `rows` is the fan-in.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::gaussian(rows, cols, (2.0 / rows.max(1) as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / rows)).
    ///
    /// Recommended before Sigmoid/Tanh/Softmax layers.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::gaussian(rows, cols, (1.0 / rows.max(1) as f64).sqrt(), rng)
    }

    /// A 1×n matrix holding `values`.
    pub fn row(values: Vec<f64>) -> Matrix {
        Matrix { rows: 1, cols: values.len(), data: vec![values] }
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.rows, other.rows);
        assert_eq!(self.cols, other.cols);
        let data = self.data.iter().zip(other.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(x, y)| x * y).collect()
            })
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    /// `self * rhs` without consuming either operand.
    pub fn dot(&self, rhs: &Matrix) -> Matrix {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..res.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        res
    }

    /// `selfᵀ * rhs`, used for outer products in backprop.
    pub fn transpose_dot(&self, rhs: &Matrix) -> Matrix {
        self.transpose().dot(rhs)
    }

    /// Flattened view of a 1×n matrix.
    pub fn first_row(&self) -> &[f64] {
        self.data.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn values(&self) -> impl Iterator<Item = &f64> {
        self.data.iter().flat_map(|row| row.iter())
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.data.iter_mut().flat_map(|row| row.iter_mut())
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map(Vec::len).unwrap_or(0),
            data,
        }
    }

    /// Checks that `data` really is `rows × cols`. Deserialized matrices
    /// are validated with this before use.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|row| row.len() == self.cols)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl AddAssign<&Matrix> for Matrix {
    fn add_assign(&mut self, rhs: &Matrix) {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        for (row, rhs_row) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (x, y) in row.iter_mut().zip(rhs_row.iter()) {
                *x += y;
            }
        }
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = self;

        for (row, rhs_row) in res.data.iter_mut().zip(rhs.data.iter()) {
            for (x, y) in row.iter_mut().zip(rhs_row.iter()) {
                *x -= y;
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn dot_multiplies_row_vector_by_weights() {
        let x = Matrix::row(vec![1.0, 2.0]);
        let w = Matrix::from_data(vec![vec![1.0, 0.0, 2.0], vec![0.5, 1.0, -1.0]]);
        let z = x.dot(&w);
        assert_eq!(z.rows, 1);
        assert_eq!(z.first_row(), &[2.0, 2.0, 0.0]);
    }

    #[test]
    fn transpose_dot_is_outer_product_for_row_vectors() {
        let a = Matrix::row(vec![1.0, 2.0]);
        let b = Matrix::row(vec![3.0, 4.0, 5.0]);
        let outer = a.transpose_dot(&b);
        assert_eq!(outer.rows, 2);
        assert_eq!(outer.cols, 3);
        assert_eq!(outer.data[1], vec![6.0, 8.0, 10.0]);
    }

    #[test]
    fn seeded_initialization_is_reproducible() {
        let a = Matrix::he(4, 3, &mut StdRng::seed_from_u64(11));
        let b = Matrix::he(4, 3, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
        assert!(a.values().any(|&v| v != 0.0));
    }

    #[test]
    fn well_formed_detects_ragged_rows() {
        let mut m = Matrix::zeros(2, 2);
        assert!(m.is_well_formed());
        m.data[1].push(1.0);
        assert!(!m.is_well_formed());
    }

    #[test]
    fn add_assign_and_sub_are_element_wise() {
        let mut a = Matrix::from_data(vec![vec![1.0, 2.0]]);
        let b = Matrix::from_data(vec![vec![0.5, 0.5]]);
        a += &b;
        assert_eq!(a.first_row(), &[1.5, 2.5]);
        assert_eq!((a - b).first_row(), &[1.0, 2.0]);
    }
}
