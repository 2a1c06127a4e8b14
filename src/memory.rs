use crate::{KMeansError, Result};
use num::Float;
use std::{
    fmt::{Debug, Display, LowerExp}, iter::Sum, ops::{AddAssign, DivAssign, SubAssign}, slice::ChunksExact
};

/// Floating point type, all calculations are carried out in.
pub trait Primitive: Float + Sum + AddAssign + SubAssign + DivAssign
                + Default + Display + Debug + LowerExp + Send + Sync + 'static {
    /// Convert a count (e.g. a cluster size) into this type.
    fn from_count(cnt: usize) -> Self;
    /// Convert a configuration literal into this type.
    fn from_f64(v: f64) -> Self;
}
impl Primitive for f32 {
    #[inline] fn from_count(cnt: usize) -> Self { cnt as f32 }
    #[inline] fn from_f64(v: f64) -> Self { v as f32 }
}
impl Primitive for f64 {
    #[inline] fn from_count(cnt: usize) -> Self { cnt as f64 }
    #[inline] fn from_f64(v: f64) -> Self { v }
}


/// Dense row-major matrix, used both for the sample data (`n x d`) and for center sets (`k x d`).
///
/// Storage layout: [row-major] = [<row0>,<row1>,<row2>,...]
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T: Primitive> {
    values: Vec<T>,
    rows: usize,
    cols: usize,
}
impl<T: Primitive> Matrix<T> {
    /// Wrap a row-major value buffer holding `rows * cols` values.
    pub fn new(values: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if cols == 0 {
            return Err(KMeansError::ZeroColumns);
        }
        let expected = rows.checked_mul(cols).ok_or(KMeansError::ShapeOverflow { rows, cols })?;
        if values.len() != expected {
            return Err(KMeansError::ShapeMismatch { rows, cols, expected, actual: values.len() });
        }
        Ok(Self { values, rows, cols })
    }

    /// Build a matrix from a list of equally sized rows.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut values = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            values.extend_from_slice(row.as_ref());
        }
        Self::new(values, rows.len(), cols)
    }

    pub(crate) fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self { values: vec![value; rows * cols], rows, cols }
    }

    #[inline] pub fn rows(&self) -> usize { self.rows }
    #[inline] pub fn cols(&self) -> usize { self.cols }
    #[inline] pub fn as_slice(&self) -> &[T] { &self.values }
    pub fn into_vec(self) -> Vec<T> { self.values }

    /// Row `idx` of the matrix. Panics if `idx >= rows()`.
    #[inline]
    pub fn row(&self, idx: usize) -> &[T] {
        &self.values[idx * self.cols..(idx + 1) * self.cols]
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, idx: usize) -> &mut [T] {
        &mut self.values[idx * self.cols..(idx + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> ChunksExact<'_, T> {
        self.values.chunks_exact(self.cols)
    }

    /// Copy of the first `cnt` rows (all rows, if there are fewer).
    pub fn head(&self, cnt: usize) -> Self {
        let cnt = cnt.min(self.rows);
        Self { values: self.values[..cnt * self.cols].to_vec(), rows: cnt, cols: self.cols }
    }

    /// Largest absolute element-wise difference to `other`.
    ///
    /// A NaN on either side makes the result NaN, so a degenerate center never looks converged.
    pub fn max_abs_diff(&self, other: &Self) -> Result<T> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(KMeansError::MatrixMismatch {
                rows: self.rows, cols: self.cols, other_rows: other.rows, other_cols: other.cols
            });
        }
        Ok(self.values.iter().zip(other.values.iter())
            .map(|(&a, &b)| (a - b).abs())
            .fold(T::zero(), |acc, d| {
                if acc.is_nan() || d.is_nan() { T::nan() } else if d > acc { d } else { acc }
            }))
    }
}
