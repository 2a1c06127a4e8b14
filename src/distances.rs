use crate::{KMeansError, Matrix, Primitive, Result};
use rayon::prelude::*;

#[inline(always)]
pub fn squared_norm<T: Primitive>(v: &[T]) -> T {
    v.iter().map(|&x| x * x).sum()
}

#[inline(always)]
pub fn dot<T: Primitive>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum()
}

/// Squared euclidean distance, computed as `sum((a - b)^2)`.
#[inline(always)]
pub fn squared_euclidean<T: Primitive>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b.iter())
        .map(|(&x, &y)| x - y)          // <sample> - <center>
        .map(|v| v * v)                 // <vec_components> ^2
        .sum()                          // sum(<vec_components>^2)
}

#[inline(always)]
pub fn euclidean<T: Primitive>(a: &[T], b: &[T]) -> T {
    squared_euclidean(a, b).sqrt()
}

/// Check that `centers` can be compared against `samples` and return the amount of centers.
pub(crate) fn check_centers<T: Primitive>(samples: &Matrix<T>, centers: &Matrix<T>) -> Result<usize> {
    if centers.cols() != samples.cols() {
        return Err(KMeansError::DimensionMismatch { sample_dims: samples.cols(), center_dims: centers.cols() });
    }
    if centers.rows() == 0 {
        return Err(KMeansError::NoCenters);
    }
    Ok(centers.rows())
}

/// Squared euclidean distances between every sample and every center.
///
/// Uses the expansion `||x - u||^2 = ||x||^2 + ||u||^2 - 2 * x.u`, so the squared norms of all
/// centers are only calculated once. This trades some accuracy for speed: when samples and centers
/// have a large magnitude relative to their separation, cancellation can make small distances
/// inexact (or even slightly negative). Use [`squared_euclidean`] where that matters.
///
/// ## Returns
/// `n x k` distances [row-major]: entry `i * k + j` is the distance of sample `i` to center `j`.
pub fn pairwise_squared_distances<T: Primitive>(samples: &Matrix<T>, centers: &Matrix<T>) -> Result<Vec<T>> {
    let k = check_centers(samples, centers)?;
    let center_norms: Vec<T> = centers.iter_rows().map(squared_norm).collect();
    let two = T::one() + T::one();

    let mut distances = vec![T::zero(); samples.rows() * k];
    // rows are independent, each one is summed sequentially -> result does not depend on thread count
    let work_packet_size = (samples.rows() / rayon::current_num_threads()).max(1);
    distances.par_chunks_mut(k)
        .with_min_len(work_packet_size)
        .zip(samples.as_slice().par_chunks(samples.cols()))
        .for_each(|(dist_row, s)| {
            let sample_norm = squared_norm(s);
            dist_row.iter_mut()
                .zip(centers.iter_rows().zip(center_norms.iter().cloned()))
                .for_each(|(d, (c, center_norm))| *d = sample_norm + center_norm - two * dot(s, c));
        });
    Ok(distances)
}

/// Index of the smallest value, the lowest index wins ties.
///
/// NaN values are never selected while at least one value is not NaN; a row consisting only
/// of NaNs maps to `0`.
pub(crate) fn argmin<T: Primitive>(row: &[T]) -> usize {
    let mut best: Option<(usize, T)> = None;
    for (idx, &d) in row.iter().enumerate() {
        if d.is_nan() {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((idx, d)),
        }
    }
    best.map(|(idx, _)| idx).unwrap_or(0)
}
