use crate::{distances, memory::*, EmptyClusterPolicy, KMeans, KMeansConfig, KMeansError, KMeansState, Result};
use log::{debug, info, trace, warn};

pub(crate) struct Lloyd<T: Primitive> {
    _p: std::marker::PhantomData<T>
}
impl<T: Primitive> Lloyd<T> {
    /// Move samples into empty clusters, before the centers are recalculated from `assignments`.
    ///
    /// For each empty cluster, the sample with the highest distance to its current center is chosen,
    /// as long as it is not the last sample of its own cluster. Returns the amount of reseeded clusters.
    fn reseed_empty_clusters(data: &KMeans<T>, centers: &Matrix<T>, assignments: &mut [usize]) -> usize {
        let k = centers.rows();
        let mut centroid_frequency = vec![0usize; k];
        assignments.iter().for_each(|&a| centroid_frequency[a] += 1);
        if centroid_frequency.iter().all(|&f| f > 0) {
            return 0;
        }

        let centroid_distances: Vec<T> = data.samples.iter_rows()
            .zip(assignments.iter())
            .map(|(s, &a)| distances::squared_euclidean(s, centers.row(a)))
            .collect();
        // NaN distances sort last -> those samples are taken first
        let mut distance_sorted_samples: Vec<usize> = (0..data.sample_cnt()).collect();
        distance_sorted_samples.sort_by(|&i1, &i2| {
            let (d1, d2) = (centroid_distances[i1], centroid_distances[i2]);
            d1.partial_cmp(&d2).unwrap_or_else(|| d1.is_nan().cmp(&d2.is_nan()))
        });

        let mut reseeded = 0;
        for empty_id in 0..k {
            if centroid_frequency[empty_id] != 0 {
                continue;
            }
            let donor = distance_sorted_samples.iter().rev().cloned()
                .find(|&sample_id| centroid_frequency[assignments[sample_id]] > 1);
            let Some(sample_id) = donor else {
                break;
            };
            let prev_centroid_id = assignments[sample_id];
            trace!("moving sample {} from cluster {} into empty cluster {}", sample_id, prev_centroid_id, empty_id);
            centroid_frequency[prev_centroid_id] -= 1;
            centroid_frequency[empty_id] += 1;
            assignments[sample_id] = empty_id;
            reseeded += 1;
        }
        reseeded
    }

    pub fn calculate(data: &KMeans<T>, k: usize, config: &KMeansConfig<'_, T>) -> Result<KMeansState<T>> {
        if k == 0 || k > data.sample_cnt() {
            return Err(KMeansError::InvalidCenterCount { k, sample_cnt: data.sample_cnt() });
        }
        let mut state = KMeansState::new(k, data.samples.head(k));
        (config.init_done)(&state);
        let mut abort_strategy = config.abort_strategy.create_logic();

        loop {
            if let Some(max_iter) = config.max_iter {
                if state.iterations >= max_iter {
                    warn!("stopping after {} iterations without convergence (last error: {:?})", max_iter, state.error());
                    break;
                }
            }
            let iteration = state.iterations + 1;

            let mut assignments = data.cluster_data(&state.centroids)?;
            if config.empty_clusters == EmptyClusterPolicy::ReseedFarthest {
                let reseeded = Self::reseed_empty_clusters(data, &state.centroids, &mut assignments);
                if reseeded > 0 {
                    debug!("iteration {}: reseeded {} empty clusters", iteration, reseeded);
                }
            }
            let new_centroids = data.calculate_centers(&assignments, k)?;
            let previous_centroids = std::mem::replace(&mut state.centroids, new_centroids);
            let shift = state.centroids.max_abs_diff(&previous_centroids)?;
            let error = data.calculate_error(&state.centroids)?;

            state.assignments = assignments;
            state.errors.push(error);
            state.iterations = iteration;
            if state.centroids.as_slice().iter().any(|v| v.is_nan()) {
                warn!("iteration {}: at least one cluster is empty, its center is NaN", iteration);
            }
            debug!("iteration {}: center shift {:e}, error {:e}", iteration, shift, error);

            // Notify subscriber about finished iteration
            (config.iteration_done)(&state, iteration, shift);
            if abort_strategy.converged(shift, error) {
                state.converged = true;
                info!("converged after {} iterations, error {:e}", iteration, error);
                break;
            }
        }
        Ok(state)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing;
    use crate::AbortStrategy;
    use std::cell::RefCell;

    fn kmean(rows: &[[f64; 2]]) -> KMeans<f64> {
        KMeans::from_matrix(Matrix::from_rows(rows).unwrap())
    }

    #[test]
    fn two_separated_pairs() {
        let kmean = kmean(&[[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]]);
        let res = kmean.kmeans_lloyd(2, &KMeansConfig::default()).unwrap();

        assert!(res.converged);
        assert!(res.iterations <= 5);
        assert_eq!(res.centroids.as_slice(), &[0.0, 0.5, 10.0, 10.5]);
        assert_eq!(res.assignments, vec![0, 0, 1, 1]);
        assert_eq!(res.errors.len(), res.iterations);
        assert_eq!(res.error(), Some(0.5));

        let (centers, errors) = kmean.lloyd_algorithm(2, 0.01).unwrap();
        assert_eq!(centers, res.centroids);
        assert_eq!(errors, res.errors);
    }

    #[test]
    fn single_cluster_is_global_mean() {
        let kmean = kmean(&[[1.0, 2.0], [3.0, 2.0], [2.0, 5.0], [2.0, -1.0]]);
        let res = kmean.kmeans_lloyd(1, &KMeansConfig::default()).unwrap();

        assert!(res.converged);
        // the first iteration already lands on the mean, the second one only confirms it
        assert!(res.iterations <= 2);
        assert_eq!(res.centroids.as_slice(), &[2.0, 2.0]);
        assert_eq!(res.assignments, vec![0; 4]);
        let should = (1.0 + 1.0 + 3.0 + 3.0) / 4.0;
        assert!(res.errors.iter().all(|&e| e == should));
    }

    #[test]
    fn single_cluster_near_mean_converges_in_one_iteration() {
        let kmean = kmean(&[[2.0, 2.0], [1.0, 2.0], [3.0, 2.0]]);
        let res = kmean.kmeans_lloyd(1, &KMeansConfig::default()).unwrap();
        assert_eq!(res.iterations, 1);
        assert_eq!(res.centroids.as_slice(), &[2.0, 2.0]);
        assert_approx_eq!(res.error().unwrap(), 2.0 / 3.0, 1e-12);
    }

    #[test]
    fn one_center_per_sample() {
        let kmean = kmean(&[[0.0, 0.0], [3.0, 1.0], [-7.0, 2.5], [100.0, 100.0], [0.5, 0.5]]);
        let res = kmean.kmeans_lloyd(5, &KMeansConfig::default()).unwrap();
        assert!(res.converged);
        assert_eq!(res.iterations, 1);
        assert_eq!(res.errors, vec![0.0]);
        assert_eq!(&res.centroids, kmean.samples());
        assert_eq!(res.assignments, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn invalid_center_count() {
        let kmean = kmean(&[[0.0, 0.0], [1.0, 1.0]]);
        assert_eq!(kmean.kmeans_lloyd(0, &KMeansConfig::default()).err(),
            Some(KMeansError::InvalidCenterCount { k: 0, sample_cnt: 2 }));
        assert_eq!(kmean.lloyd_algorithm(3, 0.01).err(),
            Some(KMeansError::InvalidCenterCount { k: 3, sample_cnt: 2 }));
    }

    #[test]
    fn well_separated_blobs() {
        let means = [[0.0, 0.0], [20.0, 0.0], [0.0, 20.0], [20.0, 20.0]];
        let samples = testing::blobs(7, &means, 250, 1.0);
        let kmean = KMeans::from_matrix(samples);
        let conf = KMeansConfig::build().max_iter(200).build();
        let res = kmean.kmeans_lloyd(4, &conf).unwrap();

        assert!(res.converged);
        assert_eq!(res.centroids.rows(), 4);
        assert_eq!(res.centroids.cols(), 2);
        assert!(!res.errors.is_empty());
        assert_eq!(res.errors.len(), res.iterations);
        // weak trend: the run ends better than it started
        assert!(res.errors.last().unwrap() <= res.errors.first().unwrap());
        // every generating mean is recovered by one of the centers
        for mean in means.iter() {
            assert!(res.centroids.iter_rows().any(|c| distances::euclidean(c, mean) < 0.5));
        }
    }

    #[test]
    fn f32_and_f64_agree() {
        let rows = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [8.0, 8.0], [9.0, 8.0], [8.0, 9.0]];
        let res64 = kmean(&rows).kmeans_lloyd(2, &KMeansConfig::default()).unwrap();
        let rows32: Vec<Vec<f32>> = rows.iter().map(|r| r.iter().map(|&v| v as f32).collect()).collect();
        let kmean32 = KMeans::from_matrix(Matrix::from_rows(&rows32[..]).unwrap());
        let res32 = kmean32.kmeans_lloyd(2, &KMeansConfig::default()).unwrap();

        assert_eq!(res64.assignments, res32.assignments);
        assert_eq!(res64.iterations, res32.iterations);
        for (&a, &b) in res64.centroids.as_slice().iter().zip(res32.centroids.as_slice()) {
            assert_approx_eq!(a, b as f64, 1e-5);
        }
    }

    #[test]
    fn empty_cluster_propagates_nan() {
        // duplicated first sample: the second seed never wins a tie and its cluster stays empty
        let kmean = kmean(&[[0.0, 0.0], [0.0, 0.0], [5.0, 5.0]]);
        let conf = KMeansConfig::build().max_iter(4).build();
        let res = kmean.kmeans_lloyd(3, &conf).unwrap();

        assert!(!res.converged);
        assert_eq!(res.iterations, 4);
        assert_eq!(res.errors.len(), 4);
        assert!(res.errors.iter().all(|e| e.is_nan()));
        assert_eq!(res.centroids.row(0), &[0.0, 0.0]);
        assert!(res.centroids.row(1).iter().all(|v| v.is_nan()));
        assert_eq!(res.centroids.row(2), &[5.0, 5.0]);
        // the NaN center is never chosen again
        assert_eq!(res.assignments, vec![0, 0, 2]);
    }

    #[test]
    fn empty_cluster_reseeded() {
        let kmean = kmean(&[[0.0, 0.0], [0.0, 0.0], [5.0, 5.0]]);
        let conf = KMeansConfig::build()
            .max_iter(10)
            .empty_clusters(EmptyClusterPolicy::ReseedFarthest)
            .build();
        let res = kmean.kmeans_lloyd(3, &conf).unwrap();

        assert!(res.converged);
        assert_eq!(res.iterations, 1);
        assert_eq!(res.assignments, vec![0, 1, 2]);
        assert_eq!(res.centroids.as_slice(), &[0.0, 0.0, 0.0, 0.0, 5.0, 5.0]);
        assert_eq!(res.errors, vec![0.0]);
    }

    #[test]
    fn reseed_takes_farthest_sample_of_shared_cluster() {
        let kmean = kmean(&[[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [50.0, 0.0]]);
        let centers = Matrix::from_rows(&[[2.0, 0.0], [1337.0, 0.0], [50.0, 0.0]]).unwrap();
        let mut assignments = kmean.cluster_data(&centers).unwrap();
        assert_eq!(assignments, vec![0, 0, 0, 2]);

        let reseeded = Lloyd::reseed_empty_clusters(&kmean, &centers, &mut assignments);
        assert_eq!(reseeded, 1);
        // samples 0 and 2 are equally far away, the later one in sorted order is taken
        assert_eq!(assignments, vec![0, 0, 1, 2]);
        let new_centers = kmean.calculate_centers(&assignments, 3).unwrap();
        assert_eq!(new_centers.as_slice(), &[1.5, 0.0, 3.0, 0.0, 50.0, 0.0]);
    }

    #[test]
    fn max_iter_stops_early() {
        let samples = testing::blobs(3, &[[0.0, 0.0], [3.0, 3.0]], 100, 2.0);
        let kmean = KMeans::from_matrix(samples);
        let conf = KMeansConfig::build().epsilon(0.0).max_iter(1).build();
        let res = kmean.kmeans_lloyd(2, &conf).unwrap();
        assert_eq!(res.iterations, 1);
        assert_eq!(res.errors.len(), 1);

        let conf = KMeansConfig::build().max_iter(0).build();
        let res = kmean.kmeans_lloyd(2, &conf).unwrap();
        assert!(!res.converged);
        assert_eq!(res.iterations, 0);
        assert!(res.errors.is_empty());
        assert_eq!(res.centroids, kmean.samples().head(2));
    }

    #[test]
    fn no_improvement_strategy() {
        let kmean = kmean(&[[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]]);
        let conf = KMeansConfig::build()
            .abort_strategy(AbortStrategy::NoImprovement { threshold: 1e-9 })
            .build();
        let res = kmean.kmeans_lloyd(2, &conf).unwrap();
        assert!(res.converged);
        assert_eq!(res.error(), Some(0.5));
        let last_two = &res.errors[res.errors.len() - 2..];
        assert_eq!(last_two[0], last_two[1]);
    }

    #[test]
    fn status_callbacks() {
        let init_calls = RefCell::new(0usize);
        let iterations = RefCell::new(Vec::new());
        let init_done = |s: &KMeansState<f64>| {
            assert!(s.errors.is_empty());
            assert_eq!(s.centroids.as_slice(), &[0.0, 0.0, 0.0, 1.0]);
            *init_calls.borrow_mut() += 1;
        };
        let iteration_done = |s: &KMeansState<f64>, nr: usize, shift: f64| {
            assert_eq!(s.errors.len(), nr);
            iterations.borrow_mut().push((nr, shift));
        };
        let conf = KMeansConfig::build()
            .init_done(&init_done)
            .iteration_done(&iteration_done)
            .build();

        let kmean = kmean(&[[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]]);
        let res = kmean.kmeans_lloyd(2, &conf).unwrap();

        assert_eq!(*init_calls.borrow(), 1);
        let iterations = iterations.borrow();
        assert_eq!(iterations.len(), res.iterations);
        assert_eq!(iterations.last().unwrap().1, 0.0);
        assert!(iterations.iter().enumerate().all(|(i, &(nr, _))| nr == i + 1));
    }
}
