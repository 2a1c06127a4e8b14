use crate::{distances, memory::*, AbortStrategy, KMeansError, Result};
use rayon::prelude::*;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, T);

/// What to do with a cluster, that did not get any sample assigned during an iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Leave the cluster empty. Its center becomes NaN (mean over no samples) and stays
    /// NaN for the rest of the calculation. Its error and shift are NaN as well, so a
    /// [`AbortStrategy::CenterShift`] calculation will then only end by `max_iter`.
    #[default]
    Propagate,
    /// Move the sample with the largest distance to its center (taken from a cluster with more
    /// than one sample) into the empty cluster, before the centers are recalculated.
    ReseedFarthest,
}

/// This is a structure holding various configuration options for a k-means calculation, such as
/// the convergence criterion, an optional iteration limit or a couple of callbacks, that can be set
/// to get status information from a running calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the iteration (the error history already contains this iteration's error)
    /// - **iteration_id**: Number of the current iteration (starting at 1)
    /// - **shift**: Largest per-dimension movement of any center within this iteration
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// The abort-strategy to use for the running calculation
    pub(crate) abort_strategy: AbortStrategy<T>,
    /// Upper limit for the amount of iterations. `None` iterates until converged.
    pub(crate) max_iter: Option<usize>,
    pub(crate) empty_clusters: EmptyClusterPolicy,
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_, _, _| {},
            abort_strategy: AbortStrategy::default(),
            max_iter: None,
            empty_clusters: EmptyClusterPolicy::default(),
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("abort_strategy", &self.abort_strategy)
            .field("max_iter", &self.max_iter)
            .field("empty_clusters", &self.empty_clusters)
            .finish_non_exhaustive()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centers were seeded, before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the abort-strategy to use during a running k-means calculation. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::CenterShift`] `{ epsilon: 0.01 }`
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy<T>) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Shortcut for [`AbortStrategy::CenterShift`] with the given **epsilon**.
    pub fn epsilon(self, epsilon: T) -> Self {
        self.abort_strategy(AbortStrategy::CenterShift { epsilon })
    }
    /// Stop after at most **max_iter** iterations, even if the calculation did not converge.
    /// ## Default
    /// No limit. A calculation that never converges runs forever.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = Some(max_iter); self
    }
    /// Set the handling of clusters without samples.
    /// ## Default
    /// [`EmptyClusterPolicy::Propagate`]
    pub fn empty_clusters(mut self, policy: EmptyClusterPolicy) -> Self {
        self.config.empty_clusters = policy; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// State of a running calculation, and the final result returned by [`KMeans::kmeans_lloyd`].
///
/// ## Fields
/// - **k**: The amount of clusters that were requested
/// - **centroids**: Current cluster centers (`k x d`), row `i` is the center of cluster `i`
/// - **assignments**: Cluster index of each sample, as calculated in the last iteration
/// - **errors**: Error history: mean euclidean distance from every sample to its nearest center, one entry per iteration
/// - **iterations**: Amount of finished iterations
/// - **converged**: Whether the abort-strategy reported convergence (**false** if `max_iter` was hit instead)
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub centroids: Matrix<T>,
    pub assignments: Vec<usize>,
    pub errors: Vec<T>,
    pub iterations: usize,
    pub converged: bool,
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(k: usize, centroids: Matrix<T>) -> Self {
        Self {
            k,
            centroids,
            assignments: Vec::new(),
            errors: Vec::new(),
            iterations: 0,
            converged: false,
        }
    }

    /// The error after the last iteration, if there was one.
    pub fn error(&self) -> Option<T> {
        self.errors.last().cloned()
    }
}


/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct, giving the samples you want to operate on. The samples are
/// never mutated, so one instance can serve multiple calculations (also in parallel).
///
/// The three steps of Lloyd's algorithm are available separately:
/// - [`KMeans::cluster_data`]: assign every sample to its nearest center
/// - [`KMeans::calculate_centers`]: recalculate centers as the means of their samples
/// - [`KMeans::calculate_error`]: evaluate the objective for a set of centers
///
/// The complete iteration is run by [`KMeans::lloyd_algorithm`] / [`KMeans::kmeans_lloyd`].
pub struct KMeans<T: Primitive> {
    pub(crate) samples: Matrix<T>,
}
impl<T: Primitive> KMeans<T> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **samples** vector has
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize) -> Result<Self> {
        Ok(Self::from_matrix(Matrix::new(samples, sample_cnt, sample_dims)?))
    }

    /// Create a new instance of the [`KMeans`] structure from an already validated sample [`Matrix`]
    /// (one sample per row).
    pub fn from_matrix(samples: Matrix<T>) -> Self {
        Self { samples }
    }

    /// The sample matrix (`sample_cnt x sample_dims`) this instance operates on.
    pub fn samples(&self) -> &Matrix<T> { &self.samples }
    /// Amount of samples.
    pub fn sample_cnt(&self) -> usize { self.samples.rows() }
    /// Amount of dimensions of each sample.
    pub fn sample_dims(&self) -> usize { self.samples.cols() }

    /// Assign every sample to the index of its nearest center (squared euclidean distance).
    ///
    /// Ties are resolved in favour of the lowest center index. Centers with NaN coordinates are
    /// never chosen, unless all centers are NaN (then every sample is assigned to `0`).
    ///
    /// ## Errors
    /// [`KMeansError::DimensionMismatch`] if the centers' dimension differs from the samples',
    /// [`KMeansError::NoCenters`] if there are no centers.
    pub fn cluster_data(&self, centers: &Matrix<T>) -> Result<Vec<usize>> {
        let dist_matrix = distances::pairwise_squared_distances(&self.samples, centers)?;
        Ok(dist_matrix.par_chunks(centers.rows())
            .map(distances::argmin)
            .collect())
    }

    /// Calculate new centers: row `i` of the result is the mean of all samples assigned to cluster `i`.
    ///
    /// A cluster without samples gets a NaN center.
    ///
    /// ## Errors
    /// [`KMeansError::AssignmentLength`] if there is not exactly one assignment per sample,
    /// [`KMeansError::AssignmentOutOfRange`] if an assignment is `>= k`.
    pub fn calculate_centers(&self, assignments: &[usize], k: usize) -> Result<Matrix<T>> {
        if assignments.len() != self.sample_cnt() {
            return Err(KMeansError::AssignmentLength { expected: self.sample_cnt(), actual: assignments.len() });
        }
        let mut centers = Matrix::filled(k, self.sample_dims(), T::zero());
        let mut frequencies = vec![0usize; k];
        for (sample, (s, &label)) in self.samples.iter_rows().zip(assignments.iter()).enumerate() {
            if label >= k {
                return Err(KMeansError::AssignmentOutOfRange { sample, label, k });
            }
            frequencies[label] += 1;
            centers.row_mut(label).iter_mut()
                .zip(s.iter())
                .for_each(|(c, &v)| *c += v);
        }
        for (idx, &frequency) in frequencies.iter().enumerate() {
            // 0 / 0 -> NaN for empty clusters
            let frequency = T::from_count(frequency);
            centers.row_mut(idx).iter_mut().for_each(|c| *c /= frequency);
        }
        Ok(centers)
    }

    /// Mean euclidean (not squared) distance from every sample to its nearest center.
    ///
    /// Distances are calculated as `sqrt(sum((x - u)^2))`, which stays accurate where the
    /// expansion used by [`KMeans::cluster_data`] would cancel out. A NaN center makes the
    /// result NaN; without samples, the result is NaN as well.
    ///
    /// ## Errors
    /// Same as [`KMeans::cluster_data`].
    pub fn calculate_error(&self, centers: &Matrix<T>) -> Result<T> {
        distances::check_centers(&self.samples, centers)?;
        let nearest: Vec<T> = self.samples.as_slice()
            .par_chunks(self.sample_dims())
            .map(|s| centers.iter_rows()
                .map(|c| distances::euclidean(s, c))
                .fold(T::infinity(), |best, d| {
                    if best.is_nan() || d.is_nan() { T::nan() } else if d < best { d } else { best }
                }))
            .collect();
        // summed sequentially, so the result is independent of the thread count
        Ok(nearest.into_iter().sum::<T>() / T::from_count(self.sample_cnt()))
    }

    /// Lloyd's algorithm with the default configuration and the given convergence tolerance.
    ///
    /// Centers are seeded with the first **k** samples. The iteration stops once no center
    /// coordinate moved by more than **epsilon** ([`AbortStrategy::CenterShift`]); there is no
    /// iteration limit, use [`KMeans::kmeans_lloyd`] with [`KMeansConfigBuilder::max_iter`] for that.
    ///
    /// ## Returns
    /// The final centers (`k x d`) and the error history (one entry per iteration).
    ///
    /// ## Example
    /// ```rust
    /// use lloyd::*;
    ///
    /// let samples = vec![0.0f64, 0.0, 0.0, 1.0, 10.0, 10.0, 10.0, 11.0];
    /// let kmean = KMeans::new(samples, 4, 2).unwrap();
    /// let (centers, errors) = kmean.lloyd_algorithm(2, 0.01).unwrap();
    ///
    /// assert_eq!(centers.as_slice(), &[0.0, 0.5, 10.0, 10.5]);
    /// assert_eq!(errors.last(), Some(&0.5));
    /// ```
    pub fn lloyd_algorithm(&self, k: usize, epsilon: T) -> Result<(Matrix<T>, Vec<T>)> {
        let config = KMeansConfig::build().epsilon(epsilon).build();
        let state = self.kmeans_lloyd(k, &config)?;
        Ok((state.centroids, state.errors))
    }

    /// Normal k-means algorithm implementation (Lloyd), seeded with the first **k** samples.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for (`1 <= k <= sample_cnt`)
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// ## Example
    /// ```rust
    /// use lloyd::*;
    ///
    /// let (sample_cnt, sample_dims, k) = (2000, 16, 4);
    /// let samples: Vec<f64> = (0..sample_cnt * sample_dims).map(|i| ((i * 7919) % 1000) as f64 / 1000.0).collect();
    ///
    /// let kmean = KMeans::new(samples, sample_cnt, sample_dims).unwrap();
    /// let conf = KMeansConfig::build().epsilon(1e-4).max_iter(100).build();
    /// let result = kmean.kmeans_lloyd(k, &conf).unwrap();
    ///
    /// println!("Centroids: {:?}", result.centroids);
    /// println!("Cluster-Assignments: {:?}", result.assignments);
    /// println!("Error: {:?}", result.error());
    /// ```
    pub fn kmeans_lloyd(&self, k: usize, config: &KMeansConfig<'_, T>) -> Result<KMeansState<T>> {
        crate::variants::Lloyd::calculate(self, k, config)
    }
}
