//! # lloyd - API documentation
//!
//! Lloyd is a small rust library for k-means clustering with Lloyd's algorithm: samples are assigned to
//! their nearest center, then every center is moved to the mean of its samples, and this is repeated
//! until the centers stop moving.
//!
//! ## Design target
//! Results are meant to be reproducible: the centers are always seeded with the first **k** samples
//! (no randomness involved), ties go to the lowest center index, and the parallelized parts of the
//! calculation produce the same numbers regardless of the amount of threads.
//! Samples are given as a plain row-major vector (or [`Matrix`]), instead of any high-level
//! matrix crate such as nalgebra or ndarray.
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use lloyd::*;
//!
//! let samples = vec![0.0f64, 0.0,   0.0, 1.0,   10.0, 10.0,   10.0, 11.0];
//! let kmean = KMeans::new(samples, 4, 2).unwrap();
//!
//! // Iterate until no center coordinate moves by more than 0.01
//! let (centers, errors) = kmean.lloyd_algorithm(2, 0.01).unwrap();
//!
//! println!("Centers: {:?}", centers);
//! println!("Error history: {:?}", errors);
//! ```
//!
//! ## Example (using the status event callbacks)
//! ```rust
//! use lloyd::*;
//!
//! let (sample_cnt, sample_dims, k) = (2000, 8, 4);
//! let samples: Vec<f64> = (0..sample_cnt * sample_dims).map(|i| ((i * 7919) % 997) as f64).collect();
//!
//! let conf = KMeansConfig::<f64>::build()
//!     .init_done(&|_| println!("Initialization completed."))
//!     .iteration_done(&|s, nr, shift|
//!         println!("Iteration {} - Error: {:.2} | Center shift: {:.4}", nr, s.errors[nr - 1], shift))
//!     .max_iter(50)
//!     .build();
//!
//! let kmean = KMeans::new(samples, sample_cnt, sample_dims).unwrap();
//! let result = kmean.kmeans_lloyd(k, &conf).unwrap();
//! println!("Converged: {} after {} iterations", result.converged, result.iterations);
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeans`] struct, which takes over the sample data into its ownership.
//! Its methods are the single steps of the algorithm ([`KMeans::cluster_data`], [`KMeans::calculate_centers`],
//! [`KMeans::calculate_error`]) as well as the complete iteration ([`KMeans::lloyd_algorithm`],
//! [`KMeans::kmeans_lloyd`]). None of them mutate the instance.
//!
//! The iteration is configured with a [`KMeansConfig`] ([`AbortStrategy`], optional iteration limit,
//! [`EmptyClusterPolicy`], status callbacks). Progress is also reported through the [`log`] facade.
//!
//! ## Caveats
//! - By default there is no iteration limit. A calculation that never converges (e.g. because of a too
//!   small epsilon) runs forever, see [`KMeansConfigBuilder::max_iter`].
//! - A cluster that ends up without samples gets a NaN center. It is never chosen again, and its NaN
//!   values show up in the centers and errors. See [`EmptyClusterPolicy`].

#[macro_use] mod helpers;
mod error;
mod memory;
mod api;
mod variants;
mod abort_strategy;
pub mod distances;

pub use abort_strategy::AbortStrategy;
pub use api::{EmptyClusterPolicy, KMeans, KMeansConfig, KMeansConfigBuilder, KMeansState};
pub use error::{KMeansError, Result};
pub use memory::{Matrix, Primitive};
