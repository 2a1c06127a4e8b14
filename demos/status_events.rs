use lloyd::*;

fn main() -> Result<()> {
    env_logger::init();
    let (sample_cnt, sample_dims, k, max_iter) = (20000, 200, 4, 2500);

    // Generate some random data
    let mut samples = vec![0.0f64; sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rand::random());

    let conf = KMeansConfig::<f64>::build()
        .init_done(&|s| println!("Initialization completed with {} centers.", s.k))
        .iteration_done(&|s, nr, shift| {
            let error = s.errors[nr - 1];
            let improvement = if nr > 1 { s.errors[nr - 2] - error } else { f64::NAN };
            println!("Iteration {} - Error: {:.4} | Improvement: {:.4} | Center shift: {:.4}",
                nr, error, improvement, shift)
        })
        .epsilon(1e-3)
        .max_iter(max_iter)
        .empty_clusters(EmptyClusterPolicy::ReseedFarthest)
        .build();

    let kmean = KMeans::new(samples, sample_cnt, sample_dims)?;
    let result = kmean.kmeans_lloyd(k, &conf)?;

    println!("Converged: {} ({} iterations)", result.converged, result.iterations);
    println!("Cluster-Assignments: {:?}", &result.assignments[..20]);
    println!("Error: {:?}", result.error());
    Ok(())
}
