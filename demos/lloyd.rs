use lloyd::*;
use rand::prelude::*;

fn main() -> Result<()> {
    env_logger::init();
    let (sample_cnt, sample_dims, k) = (20000, 64, 10);

    // Generate some clustered data: k random prototypes plus noise
    let mut rnd = StdRng::seed_from_u64(1337);
    let prototypes: Vec<f64> = (0..k * sample_dims).map(|_| rnd.gen_range(0.0..10.0)).collect();
    let mut samples = vec![0.0f64; sample_cnt * sample_dims];
    samples.chunks_exact_mut(sample_dims).enumerate().for_each(|(i, s)| {
        let prototype = &prototypes[(i % k) * sample_dims..(i % k + 1) * sample_dims];
        s.iter_mut().zip(prototype.iter()).for_each(|(v, p)| *v = p + rnd.gen_range(-1.0..1.0));
    });

    // Seeded with the first k samples, iterate until no center moves by more than 0.01
    let kmean = KMeans::new(samples, sample_cnt, sample_dims)?;
    let (centers, errors) = kmean.lloyd_algorithm(k, 0.01)?;

    for (idx, center) in centers.iter_rows().enumerate() {
        println!("Center {}: {:.2?}", idx, &center[..4]);
    }
    println!("Error history: {:?}", errors);
    Ok(())
}
