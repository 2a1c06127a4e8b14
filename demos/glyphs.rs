//! Clusters noisy 8x8 images of a few glyphs and prints each trained center as an image.
use lloyd::*;
use rand::prelude::*;

const WIDTH: usize = 8;
const HEIGHT: usize = 8;

const GLYPHS: [[&str; HEIGHT]; 4] = [
    ["..####..", ".#....#.", "#......#", "#......#", "#......#", "#......#", ".#....#.", "..####.."],
    ["...##...", "..###...", ".#.##...", "...##...", "...##...", "...##...", "...##...", ".######."],
    ["#......#", ".#....#.", "..#..#..", "...##...", "...##...", "..#..#..", ".#....#.", "#......#"],
    ["........", "...##...", "...##...", "########", "########", "...##...", "...##...", "........"],
];

fn glyph_pixels(glyph: &[&str; HEIGHT]) -> Vec<f32> {
    glyph.iter().flat_map(|row| row.chars().map(|c| if c == '#' { 1.0 } else { 0.0 })).collect()
}

fn render(center: &[f32]) -> String {
    const SHADES: [char; 5] = [' ', '.', ':', '+', '#'];
    center.chunks_exact(WIDTH)
        .map(|row| row.iter()
            .map(|v| SHADES[((v.clamp(0.0, 1.0) * 4.0).round()) as usize])
            .collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rnd = StdRng::seed_from_u64(28);
    let prototypes: Vec<Vec<f32>> = GLYPHS.iter().map(glyph_pixels).collect();

    // Noisy copies: every pixel is flipped with a probability of 10%
    let sample_cnt = 2000;
    let mut samples = Vec::with_capacity(sample_cnt * WIDTH * HEIGHT);
    for i in 0..sample_cnt {
        let prototype = &prototypes[i % prototypes.len()];
        samples.extend(prototype.iter().map(|&p| if rnd.gen_bool(0.1) { 1.0 - p } else { p }));
    }

    let kmean = KMeans::new(samples, sample_cnt, WIDTH * HEIGHT)?;
    let conf = KMeansConfig::build().epsilon(1e-3).max_iter(100).build();
    let result = kmean.kmeans_lloyd(GLYPHS.len(), &conf)?;

    for (idx, center) in result.centroids.iter_rows().enumerate() {
        println!("Center {}:\n{}\n", idx, render(center));
    }
    println!("Error history: {:?}", result.errors);
    Ok(())
}
