use std::hint::black_box;
use std::time::Instant;

use axite_gen::{GenConfig, ScatterPolicy, generate};

fn bench_generate(half_extent: i32, iterations: usize) {
    let config = GenConfig {
        half_extent,
        rng_seed: Some(42),
        ..GenConfig::default()
    };

    let start = Instant::now();
    for _ in 0..iterations {
        let mut policy = ScatterPolicy::new(&config);
        let tiles = generate(black_box(&config), &mut policy);
        black_box(tiles);
    }
    let elapsed = start.elapsed();
    let side = half_extent as usize * 2;
    let per_iter = elapsed / iterations as u32;
    println!(
        "  generate ({side}x{side}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("world generation:");
    bench_generate(25, 100);
    bench_generate(50, 50);
    bench_generate(100, 10);
}
