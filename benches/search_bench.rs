use criterion::{criterion_group, criterion_main, Criterion};
use grid_util::point::Point;
use grid_visualizer_core::{search, CellGrid, NullDisplay};
use rand::prelude::*;
use std::hint::black_box;

fn random_walls(grid: &mut CellGrid, rng: &mut StdRng, wall_ratio: f64) {
    for x in 0..grid.width() as i32 {
        for y in 0..grid.height() as i32 {
            if rng.gen_bool(wall_ratio) {
                grid.set_wall(Point::new(x, y)).unwrap();
            }
        }
    }
}

fn best_first_bench(c: &mut Criterion) {
    const N: usize = 80;
    let mut rng = StdRng::seed_from_u64(0);
    for wall_ratio in [0.0, 0.2] {
        let mut grid = CellGrid::new(N, N);
        random_walls(&mut grid, &mut rng, wall_ratio);
        grid.set_start(Point::new(0, 0)).unwrap();
        grid.set_target(Point::new(N as i32 - 1, N as i32 - 1)).unwrap();
        c.bench_function(format!("{N}x{N}, {wall_ratio} walls").as_str(), |b| {
            b.iter(|| black_box(search(&mut grid, &NullDisplay)))
        });
    }
}

criterion_group!(benches, best_first_bench);
criterion_main!(benches);
