#![allow(clippy::all)] // Clippy will attempt to remove black_box() internals

use bspline_interp::{InterpolationFunction, InterpolationTemplate, Mesh};
use criterion::*;
use gridgen::*;

enum Kind {
    Interp,
    Extrap,
}

macro_rules! bench_eval_specific {
    ($group:ident, $ndims:expr, $order:expr, $gridsize:expr, $size:expr, $kind:expr, $shuffled:expr) => {
        $group.throughput(Throughput::Elements(*$size as u64));
        let scan_or_shuffle = if $shuffled { "Shuffled Order" } else { "Sequential Order" };

        $group.bench_with_input(
            BenchmarkId::new(
                format!(
                    "Order {} Regular {}x{}D, {}",
                    $order, $gridsize, $ndims, scan_or_shuffle
                ),
                $size,
            ),
            $size,
            |b, &size| {
                // Interpolation grid and fit
                let (grids, z) = gen_grid($ndims, $gridsize, 0.0);
                let dims = [$gridsize; $ndims];
                let mut ranges = [(0.0, 1.0); $ndims];
                (0..$ndims).for_each(|i| ranges[i] = (grids[i][0], grids[i][$gridsize - 1]));
                let samples = Mesh::from_vec(dims, z).unwrap();
                let f = InterpolationFunction::new($order, [false; $ndims], &samples, ranges)
                    .unwrap();

                // Observation grid
                let m: usize = ((size as f64).powf(1.0 / ($ndims as f64)) + 2.0) as usize;
                let gridobs_t = match $kind {
                    Kind::Interp => gen_interp_obs_grid(&grids, m, $shuffled),
                    Kind::Extrap => gen_extrap_obs_grid(&grids, m, $shuffled),
                };
                let obs: Vec<&[f64]> = gridobs_t.iter().map(|x| &x[..size]).collect();
                let mut out = vec![0.0; size];

                b.iter(|| black_box(f.interp(&obs, &mut out).unwrap()));
            },
        );
    };
}

macro_rules! bench_fit_specific {
    ($group:ident, $ndims:expr, $order:expr, $gridsize:expr, $periodic:expr) => {
        let n = ($gridsize as usize).pow($ndims as u32);
        $group.throughput(Throughput::Elements(n as u64));
        let kind = if $periodic { "Periodic" } else { "Aperiodic" };

        // Template construction is included; refits of one template are cheaper
        $group.bench_function(
            BenchmarkId::new(format!("Order {} {} {}x{}D", $order, kind, $gridsize, $ndims), n),
            |b| {
                let (_, z) = gen_grid($ndims, $gridsize, 0.0);
                let dims = [$gridsize; $ndims];
                let samples = Mesh::from_vec(dims, z).unwrap();
                let ranges = [(0.0, 100.0); $ndims];

                b.iter(|| {
                    black_box({
                        let template = InterpolationTemplate::regular(
                            $order,
                            [$periodic; $ndims],
                            dims,
                            ranges,
                        )
                        .unwrap();
                        template.solve_control_points(&samples).unwrap()
                    })
                });
            },
        );
    };
}

macro_rules! bench_fit_rectilinear_specific {
    ($group:ident, $ndims:expr, $order:expr, $gridsize:expr, $periodic:expr) => {
        let n = ($gridsize as usize).pow($ndims as u32);
        $group.throughput(Throughput::Elements(n as u64));
        let kind = if $periodic { "Periodic" } else { "Aperiodic" };

        $group.bench_function(
            BenchmarkId::new(
                format!("Order {} {} Rectilinear {}x{}D", $order, kind, $gridsize, $ndims),
                n,
            ),
            |b| {
                // Jitter each coordinate by up to a quarter of the spacing
                let noise = 0.5 * 100.0 / ($gridsize as f64 - 1.0);
                let (grids, z) = gen_grid($ndims, $gridsize, noise);
                let dims = [$gridsize; $ndims];
                let samples = Mesh::from_vec(dims, z).unwrap();
                let coords: [&[f64]; $ndims] = std::array::from_fn(|i| &grids[i][..]);

                b.iter(|| {
                    black_box({
                        let template =
                            InterpolationTemplate::rectilinear($order, [$periodic; $ndims], coords)
                                .unwrap();
                        template.solve_control_points(&samples).unwrap()
                    })
                });
            },
        );
    };
}

fn bench_fit(c: &mut Criterion) {
    for gridsize in [100, 10_000] {
        let mut group = c.benchmark_group(format!("Fit_1D_{gridsize}-grid"));
        for periodic in [false, true] {
            bench_fit_specific!(group, 1, 3, gridsize, periodic);
            bench_fit_specific!(group, 1, 5, gridsize, periodic);
            bench_fit_rectilinear_specific!(group, 1, 3, gridsize, periodic);
        }
        group.finish();
    }

    for gridsize in [10, 100] {
        let mut group = c.benchmark_group(format!("Fit_2D_{gridsize}-grid"));
        for periodic in [false, true] {
            bench_fit_specific!(group, 2, 3, gridsize, periodic);
            bench_fit_rectilinear_specific!(group, 2, 3, gridsize, periodic);
        }
        group.finish();
    }

    for gridsize in [10, 50] {
        let mut group = c.benchmark_group(format!("Fit_3D_{gridsize}-grid"));
        for periodic in [false, true] {
            bench_fit_specific!(group, 3, 3, gridsize, periodic);
        }
        group.finish();
    }
}

fn bench_interp(c: &mut Criterion) {
    for shuffled in [true, false] {
        for gridsize in [100, 1000] {
            let mut group = c.benchmark_group(format!("Interp_1D_{gridsize}-grid"));
            for size in [1, 100, 1_000_000].iter() {
                bench_eval_specific!(group, 1, 1, gridsize, size, Kind::Interp, shuffled);
                bench_eval_specific!(group, 1, 3, gridsize, size, Kind::Interp, shuffled);
            }
            group.finish();
        }

        for gridsize in [10, 100] {
            let mut group = c.benchmark_group(format!("Interp_2D_{gridsize}-grid"));
            for size in [1, 100, 1_000_000].iter() {
                bench_eval_specific!(group, 2, 3, gridsize, size, Kind::Interp, shuffled);
            }
            group.finish();
        }

        for gridsize in [10, 50] {
            let mut group = c.benchmark_group(format!("Interp_3D_{gridsize}-grid"));
            for size in [1, 100, 100_000].iter() {
                bench_eval_specific!(group, 3, 3, gridsize, size, Kind::Interp, shuffled);
            }
            group.finish();
        }
    }
}

fn bench_extrap(c: &mut Criterion) {
    for gridsize in [10] {
        let mut group = c.benchmark_group(format!("Extrap_2D_{gridsize}-grid"));
        for size in [1, 100, 1_000_000].iter() {
            bench_eval_specific!(group, 2, 3, gridsize, size, Kind::Extrap, true);
        }
        group.finish();
    }

    for gridsize in [10] {
        let mut group = c.benchmark_group(format!("Extrap_3D_{gridsize}-grid"));
        for size in [1, 100, 100_000].iter() {
            bench_eval_specific!(group, 3, 3, gridsize, size, Kind::Extrap, true);
        }
        group.finish();
    }
}

criterion_group!(benches_fit, bench_fit);
criterion_group!(benches_interp, bench_interp);
criterion_group!(benches_extrap, bench_extrap);
criterion_main!(benches_fit, benches_interp, benches_extrap,);

mod randn {
    use rand::distr::{Distribution, StandardUniform};
    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;

    /// Fixed random seed to support repeatable testing
    const SEED: [u8; 32] = [
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 15, 14, 13, 12, 11, 10, 9, 8, 7,
        6, 5, 4, 3, 2, 1,
    ];

    /// Get a random number generator with a const seed for repeatable testing
    pub fn rng_fixed_seed() -> StdRng {
        StdRng::from_seed(SEED)
    }

    /// Generate `n` random numbers using provided generator
    pub fn randn<T>(rng: &mut StdRng, n: usize) -> Vec<T>
    where
        StandardUniform: Distribution<T>,
    {
        (0..n).map(|_| rng.random::<T>()).collect()
    }
}

mod gridgen {
    use super::randn::*;
    use bspline_interp::utils::*;
    use rand::seq::SliceRandom;

    /// Grid on [0, 100] along each axis, evenly spaced and then jittered by up to
    /// `noise / 2`, and random sample values.
    pub fn gen_grid(ndims: usize, size: usize, noise: f64) -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut rng = rng_fixed_seed();
        let n = size.pow(ndims as u32);
        let z = randn::<f64>(&mut rng, n);

        let grids: Vec<Vec<f64>> = (0..ndims)
            .map(|_| {
                let mut x = linspace(0.0, 100.0, size);
                if noise > 0.0 {
                    let dx = randn::<f64>(&mut rng, size);
                    (0..size).for_each(|i| x[i] = x[i] + (dx[i] - 0.5) * noise);
                }
                x
            })
            .collect();

        (grids, z)
    }

    /// Sequential or shuffled observation points inside the grid.
    ///
    /// `size` is the count per axis, so there are `size.pow(ndims)` points in total.
    pub fn gen_interp_obs_grid(
        grids: &Vec<Vec<f64>>,
        size: usize,
        shuffled: bool,
    ) -> Vec<Vec<f64>> {
        let mut rng = rng_fixed_seed();
        let ndims = grids.len();

        let xobs: Vec<Vec<f64>> = (0..ndims)
            .map(|i| linspace(grids[i][1], grids[i][grids[i].len() - 2], size))
            .collect();
        let gridobs = meshgrid((0..ndims).map(|i| &xobs[i]).collect());
        let mut gridobs_t: Vec<Vec<f64>> = (0..ndims)
            .map(|i| gridobs.iter().map(|x| x[i]).collect())
            .collect(); // transpose
        if shuffled {
            (0..ndims).for_each(|i| gridobs_t[i].shuffle(&mut rng));
        }
        gridobs_t
    }

    /// Observation points beyond the upper corner of the grid on every axis,
    /// where every coordinate is clamped.
    pub fn gen_extrap_obs_grid(
        grids: &Vec<Vec<f64>>,
        size: usize,
        shuffled: bool,
    ) -> Vec<Vec<f64>> {
        let mut rng = rng_fixed_seed();
        let ndims = grids.len();

        let xobs: Vec<Vec<f64>> = (0..ndims)
            .map(|i| {
                let last = grids[i][grids[i].len() - 1];
                linspace(last + 1.0, last + 2.0, size)
            })
            .collect();
        let gridobs = meshgrid((0..ndims).map(|i| &xobs[i]).collect());
        let mut gridobs_t: Vec<Vec<f64>> = (0..ndims)
            .map(|i| gridobs.iter().map(|x| x[i]).collect())
            .collect(); // transpose
        if shuffled {
            (0..ndims).for_each(|i| gridobs_t[i].shuffle(&mut rng));
        }
        gridobs_t
    }
}
