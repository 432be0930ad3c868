//! Run these benches with `cargo bench --bench center -- --verbose`
use criterion::{criterion_group, criterion_main, Criterion};
use vortex_analysis::{choose_centers, CancelToken, CenterSolver, GriddedData};

mod utils;

criterion_main!(center_benches);

criterion_group!(
    name = center_benches;
    config = utils::build_tester();
    targets = solve_cell_bench, choose_centers_bench
);

fn solve_cell_bench(c: &mut Criterion) {
    let vortex = utils::test_vortex();
    let config = utils::test_config();
    let solver = CenterSolver::new(&config);
    let (x, y) = vortex.center_xy();
    let guess = (x + 3.0, y - 2.0);

    c.bench_function("solve_cell", |b| {
        b.iter(|| {
            let _x = solver.solve_cell(&vortex, guess, 30.0, 1.0);
        });
    });
}

fn choose_centers_bench(c: &mut Criterion) {
    let vortex = utils::test_vortex();
    let config = utils::test_config();
    let solver = CenterSolver::new(&config);
    let (x, y) = vortex.center_xy();
    let guess = (x + 3.0, y - 2.0);
    let field = solver
        .solve(&vortex, guess, &CancelToken::new())
        .expect("not cancelled");

    c.bench_function("choose_centers", |b| {
        b.iter(|| {
            let _x = choose_centers(&field, &config, vortex.radar_location(), guess);
        });
    });
}
