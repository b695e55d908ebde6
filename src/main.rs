use std::process::ExitCode;
use std::time::Instant;

use matmul_strategies::{
    load_matrix_market_csr, multiply_with, MultiplyConfig, Result, SparseMatrixCSR, Strategy,
};
use ndarray::array;
use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

fn main() -> ExitCode {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let outcome = match args.as_slice() {
        [_] => run_demo(),
        [_, a] => run_files(a, a),
        [_, a, b] => run_files(a, b),
        _ => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!("Usage: matmul-strategies [A.mtx [B.mtx]]");
    println!();
    println!("  no arguments  - multiply a 2x2 example along every path");
    println!("  A.mtx         - square A in CSR form");
    println!("  A.mtx B.mtx   - multiply A by B in CSR form");
}

/// Multiplies the 2x2 example with every strategy
fn run_demo() -> Result<()> {
    let a = array![[1.0, 2.0], [3.0, 4.0]];
    let b = array![[5.0, 6.0], [7.0, 8.0]];
    let config = MultiplyConfig::default();

    println!("A = {:?}", a.outer_iter().map(|r| r.to_vec()).collect::<Vec<_>>());
    println!("B = {:?}", b.outer_iter().map(|r| r.to_vec()).collect::<Vec<_>>());
    println!();

    for strategy in [
        Strategy::Naive,
        Strategy::Blocked,
        Strategy::ParallelRows,
        Strategy::SparseRow,
        Strategy::SparseColumn,
    ] {
        let c = multiply_with(&a, &b, strategy, &config)?;
        println!(
            "{:<13} {:?}",
            format!("{:?}:", strategy),
            c.outer_iter().map(|r| r.to_vec()).collect::<Vec<_>>()
        );
    }
    Ok(())
}

/// Loads two Matrix Market files and multiplies them in CSR form
fn run_files(path_a: &str, path_b: &str) -> Result<()> {
    let a = load_matrix_market_csr(path_a)?;
    let b = if path_a == path_b {
        a.clone()
    } else {
        load_matrix_market_csr(path_b)?
    };

    describe("A", &a);
    describe("B", &b);

    let config = MultiplyConfig::default();

    let start = Instant::now();
    let serial = a.multiply(&b)?;
    let serial_time = start.elapsed();

    let start = Instant::now();
    let parallel = a.multiply_parallel(&b, config.n_threads)?;
    let parallel_time = start.elapsed();

    describe("C", &serial);
    println!("serial:   {:>10.3} ms", serial_time.as_secs_f64() * 1e3);
    println!(
        "parallel: {:>10.3} ms ({} threads, identical: {})",
        parallel_time.as_secs_f64() * 1e3,
        config.n_threads,
        parallel == serial
    );
    Ok(())
}

fn describe(name: &str, m: &SparseMatrixCSR<f64>) {
    println!(
        "{}: {} × {}, nnz = {}, density = {:.3e}",
        name,
        m.n_rows,
        m.n_cols,
        m.nnz(),
        m.density()
    );
}
