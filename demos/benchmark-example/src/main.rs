use p2quantile::EstimatorError;

use rand::distributions::{Distribution, Uniform};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn generate_rand() -> f64 {
    let mut rng = rand::thread_rng();
    let between = Uniform::from(0.0..100.0);
    between.sample(&mut rng)
}

fn main() -> Result<(), EstimatorError> {
    const SAMPLE_SIZE: usize = 10_000;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut median = p2quantile::new_estimator(0.5)?;
    let mut p99 = p2quantile::new_estimator(0.99)?;

    for _ in 0..SAMPLE_SIZE {
        let v = generate_rand();
        median.add(v);
        p99.add(v);
    }
    info!(samples = SAMPLE_SIZE, "stream consumed");

    println!("median is {}", median.quantile());
    println!("99th percentile is {}", p99.quantile());
    println!("min is {}", median.markers()[0]);
    println!("max is {}", median.markers()[p2quantile::MARKER_COUNT - 1]);
    println!("{}", median.snapshot().to_json()?);

    Ok(())
}
