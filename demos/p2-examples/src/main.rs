use p2quantile::EstimatorError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SAMPLES: [f64; 100] = [
    0.5273, 0.1839, 0.9471, 0.6245, 0.3082, 0.7516, 0.0924, 0.4698, 0.8372, 0.2157,
    0.6810, 0.3946, 0.0593, 0.9981, 0.1227, 0.7462, 0.3089, 0.5734, 0.8895, 0.4316,
    0.2648, 0.6159, 0.0382, 0.7821, 0.9347, 0.1573, 0.5012, 0.3468, 0.7093, 0.2894,
    0.6205, 0.1742, 0.9638, 0.0871, 0.3982, 0.8427, 0.2561, 0.7124, 0.1346, 0.5539,
    0.4793, 0.6601, 0.0217, 0.9054, 0.3702, 0.7983, 0.2438, 0.6897, 0.1184, 0.5310,
    0.6029, 0.1937, 0.9732, 0.0675, 0.4286, 0.8619, 0.3051, 0.7482, 0.0913, 0.4675,
    0.8294, 0.2128, 0.6751, 0.3892, 0.0537, 0.9924, 0.1165, 0.7398, 0.3026, 0.5671,
    0.8823, 0.4264, 0.2593, 0.6102, 0.0314, 0.7756, 0.9281, 0.1519, 0.4957, 0.3412,
    0.7036, 0.2841, 0.6147, 0.1689, 0.9572, 0.0816, 0.3927, 0.8371, 0.2503, 0.7069,
    0.1289, 0.5483, 0.4736, 0.6547, 0.0162, 0.8998, 0.3647, 0.7926, 0.2382, 0.6841,
];

fn main() -> Result<(), EstimatorError> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut q1 = p2quantile::new_estimator(0.25)?;
    let mut q2 = p2quantile::new_estimator(0.5)?;
    let mut q3 = p2quantile::new_estimator(0.75)?;

    // exact quartiles from the full history, for eyeballing the estimates
    let mut buffer: Vec<f64> = Vec::with_capacity(SAMPLES.len());

    for &v in SAMPLES.iter() {
        q1.add(v);
        q2.add(v);
        q3.add(v);

        buffer.push(v);
        buffer.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = buffer.len();

        let n_pos = q2.real_positions();
        let d_pos = q2.desired_positions();
        println!(
            "value: {:.2}, Q1: {:.2}, Q2: {:.2}, Q3: {:.2} | Q1: {}, Q2: {}, Q3: {}  {},{:?},[{:.2}, {:.2}, {:.2}, {:.2}, {:.2}]",
            v,
            q1.quantile(),
            q2.quantile(),
            q3.quantile(),
            buffer[n / 4],
            buffer[n / 2],
            buffer[n * 3 / 4],
            q2.count(),
            n_pos,
            d_pos[0],
            d_pos[1],
            d_pos[2],
            d_pos[3],
            d_pos[4],
        );
    }

    println!("{}", q1);
    println!("{}", q2);
    println!("{}", q3);

    Ok(())
}
