use p2quantile::{self, P2Estimator, MARKER_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLE_SIZE: usize = 20_000;
const PROBABILITIES: [f64; 3] = [0.25, 0.5, 0.75];

// Sort-then-index reference over the full history.
fn brute_force_quantile(buffer: &[f64], probability: f64) -> f64 {
    let mut sorted = buffer.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let index = ((sorted.len() - 1) as f64 * probability).round() as usize;
    sorted[index]
}

fn check_invariants(est: &P2Estimator, min: f64, max: f64) {
    let markers = est.markers();
    let real = est.real_positions();
    let desired = est.desired_positions();
    let last = (est.count() - 1) as i64;

    for i in 0..MARKER_COUNT - 1 {
        assert!(
            markers[i] <= markers[i + 1],
            "markers out of order after {} samples: {:?}",
            est.count(),
            markers
        );
        assert!(
            real[i] < real[i + 1],
            "positions not strictly increasing after {} samples: {:?}",
            est.count(),
            real
        );
    }

    assert_eq!(real[0], 0);
    assert_eq!(real[MARKER_COUNT - 1], last);
    assert_eq!(desired[0], 0.0);
    assert_eq!(desired[MARKER_COUNT - 1], last as f64);

    assert_eq!(markers[0], min);
    assert_eq!(markers[MARKER_COUNT - 1], max);
    assert_eq!(est.quantile(), markers[2]);
}

#[test]
fn converges_on_uniform_stream() {
    for (seed, &p) in PROBABILITIES.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(seed as u64 + 7);
        let mut est = p2quantile::new_estimator(p).unwrap();
        let mut buffer = Vec::with_capacity(SAMPLE_SIZE);

        for _ in 0..SAMPLE_SIZE {
            let v: f64 = rng.gen();
            est.add(v);
            buffer.push(v);
        }

        let estimate = est.quantile();
        assert!(
            (estimate - p).abs() < 0.02,
            "quantile {} was {:.5} (expected {:.5})",
            p,
            estimate,
            p
        );

        let reference = brute_force_quantile(&buffer, p);
        assert!(
            (estimate - reference).abs() < 0.01,
            "quantile {} was {:.5} but the sorted buffer gives {:.5}",
            p,
            estimate,
            reference
        );
    }
}

#[test]
fn invariants_hold_on_every_step() {
    let mut rng = StdRng::seed_from_u64(1234);

    for &p in &[0.05, 0.25, 0.5, 0.75, 0.95] {
        // continuous, heavily tied and skewed inputs
        let streams: Vec<Vec<f64>> = vec![
            (0..2000).map(|_| rng.gen::<f64>()).collect(),
            (0..2000).map(|_| rng.gen_range(0, 4) as f64).collect(),
            (0..2000).map(|_| -(1.0 - rng.gen::<f64>()).ln()).collect(),
        ];

        for stream in streams {
            let mut est = P2Estimator::new(p).unwrap();
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;

            for v in stream {
                est.add(v);
                min = min.min(v);
                max = max.max(v);

                if est.is_warmed_up() {
                    check_invariants(&est, min, max);
                }
            }
        }
    }
}

#[test]
fn warm_up_matches_sorted_input() {
    let mut rng = StdRng::seed_from_u64(99);
    let first: Vec<f64> = (0..MARKER_COUNT).map(|_| rng.gen_range(-50.0, 50.0)).collect();

    let mut est = P2Estimator::new(0.5).unwrap();
    est.extend(first.iter().copied());

    let mut sorted = first.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    assert_eq!(&est.markers()[..], &sorted[..]);
    assert_eq!(est.quantile(), brute_force_quantile(&first, 0.5));
}

#[test]
fn same_input_same_output() {
    let values: Vec<f64> = {
        let mut rng = StdRng::seed_from_u64(2024);
        (0..500).map(|_| rng.gen_range(0.0, 100.0)).collect()
    };

    let mut a = P2Estimator::new(0.9).unwrap();
    let mut b = P2Estimator::new(0.9).unwrap();

    let mut trace_a = Vec::new();
    for &v in &values {
        a.add(v);
        trace_a.push(a.quantile());
    }

    // run b over junk first, then reset and replay
    b.extend(values.iter().rev().map(|v| v * 3.0));
    b.reset();

    for (i, &v) in values.iter().enumerate() {
        b.add(v);
        assert_eq!(b.quantile(), trace_a[i], "diverged at sample {}", i);
    }
    assert_eq!(a, b);
}

#[test]
fn snapshot_reports_state() {
    let mut est = p2quantile::new_estimator(0.5).unwrap();
    est.extend(vec![2.1, 2.3, 2.0, 1.9, 2.2, 2.4]);

    let snapshot = est.snapshot();
    assert_eq!(snapshot.count, 6);
    assert_eq!(snapshot.quantile, 2.1);
    assert_eq!(snapshot.markers, *est.markers());
    assert_eq!(snapshot.real_positions, [0, 1, 2, 3, 5]);

    let json = snapshot.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["count"], 6);
    assert_eq!(value["probability"], 0.5);
    assert_eq!(value["real_positions"][4], 5);
    assert_eq!(value["desired_positions"][1], 1.25);
}
