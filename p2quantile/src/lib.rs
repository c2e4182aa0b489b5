//! Streaming estimation of a single quantile with the P² algorithm.
//!
//! A [`P2Estimator`] keeps five markers (minimum, three interior markers around
//! the target quantile, maximum) and nudges the interior ones towards their ideal
//! ranks as samples arrive, so memory use stays constant however long the stream.
//!
//! ```
//! let mut median = p2quantile::new_estimator(0.5).unwrap();
//! for v in [2.1, 2.3, 2.0, 1.9, 2.2] {
//!     median.add(v);
//! }
//! assert_eq!(median.quantile(), 2.1);
//! ```

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

mod error;

pub use error::EstimatorError;


/// Number of markers tracked by the algorithm.
pub const MARKER_COUNT: usize = 5;

const LAST: usize = MARKER_COUNT - 1;

#[derive(Clone, PartialEq, Debug)]
pub struct P2Estimator {
    probability: f64,

    markers: [f64; MARKER_COUNT],
    real_positions: [i64; MARKER_COUNT],
    desired_positions: [f64; MARKER_COUNT],

    count: u64,
}

impl fmt::Display for P2Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P2Estimator(probability: {:.5}, count: {}, quantile: {:.5})",
            self.probability,
            self.count,
            self.quantile()
        )
    }
}

impl P2Estimator {
    /// Creates an empty estimator for the quantile at `probability`.
    ///
    /// The probability must be finite and lie strictly between 0 and 1.
    pub fn new(probability: f64) -> Result<Self, EstimatorError> {
        if !(probability > 0.0 && probability < 1.0) {
            return Err(EstimatorError::InvalidProbability(probability));
        }

        let mut est = P2Estimator {
            probability,
            markers: [0.0; MARKER_COUNT],
            real_positions: [0; MARKER_COUNT],
            desired_positions: [0.0; MARKER_COUNT],
            count: 0,
        };
        est.reset();

        debug!(probability, "created P2 estimator");
        Ok(est)
    }

    // Returns the estimator to the state it had right after construction.
    pub fn reset(&mut self) {
        self.count = 0;
        self.markers = [0.0; MARKER_COUNT];
        for (i, position) in self.real_positions.iter_mut().enumerate() {
            *position = i as i64;
        }
        self.update_desired_positions(MARKER_COUNT as u64);

        trace!(probability = self.probability, "reset P2 estimator");
    }

    pub fn add(&mut self, value: f64) {
        assert!(value.is_finite(), "invalid value added: {}", value);

        if self.count < MARKER_COUNT as u64 {
            self.markers[self.count as usize] = value;
            self.count += 1;

            if self.count == MARKER_COUNT as u64 {
                self.markers.sort_by(|a, b| {
                    a.partial_cmp(b)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                debug!(markers = ?self.markers, "initial markers sorted");
            }
            return;
        }

        self.count += 1;

        if value < self.markers[0] {
            self.markers[0] = value;
        } else if value > self.markers[LAST] {
            self.markers[LAST] = value;
        }

        self.update_real_positions(value);
        self.update_desired_positions(self.count);
        self.adjust_markers();
    }

    // Current estimate of the target quantile. Only meaningful once five samples
    // have been added; before that it reads whatever sits in the middle slot.
    pub fn quantile(&self) -> f64 {
        self.markers[2]
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_warmed_up(&self) -> bool {
        self.count >= MARKER_COUNT as u64
    }

    pub fn markers(&self) -> &[f64; MARKER_COUNT] {
        &self.markers
    }

    pub fn real_positions(&self) -> &[i64; MARKER_COUNT] {
        &self.real_positions
    }

    pub fn desired_positions(&self) -> &[f64; MARKER_COUNT] {
        &self.desired_positions
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            probability: self.probability,
            count: self.count,
            quantile: self.quantile(),
            markers: self.markers,
            real_positions: self.real_positions,
            desired_positions: self.desired_positions,
        }
    }

    fn update_real_positions(&mut self, value: f64) {
        // the extremes always sit at the first and last rank
        self.real_positions[0] = 0;
        self.real_positions[LAST] = (self.count - 1) as i64;

        for i in 1..LAST {
            if value < self.markers[i] {
                self.real_positions[i] += 1;
            }
        }
    }

    fn update_desired_positions(&mut self, count: u64) {
        let max_index = (count - 1) as f64;
        let mid_index = max_index / 2.0;
        let p = self.probability;

        self.desired_positions = [
            0.0,
            mid_index * p,
            max_index * p,
            mid_index + mid_index * p,
            max_index,
        ];
    }

    fn adjust_markers(&mut self) {
        for i in 1..LAST {
            let n = &self.real_positions;
            let error = self.desired_positions[i] - n[i] as f64;

            if !((error >= 1.0 && n[i + 1] - n[i] > 1) || (error <= -1.0 && n[i - 1] - n[i] < -1))
            {
                continue;
            }

            let s = sign(error);
            if s == 0 {
                continue;
            }

            assert!(
                n[i - 1] < n[i] && n[i] < n[i + 1],
                "marker positions collapsed around marker {}: {:?}",
                i,
                n
            );

            let candidate = self.parabolic(i, s);
            if self.markers[i - 1] < candidate && candidate < self.markers[i + 1] {
                self.markers[i] = candidate;
            } else {
                let linear = self.linear(i, s);
                trace!(marker = i, candidate, linear, "parabolic estimate out of bounds");
                self.markers[i] = linear;
            }

            self.real_positions[i] += s;
        }
    }

    // Piecewise-parabolic prediction of the value at rank n[i] + s, fitted through
    // markers i-1, i and i+1.
    fn parabolic(&self, i: usize, s: i64) -> f64 {
        let q = &self.markers;
        let n = &self.real_positions;
        let d = s as f64;

        let (n0, n1, n2) = (n[i - 1] as f64, n[i] as f64, n[i + 1] as f64);

        q[i] + d / (n2 - n0)
            * ((n1 - n0 + d) * (q[i + 1] - q[i]) / (n2 - n1)
                + (n2 - n1 - d) * (q[i] - q[i - 1]) / (n1 - n0))
    }

    fn linear(&self, i: usize, s: i64) -> f64 {
        let q = &self.markers;
        let n = &self.real_positions;
        let j = (i as i64 + s) as usize;

        q[i] + s as f64 * (q[j] - q[i]) / (n[j] - n[i]) as f64
    }
}

impl Extend<f64> for P2Estimator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

/// Point-in-time copy of an estimator's internal state, for diagnostics.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct Snapshot {
    pub probability: f64,
    pub count: u64,
    pub quantile: f64,
    pub markers: [f64; MARKER_COUNT],
    pub real_positions: [i64; MARKER_COUNT],
    pub desired_positions: [f64; MARKER_COUNT],
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, EstimatorError> {
        Ok(serde_json::to_string(self)?)
    }
}

pub fn new_estimator(probability: f64) -> Result<P2Estimator, EstimatorError> {
    P2Estimator::new(probability)
}

fn sign(x: f64) -> i64 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}
