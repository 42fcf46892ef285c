/// GR4J unit hydrograph functions.
///
/// Implements the S-curve based unit hydrographs (UH1 and UH2) used for
/// temporal distribution of effective rainfall, and the circular delay
/// lines that hold the recent inflows they are convolved with.
///
/// UH1 has base time X4 (length ceil(X4)), UH2 has base time 2*X4
/// (length ceil(2*X4)). Both are mass-conserving: ordinates sum to 1.
use smallvec::{smallvec, SmallVec};

use super::constants::{D, MAX_TIME_BASE};
use crate::error::ModelError;

/// Delay lines up to this length are stored inline. Covers X4 <= 4 days
/// for UH2, which includes the whole default calibration box.
pub const DELAY_INLINE: usize = 8;

type Ordinates = SmallVec<[f64; DELAY_INLINE]>;

/// Compute UH1 S-curve value at position t.
fn ss1(t: f64, x4: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else {
        (t / x4).powf(D).min(1.0)
    }
}

/// Compute UH2 S-curve value at position t.
fn ss2(t: f64, x4: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t < x4 {
        0.5 * (t / x4).powf(D)
    } else if t < 2.0 * x4 {
        // Clamp the base before the fractional power.
        1.0 - 0.5 * (2.0 - t / x4).max(0.0).powf(D)
    } else {
        1.0
    }
}

fn first_differences(len: usize, x4: f64, curve: fn(f64, f64) -> f64) -> Ordinates {
    (1..=len)
        .map(|i| {
            let t = i as f64;
            curve(t, x4) - curve(t - 1.0, x4)
        })
        .collect()
}

/// UH1/UH2 ordinates for one value of X4.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitHydrographs {
    pub uh1: Ordinates,
    pub uh2: Ordinates,
}

impl UnitHydrographs {
    /// Build both kernels from the time base X4.
    ///
    /// Fails with `InvalidParameter` when X4 is not a finite positive number
    /// no larger than [`MAX_TIME_BASE`].
    pub fn new(x4: f64) -> Result<Self, ModelError> {
        if !x4.is_finite() || x4 <= 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "X4",
                value: x4,
                reason: "unit hydrograph time base must be finite and positive",
            });
        }
        if x4 > MAX_TIME_BASE {
            return Err(ModelError::InvalidParameter {
                name: "X4",
                value: x4,
                reason: "unit hydrograph time base exceeds 1000 days",
            });
        }
        let n1 = (x4.ceil() as usize).max(1);
        let n2 = ((2.0 * x4).ceil() as usize).max(1);
        Ok(Self {
            uh1: first_differences(n1, x4, ss1),
            uh2: first_differences(n2, x4, ss2),
        })
    }
}

/// Compute unit hydrograph ordinates for UH1 and UH2.
///
/// Returns (uh1_ordinates, uh2_ordinates).
pub fn compute_uh_ordinates(x4: f64) -> Result<(Vec<f64>, Vec<f64>), ModelError> {
    let uh = UnitHydrographs::new(x4)?;
    Ok((uh.uh1.to_vec(), uh.uh2.to_vec()))
}

/// Fixed-length circular buffer of the most recent routed inflows.
///
/// `head` is the slot the next inflow is written to; the entry with lag k
/// (k = 0 newest) lives at `(head - 1 - k) mod len`.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayLine {
    buf: Ordinates,
    head: usize,
}

impl DelayLine {
    /// An empty (all-zero) delay line of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            buf: smallvec![0.0; len.max(1)],
            head: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Entry with lag `k` (0 = most recent insertion).
    pub fn lagged(&self, k: usize) -> f64 {
        let n = self.buf.len();
        self.buf[(self.head + n - 1 - k % n) % n]
    }

    /// Insert `input` as the newest entry, displacing the oldest.
    pub fn push(&mut self, input: f64) {
        self.buf[self.head] = input;
        self.head = (self.head + 1) % self.buf.len();
    }

    /// Entries ordered newest first.
    pub fn to_vec(&self) -> Vec<f64> {
        (0..self.len()).map(|k| self.lagged(k)).collect()
    }

    /// Rebuild a delay line from entries ordered newest first.
    pub fn from_newest_first(values: &[f64]) -> Self {
        let mut line = Self::zeros(values.len());
        for &v in values.iter().rev() {
            line.push(v);
        }
        line
    }
}

/// Perform unit hydrograph convolution for one time step.
///
/// Inserts `input` into the delay line, then returns the dot product of
/// the ordinates with the inflows, ordinate k pairing with the inflow of
/// k days ago.
pub fn convolve_uh(line: &mut DelayLine, ordinates: &[f64], input: f64) -> f64 {
    debug_assert_eq!(line.len(), ordinates.len());
    line.push(input);
    ordinates
        .iter()
        .enumerate()
        .map(|(k, &o)| o * line.lagged(k))
        .sum()
}
