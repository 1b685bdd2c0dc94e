//! Sampling primitives over a caller-supplied random generator.
//!
//! The whole run consumes one linear pseudorandom stream: every draw goes
//! through a `&mut R where R: Rng` handle threaded down from the sampler, so
//! seeded runs are reproducible and the coupling argument (which needs a
//! fixed draw order) holds.

use crate::bounding::BoundingList;
use rand::Rng;

/// Draws a colour uniformly from the set bits of `bs`.
///
/// Returns `None` when the set is empty.
#[inline]
pub fn uniform_over_set_bits<R: Rng>(rng: &mut R, bs: &BoundingList) -> Option<usize> {
    let count = bs.count();
    if count == 0 {
        return None;
    }
    let idx = rng.random_range(0..count);
    bs.iter().nth(idx)
}

/// Draws a uniform real in `[0, 1)`.
#[inline]
pub fn unit<R: Rng>(rng: &mut R) -> f64 {
    rng.random::<f64>()
}

/// Draws an index from the categorical distribution proportional to
/// `weights`.
///
/// Returns `None` when the total weight is not positive. If accumulated
/// rounding pushes the walk past the final positive weight, the last
/// positive-weight index is returned, matching the behaviour of a CDF
/// inversion clamped to the support.
pub fn sample_from_weights<R: Rng>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let threshold = rng.random::<f64>() * total;
    let mut acc = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        acc += w;
        if acc > threshold {
            return Some(i);
        }
    }
    weights.iter().rposition(|&w| w > 0.0)
}

// ============================================================================
// Tests
// ============================================================================
