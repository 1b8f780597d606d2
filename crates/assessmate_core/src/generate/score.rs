//! High-biased Likert score sampling.

use rand::Rng;

/// Top of the Likert scale used by generated questions.
pub const DEFAULT_MAX_SCORE: u8 = 5;

/// Draws one score in `1..=max_score`, skewed toward `max_score`.
///
/// Samples a triangular distribution with minimum 1 and both mode and
/// maximum at `max_score`, then rounds and clamps.
pub fn biased_score<R: Rng + ?Sized>(rng: &mut R, max_score: u8) -> u8 {
    let high = f64::from(max_score.max(1));
    let sample = triangular(rng, 1.0, high, high);
    sample.round().clamp(1.0, high) as u8
}

/// Inverse-CDF sample of a triangular distribution.
fn triangular<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64, mode: f64) -> f64 {
    if high <= low {
        return low;
    }
    let u: f64 = rng.gen();
    let span = high - low;
    let pivot = (mode - low) / span;
    if u <= pivot {
        low + (u * span * (mode - low)).sqrt()
    } else {
        high - ((1.0 - u) * span * (high - mode)).sqrt()
    }
}
