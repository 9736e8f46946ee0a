/// Confidence values attached to heuristic term matches.
/// Regex hits carry no real signal, so the score is a jittered constant band.

use rand::Rng;

/// Lower bound (inclusive) of heuristic match confidence.
pub const HEURISTIC_CONFIDENCE_MIN: f32 = 0.85;
/// Upper bound (exclusive) of heuristic match confidence.
pub const HEURISTIC_CONFIDENCE_MAX: f32 = 0.95;

/// Draw a confidence in `[0.85, 0.95)`.
pub fn jittered_confidence<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let c = rng.gen_range(HEURISTIC_CONFIDENCE_MIN..HEURISTIC_CONFIDENCE_MAX);
    // f32 rounding can land exactly on the upper bound
    if c >= HEURISTIC_CONFIDENCE_MAX {
        HEURISTIC_CONFIDENCE_MIN
    } else {
        c
    }
}
