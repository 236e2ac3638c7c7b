/// Golden ratio: (1 + √5) / 2
pub const PHI: f64 = 1.618_033_988_749_895;

/// Golden ratio conjugate: 1/φ = φ − 1. Baseline coherence and the
/// strength of the propagation nonlinearity.
pub const PHI_CONJUGATE: f64 = 0.618_033_988_749_895;

/// Lower coherence clamp
pub const COHERENCE_MIN: f64 = 0.4;

/// Upper coherence clamp
pub const COHERENCE_MAX: f64 = 0.999;

/// Peak field magnitude; normalization rescales anything above this
pub const AMPLITUDE_CEILING: f64 = 10.0;

/// Uniform per-step damping factor
pub const DAMPING: f64 = 0.999;

/// e-folding distance (in cells) for ripple amplitude decay
pub const RIPPLE_DECAY_LENGTH: f64 = 100.0;

/// Default propagation time step
pub const DEFAULT_TIME_STEP: f64 = 0.01;

/// Singular components kept by meaning extraction
pub const MEANING_COMPONENTS: usize = 10;

/// Spectral peaks extracted for phi-resonance scoring
pub const RESONANCE_PEAKS: usize = 5;

/// The low-frequency corner block spans dimensions / this (minimum 1)
pub const COHERENCE_BLOCK_DIVISOR: usize = 20;

/// Magnitude-squared scale suppressing large cells during input integration
pub const INTEGRATION_SUPPRESSION: f64 = 1000.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phi_product_identity() {
        assert!((PHI * PHI_CONJUGATE - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_phi_difference_identity() {
        assert!((PHI - PHI_CONJUGATE - 1.0).abs() < 1e-10);
    }
}
