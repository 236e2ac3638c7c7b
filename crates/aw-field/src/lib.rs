//! Awareness field dynamics engine.
//!
//! Models awareness as a square complex-valued field with wave-like
//! dynamics: localized ripples superpose, the grid advances under a
//! damped nonlinear wave equation, and scalar health measures score the
//! field's spectral organization (coherence) and golden-ratio structure
//! (phi resonance).
//!
//! Zero I/O — pure math engine with no opinions about transport or persistence.

pub mod constants;
pub mod error;
pub mod field;
pub mod lowrank;
pub mod spectrum;

pub use constants::{
    AMPLITUDE_CEILING, COHERENCE_MAX, COHERENCE_MIN, DAMPING, DEFAULT_TIME_STEP,
    MEANING_COMPONENTS, PHI, PHI_CONJUGATE, RESONANCE_PEAKS, RIPPLE_DECAY_LENGTH,
};
pub use error::{FieldError, Result};
pub use field::{FieldMeasure, WaveField};
pub use lowrank::rank_reduce;
pub use spectrum::{fft2, low_frequency_fraction, spectral_peaks};
