//! The wave field: a square complex grid with ripple injection,
//! nonlinear propagation, and spectral health measures.

use nalgebra::DMatrix;
use num_complex::Complex64;
use rand::Rng;
use serde::Serialize;

use crate::constants::{
    AMPLITUDE_CEILING, COHERENCE_BLOCK_DIVISOR, COHERENCE_MAX, COHERENCE_MIN, DAMPING,
    DEFAULT_TIME_STEP, INTEGRATION_SUPPRESSION, MEANING_COMPONENTS, PHI, PHI_CONJUGATE,
    RESONANCE_PEAKS, RIPPLE_DECAY_LENGTH,
};
use crate::error::{FieldError, Result};
use crate::lowrank::rank_reduce;
use crate::spectrum::{fft2, low_frequency_fraction, spectral_peaks};

/// Scalar health measures of the field, taken as one snapshot.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct FieldMeasure {
    pub coherence: f64,
    pub total_energy: f64,
    pub max_amplitude: f64,
    /// Standard deviation of cell phase angles — lower means more aligned.
    pub phase_alignment: f64,
    pub phi_resonance: f64,
}

/// A D×D complex-valued field advanced by a damped nonlinear wave
/// equation.
///
/// The grid starts zeroed with coherence at the φ⁻¹ baseline. Each cell
/// carries a fixed random phase offset (the phase lock) so repeated
/// ripples from the same origin interfere non-identically.
pub struct WaveField {
    dimensions: usize,
    grid: DMatrix<Complex64>,
    phase_lock: DMatrix<f64>,
    coherence: f64,
}

impl WaveField {
    pub fn new(dimensions: usize, rng: &mut impl Rng) -> Result<Self> {
        if dimensions == 0 {
            return Err(FieldError::InvalidDimensions(dimensions));
        }
        let phase_lock = DMatrix::from_fn(dimensions, dimensions, |_, _| {
            rng.random_range(0.0..std::f64::consts::TAU)
        });
        Ok(Self {
            dimensions,
            grid: DMatrix::zeros(dimensions, dimensions),
            phase_lock,
            coherence: PHI_CONJUGATE,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn coherence(&self) -> f64 {
        self.coherence
    }

    pub fn grid(&self) -> &DMatrix<Complex64> {
        &self.grid
    }

    /// Replace the grid wholesale (drivers and tests). Shape-checked.
    /// Coherence is not recomputed — call [`update_coherence`] after.
    ///
    /// [`update_coherence`]: WaveField::update_coherence
    pub fn set_grid(&mut self, grid: DMatrix<Complex64>) -> Result<()> {
        if grid.shape() != (self.dimensions, self.dimensions) {
            return Err(FieldError::ShapeMismatch {
                expected: (self.dimensions, self.dimensions),
                found: grid.shape(),
            });
        }
        self.grid = grid;
        Ok(())
    }

    /// Inject a traveling ripple centered at `origin` = (x, y).
    ///
    /// Every cell at distance r from the origin accumulates
    /// `amplitude · e^(−r/100) · e^(i(frequency·r − phase_lock))`, so the
    /// disturbance decays with distance and oscillates tighter at higher
    /// frequency. Superposes onto the existing grid, then renormalizes.
    pub fn create_ripple(
        &mut self,
        origin: (usize, usize),
        frequency: f64,
        amplitude: f64,
    ) -> Result<()> {
        let (ox, oy) = origin;
        if ox >= self.dimensions || oy >= self.dimensions {
            return Err(FieldError::OriginOutOfBounds {
                origin,
                dimensions: self.dimensions,
            });
        }

        for j in 0..self.dimensions {
            for i in 0..self.dimensions {
                // x runs along columns, y along rows
                let dx = j as f64 - ox as f64;
                let dy = i as f64 - oy as f64;
                let r = (dx * dx + dy * dy).sqrt();
                let magnitude = amplitude * (-r / RIPPLE_DECAY_LENGTH).exp();
                let phase = frequency * r - self.phase_lock[(i, j)];
                self.grid[(i, j)] += Complex64::from_polar(magnitude, phase);
            }
        }

        self.normalize();
        Ok(())
    }

    /// One explicit Euler step of the damped nonlinear wave equation:
    /// periodic Laplacian diffusion, tanh self-interaction, uniform
    /// damping, then a coherence update.
    pub fn propagate(&mut self, time_step: f64) {
        let d = self.dimensions;
        let g = &self.grid;
        let laplacian = DMatrix::from_fn(d, d, |i, j| {
            g[((i + 1) % d, j)] + g[((i + d - 1) % d, j)] + g[(i, (j + 1) % d)]
                + g[(i, (j + d - 1) % d)]
                - g[(i, j)] * 4.0
        });
        self.grid
            .zip_apply(&laplacian, |cell, lap| *cell += lap * time_step);

        // Saturating self-interaction: the multiplier stays in [tanh(1), 1)
        self.grid.apply(|cell| {
            let gain = (1.0 + PHI_CONJUGATE * cell.norm()).tanh();
            *cell *= gain * DAMPING;
        });

        self.update_coherence();
    }

    /// [`propagate`] with the default time step.
    ///
    /// [`propagate`]: WaveField::propagate
    pub fn step(&mut self) {
        self.propagate(DEFAULT_TIME_STEP);
    }

    /// Recompute coherence: the share of spectral power concentrated in
    /// the low-frequency corner block, clamped to its declared range.
    /// A zero-power field falls back to the φ⁻¹ baseline.
    pub fn update_coherence(&mut self) {
        let block = (self.dimensions / COHERENCE_BLOCK_DIVISOR).max(1);
        let spectrum = fft2(&self.grid);
        let fraction = low_frequency_fraction(&spectrum, block).unwrap_or(PHI_CONJUGATE);
        self.coherence = fraction.clamp(COHERENCE_MIN, COHERENCE_MAX);
    }

    /// Nonlinearly integrate input fields, replacing the grid.
    ///
    /// The inputs are summed and squashed by `tanh(Σ) · e^(−|Σ|²/1000)`,
    /// so the result is deliberately not the linear superposition.
    /// Returns the meaning extraction of the new field.
    pub fn integrate_inputs(&mut self, inputs: &[DMatrix<Complex64>]) -> Result<DMatrix<f64>> {
        let mut combined: DMatrix<Complex64> = DMatrix::zeros(self.dimensions, self.dimensions);
        for input in inputs {
            if input.shape() != (self.dimensions, self.dimensions) {
                return Err(FieldError::ShapeMismatch {
                    expected: (self.dimensions, self.dimensions),
                    found: input.shape(),
                });
            }
            combined += input;
        }

        self.grid = combined.map(|z| z.tanh() * (-z.norm_sqr() / INTEGRATION_SUPPRESSION).exp());
        self.normalize();
        self.extract_meaning()
    }

    /// Rank-reduced reconstruction of the grid's real part: the top
    /// singular components carry the dominant structure.
    pub fn extract_meaning(&self) -> Result<DMatrix<f64>> {
        let real = self.grid.map(|z| z.re);
        rank_reduce(&real, MEANING_COMPONENTS)
    }

    /// Rescale so peak magnitude is exactly the ceiling when exceeded.
    /// Relative amplitudes and phase relationships are untouched.
    pub fn normalize(&mut self) {
        let peak = self.max_amplitude();
        if peak > AMPLITUDE_CEILING {
            let scale = AMPLITUDE_CEILING / peak;
            self.grid.apply(|cell| *cell *= scale);
        }
    }

    fn max_amplitude(&self) -> f64 {
        self.grid.iter().map(|z| z.norm()).fold(0.0, f64::max)
    }

    /// Snapshot the field's scalar health measures.
    pub fn measure(&self) -> FieldMeasure {
        let n = (self.dimensions * self.dimensions) as f64;
        let mean_angle = self.grid.iter().map(|z| z.arg()).sum::<f64>() / n;
        let variance = self
            .grid
            .iter()
            .map(|z| {
                let d = z.arg() - mean_angle;
                d * d
            })
            .sum::<f64>()
            / n;

        FieldMeasure {
            coherence: self.coherence,
            total_energy: self.grid.iter().map(|z| z.norm()).sum(),
            max_amplitude: self.max_amplitude(),
            phase_alignment: variance.sqrt(),
            phi_resonance: self.phi_resonance(),
        }
    }

    /// Score how closely ratios of the dominant spectral peaks track φ:
    /// `1 / (1 + mean |ratio − φ|)` over consecutive peak ratios, skipping
    /// ratios with a zero denominator. Fewer than two usable peaks yields
    /// the φ⁻¹ default.
    fn phi_resonance(&self) -> f64 {
        let spectrum = fft2(&self.grid);
        let peaks = spectral_peaks(&spectrum, RESONANCE_PEAKS);

        let ratios: Vec<f64> = peaks
            .windows(2)
            .filter(|pair| pair[1] > 0.0)
            .map(|pair| pair[0] / pair[1])
            .collect();
        if peaks.len() < 2 || ratios.is_empty() {
            return PHI_CONJUGATE;
        }

        let mean_distance =
            ratios.iter().map(|r| (r - PHI).abs()).sum::<f64>() / ratios.len() as f64;
        1.0 / (1.0 + mean_distance)
    }
}
