//! 2-D discrete Fourier analysis of the field grid.
//!
//! One shared DFT implementation feeds both the coherence measure and
//! phi-resonance peak scoring.

use nalgebra::DMatrix;
use num_complex::Complex64;
use rustfft::FftPlanner;

/// Forward 2-D DFT: row transforms followed by column transforms.
/// Unnormalized, matching the usual forward convention — callers only
/// consume power ratios, so the scale factor cancels.
pub fn fft2(grid: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let (rows, cols) = grid.shape();
    let mut out = grid.clone();
    let mut planner = FftPlanner::new();

    let row_fft = planner.plan_fft_forward(cols);
    let mut buf = vec![Complex64::new(0.0, 0.0); cols];
    for i in 0..rows {
        for j in 0..cols {
            buf[j] = out[(i, j)];
        }
        row_fft.process(&mut buf);
        for j in 0..cols {
            out[(i, j)] = buf[j];
        }
    }

    let col_fft = planner.plan_fft_forward(rows);
    let mut buf = vec![Complex64::new(0.0, 0.0); rows];
    for j in 0..cols {
        for i in 0..rows {
            buf[i] = out[(i, j)];
        }
        col_fft.process(&mut buf);
        for i in 0..rows {
            out[(i, j)] = buf[i];
        }
    }

    out
}

/// Fraction of spectral power inside the `block`×`block` low-frequency
/// corner. `None` when the spectrum carries no power at all.
pub fn low_frequency_fraction(spectrum: &DMatrix<Complex64>, block: usize) -> Option<f64> {
    let mut low = 0.0;
    let mut total = 0.0;
    for j in 0..spectrum.ncols() {
        for i in 0..spectrum.nrows() {
            let power = spectrum[(i, j)].norm_sqr();
            total += power;
            if i < block && j < block {
                low += power;
            }
        }
    }
    if total > 0.0 { Some(low / total) } else { None }
}

/// The `count` largest magnitudes of a spectrum in descending order,
/// found by repeatedly extracting the maximum and zeroing it out.
pub fn spectral_peaks(spectrum: &DMatrix<Complex64>, count: usize) -> Vec<f64> {
    let mut magnitudes: Vec<f64> = spectrum.iter().map(|z| z.norm()).collect();
    let mut peaks = Vec::with_capacity(count);

    for _ in 0..count {
        let Some((idx, &max)) = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
        else {
            break;
        };
        peaks.push(max);
        magnitudes[idx] = 0.0;
    }

    peaks
}
