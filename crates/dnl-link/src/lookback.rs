//! Delayed reads of cumulative curves.
//!
//! A link model asks "what was `U` (or `D`) at `boundary − delay`?", with
//! `delay` in steps.  Reads before the start of the horizon return the first
//! boundary value.

use dnl_core::LookbackMode;

/// Value of `curve` at `boundary − delay`.
pub fn read(curve: &[f64], boundary: usize, delay: f64, mode: LookbackMode) -> f64 {
    match mode {
        LookbackMode::Floor => {
            let back = delay.floor() as usize;
            curve[boundary.saturating_sub(back)]
        }
        LookbackMode::Interpolate => {
            let at = boundary as f64 - delay;
            if at <= 0.0 {
                return curve[0];
            }
            let k = at.floor() as usize;
            let frac = at - k as f64;
            if frac == 0.0 || k + 1 >= curve.len() {
                curve[k.min(curve.len() - 1)]
            } else {
                curve[k] + frac * (curve[k + 1] - curve[k])
            }
        }
    }
}

/// How strongly a delayed read at boundary `t + 1` depends on the value at
/// `t + 1` itself.
///
/// This is the weight with which a change of the current step's cumulative
/// value feeds back into the same step: 1 or 0 for floored reads, and the
/// interpolation weight `1 − delay` for interpolated reads shorter than a
/// step.
pub fn sensitivity(delay: f64, mode: LookbackMode) -> f64 {
    match mode {
        LookbackMode::Floor => {
            if delay < 1.0 { 1.0 } else { 0.0 }
        }
        LookbackMode::Interpolate => (1.0 - delay).max(0.0),
    }
}
