//! Pick how many Fourier coefficients a ring's azimuthal coverage supports.

/// Number of Fourier coefficients to fit given the storm relative angles (radians, `[0, 2π)`) of
/// the valid samples.
///
/// Angles are binned into 360 one degree bins. Runs of empty bins are measured twice around the
/// circle so a gap spanning north is seen whole. A run longer than `gaps[k]` limits the fit to
/// wavenumber `k`, that is `2k + 1` coefficients, and a run longer than `gaps[0]` means the ring
/// can not be fit at all and 0 is returned. Without limiting gaps the result is
/// `2 * max_wavenumber + 3`, which resolves the tangential asymmetries up to `max_wavenumber`.
pub(crate) fn num_coefficients(psi: &[f64], max_wavenumber: u8, gaps: &[f64]) -> usize {
    debug_assert!(gaps.len() > max_wavenumber as usize);

    let mut filled = [false; 360];
    for &angle in psi {
        filled[(angle.to_degrees().floor().max(0.0) as usize) % 360] = true;
    }

    let mut num_coeffs = 2 * max_wavenumber as usize + 3;
    let mut gap_run = 0.0;

    for deg in 0..720 {
        if filled[deg % 360] {
            gap_run = 0.0;
            if deg >= 360 {
                return num_coeffs;
            }
        } else {
            gap_run += 1.0;
            if gap_run > gaps[0] {
                return 0;
            }

            if let Some(k) = (1..=max_wavenumber as usize).find(|&k| gap_run > gaps[k]) {
                num_coeffs = num_coeffs.min(2 * k + 1);
            }
        }
    }

    0
}
