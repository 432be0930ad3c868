//! Pressure, density and temperature perturbations implied by the wind field at every height.
//!
//! The gradient wind pressure deficit at each height is added to a hydrostatic reference
//! atmosphere. Density then follows from the vertical pressure gradient, temperature from the
//! ideal gas law and potential temperature from Poisson's equation.
use super::deficit::PressureProfile;
use itertools::Itertools;
use metfor::{HectoPascal, Kelvin, Km, Quantity};
use optional::{none, some, Optioned};

/// Surface density of the thermal reference atmosphere, kg/m³.
pub const REFERENCE_SURFACE_DENSITY: f64 = 1.244;
/// Density scale height of the thermal reference atmosphere, km.
pub const REFERENCE_SCALE_HEIGHT: f64 = 8.864;

// hPa/km to Pa/m
const HPA_PER_KM_TO_PA_PER_M: f64 = 0.1;

/// The horizontally uniform reference atmosphere at one height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLevel {
    /// Height above the radar.
    pub height: Km,
    /// Pressure.
    pub pressure: HectoPascal,
    /// Density, kg/m³.
    pub density: f64,
    /// Temperature.
    pub temperature: Kelvin,
    /// Potential temperature.
    pub theta: Kelvin,
}

impl ReferenceLevel {
    fn new(height: f64, pressure: f64) -> Self {
        let density = reference_density(height);
        let (temperature, theta) = gas_temperatures(pressure, density);
        ReferenceLevel {
            height: Km(height),
            pressure: HectoPascal(pressure),
            density,
            temperature,
            theta,
        }
    }
}

/// Reference density at `height` km, kg/m³.
pub fn reference_density(height: f64) -> f64 {
    REFERENCE_SURFACE_DENSITY * (-height / REFERENCE_SCALE_HEIGHT).exp()
}

/// Temperature from the ideal gas law and the potential temperature, for `pressure` hPa and
/// `density` kg/m³.
fn gas_temperatures(pressure: f64, density: f64) -> (Kelvin, Kelvin) {
    let temperature = Kelvin(pressure * 100.0 / (density * metfor::Rd.unpack()));
    let theta = metfor::potential_temperature(HectoPascal(pressure), temperature);
    (temperature, theta)
}

/// Perturbations from the reference atmosphere on every (height, ring) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalField {
    radii: Vec<f64>,
    reference: Vec<ReferenceLevel>,
    pressure: Vec<Vec<Optioned<f64>>>,
    density: Vec<Vec<Optioned<f64>>>,
    temperature: Vec<Vec<Optioned<f64>>>,
    theta: Vec<Vec<Optioned<f64>>>,
}

impl ThermalField {
    /// Solve for the perturbations.
    ///
    /// `profiles` holds the pressure deficit profile for each of `levels` (km), all on the same
    /// rings. `surface_pressure` is the environmental pressure at the ground, hPa. Cells at heights
    /// without a profile, or without a neighboring height to take the vertical gradient from, are
    /// missing.
    pub fn solve(
        levels: &[f64],
        profiles: &[Option<PressureProfile>],
        surface_pressure: f64,
    ) -> Self {
        let reference = reference_atmosphere(levels, surface_pressure);

        let radii: Vec<f64> = profiles
            .iter()
            .flatten()
            .next()
            .map(|profile| profile.radii().to_vec())
            .unwrap_or_default();

        // Pressure relative to the outer ring, where the vortex meets the environment.
        let perturbation: Vec<Option<Vec<f64>>> = profiles
            .iter()
            .map(|profile| {
                profile.as_ref().map(|profile| {
                    let outer = profile.outer();
                    profile.values().iter().map(|p| p - outer).collect()
                })
            })
            .collect();

        let num_levels = levels.len();
        let mut field = ThermalField {
            radii: radii.clone(),
            reference,
            pressure: vec![vec![none(); radii.len()]; num_levels],
            density: vec![vec![none(); radii.len()]; num_levels],
            temperature: vec![vec![none(); radii.len()]; num_levels],
            theta: vec![vec![none(); radii.len()]; num_levels],
        };

        for hi in 0..num_levels {
            let here = match perturbation.get(hi) {
                Some(Some(here)) => here,
                _ => continue,
            };
            let below = hi
                .checked_sub(1)
                .and_then(|i| perturbation[i].as_ref().map(|p| (i, p)));
            let above = perturbation.get(hi + 1).and_then(|p| p.as_ref().map(|p| (hi + 1, p)));
            let reference = field.reference[hi];

            for ri in 0..radii.len() {
                let p_prime = here[ri];
                field.pressure[hi][ri] = some(p_prime);

                // hPa per km
                let dpdz = match (below, above) {
                    (Some((b, pb)), Some((a, pa))) => (pa[ri] - pb[ri]) / (levels[a] - levels[b]),
                    (Some((b, pb)), None) => (p_prime - pb[ri]) / (levels[hi] - levels[b]),
                    (None, Some((a, pa))) => (pa[ri] - p_prime) / (levels[a] - levels[hi]),
                    (None, None) => continue,
                };

                // metfor::g is negative, downward.
                let rho_prime = dpdz * HPA_PER_KM_TO_PA_PER_M / metfor::g;
                let rho = reference.density + rho_prime;
                let p = reference.pressure.unpack() + p_prime;
                if rho <= 0.0 || p <= 0.0 {
                    continue;
                }

                let (temperature, theta) = gas_temperatures(p, rho);
                field.density[hi][ri] = some(rho_prime);
                field.temperature[hi][ri] =
                    some(temperature.unpack() - reference.temperature.unpack());
                field.theta[hi][ri] = some(theta.unpack() - reference.theta.unpack());
            }
        }

        field
    }

    /// Ring radii, km.
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Reference atmosphere at each analysis height.
    pub fn reference(&self) -> &[ReferenceLevel] {
        &self.reference
    }

    /// Pressure perturbation, hPa.
    pub fn pressure(&self, height_index: usize, ring_index: usize) -> Optioned<f64> {
        lookup(&self.pressure, height_index, ring_index)
    }

    /// Density perturbation, kg/m³.
    pub fn density(&self, height_index: usize, ring_index: usize) -> Optioned<f64> {
        lookup(&self.density, height_index, ring_index)
    }

    /// Temperature perturbation, K.
    pub fn temperature(&self, height_index: usize, ring_index: usize) -> Optioned<f64> {
        lookup(&self.temperature, height_index, ring_index)
    }

    /// Potential temperature perturbation, K.
    pub fn theta(&self, height_index: usize, ring_index: usize) -> Optioned<f64> {
        lookup(&self.theta, height_index, ring_index)
    }
}

fn lookup(vals: &[Vec<Optioned<f64>>], height_index: usize, ring_index: usize) -> Optioned<f64> {
    vals.get(height_index)
        .and_then(|row| row.get(ring_index))
        .cloned()
        .unwrap_or_else(none)
}

/// Hydrostatic reference pressure at each level, integrated upward from the surface with the
/// trapezoid rule.
fn reference_atmosphere(levels: &[f64], surface_pressure: f64) -> Vec<ReferenceLevel> {
    let mut pressure = surface_pressure;

    std::iter::once(0.0)
        .chain(levels.iter().cloned())
        .tuple_windows::<(_, _)>()
        .map(|(bottom, top)| {
            let mean_density = 0.5 * (reference_density(bottom) + reference_density(top));
            pressure += metfor::g * mean_density * (top - bottom) * 1000.0 / 100.0;
            ReferenceLevel::new(top, pressure)
        })
        .collect()
}
