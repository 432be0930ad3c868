//! Rapid deepening and filling from a series of analyzed volumes.
use crate::{utility::mean, vortex::VortexProfile};
use chrono::NaiveDateTime;
use log::info;
use metfor::Quantity;

/// How the central pressure of a volume compares with the volumes before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trend {
    /// Falling faster than the rapid change rate, hPa/hour attached.
    RapidDeepening(f64),
    /// Rising faster than the rapid change rate, hPa/hour attached.
    RapidFilling(f64),
    /// Changing slower than the rapid change rate, hPa/hour attached.
    Steady(f64),
    /// Not enough earlier volumes with a central pressure, or no central pressure for this one.
    Unknown,
}

/// Classifies the central pressure tendency of a chronological series of volumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityTrend {
    volume_span: usize,
    rapid_rate: f64,
}

impl Default for IntensityTrend {
    fn default() -> Self {
        IntensityTrend {
            volume_span: 8,
            rapid_rate: 3.0,
        }
    }
}

impl IntensityTrend {
    /// Number of earlier volumes averaged.
    pub fn with_volume_span(mut self, volume_span: usize) -> Self {
        self.volume_span = volume_span.max(1);
        self
    }

    /// Rate of change considered rapid, hPa/hour.
    pub fn with_rapid_rate(mut self, rapid_rate: f64) -> Self {
        self.rapid_rate = rapid_rate;
        self
    }

    /// One trend per volume of `profiles`, which must be in chronological order.
    pub fn classify(&self, profiles: &[VortexProfile]) -> Vec<Trend> {
        let series: Vec<Option<(NaiveDateTime, f64)>> = profiles
            .iter()
            .map(|profile| {
                profile
                    .central_pressure()
                    .into_option()
                    .map(|p| (profile.time, p.unpack()))
            })
            .collect();

        (0..series.len())
            .map(|i| self.trend_at(&series, i))
            .collect()
    }

    /// Trend of the last volume of `profiles`.
    pub fn latest(&self, profiles: &[VortexProfile]) -> Trend {
        self.classify(profiles)
            .last()
            .cloned()
            .unwrap_or(Trend::Unknown)
    }

    fn trend_at(&self, series: &[Option<(NaiveDateTime, f64)>], index: usize) -> Trend {
        let (time, pressure) = match series[index] {
            Some(val) => val,
            None => return Trend::Unknown,
        };

        let previous: Vec<(NaiveDateTime, f64)> = series[..index]
            .iter()
            .rev()
            .take(self.volume_span)
            .flatten()
            .cloned()
            .collect();
        if previous.len() < self.volume_span {
            return Trend::Unknown;
        }

        // Seconds before `time`, the mean is the time the average pressure is valid for.
        let ages: Vec<f64> = previous
            .iter()
            .map(|(t, _)| (time - *t).num_seconds() as f64)
            .collect();
        let pressures: Vec<f64> = previous.iter().map(|&(_, p)| p).collect();

        let (age, average) = match (mean(&ages), mean(&pressures)) {
            (Some(age), Some(average)) if age > 0.0 => (age, average),
            _ => return Trend::Unknown,
        };

        let rate = (pressure - average) / (age / 3600.0);
        if rate <= -self.rapid_rate {
            info!("Rapid deepening at {}, {:.1} hPa/hour.", time, rate);
            Trend::RapidDeepening(rate)
        } else if rate >= self.rapid_rate {
            info!("Rapid filling at {}, {:.1} hPa/hour.", time, rate);
            Trend::RapidFilling(rate)
        } else {
            Trend::Steady(rate)
        }
    }
}
