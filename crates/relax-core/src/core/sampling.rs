use nalgebra::{Unit, Vector3};
use rand::Rng;
use std::f64::consts::PI;
use thiserror::Error;

/// Tolerance used when checking that a cumulative distribution ends at one.
pub const CDF_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    #[error("Input probability list is empty, cannot build a distribution")]
    Empty,
    #[error("Weight {value} at index {index} is negative or not finite")]
    InvalidWeight { index: usize, value: f64 },
    #[error("Weights sum to zero, cannot normalize")]
    ZeroTotalWeight,
    #[error("Cumulative value {value} at index {index} is negative or not finite")]
    InvalidCdfValue { index: usize, value: f64 },
    #[error("Cumulative values decrease at index {index}")]
    UnsortedCdf { index: usize },
    #[error("Cumulative distribution ends at {last} instead of 1")]
    UnnormalizedCdf { last: f64 },
}

/// A discrete distribution over `0..len` stored as its cumulative distribution.
///
/// Sampling is an inverse-CDF lookup: the sampled index is the first one whose
/// cumulative value exceeds the uniform draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteDistribution {
    cdf: Vec<f64>,
}

impl DiscreteDistribution {
    /// Builds a distribution from values already in cumulative form.
    ///
    /// The final value is snapped to exactly `1.0` when it lies within
    /// [`CDF_TOLERANCE`] of one, and any earlier value inside that tolerance
    /// above one is clamped to `1.0`, so the stored sequence stays
    /// non-decreasing.
    pub fn from_cdf(values: &[f64]) -> Result<Self, SamplingError> {
        if values.is_empty() {
            return Err(SamplingError::Empty);
        }
        for (index, &value) in values.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(SamplingError::InvalidCdfValue { index, value });
            }
            if index > 0 && value < values[index - 1] {
                return Err(SamplingError::UnsortedCdf { index });
            }
        }

        let last = values[values.len() - 1];
        if (last - 1.0).abs() > CDF_TOLERANCE {
            return Err(SamplingError::UnnormalizedCdf { last });
        }

        let mut cdf: Vec<f64> = values.iter().map(|v| v.min(1.0)).collect();
        let len = cdf.len();
        cdf[len - 1] = 1.0;
        Ok(Self { cdf })
    }

    /// Builds a distribution from unnormalized, non-negative weights.
    pub fn from_weights(weights: &[f64]) -> Result<Self, SamplingError> {
        if weights.is_empty() {
            return Err(SamplingError::Empty);
        }
        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(SamplingError::InvalidWeight { index, value });
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(SamplingError::ZeroTotalWeight);
        }

        let mut running = 0.0;
        let mut cdf: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w;
                running / total
            })
            .collect();
        let len = cdf.len();
        cdf[len - 1] = 1.0;
        Ok(Self { cdf })
    }

    pub fn len(&self) -> usize {
        self.cdf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cdf.is_empty()
    }

    pub fn cdf(&self) -> &[f64] {
        &self.cdf
    }

    pub fn probability(&self, index: usize) -> Option<f64> {
        let upper = *self.cdf.get(index)?;
        let lower = if index == 0 { 0.0 } else { self.cdf[index - 1] };
        Some(upper - lower)
    }

    /// Returns the first index whose cumulative value exceeds `xi`.
    ///
    /// `xi` is expected in `[0, 1)`; anything at or past the end clamps to
    /// the last index.
    pub fn index_for(&self, xi: f64) -> usize {
        self.cdf
            .partition_point(|&c| c <= xi)
            .min(self.cdf.len() - 1)
    }

    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.index_for(rng.r#gen::<f64>())
    }
}

/// Samples a direction uniformly on the unit sphere.
///
/// The polar cosine is uniform on `[-1, 1]` and the azimuth uniform on `[0, 2π)`.
pub fn sample_isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> Unit<Vector3<f64>> {
    let mu: f64 = 2.0 * rng.r#gen::<f64>() - 1.0;
    let phi: f64 = 2.0 * PI * rng.r#gen::<f64>();
    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();
    Unit::new_normalize(Vector3::new(
        sin_theta * phi.cos(),
        sin_theta * phi.sin(),
        mu,
    ))
}
