//! Pluggable numeric distance between sounds.
//!
//! A [`DistanceBuilder`] is fitted against a model the first time a distance
//! is requested; the resulting [`DistanceModel`] is cached by the model for
//! the rest of its life.

use crate::error::Result;
use crate::model::Model;

/// A fitted distance function over binary value vectors
pub trait DistanceModel: Send + Sync {
    fn predict(&self, a: &[f64], b: &[f64]) -> f64;
}

/// Builds a [`DistanceModel`] for one model
pub trait DistanceBuilder: Send + Sync {
    fn fit(&self, model: &Model) -> Result<Box<dyn DistanceModel>>;
}

/// Euclidean distance between binary value vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanBuilder;

#[derive(Debug, Clone, Copy)]
struct Euclidean;

impl DistanceModel for Euclidean {
    fn predict(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl DistanceBuilder for EuclideanBuilder {
    fn fit(&self, model: &Model) -> Result<Box<dyn DistanceModel>> {
        log::debug!(
            "fitting euclidean distance over {} values of {}",
            model.registry().value_count(),
            model.name()
        );
        Ok(Box::new(Euclidean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean() {
        let euclidean = Euclidean;
        assert_eq!(euclidean.predict(&[0.0, 1.0, 1.0], &[0.0, 1.0, 1.0]), 0.0);
        assert_eq!(euclidean.predict(&[1.0, 0.0, 0.0, 0.0], &[0.0, 0.0, 0.0, 1.0]), 2f64.sqrt());
        assert_eq!(euclidean.predict(&[1.0, 1.0, 1.0, 1.0], &[0.0; 4]), 2.0);
    }
}
