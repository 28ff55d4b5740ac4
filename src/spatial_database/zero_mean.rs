use std::iter;

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Shift between measured values and the zero-mean residuals simple kriging works on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroMeanTransform<T>
where
    T: Float,
{
    mean: T,
}

impl<T> ZeroMeanTransform<T>
where
    T: Float,
{
    pub fn new(mean: T) -> Self {
        Self { mean }
    }

    pub fn mean(&self) -> T {
        self.mean
    }

    pub fn transform(&self, data: T) -> T {
        data - self.mean
    }

    pub fn back_transform(&self, data: T) -> T {
        data + self.mean
    }

    /// Residuals of every value in `data`.
    pub fn residuals(&self, data: &[T]) -> Vec<T> {
        data.iter().map(|v| self.transform(*v)).collect()
    }
}

impl<T> From<&[T]> for ZeroMeanTransform<T>
where
    T: Float + iter::Sum + Copy,
{
    fn from(data: &[T]) -> Self {
        let mean = data.iter().copied().sum::<T>() / T::from(data.len()).unwrap_or_else(T::one);
        Self::new(mean)
    }
}

/// Where the known mean of simple kriging comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownMean {
    #[default]
    Zero,
    Value(f64),
    /// Arithmetic mean of the conditioning data.
    Sample,
}

impl KnownMean {
    pub fn transform(&self, data: &[f64]) -> ZeroMeanTransform<f64> {
        match self {
            KnownMean::Zero => ZeroMeanTransform::new(0.0),
            KnownMean::Value(mean) => ZeroMeanTransform::new(*mean),
            KnownMean::Sample => ZeroMeanTransform::from(data),
        }
    }
}
