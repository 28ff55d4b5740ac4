use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nalgebra::Point2;

use crate::error::KrigingError;
use crate::variography::model_variograms::VariogramModel;

use self::kriging_matrix::KrigingMatrix;

pub mod dense;
pub mod kriging_matrix;
pub mod moving_window;
pub mod point_loop;

/// Cooperative cancellation flag shared between a caller and an in-flight solve.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything a solve strategy reads. Borrowed from the session for one `execute` call.
pub struct SolveContext<'a> {
    pub matrix: &'a KrigingMatrix,
    /// Working-frame data locations, in matrix order.
    pub data: &'a [Point2<f64>],
    /// Data values minus the known mean.
    pub residuals: &'a [f64],
    pub variogram: &'a VariogramModel,
    pub cancel: Option<&'a CancellationToken>,
}

impl SolveContext<'_> {
    pub fn sill(&self) -> f64 {
        self.matrix.sill()
    }

    pub(crate) fn check_cancelled(&self, completed: usize) -> Result<(), KrigingError> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(KrigingError::Cancelled { completed }),
            _ => Ok(()),
        }
    }
}

/// Residual estimates and estimation variances, one entry per query point.
///
/// Masked points hold `NaN` in both vectors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolveOutput {
    pub estimates: Vec<f64>,
    pub variances: Vec<f64>,
}

impl SolveOutput {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            estimates: Vec::with_capacity(n),
            variances: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, estimate: f64, variance: f64) {
        self.estimates.push(estimate);
        self.variances.push(variance);
    }

    pub(crate) fn push_masked(&mut self) {
        self.push(f64::NAN, f64::NAN);
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}

#[inline(always)]
pub(crate) fn is_masked(mask: Option<&[bool]>, index: usize) -> bool {
    mask.map_or(false, |m| m[index])
}
