use std::sync::Arc;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::geometry::anisotropy::AnisotropyParameters;
use crate::spatial_database::point_set::PointSet;
use crate::spatial_database::zero_mean::{KnownMean, ZeroMeanTransform};
use crate::systems::kriging_matrix::KrigingMatrix;
use crate::systems::{dense, moving_window, point_loop, SolveContext};
use crate::variography::experimental_variogram::{DirectionFilter, ExperimentalVariogram};
use crate::variography::model_variograms::{
    CustomVariogram, VariogramKind, VariogramModel, WeightScheme,
};
use crate::variography::statistics::CrossValidation;
use crate::variography::{self, FittedVariogram};

use super::query::QuerySet;
use super::{ExecuteOptions, KrigingOutput, QueryStyle, SolveStrategy};

/// Variogram, anisotropy and statistics settings of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KrigingConfig {
    pub variogram_model: VariogramKind,
    /// Used verbatim when given, fitted to the experimental variogram otherwise.
    pub variogram_parameters: Option<Vec<f64>>,
    pub nlags: usize,
    pub weight: WeightScheme,
    pub anisotropy_scaling: f64,
    /// Clockwise frame rotation in degrees.
    pub anisotropy_angle: f64,
    pub enable_statistics: bool,
    pub mean: KnownMean,
    /// Lower azimuth bound in degrees of the pairs used for the experimental variogram.
    pub min_theta: Option<f64>,
    /// Upper azimuth bound in degrees, see [`DirectionFilter`].
    pub max_theta: Option<f64>,
}

impl Default for KrigingConfig {
    fn default() -> Self {
        Self {
            variogram_model: VariogramKind::Linear,
            variogram_parameters: None,
            nlags: 6,
            weight: WeightScheme::None,
            anisotropy_scaling: 1.0,
            anisotropy_angle: 0.0,
            enable_statistics: false,
            mean: KnownMean::Zero,
            min_theta: None,
            max_theta: None,
        }
    }
}

impl KrigingConfig {
    pub fn with_variogram(kind: VariogramKind, parameters: Option<Vec<f64>>) -> Self {
        Self {
            variogram_model: kind,
            variogram_parameters: parameters,
            ..Default::default()
        }
    }
}

/// Everything derived from the data and a [`KrigingConfig`].
///
/// Built in full before it replaces the state of a session.
struct VariogramState {
    config: KrigingConfig,
    anisotropy: AnisotropyParameters,
    working_points: Vec<Point2<f64>>,
    mean: ZeroMeanTransform<f64>,
    residuals: Vec<f64>,
    experimental: ExperimentalVariogram,
    variogram: Arc<VariogramModel>,
    statistics: Option<CrossValidation>,
}

impl VariogramState {
    fn new(
        points: &PointSet,
        center: Point2<f64>,
        config: KrigingConfig,
        custom: Option<CustomVariogram>,
    ) -> Result<Self> {
        let anisotropy = AnisotropyParameters::new(
            center,
            config.anisotropy_scaling,
            config.anisotropy_angle,
        )?;
        let working_points = anisotropy.transform_all(points.points());
        debug!(
            scaling = anisotropy.scaling,
            angle = anisotropy.angle,
            center = ?anisotropy.center,
            "adjusted data for anisotropy"
        );

        let direction = DirectionFilter::from_bounds(config.min_theta, config.max_theta)?;
        let mean = config.mean.transform(points.data());
        let residuals = mean.residuals(points.data());

        let FittedVariogram {
            experimental,
            model,
        } = variography::fit(
            &working_points,
            points.data(),
            config.variogram_model,
            config.variogram_parameters.clone(),
            custom,
            config.nlags,
            config.weight,
            direction,
        )?;

        let statistics = match (config.enable_statistics, model.kind().is_bounded()) {
            (false, _) => None,
            (true, true) => Some(CrossValidation::compute(
                &working_points,
                &residuals,
                &model,
            )?),
            (true, false) => {
                warn!(
                    model = %model.kind(),
                    "cross-validation statistics need a bounded variogram, skipped"
                );
                None
            }
        };

        Ok(Self {
            config,
            anisotropy,
            working_points,
            mean,
            residuals,
            experimental,
            variogram: Arc::new(model),
            statistics,
        })
    }
}

/// A two-dimensional simple kriging session.
///
/// Owns the conditioning data and the variogram fitted to it. `execute` only reads the
/// session, so concurrent solves can share it; `update_variogram_model` needs exclusive
/// access and replaces the variogram state all at once.
pub struct SimpleKriging {
    points: PointSet,
    center: Point2<f64>,
    state: VariogramState,
}

impl SimpleKriging {
    /// Creates a session and fits its variogram
    /// # Arguments
    /// * `points` - conditioning data in raw coordinates
    /// * `config` - variogram, anisotropy and statistics settings
    /// * `custom` - the variogram function, required when the model is `custom`
    pub fn new(
        points: PointSet,
        config: KrigingConfig,
        custom: Option<CustomVariogram>,
    ) -> Result<Self> {
        let center = points.center();
        let state = VariogramState::new(&points, center, config, custom)?;

        Ok(Self {
            points,
            center,
            state,
        })
    }

    pub fn from_xyz(
        x: &[f64],
        y: &[f64],
        z: &[f64],
        config: KrigingConfig,
        custom: Option<CustomVariogram>,
    ) -> Result<Self> {
        Self::new(PointSet::from_xyz(x, y, z)?, config, custom)
    }

    /// Refit with a new configuration.
    ///
    /// The anisotropy center stays that of the original data. On error the session is
    /// left exactly as it was.
    pub fn update_variogram_model(
        &mut self,
        config: KrigingConfig,
        custom: Option<CustomVariogram>,
    ) -> Result<()> {
        let state = VariogramState::new(&self.points, self.center, config, custom)?;
        self.state = state;
        info!(
            model = %self.state.variogram.kind(),
            parameters = %self.state.variogram.describe(),
            "variogram model updated"
        );
        Ok(())
    }

    /// Estimate values and estimation variances at the query locations.
    /// # Arguments
    /// * `style` - points, grid or masked grid
    /// * `xpoints`, `ypoints` - query coordinates in the raw frame
    /// * `options` - backend, optional moving window and cancellation
    pub fn execute(
        &self,
        style: QueryStyle<'_>,
        xpoints: &[f64],
        ypoints: &[f64],
        options: &ExecuteOptions,
    ) -> Result<KrigingOutput> {
        let strategy = options.strategy(self.points.len())?;
        let query = QuerySet::build(&style, xpoints, ypoints)?;
        let working_query = self.state.anisotropy.transform_all(&query.points);

        let matrix = KrigingMatrix::build(&self.state.working_points, &self.state.variogram)?;
        let ctx = SolveContext {
            matrix: &matrix,
            data: &self.state.working_points,
            residuals: &self.state.residuals,
            variogram: &self.state.variogram,
            cancel: options.cancel.as_ref(),
        };

        debug!(?strategy, points = query.len(), "executing simple kriging");

        let mask = query.mask.as_deref();
        let solved = match strategy {
            SolveStrategy::Dense => dense::solve(&ctx, &working_query, mask)?,
            SolveStrategy::Loop => point_loop::solve(&ctx, &working_query, mask)?,
            SolveStrategy::MovingWindow { n_closest } => {
                moving_window::solve(&ctx, &working_query, mask, n_closest)?
            }
        };

        Ok(query.into_output(solved, &self.state.mean))
    }

    /// Build the kriging matrix of the current variogram for inspection.
    pub fn kriging_matrix(&self) -> Result<KrigingMatrix> {
        KrigingMatrix::build(&self.state.working_points, &self.state.variogram)
    }

    pub fn config(&self) -> &KrigingConfig {
        &self.state.config
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn working_coordinates(&self) -> &[Point2<f64>] {
        self.state.working_points.as_slice()
    }

    pub fn anisotropy(&self) -> &AnisotropyParameters {
        &self.state.anisotropy
    }

    pub fn variogram(&self) -> Arc<VariogramModel> {
        Arc::clone(&self.state.variogram)
    }

    pub fn mean(&self) -> f64 {
        self.state.mean.mean()
    }

    pub fn experimental_variogram(&self) -> &ExperimentalVariogram {
        &self.state.experimental
    }

    pub fn lags(&self) -> &[f64] {
        self.state.experimental.lags.as_slice()
    }

    pub fn semivariance(&self) -> &[f64] {
        self.state.experimental.semivariance.as_slice()
    }

    pub fn semivariance_error(&self) -> &[f64] {
        self.state.experimental.semivariance_error.as_slice()
    }

    pub fn statistics(&self) -> Option<&CrossValidation> {
        self.state.statistics.as_ref()
    }

    pub fn epsilon_residuals(&self) -> Option<&[f64]> {
        self.state
            .statistics
            .as_ref()
            .map(|stats| stats.epsilon.as_slice())
    }
}
