use super::IsoVariogramModel;

/// `slope * h + nugget`. Unbounded, usable for variogram analysis only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear {
    pub slope: f64,
    pub nugget: f64,
}

impl IsoVariogramModel for Linear {
    const PARAMETER_NAMES: &'static [&'static str] = &["slope", "nugget"];

    fn from_params(params: &[f64]) -> Self {
        Self {
            slope: params[0],
            nugget: params[1],
        }
    }

    fn variogram(&self, h: f64) -> f64 {
        self.slope * h + self.nugget
    }

    fn c_0(&self) -> Option<f64> {
        None
    }
}
