use super::IsoVariogramModel;

#[derive(Debug, Clone, Copy, Default)]
pub struct IsoExponential {
    pub sill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl IsoExponential {
    pub fn new(sill: f64, range: f64, nugget: f64) -> Self {
        Self {
            sill,
            range,
            nugget,
        }
    }
}

impl IsoVariogramModel for IsoExponential {
    const PARAMETER_NAMES: &'static [&'static str] = &["sill", "range", "nugget"];

    fn from_params(params: &[f64]) -> Self {
        Self::new(params[0], params[1], params[2])
    }

    fn variogram(&self, h: f64) -> f64 {
        (self.sill - self.nugget) * (1.0 - (-h / (self.range / 3.0)).exp()) + self.nugget
    }

    fn c_0(&self) -> Option<f64> {
        Some(self.sill)
    }
}
