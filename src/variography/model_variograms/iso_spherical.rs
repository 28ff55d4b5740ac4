use super::IsoVariogramModel;

#[derive(Debug, Clone, Default, Copy)]
pub struct IsoSpherical {
    pub sill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl IsoSpherical {
    pub fn new(sill: f64, range: f64, nugget: f64) -> Self {
        Self {
            sill,
            range,
            nugget,
        }
    }
}

impl IsoVariogramModel for IsoSpherical {
    const PARAMETER_NAMES: &'static [&'static str] = &["sill", "range", "nugget"];

    fn from_params(params: &[f64]) -> Self {
        Self::new(params[0], params[1], params[2])
    }

    fn variogram(&self, h: f64) -> f64 {
        if h <= self.range {
            let r = h / self.range;
            return (self.sill - self.nugget) * (1.5 * r - 0.5 * r.powi(3)) + self.nugget;
        }
        self.sill
    }

    fn c_0(&self) -> Option<f64> {
        Some(self.sill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reaches_sill_at_range() {
        let v = IsoSpherical::new(2.0, 1.5, 0.25);
        assert_relative_eq!(v.variogram(0.0), 0.25);
        assert_relative_eq!(v.variogram(1.5), 2.0);
        assert_relative_eq!(v.variogram(10.0), 2.0);
        assert_relative_eq!(v.variogram(0.75), 1.75 * (0.75 - 0.0625) + 0.25);
        assert_relative_eq!(v.covariogram(10.0).unwrap(), 0.0);
    }
}
