use super::IsoVariogramModel;

/// `scale * h^exponent + nugget`. Unbounded, usable for variogram analysis only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Power {
    pub scale: f64,
    pub exponent: f64,
    pub nugget: f64,
}

impl IsoVariogramModel for Power {
    const PARAMETER_NAMES: &'static [&'static str] = &["scale", "exponent", "nugget"];

    fn from_params(params: &[f64]) -> Self {
        Self {
            scale: params[0],
            exponent: params[1],
            nugget: params[2],
        }
    }

    fn variogram(&self, h: f64) -> f64 {
        self.scale * h.powf(self.exponent) + self.nugget
    }

    fn c_0(&self) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn power_has_no_sill() {
        let v = Power::from_params(&[2.0, 1.5, 0.5]);
        assert_relative_eq!(v.variogram(4.0), 2.0 * 8.0 + 0.5);
        assert_eq!(v.covariogram(4.0), None);
    }
}
