//! Output transformation from margin to prediction.

/// Maps the forest's raw margin to the objective's output space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputTransform {
    /// output = margin. Squared error, absolute error, quantile and friends.
    #[default]
    Identity,
    /// output = 1 / (1 + exp(-margin)).
    Sigmoid,
    /// output = exp(margin). Log-link objectives.
    Exp,
}

impl OutputTransform {
    /// Transform implied by an XGBoost objective name.
    pub fn from_objective(objective: &str) -> Self {
        match objective {
            "binary:logistic" | "reg:logistic" => OutputTransform::Sigmoid,
            "count:poisson" | "reg:gamma" | "reg:tweedie" | "survival:cox" | "survival:aft" => {
                OutputTransform::Exp
            }
            _ => OutputTransform::Identity,
        }
    }

    #[inline]
    pub fn apply(&self, margin: f64) -> f64 {
        match self {
            OutputTransform::Identity => margin,
            OutputTransform::Sigmoid => sigmoid(margin),
            OutputTransform::Exp => margin.exp(),
        }
    }
}

/// Numerically stable sigmoid.
#[inline]
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
