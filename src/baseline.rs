use crate::instance::PortfolioInstance;
use crate::portfolio::Portfolio;
use crate::problem::Problem;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary of a batch of random candidates scored against one instance.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BaselineReport {
    pub samples: usize,
    pub feasible: usize,
    /// Lowest risk among feasible draws.
    pub best_risk: Option<f64>,
    pub best_portfolio: Option<Portfolio>,
    pub mean_risk: Option<f64>,
    /// Sample standard deviation; needs at least two feasible draws.
    pub risk_std_dev: Option<f64>,
}

impl BaselineReport {
    pub fn feasible_ratio(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.feasible as f64 / self.samples as f64
    }
}

/// Draws `samples` random solutions and records how the feasible ones score.
pub fn sample_baseline<R: Rng + ?Sized>(
    instance: &PortfolioInstance,
    samples: usize,
    rng: &mut R,
) -> BaselineReport {
    let mut risks = Vec::with_capacity(samples);
    let mut best: Option<(f64, Portfolio)> = None;
    let direction = instance.direction();

    for _ in 0..samples {
        let candidate = instance.random_solution_with(rng);
        if let Some(risk) = instance.evaluate(&candidate).risk() {
            risks.push(risk);
            if best
                .as_ref()
                .map_or(true, |(best_risk, _)| direction.prefers(risk, *best_risk))
            {
                best = Some((risk, candidate));
            }
        }
    }

    let mean_risk = (!risks.is_empty()).then(|| risks.iter().mean());
    let risk_std_dev = (risks.len() > 1).then(|| risks.iter().std_dev());
    let (best_risk, best_portfolio) = best.unzip();

    BaselineReport {
        samples,
        feasible: risks.len(),
        best_risk,
        best_portfolio,
        mean_risk,
        risk_std_dev,
    }
}
