use crate::instance::PortfolioInstance;
use crate::portfolio::Portfolio;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub mod objective;
pub mod sampling;

use self::objective::{evaluate_portfolio, Evaluation, Infeasibility};
use self::sampling::random_allocation;

#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum OptimizationDirection {
    Maximize,
    Minimize,
}

impl OptimizationDirection {
    /// Whether `candidate` beats `incumbent` under this direction.
    pub fn prefers(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            OptimizationDirection::Maximize => candidate > incumbent,
            OptimizationDirection::Minimize => candidate < incumbent,
        }
    }
}

/// What an external solver needs from a problem: a way to score candidates
/// and a way to draw starting points.
pub trait Problem {
    type Solution;

    fn evaluate(&self, solution: &Self::Solution) -> Evaluation;

    fn random_solution_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Solution;

    fn random_solution(&self) -> Self::Solution {
        self.random_solution_with(&mut thread_rng())
    }

    fn direction(&self) -> OptimizationDirection {
        OptimizationDirection::Minimize
    }
}

impl Problem for PortfolioInstance {
    type Solution = Portfolio;

    fn evaluate(&self, solution: &Portfolio) -> Evaluation {
        let evaluation = evaluate_portfolio(self, solution);
        if let Evaluation::Infeasible(reason) = &evaluation {
            debug!(%reason, "Rejected candidate");
        }
        evaluation
    }

    fn random_solution_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Portfolio {
        Portfolio::new(random_allocation(self.stock_count(), rng))
    }
}

impl PortfolioInstance {
    /// Scores a raw candidate mapping such as `{"portfolio": [0.5, 0.5]}`.
    pub fn evaluate_json(&self, candidate: &Value) -> Evaluation {
        match Portfolio::from_json(candidate) {
            Some(portfolio) => self.evaluate(&portfolio),
            None => {
                debug!("Rejected candidate: not a portfolio mapping");
                Evaluation::Infeasible(Infeasibility::Malformed)
            }
        }
    }
}
