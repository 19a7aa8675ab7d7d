use crate::consts::{FEASIBILITY_TOLERANCE, INFEASIBLE_SCORE};
use crate::instance::PortfolioInstance;
use crate::portfolio::Portfolio;
use itertools::{iproduct, izip};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a candidate was rejected.
#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Infeasibility {
    /// Not a mapping holding a numeric `portfolio` list.
    Malformed,
    WrongLength { expected: usize, found: usize },
    OutOfBounds { index: usize, weight: f64 },
    BudgetNotSpent { total: f64 },
    ProfitBelowFloor { profit: f64, floor: f64 },
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Infeasibility::Malformed => write!(f, "candidate is not a portfolio mapping"),
            Infeasibility::WrongLength { expected, found } => {
                write!(f, "expected {expected} weights, got {found}")
            }
            Infeasibility::OutOfBounds { index, weight } => {
                write!(f, "weight {weight} at index {index} is outside [0, 1]")
            }
            Infeasibility::BudgetNotSpent { total } => {
                write!(f, "weights sum to {total}, not 1")
            }
            Infeasibility::ProfitBelowFloor { profit, floor } => {
                write!(f, "profit {profit} is below the expected {floor}")
            }
        }
    }
}

/// Outcome of scoring a candidate. Lower risk is better.
#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Evaluation {
    Feasible(f64),
    Infeasible(Infeasibility),
}

impl Evaluation {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Evaluation::Feasible(_))
    }

    pub fn risk(&self) -> Option<f64> {
        match self {
            Evaluation::Feasible(risk) => Some(*risk),
            Evaluation::Infeasible(_) => None,
        }
    }

    /// Flattens the outcome to a number, mapping infeasible candidates to
    /// `INFEASIBLE_SCORE`.
    pub fn score(&self) -> f64 {
        self.risk().unwrap_or(INFEASIBLE_SCORE)
    }
}

/// Weighted return of an allocation, summed in stock order.
pub fn portfolio_profit(weights: &[f64], returns: &DVector<f64>) -> f64 {
    izip!(weights, returns.iter())
        .map(|(weight, expected_return)| weight * expected_return)
        .sum()
}

/// Quadratic risk `sum_s sum_t w_s * w_t * sigma[s][t]` over the full matrix.
pub fn portfolio_risk(weights: &[f64], covariance: &DMatrix<f64>) -> f64 {
    let n = weights.len();
    iproduct!(0..n, 0..n)
        .map(|(s, t)| weights[s] * weights[t] * covariance[(s, t)])
        .sum()
}

/// Checks the constraints in order (shape, bounds, budget, profit floor) and
/// returns the risk of the first candidate that passes them all.
pub fn evaluate_portfolio(instance: &PortfolioInstance, portfolio: &Portfolio) -> Evaluation {
    let weights = portfolio.weights();
    let stock_count = instance.stock_count();

    if weights.len() != stock_count {
        return Evaluation::Infeasible(Infeasibility::WrongLength {
            expected: stock_count,
            found: weights.len(),
        });
    }

    // NaN fails the range check as well
    if let Some((index, &weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, weight)| !(0.0..=1.0).contains(*weight))
    {
        return Evaluation::Infeasible(Infeasibility::OutOfBounds { index, weight });
    }

    let total = portfolio.total();
    if (total - 1.0).abs() > FEASIBILITY_TOLERANCE {
        return Evaluation::Infeasible(Infeasibility::BudgetNotSpent { total });
    }

    let profit = portfolio_profit(weights, instance.returns());
    let floor = instance.expected_profit();
    if profit < floor - FEASIBILITY_TOLERANCE {
        return Evaluation::Infeasible(Infeasibility::ProfitBelowFloor { profit, floor });
    }

    Evaluation::Feasible(portfolio_risk(weights, instance.covariance()))
}
