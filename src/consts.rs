/// Slack allowed on the budget (sum-to-one) and profit-floor constraints.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Score reported for an infeasible candidate when a plain number is needed.
/// Any feasible risk is far below it, so a minimizer never prefers it.
pub const INFEASIBLE_SCORE: f64 = i64::MAX as f64;

// Non-blank line layout of an instance file
pub const PROFIT_LINE: usize = 0;
pub const STOCK_COUNT_LINE: usize = 1;
pub const COVARIANCE_FIRST_LINE: usize = 3;
