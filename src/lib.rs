// Modules
pub mod baseline;
pub mod config;
pub mod consts;
pub mod instance;
pub mod portfolio;
pub mod problem;

pub use crate::instance::{InstanceError, PortfolioInstance};
pub use crate::portfolio::Portfolio;
pub use crate::problem::objective::{Evaluation, Infeasibility};
pub use crate::problem::{OptimizationDirection, Problem};
