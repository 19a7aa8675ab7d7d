use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A candidate allocation: the share of the budget put in each stock.
///
/// Serializes as `{"portfolio": [..]}`, the mapping solvers exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(rename = "portfolio")]
    pub weights: Vec<f64>,
}

impl Portfolio {
    pub fn new(weights: Vec<f64>) -> Self {
        Portfolio { weights }
    }

    /// Reads a candidate out of a raw JSON mapping. Returns `None` when the
    /// value is not an object, lacks the `portfolio` key, or holds anything
    /// other than a list of numbers under it. Other keys are ignored.
    pub fn from_json(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Portfolio::deserialize(value).ok()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }
}
