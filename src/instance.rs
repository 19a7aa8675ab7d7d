use crate::config::ProblemConfig;
use crate::consts::{COVARIANCE_FIRST_LINE, PROFIT_LINE, STOCK_COUNT_LINE};
use nalgebra::{DMatrix, DVector};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("Failed to read instance file `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Instance is truncated: needed at least {needed} non-blank lines, found {found}")]
    MissingLines { needed: usize, found: usize },
    #[error("Line {line}: `{token}` is not a valid number")]
    MalformedNumber { line: usize, token: String },
    #[error("Line {line}: expected {expected} values, found {found}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// A loaded portfolio problem: the profit floor, the covariance (risk) matrix
/// and the expected return of each stock.
///
/// Never mutated after loading; evaluations only borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioInstance {
    expected_profit: f64,
    stock_count: usize,
    covariance: DMatrix<f64>,
    returns: DVector<f64>,
}

impl PortfolioInstance {
    /// Loads an instance file. Relative paths are resolved against
    /// `config.instance_dir`.
    pub fn load(path: impl AsRef<Path>, config: &ProblemConfig) -> Result<Self, InstanceError> {
        let path = config.resolve_instance_path(path.as_ref());
        let contents = fs::read_to_string(&path).map_err(|source| InstanceError::Io {
            path: path.clone(),
            source,
        })?;
        let instance: PortfolioInstance = contents.parse()?;
        debug!(
            path = %path.display(),
            stocks = instance.stock_count,
            expected_profit = instance.expected_profit,
            "Loaded portfolio instance"
        );
        Ok(instance)
    }

    pub fn expected_profit(&self) -> f64 {
        self.expected_profit
    }

    pub fn stock_count(&self) -> usize {
        self.stock_count
    }

    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    pub fn returns(&self) -> &DVector<f64> {
        &self.returns
    }
}

impl FromStr for PortfolioInstance {
    type Err = InstanceError;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        // indexing is done on non-blank lines only
        let lines: Vec<&str> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let header_lines = STOCK_COUNT_LINE + 1;
        let expected_profit: f64 = parse_leading(&lines, PROFIT_LINE, header_lines)?;
        let stock_count: usize = parse_leading(&lines, STOCK_COUNT_LINE, header_lines)?;

        // the line between the count and the matrix is a header and is never read
        let returns_line = COVARIANCE_FIRST_LINE.saturating_add(stock_count);
        let needed = returns_line.saturating_add(1);
        if lines.len() < needed {
            return Err(InstanceError::MissingLines {
                needed,
                found: lines.len(),
            });
        }

        // rows are parsed before anything is sized by the count, a short row
        // stops the load as soon as it is read
        let rows = (0..stock_count)
            .map(|row| parse_row(&lines, COVARIANCE_FIRST_LINE + row, stock_count, needed))
            .collect::<Result<Vec<Vec<f64>>, _>>()?;
        let returns = parse_row(&lines, returns_line, stock_count, needed)?;

        Ok(PortfolioInstance {
            expected_profit,
            stock_count,
            covariance: DMatrix::from_row_iterator(
                stock_count,
                stock_count,
                rows.into_iter().flatten(),
            ),
            returns: DVector::from_vec(returns),
        })
    }
}

fn line_at<'a>(
    lines: &[&'a str],
    index: usize,
    needed: usize,
) -> Result<&'a str, InstanceError> {
    lines.get(index).copied().ok_or(InstanceError::MissingLines {
        needed,
        found: lines.len(),
    })
}

fn parse_token<T: FromStr>(token: &str, index: usize) -> Result<T, InstanceError> {
    token.parse().map_err(|_| InstanceError::MalformedNumber {
        line: index + 1,
        token: token.to_string(),
    })
}

/// Parses the first token of a line; anything after it is ignored.
fn parse_leading<T: FromStr>(
    lines: &[&str],
    index: usize,
    needed: usize,
) -> Result<T, InstanceError> {
    let token = line_at(lines, index, needed)?
        .split_whitespace()
        .next()
        .unwrap_or_default();
    parse_token(token, index)
}

fn parse_row(
    lines: &[&str],
    index: usize,
    width: usize,
    needed: usize,
) -> Result<Vec<f64>, InstanceError> {
    let row = line_at(lines, index, needed)?
        .split_whitespace()
        .map(|token| parse_token(token, index))
        .collect::<Result<Vec<f64>, _>>()?;

    if row.len() != width {
        return Err(InstanceError::RowLength {
            line: index + 1,
            expected: width,
            found: row.len(),
        });
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_STOCKS: &str = "0.05\n2\ncovariance\n1 0\n0 1\n0.1 0.2\n";

    #[test]
    fn test_parse_two_stock_instance() {
        let instance: PortfolioInstance = TWO_STOCKS.parse().unwrap();
        assert_eq!(instance.expected_profit(), 0.05);
        assert_eq!(instance.stock_count(), 2);
        assert_eq!(instance.covariance(), &DMatrix::identity(2, 2));
        assert_eq!(instance.returns().as_slice(), &[0.1, 0.2]);
    }

    #[test]
    fn test_blank_lines_and_padding_are_ignored() {
        let padded = "\n  0.05 percent \n\n\t2 stocks\n\n-- sigma --\n 1   0.3\n\n0.3 2\n   \n0.1 0.2\n\n";
        let instance: PortfolioInstance = padded.parse().unwrap();
        assert_eq!(instance.expected_profit(), 0.05);
        assert_eq!(instance.stock_count(), 2);
        assert_eq!(instance.covariance()[(0, 1)], 0.3);
        assert_eq!(instance.covariance()[(1, 0)], 0.3);
        assert_eq!(instance.covariance()[(1, 1)], 2.0);
        assert_eq!(instance.returns().as_slice(), &[0.1, 0.2]);
    }

    #[test]
    fn test_matrix_is_stored_row_major_as_read() {
        let text = "0\n2\nh\n1 2\n3 4\n0 0\n";
        let instance: PortfolioInstance = text.parse().unwrap();
        assert_eq!(instance.covariance()[(0, 1)], 2.0);
        assert_eq!(instance.covariance()[(1, 0)], 3.0);
    }

    #[test]
    fn test_trailing_lines_are_ignored() {
        let text = format!("{TWO_STOCKS}this is not a number\n");
        assert!(text.parse::<PortfolioInstance>().is_ok());
    }

    #[test]
    fn test_missing_returns_line_fails() {
        let truncated = "0.05\n2\ncovariance\n1 0\n0 1\n";
        match truncated.parse::<PortfolioInstance>() {
            Err(InstanceError::MissingLines { needed, found }) => {
                assert_eq!(needed, 6);
                assert_eq!(found, 5);
            }
            other => panic!("Expected MissingLines, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_stock_count_is_truncation_not_allocation() {
        let text = format!("0.05\n{}\nh\n1 0\n0 1\n0.1 0.2\n", usize::MAX);
        assert!(matches!(
            text.parse::<PortfolioInstance>(),
            Err(InstanceError::MissingLines { found: 6, .. })
        ));
    }

    #[test]
    fn test_huge_stock_count_with_one_value_per_line_is_row_error() {
        // enough lines to pass the line count, but every row is one number wide
        let stock_count = 100_000;
        let mut text = format!("0\n{}\nh\n", stock_count);
        text.push_str(&"1\n".repeat(stock_count + 1));
        assert!(matches!(
            text.parse::<PortfolioInstance>(),
            Err(InstanceError::RowLength {
                line: 4,
                expected: 100_000,
                found: 1
            })
        ));
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(
            "".parse::<PortfolioInstance>(),
            Err(InstanceError::MissingLines { needed: 2, found: 0 })
        ));
    }

    #[test]
    fn test_malformed_tokens_report_line() {
        let bad_profit = "abc\n2\nh\n1 0\n0 1\n0.1 0.2\n";
        assert!(matches!(
            bad_profit.parse::<PortfolioInstance>(),
            Err(InstanceError::MalformedNumber { line: 1, .. })
        ));

        let fractional_count = "0.05\n2.5\nh\n1 0\n0 1\n0.1 0.2\n";
        assert!(matches!(
            fractional_count.parse::<PortfolioInstance>(),
            Err(InstanceError::MalformedNumber { line: 2, .. })
        ));

        let bad_cell = "0.05\n2\nh\n1 x\n0 1\n0.1 0.2\n";
        match bad_cell.parse::<PortfolioInstance>() {
            Err(InstanceError::MalformedNumber { line, token }) => {
                assert_eq!(line, 4);
                assert_eq!(token, "x");
            }
            other => panic!("Expected MalformedNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_row_length_mismatch_fails() {
        let short_row = "0.05\n2\nh\n1 0\n0\n0.1 0.2\n";
        assert!(matches!(
            short_row.parse::<PortfolioInstance>(),
            Err(InstanceError::RowLength {
                line: 5,
                expected: 2,
                found: 1
            })
        ));

        let long_returns = "0.05\n2\nh\n1 0\n0 1\n0.1 0.2 0.3\n";
        assert!(matches!(
            long_returns.parse::<PortfolioInstance>(),
            Err(InstanceError::RowLength {
                line: 6,
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_header_line_content_is_not_validated() {
        // a shifted file with the right line count still loads
        let shifted = "0.05\n2\n1 0\n0 1\n0.1 0.2\n9 9\n";
        let instance: PortfolioInstance = shifted.parse().unwrap();
        assert_eq!(instance.covariance()[(0, 0)], 0.0);
        assert_eq!(instance.returns().as_slice(), &[9.0, 9.0]);
    }

    #[test]
    fn test_zero_stock_instance_cannot_be_expressed() {
        // the returns line must exist and a non-blank line always holds a token
        assert!(matches!(
            "0\n0\nheader\n".parse::<PortfolioInstance>(),
            Err(InstanceError::MissingLines { needed: 4, found: 3 })
        ));
        assert!(matches!(
            "0\n0\nheader\n0\n".parse::<PortfolioInstance>(),
            Err(InstanceError::RowLength {
                line: 4,
                expected: 0,
                found: 1
            })
        ));
    }

    #[test]
    fn test_load_absolute_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_STOCKS.as_bytes()).unwrap();

        let instance = PortfolioInstance::load(file.path(), &ProblemConfig::default()).unwrap();
        assert_eq!(instance.stock_count(), 2);
    }

    #[test]
    fn test_load_relative_to_instance_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("small.txt"), TWO_STOCKS).unwrap();
        let config = ProblemConfig {
            instance_dir: dir.path().to_path_buf(),
            ..ProblemConfig::default()
        };

        let instance = PortfolioInstance::load("small.txt", &config).unwrap();
        assert_eq!(instance.expected_profit(), 0.05);
    }

    #[test]
    fn test_load_bundled_instance_from_crate_root() {
        let instance =
            PortfolioInstance::load("data/four_stocks.txt", &ProblemConfig::default()).unwrap();
        assert_eq!(instance.stock_count(), 4);
        assert_eq!(instance.covariance().nrows(), 4);
        assert_eq!(instance.returns().len(), 4);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProblemConfig {
            instance_dir: dir.path().to_path_buf(),
            ..ProblemConfig::default()
        };
        match PortfolioInstance::load("nope.txt", &config) {
            Err(InstanceError::Io { path, .. }) => assert_eq!(path, dir.path().join("nope.txt")),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
