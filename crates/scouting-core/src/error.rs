// Error taxonomy for the scoring core.

use thiserror::Error;

use crate::normalize::DegenerateMetric;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("{scorer}: required column `{column}` is missing")]
    MissingColumn { scorer: String, column: String },

    #[error("{scorer}: metric `{metric}` cannot be normalized: {source}")]
    DegenerateMetric {
        scorer: String,
        metric: String,
        #[source]
        source: DegenerateMetric,
    },

    #[error("{scorer}: invalid weight configuration: {reason}")]
    InvalidWeightConfig { scorer: String, reason: String },

    /// Duplicate identity keys in a join input. Joining would fan the
    /// duplicates out into a cross product.
    #[error("{table}: player key {key} appears {count} times")]
    JoinFanout {
        table: String,
        key: String,
        count: usize,
    },

    #[error("{scorer}: metric `{metric}` for {player} has non-positive divisor {divisor}")]
    NonPositiveDivisor {
        scorer: String,
        metric: String,
        player: String,
        divisor: f64,
    },

    #[error("row for {player} has {actual} values, table has {expected} columns")]
    RowWidth {
        player: String,
        expected: usize,
        actual: usize,
    },

    #[error("column `{column}` has {actual} values, table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl ScoreError {
    pub(crate) fn missing(scorer: &str, column: &str) -> Self {
        ScoreError::MissingColumn {
            scorer: scorer.to_string(),
            column: column.to_string(),
        }
    }

    pub(crate) fn degenerate(scorer: &str, metric: &str, source: DegenerateMetric) -> Self {
        ScoreError::DegenerateMetric {
            scorer: scorer.to_string(),
            metric: metric.to_string(),
            source,
        }
    }

    pub(crate) fn weights(scorer: &str, reason: impl Into<String>) -> Self {
        ScoreError::InvalidWeightConfig {
            scorer: scorer.to_string(),
            reason: reason.into(),
        }
    }
}
