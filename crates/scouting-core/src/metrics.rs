// Metric derivation and the weighted-composite template shared by the role
// scorers.

use tracing::debug;

use crate::error::ScoreError;
use crate::normalize::normalize;
use crate::table::StatTable;
use crate::weights::validate_weights;

/// Name of the normalized copy of `metric`.
pub fn norm_column(metric: &str) -> String {
    format!("{metric}_norm")
}

// ---------------------------------------------------------------------------
// Derived metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Raw count divided by the row's `90s`.
    Per90 { source: &'static str },
    Ratio {
        numerator: &'static str,
        denominator: &'static str,
    },
    Difference {
        minuend: &'static str,
        subtrahend: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetric {
    pub output: &'static str,
    pub rule: Rule,
}

impl DerivedMetric {
    pub const fn per_90(output: &'static str, source: &'static str) -> Self {
        Self {
            output,
            rule: Rule::Per90 { source },
        }
    }

    pub const fn ratio(output: &'static str, numerator: &'static str, denominator: &'static str) -> Self {
        Self {
            output,
            rule: Rule::Ratio {
                numerator,
                denominator,
            },
        }
    }

    pub const fn difference(output: &'static str, minuend: &'static str, subtrahend: &'static str) -> Self {
        Self {
            output,
            rule: Rule::Difference {
                minuend,
                subtrahend,
            },
        }
    }

    /// Raw columns this metric reads.
    pub fn sources(&self) -> Vec<&'static str> {
        match self.rule {
            Rule::Per90 { source } => vec![source],
            Rule::Ratio {
                numerator,
                denominator,
            } => vec![numerator, denominator],
            Rule::Difference {
                minuend,
                subtrahend,
            } => vec![minuend, subtrahend],
        }
    }

    /// One value per row of `table`. Divisors must be strictly positive;
    /// a zero or negative divisor is reported instead of producing NaN/Inf.
    pub fn compute(&self, scorer: &str, table: &StatTable) -> Result<Vec<f64>, ScoreError> {
        match self.rule {
            Rule::Per90 { source } => {
                let idx = table.require(scorer, source)?;
                table
                    .rows()
                    .iter()
                    .map(|r| {
                        divide(
                            scorer,
                            self.output,
                            &r.identity.player,
                            r.values[idx],
                            r.identity.nineties,
                        )
                    })
                    .collect()
            }
            Rule::Ratio {
                numerator,
                denominator,
            } => {
                let n = table.require(scorer, numerator)?;
                let d = table.require(scorer, denominator)?;
                table
                    .rows()
                    .iter()
                    .map(|r| divide(scorer, self.output, &r.identity.player, r.values[n], r.values[d]))
                    .collect()
            }
            Rule::Difference {
                minuend,
                subtrahend,
            } => {
                let a = table.require(scorer, minuend)?;
                let b = table.require(scorer, subtrahend)?;
                Ok(table.rows().iter().map(|r| r.values[a] - r.values[b]).collect())
            }
        }
    }
}

fn divide(scorer: &str, metric: &str, player: &str, numerator: f64, divisor: f64) -> Result<f64, ScoreError> {
    if !(divisor.is_finite() && divisor > 0.0) {
        return Err(ScoreError::NonPositiveDivisor {
            scorer: scorer.to_string(),
            metric: metric.to_string(),
            player: player.to_string(),
            divisor,
        });
    }
    Ok(numerator / divisor)
}

/// Elementwise `Σ weight · column`, summed in the order given.
pub fn weighted_sum(columns: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let len = columns.first().map(|(c, _)| c.len()).unwrap_or(0);
    (0..len)
        .map(|i| columns.iter().map(|(c, w)| c[i] * w).sum())
        .collect()
}

// ---------------------------------------------------------------------------
// Composite template
// ---------------------------------------------------------------------------

/// Derived metrics, normalized inputs with their weights, and the score
/// column for one scorer.
#[derive(Debug, Clone)]
pub struct MetricSpec {
    pub scorer: &'static str,
    pub derived: Vec<DerivedMetric>,
    /// Normalized input column and its weight, in summation order.
    pub weighted: Vec<(&'static str, f64)>,
    pub score_column: &'static str,
}

impl MetricSpec {
    /// Build a spec, rejecting its weights if they are not a valid
    /// convex combination.
    pub fn new(
        scorer: &'static str,
        derived: Vec<DerivedMetric>,
        weighted: Vec<(&'static str, f64)>,
        score_column: &'static str,
    ) -> Result<Self, ScoreError> {
        validate_weights(scorer, &weighted)?;
        Ok(Self {
            scorer,
            derived,
            weighted,
            score_column,
        })
    }

    /// Raw columns the input table must provide, first occurrence order.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut cols: Vec<&'static str> = Vec::new();
        for d in &self.derived {
            for src in d.sources() {
                if !cols.contains(&src) {
                    cols.push(src);
                }
            }
        }
        for (metric, _) in &self.weighted {
            let is_derived = self.derived.iter().any(|d| d.output == *metric);
            if !is_derived && !cols.contains(metric) {
                cols.push(*metric);
            }
        }
        cols
    }

    /// Columns appended to the input by `apply`, in append order.
    pub fn output_columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = self.derived.iter().map(|d| d.output.to_string()).collect();
        cols.extend(self.weighted.iter().map(|(m, _)| norm_column(m)));
        cols.push(self.score_column.to_string());
        cols
    }

    /// Fail on the first missing raw column, before computing anything.
    pub fn check_columns(&self, table: &StatTable) -> Result<(), ScoreError> {
        for col in self.required_columns() {
            table.require(self.scorer, col)?;
        }
        Ok(())
    }

    /// Derive, normalize, weight and sort. `table` is the scorer's own copy.
    ///
    /// An empty table comes back empty with every output column present.
    pub fn apply(&self, table: StatTable) -> Result<StatTable, ScoreError> {
        self.check_columns(&table)?;
        let mut out = table;

        if out.is_empty() {
            for col in self.output_columns() {
                out.set_column(&col, Vec::new())?;
            }
            debug!(scorer = self.scorer, "no rows to score");
            return Ok(out);
        }

        for d in &self.derived {
            let values = d.compute(self.scorer, &out)?;
            out.set_column(d.output, values)?;
        }

        let mut normalized: Vec<(Vec<f64>, f64)> = Vec::with_capacity(self.weighted.len());
        for (metric, weight) in &self.weighted {
            let raw = out
                .column(metric)
                .ok_or_else(|| ScoreError::missing(self.scorer, metric))?;
            let scaled = normalize(&raw).map_err(|e| ScoreError::degenerate(self.scorer, metric, e))?;
            out.set_column(&norm_column(metric), scaled.clone())?;
            normalized.push((scaled, *weight));
        }

        out.set_column(self.score_column, weighted_sum(&normalized))?;
        debug!(scorer = self.scorer, rows = out.len(), "scored table");

        out.sorted_desc(self.score_column)
            .ok_or_else(|| ScoreError::missing(self.scorer, self.score_column))
    }
}
