// Passing quality: accuracy, progression and chance creation from the
// passing table, each scaled against the population maximum rather than
// the percentile band.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::ScoreError;
use crate::metrics::{weighted_sum, DerivedMetric};
use crate::normalize::DegenerateMetric;
use crate::roles::RoleScorer;
use crate::table::StatTable;
use crate::weights::{validate_weights, PassingQualityWeights};

pub const NAME: &str = "passing_quality";
pub const SCORE_COLUMN: &str = "passing_quality_score";

/// Completion rates of high-volume passers get this multiplier.
pub const VOLUME_BONUS: f64 = 1.2;
const DECIMALS: f64 = 1000.0;

const PER_90: [DerivedMetric; 4] = [
    DerivedMetric::per_90("passes_per_90", "total_Cmp"),
    DerivedMetric::per_90("prog_passes_per_90", "PrgP"),
    DerivedMetric::per_90("key_passes_per_90", "KP"),
    DerivedMetric::per_90("xA_per_90", "xA"),
];

const COMPONENTS: [&str; 3] = [
    "passing_accuracy_score",
    "pass_progression_score",
    "chance_creation_score",
];

#[derive(Debug, Clone)]
pub struct PassingQuality {
    weights: [f64; 3],
}

impl PassingQuality {
    pub fn new(weights: &PassingQualityWeights) -> Result<Self, ScoreError> {
        validate_weights(
            NAME,
            &[
                ("accuracy", weights.accuracy),
                ("progression", weights.progression),
                ("chance_creation", weights.chance_creation),
            ],
        )?;
        Ok(Self {
            weights: [weights.accuracy, weights.progression, weights.chance_creation],
        })
    }

    fn required_columns() -> Vec<&'static str> {
        let mut cols: Vec<&'static str> = PER_90.iter().flat_map(|d| d.sources()).collect();
        cols.extend(["total_Cmp%", "PrgDist", "PPA"]);
        cols
    }

    fn output_columns() -> Vec<&'static str> {
        let mut cols: Vec<&'static str> = PER_90.iter().map(|d| d.output).collect();
        cols.extend(COMPONENTS);
        cols.push(SCORE_COLUMN);
        cols
    }
}

impl RoleScorer for PassingQuality {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score_column(&self) -> &'static str {
        SCORE_COLUMN
    }

    fn score(&self, table: &StatTable) -> Result<StatTable, ScoreError> {
        for col in Self::required_columns() {
            table.require(NAME, col)?;
        }
        let mut out = table.clone();
        if out.is_empty() {
            for col in Self::output_columns() {
                out.set_column(col, Vec::new())?;
            }
            return Ok(out);
        }

        let mut per_90 = Vec::with_capacity(PER_90.len());
        for d in &PER_90 {
            per_90.push(d.compute(NAME, &out)?);
        }
        let (prog_90, key_90, xa_90) = (&per_90[1], &per_90[2], &per_90[3]);

        let completed = column(&out, "total_Cmp")?;
        let completion = column(&out, "total_Cmp%")?;
        let mid = median(&completed);
        let accuracy: Vec<f64> = completed
            .iter()
            .zip(&completion)
            .map(|(cmp, pct)| {
                let bonus = if *cmp > mid { VOLUME_BONUS } else { 1.0 };
                pct / 100.0 * bonus
            })
            .collect();

        let progression = mean_of(&[
            max_scaled("prog_passes_per_90", prog_90)?,
            max_scaled("PrgDist", &column(&out, "PrgDist")?)?,
        ]);
        let chance_creation = mean_of(&[
            max_scaled("key_passes_per_90", key_90)?,
            max_scaled("xA_per_90", xa_90)?,
            max_scaled("PPA", &column(&out, "PPA")?)?,
        ]);

        let score = weighted_sum(&[
            (accuracy.clone(), self.weights[0]),
            (progression.clone(), self.weights[1]),
            (chance_creation.clone(), self.weights[2]),
        ]);

        for (d, values) in PER_90.iter().zip(per_90) {
            out.set_column(d.output, rounded(values))?;
        }
        for (name, values) in COMPONENTS.iter().zip([accuracy, progression, chance_creation]) {
            out.set_column(name, rounded(values))?;
        }
        out.set_column(SCORE_COLUMN, rounded(score))?;
        debug!(scorer = NAME, rows = out.len(), median_completed = mid, "scored table");

        out.sorted_desc(SCORE_COLUMN)
            .ok_or_else(|| ScoreError::missing(NAME, SCORE_COLUMN))
    }
}

fn column(table: &StatTable, name: &str) -> Result<Vec<f64>, ScoreError> {
    table.column(name).ok_or_else(|| ScoreError::missing(NAME, name))
}

/// Median with the two middle values averaged for even lengths.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Each value over the column maximum, which must be finite and positive.
fn max_scaled(metric: &str, values: &[f64]) -> Result<Vec<f64>, ScoreError> {
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(ScoreError::degenerate(NAME, metric, DegenerateMetric::NonFinite { index }));
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 {
        return Err(ScoreError::degenerate(NAME, metric, DegenerateMetric::NonPositiveMax { max }));
    }
    Ok(values.iter().map(|v| v / max).collect())
}

fn mean_of(columns: &[Vec<f64>]) -> Vec<f64> {
    let share = 1.0 / columns.len() as f64;
    let weighted: Vec<(Vec<f64>, f64)> = columns.iter().map(|c| (c.clone(), share)).collect();
    weighted_sum(&weighted)
}

fn rounded(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|v| (v * DECIMALS).round() / DECIMALS).collect()
}
