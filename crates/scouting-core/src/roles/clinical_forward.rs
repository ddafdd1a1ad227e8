// Clinical forward: finishing efficiency among players with a real shot
// sample.

use tracing::debug;

use crate::error::ScoreError;
use crate::metrics::{DerivedMetric, MetricSpec};
use crate::roles::RoleScorer;
use crate::table::StatTable;
use crate::weights::ClinicalForwardConfig;

pub const NAME: &str = "clinical_forward";
pub const SCORE_COLUMN: &str = "efficiency_score";
const SHOTS: &str = "Sh";

#[derive(Debug, Clone)]
pub struct ClinicalForward {
    min_shots: f64,
    spec: MetricSpec,
}

impl ClinicalForward {
    pub fn new(config: &ClinicalForwardConfig) -> Result<Self, ScoreError> {
        // Below one shot the Gls/Sh divisor can be zero for an ordinary row.
        if !config.min_shots.is_finite() || config.min_shots < 1.0 {
            return Err(ScoreError::weights(
                NAME,
                format!("min_shots must be >= 1, got {}", config.min_shots),
            ));
        }
        let w = &config.weights;
        let spec = MetricSpec::new(
            NAME,
            vec![
                DerivedMetric::per_90("Sh_90", SHOTS),
                DerivedMetric::per_90("Gls_90", "Gls"),
                DerivedMetric::ratio("conversion_rate", "Gls", SHOTS),
                DerivedMetric::difference("xG_difference", "Gls", "xG"),
            ],
            vec![
                ("conversion_rate", w.conversion),
                ("SoT%", w.shot_accuracy),
                ("xG_difference", w.xg_overperformance),
                ("Gls_90", w.goals),
            ],
            SCORE_COLUMN,
        )?;
        Ok(Self {
            min_shots: config.min_shots,
            spec,
        })
    }
}

impl RoleScorer for ClinicalForward {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score_column(&self) -> &'static str {
        SCORE_COLUMN
    }

    /// Rows under the shot threshold are excluded entirely, not scored as
    /// zero.
    fn score(&self, table: &StatTable) -> Result<StatTable, ScoreError> {
        self.spec.check_columns(table)?;
        let shots = table.require(NAME, SHOTS)?;
        let qualified = table.filter(|r| r.values[shots] >= self.min_shots);
        debug!(
            kept = qualified.len(),
            dropped = table.len() - qualified.len(),
            min_shots = self.min_shots,
            "clinical forward shot filter"
        );
        self.spec.apply(qualified)
    }
}
