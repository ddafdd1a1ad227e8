// Pressing midfielder: defensive volume high up the pitch, midfielders only.

use tracing::debug;

use crate::error::ScoreError;
use crate::metrics::{DerivedMetric, MetricSpec};
use crate::roles::RoleScorer;
use crate::table::StatTable;
use crate::weights::PressingConfig;

pub const NAME: &str = "pressing_midfielder";
pub const SCORE_COLUMN: &str = "pressing_score";

#[derive(Debug, Clone)]
pub struct PressingMidfielder {
    position_tag: String,
    spec: MetricSpec,
}

impl PressingMidfielder {
    pub fn new(config: &PressingConfig) -> Result<Self, ScoreError> {
        let tag = config.position_tag.trim();
        if tag.is_empty() {
            return Err(ScoreError::weights(NAME, "position_tag must not be empty"));
        }
        let w = &config.weights;
        let spec = MetricSpec::new(
            NAME,
            vec![
                DerivedMetric::per_90("Tkl_90", "Tkl"),
                DerivedMetric::per_90("Int_90", "Int"),
                DerivedMetric::per_90("Att3rd_90", "Att 3rd"),
            ],
            vec![
                ("Tkl_90", w.tackles),
                ("Int_90", w.interceptions),
                ("Tkl%", w.tackle_success),
                ("Att3rd_90", w.attacking_third),
            ],
            SCORE_COLUMN,
        )?;
        Ok(Self {
            position_tag: tag.to_string(),
            spec,
        })
    }
}

impl RoleScorer for PressingMidfielder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score_column(&self) -> &'static str {
        SCORE_COLUMN
    }

    /// Only rows whose position contains the tag are scored; "MF,FW" counts
    /// as a midfielder.
    fn score(&self, table: &StatTable) -> Result<StatTable, ScoreError> {
        self.spec.check_columns(table)?;
        let midfielders = table.filter(|r| r.identity.pos.contains(self.position_tag.as_str()));
        debug!(
            kept = midfielders.len(),
            dropped = table.len() - midfielders.len(),
            tag = %self.position_tag,
            "pressing position filter"
        );
        self.spec.apply(midfielders)
    }
}
