// Playmaker: progressive passing, chance creation and pass security.

use crate::error::ScoreError;
use crate::metrics::{DerivedMetric, MetricSpec};
use crate::roles::RoleScorer;
use crate::table::StatTable;
use crate::weights::PlaymakerWeights;

pub const NAME: &str = "playmaker";
pub const SCORE_COLUMN: &str = "playmaker_score";

#[derive(Debug, Clone)]
pub struct Playmaker {
    spec: MetricSpec,
}

impl Playmaker {
    pub fn new(weights: &PlaymakerWeights) -> Result<Self, ScoreError> {
        let spec = MetricSpec::new(
            NAME,
            vec![
                DerivedMetric::per_90("PrgP_90", "PrgP"),
                DerivedMetric::per_90("KP_90", "KP"),
                DerivedMetric::per_90("Ast_90", "Ast"),
            ],
            vec![
                ("PrgP_90", weights.progressive_passes),
                ("KP_90", weights.key_passes),
                ("total_Cmp%", weights.pass_completion),
                ("Ast_90", weights.assists),
            ],
            SCORE_COLUMN,
        )?;
        Ok(Self { spec })
    }
}

impl RoleScorer for Playmaker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score_column(&self) -> &'static str {
        SCORE_COLUMN
    }

    fn score(&self, table: &StatTable) -> Result<StatTable, ScoreError> {
        self.spec.apply(table.clone())
    }
}
