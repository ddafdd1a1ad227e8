// Role scorers: one archetype each, all built on the shared metric template.

pub mod clinical_forward;
pub mod passing_quality;
pub mod playmaker;
pub mod pressing;
pub mod progressive;

use crate::composer::CompleteMidfielder;
use crate::error::ScoreError;
use crate::table::StatTable;
use crate::weights::ScoringConfig;

pub use clinical_forward::ClinicalForward;
pub use passing_quality::PassingQuality;
pub use playmaker::Playmaker;
pub use pressing::PressingMidfielder;
pub use progressive::ProgressiveMidfielder;

/// A stateless scorer over one stat table.
///
/// Implementations never mutate the input; the result is a new table with
/// the derived, normalized and score columns appended, sorted descending by
/// the score with ties in input order.
pub trait RoleScorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score_column(&self) -> &'static str;

    fn score(&self, table: &StatTable) -> Result<StatTable, ScoreError>;
}

/// Every scorer of a run, built and validated together from one config.
#[derive(Debug, Clone)]
pub struct RoleScorers {
    pub playmaker: Playmaker,
    pub clinical_forward: ClinicalForward,
    pub progressive_midfielder: ProgressiveMidfielder,
    pub pressing_midfielder: PressingMidfielder,
    pub passing_quality: PassingQuality,
    pub complete_midfielder: CompleteMidfielder,
}

impl RoleScorers {
    pub fn from_config(config: &ScoringConfig) -> Result<Self, ScoreError> {
        Ok(Self {
            playmaker: Playmaker::new(&config.playmaker)?,
            clinical_forward: ClinicalForward::new(&config.clinical_forward)?,
            progressive_midfielder: ProgressiveMidfielder::new(&config.progressive_midfielder)?,
            pressing_midfielder: PressingMidfielder::new(&config.pressing_midfielder)?,
            passing_quality: PassingQuality::new(&config.passing_quality)?,
            complete_midfielder: CompleteMidfielder::new(&config.complete_midfielder)?,
        })
    }
}
