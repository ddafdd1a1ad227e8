// Library root: the scoring core. Tables in, scored tables out; no I/O.

pub mod composer;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod roles;
pub mod table;
pub mod weights;

pub use composer::CompleteMidfielder;
pub use error::ScoreError;
pub use normalize::{normalize, DegenerateMetric};
pub use roles::{RoleScorer, RoleScorers};
pub use table::{PlayerIdentity, PlayerKey, StatRecord, StatTable};
pub use weights::ScoringConfig;
