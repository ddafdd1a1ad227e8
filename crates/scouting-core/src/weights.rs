// Weight and threshold configuration for every scorer.
//
// Defaults are the fixed business weights. Each set is checked once, when a
// scorer is built from it, so a bad set never reaches scoring.

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::roles::RoleScorers;

/// Allowed distance between a weight sum and 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Reject a weight set that is empty, holds a negative or non-finite weight,
/// or does not sum to 1.0.
pub fn validate_weights(scorer: &str, weights: &[(&str, f64)]) -> Result<(), ScoreError> {
    if weights.is_empty() {
        return Err(ScoreError::weights(scorer, "no weights configured"));
    }
    for (name, val) in weights {
        if !val.is_finite() {
            return Err(ScoreError::weights(scorer, format!("{name} must be finite, got {val}")));
        }
        if *val < 0.0 {
            return Err(ScoreError::weights(scorer, format!("{name} must be >= 0, got {val}")));
        }
    }
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ScoreError::weights(scorer, format!("weights sum to {sum}, expected 1.0")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Role weights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaymakerWeights {
    pub progressive_passes: f64,
    pub key_passes: f64,
    pub pass_completion: f64,
    pub assists: f64,
}

impl Default for PlaymakerWeights {
    fn default() -> Self {
        Self {
            progressive_passes: 0.35,
            key_passes: 0.30,
            pass_completion: 0.20,
            assists: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinisherWeights {
    pub conversion: f64,
    pub shot_accuracy: f64,
    pub xg_overperformance: f64,
    pub goals: f64,
}

impl Default for FinisherWeights {
    fn default() -> Self {
        Self {
            conversion: 0.30,
            shot_accuracy: 0.25,
            xg_overperformance: 0.25,
            goals: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressorWeights {
    pub progressive_distance: f64,
    pub progressive_carries: f64,
    pub final_third_entries: f64,
    pub progressive_receptions: f64,
}

impl Default for ProgressorWeights {
    fn default() -> Self {
        Self {
            progressive_distance: 0.35,
            progressive_carries: 0.30,
            final_third_entries: 0.20,
            progressive_receptions: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresserWeights {
    pub tackles: f64,
    pub interceptions: f64,
    pub tackle_success: f64,
    pub attacking_third: f64,
}

impl Default for PresserWeights {
    fn default() -> Self {
        Self {
            tackles: 0.35,
            interceptions: 0.30,
            tackle_success: 0.20,
            attacking_third: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompleteMidfielderWeights {
    pub progression: f64,
    pub pressing: f64,
    pub playmaking: f64,
}

impl Default for CompleteMidfielderWeights {
    fn default() -> Self {
        Self {
            progression: 0.40,
            pressing: 0.30,
            playmaking: 0.30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassingQualityWeights {
    pub accuracy: f64,
    pub progression: f64,
    pub chance_creation: f64,
}

impl Default for PassingQualityWeights {
    fn default() -> Self {
        Self {
            accuracy: 0.30,
            progression: 0.30,
            chance_creation: 0.40,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-scorer configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalForwardConfig {
    /// Rows with fewer shots are dropped before scoring.
    pub min_shots: f64,
    pub weights: FinisherWeights,
}

impl Default for ClinicalForwardConfig {
    fn default() -> Self {
        Self {
            min_shots: 20.0,
            weights: FinisherWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressingConfig {
    /// Substring a row's position must contain, so "MF,FW" matches "MF".
    pub position_tag: String,
    pub weights: PresserWeights,
}

impl Default for PressingConfig {
    fn default() -> Self {
        Self {
            position_tag: "MF".into(),
            weights: PresserWeights::default(),
        }
    }
}

/// Everything the scorers and the composer need, in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub playmaker: PlaymakerWeights,
    pub clinical_forward: ClinicalForwardConfig,
    pub progressive_midfielder: ProgressorWeights,
    pub pressing_midfielder: PressingConfig,
    pub complete_midfielder: CompleteMidfielderWeights,
    pub passing_quality: PassingQualityWeights,
}

impl ScoringConfig {
    /// Check every weight set and threshold by building the scorers once.
    pub fn validate(&self) -> Result<(), ScoreError> {
        RoleScorers::from_config(self).map(|_| ())
    }
}
