// Complete midfielder: joins the progressive, pressing and playmaker results
// on the player key and blends their scores.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::ScoreError;
use crate::metrics::{norm_column, weighted_sum};
use crate::normalize::normalize;
use crate::roles::{playmaker, pressing, progressive};
use crate::table::{PlayerKey, StatTable};
use crate::weights::{validate_weights, CompleteMidfielderWeights};

pub const NAME: &str = "complete_midfielder";
pub const SCORE_COLUMN: &str = "complete_midfielder_score";

/// The three joined score columns, in output order.
const INPUTS: [&str; 3] = [
    progressive::SCORE_COLUMN,
    pressing::SCORE_COLUMN,
    playmaker::SCORE_COLUMN,
];

#[derive(Debug, Clone)]
pub struct CompleteMidfielder {
    weights: [f64; 3],
}

impl CompleteMidfielder {
    pub fn new(weights: &CompleteMidfielderWeights) -> Result<Self, ScoreError> {
        validate_weights(
            NAME,
            &[
                ("progression", weights.progression),
                ("pressing", weights.pressing),
                ("playmaking", weights.playmaking),
            ],
        )?;
        Ok(Self {
            weights: [weights.progression, weights.pressing, weights.playmaking],
        })
    }

    pub fn output_columns() -> Vec<String> {
        let mut cols: Vec<String> = INPUTS.iter().map(|c| c.to_string()).collect();
        cols.extend(INPUTS.iter().map(|c| norm_column(c)));
        cols.push(SCORE_COLUMN.to_string());
        cols
    }

    /// Inner-join the three scored tables in progressive-table order, then
    /// re-normalize the scores over the joined population.
    ///
    /// The result carries the identity columns plus the three scores, their
    /// `_norm` copies and the composite, sorted descending with ties in join
    /// order.
    pub fn compose(
        &self,
        progressive: &StatTable,
        pressing: &StatTable,
        playmaking: &StatTable,
    ) -> Result<StatTable, ScoreError> {
        let sources = [
            (progressive::NAME, progressive),
            (pressing::NAME, pressing),
            (playmaker::NAME, playmaking),
        ];

        let mut score_idx = [0usize; 3];
        for (i, ((_, table), column)) in sources.iter().zip(INPUTS).enumerate() {
            score_idx[i] = table.require(NAME, column)?;
        }
        for (name, table) in &sources {
            reject_duplicate_keys(name, table)?;
        }

        let pressing_by_key = index_by_key(pressing);
        let playmaking_by_key = index_by_key(playmaking);

        let mut joined = StatTable::new(INPUTS.iter().map(|c| c.to_string()).collect());
        for record in progressive.rows() {
            let key = record.identity.key();
            let (Some(&p), Some(&m)) = (pressing_by_key.get(&key), playmaking_by_key.get(&key)) else {
                continue;
            };
            joined.push_row(
                record.identity.clone(),
                vec![
                    record.values[score_idx[0]],
                    pressing.rows()[p].values[score_idx[1]],
                    playmaking.rows()[m].values[score_idx[2]],
                ],
            )?;
        }

        let dropped = progressive.len() - joined.len();
        if dropped > 0 {
            debug!(dropped, kept = joined.len(), "progressive rows without a pressing and playmaker match");
        }

        if joined.is_empty() {
            for col in INPUTS.iter().map(|c| norm_column(c)) {
                joined.set_column(&col, Vec::new())?;
            }
            joined.set_column(SCORE_COLUMN, Vec::new())?;
            info!("no player appears in all three role tables");
            return Ok(joined);
        }

        let mut normalized = Vec::with_capacity(INPUTS.len());
        for (column, weight) in INPUTS.iter().zip(self.weights) {
            let raw = joined
                .column(column)
                .ok_or_else(|| ScoreError::missing(NAME, column))?;
            let scaled = normalize(&raw).map_err(|e| ScoreError::degenerate(NAME, column, e))?;
            joined.set_column(&norm_column(column), scaled.clone())?;
            normalized.push((scaled, weight));
        }
        joined.set_column(SCORE_COLUMN, weighted_sum(&normalized))?;
        info!(players = joined.len(), "composed complete midfielders");

        joined
            .sorted_desc(SCORE_COLUMN)
            .ok_or_else(|| ScoreError::missing(NAME, SCORE_COLUMN))
    }
}

fn index_by_key(table: &StatTable) -> HashMap<PlayerKey, usize> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, r)| (r.identity.key(), i))
        .collect()
}

fn reject_duplicate_keys(name: &str, table: &StatTable) -> Result<(), ScoreError> {
    let mut seen = HashSet::with_capacity(table.len());
    for record in table.rows() {
        let key = record.identity.key();
        if seen.contains(&key) {
            let count = table.rows().iter().filter(|r| r.identity.key() == key).count();
            return Err(ScoreError::JoinFanout {
                table: name.to_string(),
                key: key.to_string(),
                count,
            });
        }
        seen.insert(key);
    }
    Ok(())
}
