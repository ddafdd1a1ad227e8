// Stat tables: player identity plus an ordered set of numeric columns.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Join key for a player-season row.
///
/// The name alone collides across clubs and competitions, so every join in
/// the core uses name + squad + competition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey {
    pub player: String,
    pub squad: String,
    pub comp: String,
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comp.is_empty() {
            write!(f, "{} ({})", self.player, self.squad)
        } else {
            write!(f, "{} ({}, {})", self.player, self.squad, self.comp)
        }
    }
}

/// Categorical attributes of a row. `nineties` is minutes played in
/// 90-minute units (the `90s` column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub player: String,
    pub squad: String,
    #[serde(default)]
    pub comp: String,
    #[serde(default)]
    pub nation: String,
    pub age: u32,
    pub pos: String,
    pub nineties: f64,
}

impl PlayerIdentity {
    pub fn key(&self) -> PlayerKey {
        PlayerKey {
            player: self.player.clone(),
            squad: self.squad.clone(),
            comp: self.comp.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub identity: PlayerIdentity,
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A table of stat records sharing one column layout.
///
/// Every operation that changes the row set returns a new table, so a
/// scorer can never disturb its caller's input. Rows only enter through
/// `push_row`, so each row is exactly as wide as `columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatTable {
    columns: Vec<String>,
    rows: Vec<StatRecord>,
}

impl StatTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[StatRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of `name`, or a `MissingColumn` error attributed to `scorer`.
    pub fn require(&self, scorer: &str, name: &str) -> Result<usize, ScoreError> {
        self.column_index(name)
            .ok_or_else(|| ScoreError::missing(scorer, name))
    }

    /// Append a row. The value count must match the column layout.
    pub fn push_row(&mut self, identity: PlayerIdentity, values: Vec<f64>) -> Result<(), ScoreError> {
        if values.len() != self.columns.len() {
            return Err(ScoreError::RowWidth {
                player: identity.player,
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.rows.push(StatRecord { identity, values });
        Ok(())
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r.values[idx])
    }

    /// Set a column on every row: appended at the end when new, overwritten
    /// in place when a column of that name already exists.
    pub fn set_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), ScoreError> {
        if values.len() != self.rows.len() {
            return Err(ScoreError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.values[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.values.push(v);
                }
            }
        }
        Ok(())
    }

    /// Rows matching `pred`, original order kept.
    pub fn filter<P>(&self, pred: P) -> StatTable
    where
        P: Fn(&StatRecord) -> bool,
    {
        StatTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| pred(r)).cloned().collect(),
        }
    }

    /// Copy sorted descending by `column`. The sort is stable: rows with
    /// equal values keep their relative input order.
    pub fn sorted_desc(&self, column: &str) -> Option<StatTable> {
        let idx = self.column_index(column)?;
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            b.values[idx]
                .partial_cmp(&a.values[idx])
                .unwrap_or(Ordering::Equal)
        });
        Some(StatTable {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> StatTable {
        StatTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn players(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.identity.player.as_str()).collect()
    }
}
