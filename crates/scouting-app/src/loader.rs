// Stat table loading from FBref-style CSV exports.
//
// Identity columns (Player, Nation, Pos, Squad, Comp, Age, 90s) become the
// row identity; every other column except the bookkeeping ones is read as a
// numeric metric.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use scouting_core::{PlayerIdentity, ScoreError, StatTable};
use thiserror::Error;
use tracing::{debug, warn};

/// Columns that are neither identity nor metrics.
pub const IGNORED_COLUMNS: &[&str] = &["Rk", "Born", "Matches"];

const PLAYER: &str = "Player";
const SQUAD: &str = "Squad";
const POS: &str = "Pos";
const AGE: &str = "Age";
const NINETIES: &str = "90s";
const COMP: &str = "Comp";
const NATION: &str = "Nation";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path}: identity column `{column}` is missing")]
    MissingIdentityColumn { path: String, column: &'static str },

    #[error("{path}: no valid player rows")]
    NoRows { path: String },

    #[error(transparent)]
    Table(#[from] ScoreError),
}

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

/// "25-123" (years-days) or plain "25" into whole years.
fn parse_age(raw: &str) -> Option<u32> {
    raw.trim().split('-').next()?.trim().parse().ok()
}

/// FBref prefixes the competition with a lowercase country code
/// ("eng Premier League"); the prefix is dropped.
fn clean_comp(raw: &str) -> String {
    let mut tokens = raw.split_whitespace();
    let Some(first) = tokens.next() else {
        return String::new();
    };
    let rest: Vec<&str> = tokens.collect();
    if !rest.is_empty() && first.chars().all(|c| c.is_ascii_lowercase()) {
        rest.join(" ")
    } else {
        std::iter::once(first).chain(rest).collect::<Vec<_>>().join(" ")
    }
}

/// "eng ENG" keeps the trailing code.
fn clean_nation(raw: &str) -> String {
    raw.split_whitespace().last().unwrap_or_default().to_string()
}

/// Empty cells count as zero, as in the source tables.
fn parse_metric(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Repeated header names get a numeric suffix: the second "Tkl" is "Tkl_2".
fn dedupe_headers(headers: &csv::StringRecord) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    headers
        .iter()
        .map(|h| {
            let h = h.trim();
            let n = seen.entry(h).or_insert(0);
            *n += 1;
            if *n == 1 {
                h.to_string()
            } else {
                format!("{h}_{n}")
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Reader-based loader
// ---------------------------------------------------------------------------

/// Read one stat table. `source` names the input in errors and logs.
///
/// Repeated header rows and rows with an unreadable age, `90s` or metric
/// value are skipped with a warning.
pub fn load_table_from_reader<R: Read>(source: &str, rdr: R) -> Result<StatTable, LoadError> {
    let csv_err = |e: csv::Error| LoadError::Csv {
        path: source.to_string(),
        source: e,
    };
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = dedupe_headers(reader.headers().map_err(csv_err)?);

    let find = |name: &'static str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingIdentityColumn {
                path: source.to_string(),
                column: name,
            })
    };
    let player_idx = find(PLAYER)?;
    let squad_idx = find(SQUAD)?;
    let pos_idx = find(POS)?;
    let age_idx = find(AGE)?;
    let nineties_idx = find(NINETIES)?;
    let comp_idx = headers.iter().position(|h| h == COMP);
    let nation_idx = headers.iter().position(|h| h == NATION);

    let identity_cols = [PLAYER, SQUAD, POS, AGE, NINETIES, COMP, NATION];
    let metric_idx: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            !identity_cols.contains(&h.as_str()) && !IGNORED_COLUMNS.contains(&h.as_str())
        })
        .map(|(i, _)| i)
        .collect();

    let mut table = StatTable::new(metric_idx.iter().map(|&i| headers[i].clone()).collect());
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("{source}: skipping malformed row: {e}");
                skipped += 1;
                continue;
            }
        };
        let field = |i: usize| record.get(i).unwrap_or_default().trim();

        let player = field(player_idx);
        if player.is_empty() || player == PLAYER {
            debug!("{source}: skipping repeated header row");
            continue;
        }

        let Some(age) = parse_age(field(age_idx)) else {
            warn!("{source}: skipping '{player}': unreadable age '{}'", field(age_idx));
            skipped += 1;
            continue;
        };
        let nineties = match field(nineties_idx).parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!("{source}: skipping '{player}': unreadable 90s '{}'", field(nineties_idx));
                skipped += 1;
                continue;
            }
        };

        let mut values = Vec::with_capacity(metric_idx.len());
        let mut bad_column = None;
        for &i in &metric_idx {
            match parse_metric(field(i)) {
                Some(v) => values.push(v),
                None => {
                    bad_column = Some(i);
                    break;
                }
            }
        }
        if let Some(i) = bad_column {
            warn!(
                "{source}: skipping '{player}': non-numeric {} value '{}'",
                headers[i],
                field(i)
            );
            skipped += 1;
            continue;
        }

        let identity = PlayerIdentity {
            player: player.to_string(),
            squad: field(squad_idx).to_string(),
            comp: comp_idx.map(|i| clean_comp(field(i))).unwrap_or_default(),
            nation: nation_idx.map(|i| clean_nation(field(i))).unwrap_or_default(),
            age,
            pos: field(pos_idx).to_string(),
            nineties,
        };
        table.push_row(identity, values)?;
    }

    debug!(
        "{source}: loaded {} rows, {} metric columns, skipped {skipped}",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load a stat table from a CSV file. A file with no valid rows is an error.
pub fn load_table(path: &Path) -> Result<StatTable, LoadError> {
    let label = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: label.clone(),
        source: e,
    })?;
    let table = load_table_from_reader(&label, file)?;
    if table.is_empty() {
        return Err(LoadError::NoRows { path: label });
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
