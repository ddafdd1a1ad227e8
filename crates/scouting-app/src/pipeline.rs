// Analysis driver: load the five stat tables, pre-filter, prepare, score and
// collect the named result tables of one run.

use std::path::Path;

use scouting_core::{composer, RoleScorer, RoleScorers, ScoreError, StatTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Config, DataPaths, FilterConfig};
use crate::loader::{load_table, LoadError};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The five FBref stat categories a run reads.
#[derive(Debug, Clone, Default)]
pub struct StatTables {
    pub passing: StatTable,
    pub shooting: StatTable,
    pub possession: StatTable,
    pub defense: StatTable,
    pub goal_creation: StatTable,
}

impl StatTables {
    fn map(self, f: impl Fn(StatTable) -> StatTable) -> Self {
        Self {
            passing: f(self.passing),
            shooting: f(self.shooting),
            possession: f(self.possession),
            defense: f(self.defense),
            goal_creation: f(self.goal_creation),
        }
    }
}

/// Load every table named in `paths`, resolving relative paths against
/// `base_dir`.
pub fn load_tables(base_dir: &Path, paths: &DataPaths) -> Result<StatTables, LoadError> {
    let load = |p: &str| load_table(&DataPaths::resolve(base_dir, p));
    let tables = StatTables {
        passing: load(&paths.passing)?,
        shooting: load(&paths.shooting)?,
        possession: load(&paths.possession)?,
        defense: load(&paths.defense)?,
        goal_creation: load(&paths.goal_creation)?,
    };
    info!(
        passing = tables.passing.len(),
        shooting = tables.shooting.len(),
        possession = tables.possession.len(),
        defense = tables.defense.len(),
        goal_creation = tables.goal_creation.len(),
        "loaded stat tables"
    );
    Ok(tables)
}

/// Rows whose position is exactly one of the configured codes, no older
/// than `max_age` and with at least `min_90s`. Order is preserved.
pub fn prefilter(table: &StatTable, filters: &FilterConfig) -> StatTable {
    table.filter(|r| {
        filters.positions.iter().any(|p| *p == r.identity.pos)
            && r.identity.age <= filters.max_age
            && r.identity.nineties >= filters.min_90s
    })
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The parameters a run was made with, stored alongside its results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub positions: Vec<String>,
    pub min_90s: f64,
    pub max_age: u32,
    pub top_n: usize,
    pub min_shots: f64,
    pub min_tackle_success: f64,
}

impl RunParameters {
    pub fn from_config(config: &Config) -> Self {
        Self {
            positions: config.filters.positions.clone(),
            min_90s: config.filters.min_90s,
            max_age: config.filters.max_age,
            top_n: config.analysis.top_n,
            min_shots: config.scoring.clinical_forward.min_shots,
            min_tackle_success: config.analysis.min_tackle_success,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NamedTable {
    pub name: &'static str,
    /// Column the table is ranked by.
    pub rank_column: &'static str,
    pub table: StatTable,
}

#[derive(Debug, Clone)]
pub struct AnalysisResults {
    pub tables: Vec<NamedTable>,
    pub parameters: RunParameters,
}

impl AnalysisResults {
    pub fn get(&self, name: &str) -> Option<&StatTable> {
        self.tables.iter().find(|t| t.name == name).map(|t| &t.table)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|t| t.name).collect()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

fn sorted(label: &str, table: &StatTable, column: &str) -> Result<StatTable, ScoreError> {
    table.require(label, column)?;
    table
        .sorted_desc(column)
        .ok_or_else(|| ScoreError::MissingColumn {
            scorer: label.to_string(),
            column: column.to_string(),
        })
}

fn run_role(scorer: &dyn RoleScorer, table: &StatTable) -> Result<StatTable, ScoreError> {
    let scored = scorer.score(table)?;
    debug!(scorer = scorer.name(), rows = scored.len(), "role scored");
    Ok(scored)
}

/// Run every scorer over `tables` and collect the named results, each cut
/// to `top_n` rows. The composer sees the full role tables.
pub fn analyze_players(tables: StatTables, config: &Config) -> Result<AnalysisResults, ScoreError> {
    let scorers = RoleScorers::from_config(&config.scoring)?;
    let top_n = config.analysis.top_n;

    let filtered = tables.map(|t| prefilter(&t, &config.filters));
    info!(
        passing = filtered.passing.len(),
        shooting = filtered.shooting.len(),
        possession = filtered.possession.len(),
        defense = filtered.defense.len(),
        goal_creation = filtered.goal_creation.len(),
        "pre-filtered stat tables"
    );

    let passing = sorted("top_passers", &filtered.passing, "total_Cmp%")?;
    let shooting = sorted("top_shooters", &filtered.shooting, "npxG")?;
    let possession = sorted("possession", &filtered.possession, "Carries")?;
    let creation = sorted("top_creators", &filtered.goal_creation, "SCA")?;
    let tkl = filtered.defense.require("defense", "Tkl%")?;
    let min_tkl = config.analysis.min_tackle_success;
    let defense = sorted(
        "defense",
        &filtered.defense.filter(|r| r.values[tkl] >= min_tkl),
        "Tkl%",
    )?;

    let playmakers = run_role(&scorers.playmaker, &passing)?;
    let finishers = run_role(&scorers.clinical_forward, &shooting)?;
    let progressors = run_role(&scorers.progressive_midfielder, &possession)?;
    let pressers = run_role(&scorers.pressing_midfielder, &defense)?;
    let quality = run_role(&scorers.passing_quality, &passing)?;
    let complete = scorers
        .complete_midfielder
        .compose(&progressors, &pressers, &playmakers)?;

    let named = |name, rank_column, table: &StatTable| NamedTable {
        name,
        rank_column,
        table: table.head(top_n),
    };
    let results = AnalysisResults {
        tables: vec![
            named("top_passers", "total_Cmp%", &passing),
            named("top_shooters", "npxG", &shooting),
            named("top_creators", "SCA", &creation),
            named("playmakers", scorers.playmaker.score_column(), &playmakers),
            named("clinical_forwards", scorers.clinical_forward.score_column(), &finishers),
            named(
                "progressive_midfielders",
                scorers.progressive_midfielder.score_column(),
                &progressors,
            ),
            named(
                "pressing_midfielders",
                scorers.pressing_midfielder.score_column(),
                &pressers,
            ),
            named("passing_quality", scorers.passing_quality.score_column(), &quality),
            named("complete_midfielders", composer::SCORE_COLUMN, &complete),
        ],
        parameters: RunParameters::from_config(config),
    };

    for t in &results.tables {
        info!(table = t.name, rows = t.table.len(), "result ready");
    }
    Ok(results)
}
