// Configuration loading and parsing (scout.toml).

use std::path::{Path, PathBuf};

use scouting_core::{ScoreError, ScoringConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// File name of the run configuration inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "scout.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scouting config not found at {path}")]
    FileNotFound { path: PathBuf },

    #[error("{path} is not valid TOML: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config field `{field}` {message}")]
    ValidationError { field: String, message: String },

    #[error("could not install the default config: {message}")]
    DefaultsCopyError { message: String },

    #[error("invalid scoring configuration: {0}")]
    InvalidWeights(#[from] ScoreError),
}

// ---------------------------------------------------------------------------
// Assembled run configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub filters: FilterConfig,
    pub analysis: AnalysisConfig,
    pub scoring: ScoringConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// scout.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire scout.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ScoutFile {
    filters: FilterConfig,
    analysis: AnalysisConfig,
    #[serde(default)]
    scoring: ScoringConfig,
    database: DatabaseSection,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// Pre-filters applied to every stat table before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Exact `Pos` values to keep; "MF,FW" does not match "MF".
    pub positions: Vec<String>,
    pub min_90s: f64,
    pub max_age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub top_n: usize,
    #[serde(default = "default_min_tackle_success")]
    pub min_tackle_success: f64,
}

fn default_min_tackle_success() -> f64 {
    50.0
}

/// CSV exports, one per stat category. Relative paths resolve against the
/// base directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPaths {
    pub passing: String,
    pub shooting: String,
    pub possession: String,
    pub defense: String,
    pub goal_creation: String,
}

impl DataPaths {
    pub fn resolve(base_dir: &Path, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            base_dir.join(p)
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/scout.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let file: ScoutFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        filters: file.filters,
        analysis: file.analysis,
        scoring: file.scoring,
        db_path: file.database.path,
        data_paths: file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy `defaults/scout.toml` to `config/scout.toml` when the latter is
/// missing. Returns the written path, or `None` if a config was already in
/// place (an existing file is never overwritten).
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "{} is missing and there is no {} to copy",
                target.display(),
                source.display()
            ),
        });
    }

    let copy_err = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    };
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(copy_err)?;
    }
    std::fs::copy(&source, &target).map_err(copy_err)?;
    info!("Copied default config to {}", target.display());

    Ok(Some(target))
}

/// Copy the default config if none exists yet, then load it.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let filters = &config.filters;
    if filters.positions.is_empty() {
        return Err(invalid("filters.positions", "must list at least one position"));
    }
    if let Some(blank) = filters.positions.iter().position(|p| p.trim().is_empty()) {
        return Err(invalid(
            "filters.positions",
            format!("entry {blank} is empty"),
        ));
    }
    // Every per-90 metric divides by `90s`, so a kept row must have played.
    if !filters.min_90s.is_finite() || filters.min_90s <= 0.0 {
        return Err(invalid(
            "filters.min_90s",
            format!("must be > 0, got {}", filters.min_90s),
        ));
    }

    if config.analysis.top_n == 0 {
        return Err(invalid("analysis.top_n", "must be greater than 0"));
    }
    let tkl = config.analysis.min_tackle_success;
    if !(0.0..=100.0).contains(&tkl) {
        return Err(invalid(
            "analysis.min_tackle_success",
            format!("must be between 0 and 100 inclusive, got {tkl}"),
        ));
    }

    if config.db_path.trim().is_empty() {
        return Err(invalid("database.path", "must not be empty"));
    }

    let paths = &config.data_paths;
    let path_fields: &[(&str, &str)] = &[
        ("data_paths.passing", paths.passing.as_str()),
        ("data_paths.shooting", paths.shooting.as_str()),
        ("data_paths.possession", paths.possession.as_str()),
        ("data_paths.defense", paths.defense.as_str()),
        ("data_paths.goal_creation", paths.goal_creation.as_str()),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(invalid(name, "must not be empty"));
        }
    }

    config.scoring.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: the scouting-app crate root, where `defaults/` lives
    /// (works from the crate root or the workspace root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/scouting-app/defaults").exists() {
            cwd.join("crates/scouting-app")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Helper: temp base dir holding `config/scout.toml` with `edit` applied
    /// to the default file's text.
    fn base_with_config(name: &str, edit: impl Fn(String) -> String) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        let text = fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE)).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), edit(text)).unwrap();
        tmp
    }

    #[test]
    fn load_valid_config_from_project_files() {
        let tmp = base_with_config("scout_config_test_defaults", |t| t);
        let config = load_config_from(&tmp).expect("should load valid config");

        assert_eq!(
            config.filters.positions,
            vec!["MF", "FW,MF", "MF,FW", "MF,DF"]
        );
        assert!((config.filters.min_90s - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.filters.max_age, 30);
        assert_eq!(config.analysis.top_n, 20);
        assert!((config.analysis.min_tackle_success - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.db_path, "scouting.db");
        assert_eq!(config.data_paths.goal_creation, "data/gca.csv");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn scoring_section_is_optional() {
        let tmp = base_with_config("scout_config_test_no_scoring", |_| {
            "\
[filters]
positions = [\"MF\"]
min_90s = 10.0
max_age = 25

[analysis]
top_n = 5

[database]
path = \"runs.db\"

[data_paths]
passing = \"p.csv\"
shooting = \"s.csv\"
possession = \"o.csv\"
defense = \"d.csv\"
goal_creation = \"g.csv\"
"
            .to_string()
        });
        let config = load_config_from(&tmp).expect("should load without [scoring]");
        assert_eq!(config.scoring, ScoringConfig::default());
        assert!((config.analysis.min_tackle_success - 50.0).abs() < f64::EPSILON);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_top_n() {
        let tmp = base_with_config("scout_config_test_top_n", |t| {
            t.replace("top_n = 20", "top_n = 0")
        });
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "analysis.top_n"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_positions() {
        let tmp = base_with_config("scout_config_test_positions", |t| {
            t.replace(
                r#"positions = ["MF", "FW,MF", "MF,FW", "MF,DF"]"#,
                "positions = []",
            )
        });
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "filters.positions"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_min_90s() {
        let tmp = base_with_config("scout_config_test_min_90s", |t| {
            t.replace("min_90s = 5.0", "min_90s = 0.0")
        });
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, message } => {
                assert_eq!(field, "filters.min_90s");
                assert!(message.contains("> 0"), "message: {message}");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_min_shots() {
        let tmp = base_with_config("scout_config_test_min_shots", |t| {
            t.replace("min_shots = 20.0", "min_shots = 0.0")
        });
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::InvalidWeights(ScoreError::InvalidWeightConfig { scorer, .. }) => {
                assert_eq!(scorer, "clinical_forward");
            }
            other => panic!("expected InvalidWeights, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_tackle_success_above_100() {
        let tmp = base_with_config("scout_config_test_tkl", |t| {
            t.replace("min_tackle_success = 50.0", "min_tackle_success = 120.0")
        });
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let tmp = base_with_config("scout_config_test_weights", |t| {
            t.replace("chance_creation = 0.40", "chance_creation = 0.50")
        });
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::InvalidWeights(ScoreError::InvalidWeightConfig { scorer, .. }) => {
                assert_eq!(scorer, "passing_quality");
            }
            other => panic!("expected InvalidWeights, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_scout_toml() {
        let tmp = std::env::temp_dir().join("scout_config_test_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => {
                assert!(path.ends_with(CONFIG_FILE));
            }
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = base_with_config("scout_config_test_invalid_toml", |_| {
            "this is not valid [[[ toml".to_string()
        });
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => {
                assert!(path.ends_with(CONFIG_FILE));
            }
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    /// Helper: temp base dir with only `defaults/scout.toml`.
    fn base_with_defaults(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::copy(
            project_root().join("defaults").join(CONFIG_FILE),
            tmp.join("defaults").join(CONFIG_FILE),
        )
        .unwrap();
        tmp
    }

    #[test]
    fn first_load_copies_default_scout_toml() {
        let tmp = base_with_defaults("scout_config_test_first_load");
        assert!(!tmp.join("config").exists());

        let config = load_config(&tmp).expect("copied defaults should load");
        assert_eq!(config.analysis.top_n, 20);
        assert_eq!(
            fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap(),
            fs::read_to_string(tmp.join("defaults").join(CONFIG_FILE)).unwrap()
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_reports_the_copy_once() {
        let tmp = base_with_defaults("scout_config_test_copy_once");

        let copied = ensure_config_file(&tmp).unwrap();
        assert_eq!(copied, Some(tmp.join("config").join(CONFIG_FILE)));
        assert_eq!(ensure_config_file(&tmp).unwrap(), None);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_keeps_edited_config() {
        let tmp = base_with_defaults("scout_config_test_keeps_edits");
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), "# custom\n").unwrap();

        assert_eq!(ensure_config_file(&tmp).unwrap(), None);
        let content = fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn existing_config_needs_no_defaults() {
        let tmp = base_with_config("scout_config_test_no_defaults", |t| t);
        assert!(!tmp.join("defaults").exists());

        assert_eq!(ensure_config_file(&tmp).unwrap(), None);
        assert!(load_config(&tmp).is_ok());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_errors_without_config_or_default() {
        let tmp = std::env::temp_dir().join("scout_config_test_nothing_to_copy");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_file(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains(CONFIG_FILE), "message: {message}");
                assert!(message.contains("no "), "message: {message}");
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        assert!(!tmp.join("config").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn relative_data_paths_resolve_against_base() {
        let base = Path::new("/srv/scout");
        assert_eq!(
            DataPaths::resolve(base, "data/passing.csv"),
            PathBuf::from("/srv/scout/data/passing.csv")
        );
        assert_eq!(
            DataPaths::resolve(base, "/tmp/x.csv"),
            PathBuf::from("/tmp/x.csv")
        );
    }
}
