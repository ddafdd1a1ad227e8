// Progressive midfielder: moving the ball forward by carrying and receiving.

use crate::error::ScoreError;
use crate::metrics::{DerivedMetric, MetricSpec};
use crate::roles::RoleScorer;
use crate::table::StatTable;
use crate::weights::ProgressorWeights;

pub const NAME: &str = "progressive_midfielder";
pub const SCORE_COLUMN: &str = "progression_score";

#[derive(Debug, Clone)]
pub struct ProgressiveMidfielder {
    spec: MetricSpec,
}

impl ProgressiveMidfielder {
    pub fn new(weights: &ProgressorWeights) -> Result<Self, ScoreError> {
        let spec = MetricSpec::new(
            NAME,
            vec![
                DerivedMetric::per_90("PrgDist_90", "PrgDist"),
                DerivedMetric::per_90("PrgC_90", "PrgC"),
                DerivedMetric::per_90("1/3_90", "1/3"),
                DerivedMetric::per_90("PrgR_90", "PrgR"),
            ],
            vec![
                ("PrgDist_90", weights.progressive_distance),
                ("PrgC_90", weights.progressive_carries),
                ("1/3_90", weights.final_third_entries),
                ("PrgR_90", weights.progressive_receptions),
            ],
            SCORE_COLUMN,
        )?;
        Ok(Self { spec })
    }
}

impl RoleScorer for ProgressiveMidfielder {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::test_support::{approx_eq, build, row};

    const COLUMNS: &[&str] = &["Carries", "PrgDist", "PrgC", "1/3", "PrgR"];

    fn possession_table() -> StatTable {
        build(
            COLUMNS,
            vec![
                row("Rodri", "MF", 30.0, &[1800.0, 6000.0, 60.0, 45.0, 30.0]),
                row("Bellingham", "MF,FW", 28.0, &[1200.0, 5600.0, 110.0, 70.0, 210.0]),
                row("Kante", "MF", 20.0, &[900.0, 3000.0, 40.0, 30.0, 40.0]),
                row("Valverde", "MF", 32.0, &[1500.0, 7000.0, 95.0, 50.0, 120.0]),
            ],
        )
    }

    #[test]
    fn per_90_and_norm_columns_are_appended() {
        let out = ProgressiveMidfielder::new(&ProgressorWeights::default())
            .unwrap()
            .score(&possession_table())
            .unwrap();
        for col in [
            "PrgDist_90",
            "PrgC_90",
            "1/3_90",
            "PrgR_90",
            "PrgDist_90_norm",
            "PrgC_90_norm",
            "1/3_90_norm",
            "PrgR_90_norm",
            SCORE_COLUMN,
        ] {
            assert!(out.has_column(col), "missing {col}");
        }
        let kante = out.players().iter().position(|p| *p == "Kante").unwrap();
        assert!(approx_eq(out.value(kante, "PrgDist_90").unwrap(), 150.0, 1e-9));
        assert!(approx_eq(out.value(kante, "1/3_90").unwrap(), 1.5, 1e-9));
    }

    #[test]
    fn carries_and_receptions_lead() {
        let out = ProgressiveMidfielder::new(&ProgressorWeights::default())
            .unwrap()
            .score(&possession_table())
            .unwrap();
        assert_eq!(out.players()[0], "Bellingham");
        assert_eq!(*out.players().last().unwrap(), "Kante");
        let scores = out.column(SCORE_COLUMN).unwrap();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn zero_nineties_is_an_error() {
        let t = build(
            COLUMNS,
            vec![
                row("A", "MF", 10.0, &[1.0, 100.0, 5.0, 3.0, 2.0]),
                row("Unused", "MF", 0.0, &[0.0, 0.0, 0.0, 0.0, 0.0]),
            ],
        );
        let err = ProgressiveMidfielder::new(&ProgressorWeights::default())
            .unwrap()
            .score(&t)
            .unwrap_err();
        match err {
            ScoreError::NonPositiveDivisor { player, metric, .. } => {
                assert_eq!(player, "Unused");
                assert_eq!(metric, "PrgDist_90");
            }
            other => panic!("expected NonPositiveDivisor, got: {other}"),
        }
    }

    #[test]
    fn empty_table_keeps_columns() {
        let out = ProgressiveMidfielder::new(&ProgressorWeights::default())
            .unwrap()
            .score(&build(COLUMNS, vec![]))
            .unwrap();
        assert!(out.is_empty());
        assert!(out.has_column(SCORE_COLUMN));
        assert!(out.has_column("PrgR_90_norm"));
    }
}
