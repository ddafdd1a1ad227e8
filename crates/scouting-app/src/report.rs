// Markdown report of one analysis run.

use crate::pipeline::{AnalysisResults, NamedTable};

/// "complete_midfielders" -> "Complete Midfielders".
pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Markdown table cells cannot hold a bare `|`.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn render_table(out: &mut String, named: &NamedTable) {
    out.push_str(&format!("## {}\n\n", title_case(named.name)));
    if named.table.is_empty() {
        out.push_str("_No players matched._\n\n");
        return;
    }
    out.push_str(&format!(
        "| Rank | Player | Squad | Age | Pos | {} |\n",
        named.rank_column
    ));
    out.push_str("|---:|---|---|---:|---|---:|\n");
    for (i, row) in named.table.rows().iter().enumerate() {
        let id = &row.identity;
        let score = named
            .table
            .column_index(named.rank_column)
            .map(|c| format!("{:.3}", row.values[c]))
            .unwrap_or_default();
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            i + 1,
            escape_cell(&id.player),
            escape_cell(&id.squad),
            id.age,
            escape_cell(&id.pos),
            score
        ));
    }
    out.push('\n');
}

/// One section per result table, in run order.
pub fn render_report(results: &AnalysisResults) -> String {
    let mut out = String::from("# Scouting Report\n\n");
    let p = &results.parameters;
    out.push_str(&format!(
        "Positions: {} | max age {} | min 90s {} | min shots {} | top {}\n\n",
        p.positions.join(", "),
        p.max_age,
        p.min_90s,
        p.min_shots,
        p.top_n
    ));
    for named in &results.tables {
        render_table(&mut out, named);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RunParameters;
    use scouting_core::{PlayerIdentity, StatTable};

    fn results() -> AnalysisResults {
        let mut t = StatTable::new(vec!["Sh".into(), "efficiency_score".into()]);
        t.push_row(
            PlayerIdentity {
                player: "Jude Bellingham".into(),
                squad: "Real Madrid".into(),
                comp: "La Liga".into(),
                nation: "ENG".into(),
                age: 20,
                pos: "MF,FW".into(),
                nineties: 28.0,
            },
            vec![70.0, 0.87654],
        )
        .unwrap();
        AnalysisResults {
            tables: vec![
                NamedTable {
                    name: "clinical_forwards",
                    rank_column: "efficiency_score",
                    table: t,
                },
                NamedTable {
                    name: "pressing_midfielders",
                    rank_column: "pressing_score",
                    table: StatTable::new(vec!["pressing_score".into()]),
                },
            ],
            parameters: RunParameters {
                positions: vec!["MF".into(), "MF,FW".into()],
                min_90s: 5.0,
                max_age: 30,
                top_n: 20,
                min_shots: 20.0,
                min_tackle_success: 50.0,
            },
        }
    }

    #[test]
    fn title_case_splits_on_underscores() {
        assert_eq!(title_case("complete_midfielders"), "Complete Midfielders");
        assert_eq!(title_case("top_passers"), "Top Passers");
        assert_eq!(title_case("passing_quality"), "Passing Quality");
    }

    #[test]
    fn sections_follow_result_order() {
        let report = render_report(&results());
        let clinical = report.find("## Clinical Forwards").unwrap();
        let pressing = report.find("## Pressing Midfielders").unwrap();
        assert!(clinical < pressing);
    }

    #[test]
    fn rows_show_identity_and_score() {
        let report = render_report(&results());
        assert!(report.contains("| Rank | Player | Squad | Age | Pos | efficiency_score |"));
        assert!(report.contains("| 1 | Jude Bellingham | Real Madrid | 20 | MF,FW | 0.877 |"));
    }

    #[test]
    fn pipes_in_names_are_escaped() {
        let mut results = results();
        let mut table = StatTable::new(vec!["efficiency_score".into()]);
        table
            .push_row(
                PlayerIdentity {
                    player: "A|B".into(),
                    squad: "Club | Two".into(),
                    comp: String::new(),
                    nation: String::new(),
                    age: 22,
                    pos: "FW".into(),
                    nineties: 10.0,
                },
                vec![0.5],
            )
            .unwrap();
        results.tables[0].table = table;

        let report = render_report(&results);
        assert!(report.contains("| 1 | A\\|B | Club \\| Two | 22 | FW | 0.500 |"));
    }

    #[test]
    fn empty_table_is_noted() {
        let report = render_report(&results());
        assert!(report.contains("## Pressing Midfielders\n\n_No players matched._"));
    }
}
