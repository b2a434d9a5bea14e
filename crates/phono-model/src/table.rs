//! Tab-separated model tables.
//!
//! The first non-blank, non-comment line is the header. Column names are
//! matched case-insensitively and unknown grapheme table columns are kept as
//! auxiliary info.

use crate::error::{ModelError, Result};
use crate::types::{FeatureRow, GraphemeRow};

struct Table<'a> {
    header_line: usize,
    columns: Vec<String>,
    rows: Vec<(usize, Vec<&'a str>)>,
}

impl<'a> Table<'a> {
    fn read(text: &'a str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'));

        let (header_line, header) = lines
            .next()
            .ok_or_else(|| ModelError::table(0, "missing header row"))?;
        let columns: Vec<String> = header
            .split('\t')
            .map(|name| name.trim().to_uppercase())
            .collect();

        let mut rows = Vec::new();
        for (line, row) in lines {
            let cells: Vec<&str> = row.split('\t').map(str::trim).collect();
            if cells.len() > columns.len() {
                return Err(ModelError::table(
                    line,
                    format!("expected {} columns, found {}", columns.len(), cells.len()),
                ));
            }
            rows.push((line, cells));
        }

        Ok(Self {
            header_line,
            columns,
            rows,
        })
    }

    fn column(&self, names: &[&str]) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| names.contains(&column.as_str()))
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.column(&[name])
            .ok_or_else(|| ModelError::table(self.header_line, format!("missing column `{name}`")))
    }
}

fn cell<'a>(cells: &[&'a str], column: Option<usize>) -> &'a str {
    column.and_then(|i| cells.get(i).copied()).unwrap_or("")
}

fn parse_bool(text: &str, line: usize) -> Result<bool> {
    match text.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "" | "false" | "0" | "no" => Ok(false),
        other => Err(ModelError::table(line, format!("invalid boolean `{other}`"))),
    }
}

/// Parse a feature table (`FEATURE`, `VALUE`, `RANK`, `PREFIX`, `SUFFIX`, `CONSTRAINT`)
pub fn parse_feature_table(text: &str) -> Result<Vec<FeatureRow>> {
    let table = Table::read(text)?;
    let feature = Some(table.require("FEATURE")?);
    let value = Some(table.require("VALUE")?);
    let rank = Some(table.require("RANK")?);
    let prefix = table.column(&["PREFIX"]);
    let suffix = table.column(&["SUFFIX"]);
    let constraint = table.column(&["CONSTRAINT", "CONSTRAINTS"]);

    table
        .rows
        .iter()
        .map(|(line, cells)| {
            let rank_text = cell(cells, rank);
            let rank = rank_text
                .parse::<i64>()
                .map_err(|_| ModelError::table(*line, format!("invalid rank `{rank_text}`")))?;
            let constraint = cell(cells, constraint);
            Ok(FeatureRow {
                feature: cell(cells, feature).to_string(),
                value: cell(cells, value).to_string(),
                rank,
                prefix: cell(cells, prefix).to_string(),
                suffix: cell(cells, suffix).to_string(),
                constraint: (!constraint.is_empty()).then(|| constraint.to_string()),
            })
        })
        .collect()
}

/// Parse a grapheme table (`GRAPHEME`, `DESCRIPTION`, optional `CLASS`, extra info columns)
pub fn parse_grapheme_table(text: &str) -> Result<Vec<GraphemeRow>> {
    let table = Table::read(text)?;
    let grapheme = table.require("GRAPHEME")?;
    let description = table.require("DESCRIPTION")?;
    let class = table.column(&["CLASS", "IS_CLASS", "PARTIAL"]);
    let extra: Vec<(usize, String)> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, name)| {
            *i != grapheme && *i != description && Some(*i) != class && !name.is_empty()
        })
        .map(|(i, name)| (i, name.to_lowercase()))
        .collect();

    table
        .rows
        .iter()
        .map(|(line, cells)| {
            let mut row = GraphemeRow::new(
                cell(cells, Some(grapheme)),
                cell(cells, Some(description)),
            );
            row.is_class = parse_bool(cell(cells, class), *line)?;
            for (i, key) in &extra {
                let text = cell(cells, Some(*i));
                if !text.is_empty() {
                    row.info.insert(key.clone(), text.to_string());
                }
            }
            Ok(row)
        })
        .collect()
}
