/*
database_querier.rs

Copyright 2025 Skiddie contributors

This file is part of Skiddie.

Skiddie is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Skiddie is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Skiddie. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Database querier: find the only row of a table that matches a set of conditions.
//!
//! Discrete columns hold a few repeated values (`true`, `shipped`, ...) and get `==` or `!=`
//! conditions. Continuous columns hold distinct values, sorted in row order, and get comparison or
//! range conditions. Conditions are added one column at a time, each one removing rows from the
//! remaining candidates, and the last continuous column isolates the solution row.

use chrono::{Datelike, Days, NaiveDate};
use log::{Level, debug, log_enabled};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::{MAX_ATTEMPTS, regenerate};
use crate::difficulty::{BuiltinPreset, Difficulty, Domain, GameSchema, ParamSpec, ParamValue, Parameters};
use crate::error::Error;
use crate::game::{GameKind, Puzzle};
use crate::random::RandomSource;

/// Ratio of discrete columns in the table.
const DISCRETE_COLUMN_RATIO: f64 = 0.25;

/// Dates are drawn inside a window of that many days.
const DATE_WINDOW_DAYS: i64 = 365 * 2;

/// Index of a row in the table.
pub type RowIndex = usize;

pub const SCHEMA: GameSchema = GameSchema {
    parameters: &[
        ParamSpec {
            name: "rows",
            domain: Domain::Int { min: 2, max: 60 },
            description: "Number of rows in the table",
        },
        ParamSpec {
            name: "columns",
            domain: Domain::Int { min: 2, max: 8 },
            description: "Number of columns in the table",
        },
        ParamSpec {
            name: "max_discrete_values",
            domain: Domain::Int { min: 2, max: 6 },
            description: "Highest number of different values in a discrete column",
        },
    ],
    presets: &[
        BuiltinPreset {
            difficulty: Difficulty::Easy,
            values: &[
                ("rows", ParamValue::Int(8)),
                ("columns", ParamValue::Int(3)),
                ("max_discrete_values", ParamValue::Int(2)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Medium,
            values: &[
                ("rows", ParamValue::Int(15)),
                ("columns", ParamValue::Int(4)),
                ("max_discrete_values", ParamValue::Int(3)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Hard,
            values: &[
                ("rows", ParamValue::Int(25)),
                ("columns", ParamValue::Int(6)),
                ("max_discrete_values", ParamValue::Int(5)),
            ],
        },
    ],
};

/// Type of data in a column.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Age,
    Quantity,
    Price,
    Date,
    Boolean,
    Status,
}

impl ColumnKind {
    const CONTINUOUS: [ColumnKind; 4] = [
        ColumnKind::Age,
        ColumnKind::Quantity,
        ColumnKind::Price,
        ColumnKind::Date,
    ];
    const DISCRETE: [ColumnKind; 2] = [ColumnKind::Boolean, ColumnKind::Status];

    /// Possible column names.
    fn names(&self) -> &'static [&'static str] {
        match self {
            ColumnKind::Age => &["age", "seniority"],
            ColumnKind::Quantity => &["quantity", "stock", "units"],
            ColumnKind::Price => &["price", "cost", "revenue", "profit"],
            ColumnKind::Date => &["date", "start_date", "end_date"],
            ColumnKind::Boolean => &["exists", "preferred", "enabled", "open", "active"],
            ColumnKind::Status => &["status", "state", "stage"],
        }
    }

    /// Possible values of a discrete column.
    fn discrete_values(&self) -> &'static [&'static str] {
        match self {
            ColumnKind::Boolean => &["true", "false"],
            ColumnKind::Status => &[
                "pending",
                "shipped",
                "delivered",
                "returned",
                "cancelled",
                "lost",
            ],
            _ => &[],
        }
    }

    pub fn is_continuous(&self) -> bool {
        Self::CONTINUOUS.contains(self)
    }

    /// Generate the cells of a column.
    ///
    /// Continuous columns get distinct values in increasing order.
    fn generate(
        &self,
        rows: usize,
        max_discrete_values: usize,
        rng: &mut RandomSource,
    ) -> Result<Vec<Cell>, String> {
        let distinct = |low: i64, high: i64, rng: &mut RandomSource| -> Vec<i64> {
            let mut values: BTreeSet<i64> = BTreeSet::new();
            while values.len() < rows {
                values.insert(rng.next_int(low, high));
            }
            values.into_iter().collect()
        };

        match self {
            ColumnKind::Age => Ok(distinct(0, 89, rng).into_iter().map(Cell::Number).collect()),
            ColumnKind::Quantity => Ok(distinct(1, 999, rng).into_iter().map(Cell::Number).collect()),
            ColumnKind::Price => Ok(distinct(10_00, 999_99, rng).into_iter().map(Cell::Price).collect()),
            ColumnKind::Date => {
                let first: NaiveDate = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or("invalid date")?;
                let last: NaiveDate = NaiveDate::from_ymd_opt(1999, 12, 31).ok_or("invalid date")?;
                let span: i64 = (last - first).num_days() - DATE_WINDOW_DAYS;
                let start: i64 = rng.next_int(0, span);

                distinct(start, start + DATE_WINDOW_DAYS - 1, rng)
                    .into_iter()
                    .map(|d| {
                        first
                            .checked_add_days(Days::new(d as u64))
                            .map(Cell::Date)
                            .ok_or_else(|| format!("date overflow at day {d}"))
                    })
                    .collect()
            }
            ColumnKind::Boolean | ColumnKind::Status => {
                let values: Vec<&str> = rng.sample(
                    self.discrete_values(),
                    max_discrete_values.min(self.discrete_values().len()),
                );
                Ok((0..rows)
                    .map(|_| Cell::Text(values[rng.index(values.len())].to_string()))
                    .collect())
            }
        }
    }
}

/// Value of a table cell.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Cell {
    Number(i64),

    /// Price in cents.
    Price(i64),
    Date(NaiveDate),
    Text(String),
}

impl Cell {
    /// Value used to compare continuous cells.
    fn key(&self) -> Option<i64> {
        match self {
            Cell::Number(n) | Cell::Price(n) => Some(*n),
            Cell::Date(d) => Some(d.num_days_from_ce() as i64),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Price(c) => write!(f, "${}.{:02}", c / 100, c % 100),
            Cell::Date(d) => write!(f, "{d}"),
            Cell::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Condition on the cells of a column.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Equals(Cell),
    NotEquals(Cell),
    LessThan(Cell),
    AtMost(Cell),
    GreaterThan(Cell),
    AtLeast(Cell),

    /// Both bounds excluded.
    Between(Cell, Cell),
}

impl Predicate {
    /// Whether the cell satisfies the condition.
    pub fn matches(&self, cell: &Cell) -> bool {
        let cmp = |bound: &Cell, f: fn(i64, i64) -> bool| match (cell.key(), bound.key()) {
            (Some(a), Some(b)) => f(a, b),
            _ => false,
        };
        match self {
            Predicate::Equals(v) => cell == v,
            Predicate::NotEquals(v) => cell != v,
            Predicate::LessThan(v) => cmp(v, |a, b| a < b),
            Predicate::AtMost(v) => cmp(v, |a, b| a <= b),
            Predicate::GreaterThan(v) => cmp(v, |a, b| a > b),
            Predicate::AtLeast(v) => cmp(v, |a, b| a >= b),
            Predicate::Between(low, high) => cmp(low, |a, b| a > b) && cmp(high, |a, b| a < b),
        }
    }

    /// Format the condition for the given column, such as `quantity >= 29`.
    pub fn format(&self, column: &str) -> String {
        match self {
            Predicate::Equals(v) => format!("{column} == {v}"),
            Predicate::NotEquals(v) => format!("{column} != {v}"),
            Predicate::LessThan(v) => format!("{column} < {v}"),
            Predicate::AtMost(v) => format!("{column} <= {v}"),
            Predicate::GreaterThan(v) => format!("{column} > {v}"),
            Predicate::AtLeast(v) => format!("{column} >= {v}"),
            Predicate::Between(low, high) => format!("{low} < {column} < {high}"),
        }
    }
}

/// Column of the table with its condition.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,

    /// Columns added after the solution was isolated have no condition.
    pub predicate: Option<Predicate>,
}

impl Column {
    /// Rows of the candidates that satisfy the condition.
    fn filter(&self, candidates: &[RowIndex]) -> Vec<RowIndex> {
        match &self.predicate {
            Some(p) => candidates
                .iter()
                .copied()
                .filter(|r| p.matches(&self.cells[*r]))
                .collect(),
            None => candidates.to_vec(),
        }
    }

    /// Pick a condition for a discrete column that keeps the solution and removes at least one
    /// candidate.
    fn discrete_predicate(
        &self,
        candidates: &[RowIndex],
        solution: RowIndex,
        rng: &mut RandomSource,
    ) -> Option<Predicate> {
        let value: &Cell = &self.cells[solution];
        let mut others: Vec<&Cell> = Vec::new();
        for r in candidates {
            let c: &Cell = &self.cells[*r];
            if c != value && !others.contains(&c) {
                others.push(c);
            }
        }

        // `==` removes every other value at once, `!=` only one of them
        let mut options: Vec<Predicate> = others
            .iter()
            .map(|c| Predicate::NotEquals((*c).clone()))
            .collect();
        if !others.is_empty() {
            options.push(Predicate::Equals(value.clone()));
        }
        rng.choice(&options).cloned()
    }

    /// Pick a condition for a continuous column that keeps `keep` candidates around the
    /// solution.
    ///
    /// Cell values are distinct, so the kept candidates form a window of the sorted values.
    fn continuous_predicate(
        &self,
        candidates: &[RowIndex],
        solution: RowIndex,
        keep: usize,
        rng: &mut RandomSource,
    ) -> Option<Predicate> {
        let mut sorted: Vec<RowIndex> = candidates.to_vec();
        sorted.sort_by_key(|r| self.cells[*r].key());

        let len: usize = sorted.len();
        if len < 2 {
            return None;
        }
        let position: usize = sorted.iter().position(|r| *r == solution)?;
        let keep: usize = keep.clamp(1, len - 1);

        // First candidate of the window
        let low: i64 = position.saturating_sub(keep - 1) as i64;
        let high: i64 = position.min(len - keep) as i64;
        let start: usize = rng.next_int(low, high) as usize;
        let end: usize = start + keep - 1;
        let cell = |i: usize| self.cells[sorted[i]].clone();

        let predicate: Predicate = if start == 0 {
            if rng.chance(0.5) {
                Predicate::LessThan(cell(end + 1))
            } else {
                Predicate::AtMost(cell(end))
            }
        } else if end == len - 1 {
            if rng.chance(0.5) {
                Predicate::GreaterThan(cell(start - 1))
            } else {
                Predicate::AtLeast(cell(start))
            }
        } else {
            Predicate::Between(cell(start - 1), cell(end + 1))
        };
        Some(predicate)
    }
}

/// Pick the kinds of the columns, discrete columns first.
///
/// Kinds only repeat once every kind of the same family has been used.
fn column_kinds(columns: usize, rng: &mut RandomSource) -> Vec<ColumnKind> {
    let discrete: usize =
        ((columns as f64 * DISCRETE_COLUMN_RATIO).round() as usize).min(columns - 1);
    let mut take_cycle = |family: &[ColumnKind], count: usize| -> Vec<ColumnKind> {
        let mut pool: Vec<ColumnKind> = family.to_vec();
        rng.shuffle(&mut pool);
        pool.iter().copied().cycle().take(count).collect()
    };

    let mut kinds: Vec<ColumnKind> = take_cycle(&ColumnKind::DISCRETE, discrete);
    kinds.extend(take_cycle(&ColumnKind::CONTINUOUS, columns - discrete));
    kinds
}

/// A database querier puzzle.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DatabaseQuerier {
    rows: usize,
    columns: Vec<Column>,
    solution: RowIndex,
}

impl DatabaseQuerier {
    /// Columns, in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Rows that satisfy every condition.
    pub fn matching_rows(&self) -> Vec<RowIndex> {
        let all: Vec<RowIndex> = (0..self.rows).collect();
        self.columns.iter().fold(all, |rows, c| c.filter(&rows))
    }

    fn attempt(
        rows: usize,
        num_columns: usize,
        max_discrete_values: usize,
        rng: &mut RandomSource,
    ) -> Result<Self, String> {
        let kinds: Vec<ColumnKind> = column_kinds(num_columns, rng);
        let solution: RowIndex = rng.index(rows);
        let mut candidates: Vec<RowIndex> = (0..rows).collect();
        let mut used_names: Vec<&str> = Vec::with_capacity(num_columns);
        let mut columns: Vec<Column> = Vec::with_capacity(num_columns);

        for (i, kind) in kinds.iter().enumerate() {
            let names: Vec<&str> = kind
                .names()
                .iter()
                .copied()
                .filter(|n| !used_names.contains(n))
                .collect();
            let name: &str = *rng.choice(&names).ok_or("no column name left")?;
            used_names.push(name);

            let mut column: Column = Column {
                name: name.to_string(),
                kind: *kind,
                cells: kind.generate(rows, max_discrete_values, rng)?,
                predicate: None,
            };

            if candidates.len() > 1 {
                column.predicate = if kind.is_continuous() {
                    // Spread the narrowing over the continuous columns left
                    let remaining: usize = kinds[i..].len();
                    let keep: usize = (candidates.len() * (remaining - 1)).div_ceil(remaining);
                    column.continuous_predicate(&candidates, solution, keep, rng)
                } else {
                    column.discrete_predicate(&candidates, solution, rng)
                };
                match &column.predicate {
                    Some(predicate) => {
                        let narrowed: Vec<RowIndex> = column.filter(&candidates);
                        if !narrowed.contains(&solution) || narrowed.len() >= candidates.len() {
                            return Err(format!("condition on {name} does not narrow the candidates"));
                        }
                        debug!(
                            "    {}: {} -> {} rows",
                            predicate.format(name),
                            candidates.len(),
                            narrowed.len()
                        );
                        candidates = narrowed;
                    }
                    None => debug!("    {name}: no condition removes a candidate"),
                }
            }
            columns.push(column);
        }

        if candidates != [solution] {
            return Err(format!("{} rows match every condition", candidates.len()));
        }

        // Until now, the discrete columns all come before the continuous columns
        rng.shuffle(&mut columns);
        Ok(Self {
            rows,
            columns,
            solution,
        })
    }
}

impl Puzzle for DatabaseQuerier {
    const KIND: GameKind = GameKind::DatabaseQuerier;
    type Answer = RowIndex;

    fn generate(params: &Parameters, rng: &mut RandomSource) -> Result<Self, Error> {
        let rows: usize = params.usize("rows")?;
        let columns: usize = params.usize("columns")?;
        let max_discrete_values: usize = params.usize("max_discrete_values")?;

        let puzzle: Self = regenerate(Self::KIND, MAX_ATTEMPTS, rng, |rng| {
            Self::attempt(rows, columns, max_discrete_values, rng)
        })?;

        if log_enabled!(Level::Debug) {
            for line in puzzle.to_string().lines() {
                debug!("    {line}");
            }
            debug!("    solution = row {}", puzzle.solution);
        }
        Ok(puzzle)
    }

    fn verify(&self, answer: &RowIndex) -> bool {
        *answer == self.solution
    }

    fn solution(&self) -> RowIndex {
        self.solution
    }
}

impl fmt::Display for DatabaseQuerier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| {
                c.cells
                    .iter()
                    .map(|v| v.to_string().len())
                    .chain([c.name.len()])
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{:<w$}", c.name))
            .collect();
        writeln!(f, "    {}", header.join("  "))?;
        for row in 0..self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(c, &w)| format!("{:<w$}", c.cells[row].to_string()))
                .collect();
            writeln!(f, "{row:>3} {}", cells.join("  "))?;
        }

        let conditions: Vec<String> = self
            .columns
            .iter()
            .filter_map(|c| c.predicate.as_ref().map(|p| p.format(&c.name)))
            .collect();
        write!(f, "\n{}", conditions.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyPresets;

    fn date(y: i32, m: u32, d: u32) -> Cell {
        Cell::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn scenario() -> DatabaseQuerier {
        DatabaseQuerier {
            rows: 3,
            columns: vec![
                Column {
                    name: String::from("quantity"),
                    kind: ColumnKind::Quantity,
                    cells: vec![Cell::Number(10), Cell::Number(29), Cell::Number(40)],
                    predicate: Some(Predicate::AtLeast(Cell::Number(29))),
                },
                Column {
                    name: String::from("date"),
                    kind: ColumnKind::Date,
                    cells: vec![date(2018, 1, 1), date(2018, 5, 5), date(2019, 1, 1)],
                    predicate: Some(Predicate::AtMost(date(2018, 8, 17))),
                },
            ],
            solution: 1,
        }
    }

    #[test]
    fn conditions_narrow_to_one_row() {
        let p = scenario();

        assert_eq!(p.matching_rows(), vec![1]);
        assert!(p.verify(&1));
        assert!(!p.verify(&0));
        assert!(p.to_string().contains("quantity >= 29"));
        assert!(p.to_string().contains("date <= 2018-08-17"));

        // Dropping a condition leaves the solution valid but ambiguous
        for i in 0..2 {
            let mut q = p.clone();
            q.columns[i].predicate = None;
            let rows = q.matching_rows();
            assert!(rows.contains(&1));
            assert!(rows.len() > 1);
        }
    }

    #[test]
    fn predicates_compare_cells() {
        assert!(Predicate::Between(Cell::Price(1000), Cell::Price(2000)).matches(&Cell::Price(1500)));
        assert!(!Predicate::Between(Cell::Price(1000), Cell::Price(2000)).matches(&Cell::Price(2000)));
        assert!(Predicate::NotEquals(Cell::Text("lost".into())).matches(&Cell::Text("shipped".into())));
        assert!(!Predicate::LessThan(Cell::Number(3)).matches(&Cell::Text("true".into())));
        assert_eq!(Cell::Price(1005).to_string(), "$10.05");
        assert_eq!(
            Predicate::Between(Cell::Number(3), Cell::Number(9)).format("age"),
            "3 < age < 9"
        );
    }

    #[test]
    fn generated_tables_have_one_matching_row() {
        let presets = DifficultyPresets::new();
        for preset in ["easy", "medium", "hard"] {
            let params = presets.resolve(GameKind::DatabaseQuerier, preset).unwrap();
            for seed in 0..10 {
                let p = DatabaseQuerier::generate(&params, &mut RandomSource::seeded(seed)).unwrap();

                assert_eq!(p.matching_rows(), vec![p.solution()]);
                assert!(p.columns().iter().any(|c| c.kind.is_continuous()));

                let names: BTreeSet<&str> = p.columns().iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names.len(), p.columns().len());
            }
        }
    }

    #[test]
    fn continuous_columns_are_sorted_and_distinct() {
        let params = DifficultyPresets::new()
            .resolve(GameKind::DatabaseQuerier, "hard")
            .unwrap();
        let p = DatabaseQuerier::generate(&params, &mut RandomSource::seeded(2)).unwrap();

        for c in p.columns().iter().filter(|c| c.kind.is_continuous()) {
            assert!(c.cells.windows(2).all(|w| w[0].key() < w[1].key()));
        }
    }

    #[test]
    fn discrete_columns_respect_the_value_limit() {
        let params = DifficultyPresets::new()
            .resolve(GameKind::DatabaseQuerier, "hard")
            .unwrap()
            .with("max_discrete_values", ParamValue::Int(2))
            .unwrap()
            .with("columns", ParamValue::Int(8))
            .unwrap();

        for seed in 0..5 {
            let p = DatabaseQuerier::generate(&params, &mut RandomSource::seeded(seed)).unwrap();
            for c in p.columns().iter().filter(|c| !c.kind.is_continuous()) {
                let values: Vec<String> = c.cells.iter().map(|v| v.to_string()).collect();
                let distinct: BTreeSet<&String> = values.iter().collect();
                assert!(distinct.len() <= 2);
            }
        }
    }
}
