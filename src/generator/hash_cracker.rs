/*
hash_cracker.rs

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

//! Hash cracker: complete a grid of password hashes.
//!
//! The hashes form a Latin rectangle: each one uses every character of the charset exactly once,
//! and no character appears twice in the same column. Some characters are masked, and the player
//! types the complete hashes back. The generator only masks a character when the grid still has a
//! single completion.
//!
//! ```text
//! charset: 1 7 a e
//!    root:  0x7a?e
//!  daemon:  0x?1e7
//!     bin:  0xe??a
//! ```

use log::{Level, debug, log_enabled};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

use super::{MAX_ATTEMPTS, regenerate};
use crate::difficulty::{BuiltinPreset, Difficulty, Domain, GameSchema, ParamSpec, ParamValue, Parameters};
use crate::error::{ConfigurationError, Error};
use crate::game::{GameKind, Puzzle};
use crate::random::RandomSource;

/// Characters the charset is drawn from.
const VALID_CHARS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

/// Prefix of every hash.
const PREFIX_STRING: &str = "0x";

/// Max number of solver steps for one uniqueness check, otherwise the mask is not kept.
const MAX_SOLVER_ITERATIONS: usize = 100_000;

/// Names shown in front of the hashes.
const USERNAMES: [&str; 43] = [
    "lostatc", "root", "daemon", "bin", "sys", "sync", "games", "man", "mail", "news", "uucp",
    "proxy", "www-data", "backup", "list", "irc", "nobody", "systemd-network", "systemd-resolve",
    "syslog", "messagebus", "uuidd", "usbmux", "dnsmasq", "rtkit", "saned", "pulse", "avahi",
    "colord", "gdm", "libvirt-qemu", "chrony", "lp", "nscd", "polkitd", "postfix", "sshd",
    "mysql", "svn", "redis", "statd", "rpc", "kernoops",
];

pub const SCHEMA: GameSchema = GameSchema {
    parameters: &[
        ParamSpec {
            name: "columns",
            domain: Domain::Int { min: 3, max: 8 },
            description: "Length of a hash, which is also the size of the charset",
        },
        ParamSpec {
            name: "rows",
            domain: Domain::Int { min: 2, max: 8 },
            description: "Number of hashes, at most the number of columns",
        },
        ParamSpec {
            name: "hidden_ratio",
            domain: Domain::Ratio { min: 0.1, max: 0.9 },
            description: "Ratio of characters to mask",
        },
    ],
    presets: &[
        BuiltinPreset {
            difficulty: Difficulty::Easy,
            values: &[
                ("columns", ParamValue::Int(4)),
                ("rows", ParamValue::Int(3)),
                ("hidden_ratio", ParamValue::Ratio(0.3)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Medium,
            values: &[
                ("columns", ParamValue::Int(5)),
                ("rows", ParamValue::Int(4)),
                ("hidden_ratio", ParamValue::Ratio(0.45)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Hard,
            values: &[
                ("columns", ParamValue::Int(7)),
                ("rows", ParamValue::Int(6)),
                ("hidden_ratio", ParamValue::Ratio(0.6)),
            ],
        },
    ],
};

/// Complete hashes typed by the player, without the `0x` prefix.
pub type CrackedGrid = Vec<String>;

/// Grid with masked cells.
type PartialGrid = Vec<Vec<Option<char>>>;

/// Backtracking solver counting the completions of a partial grid.
struct Solver<'a> {
    alphabet: &'a [char],

    /// Number of steps of the last count.
    iteration: usize,
}

impl<'a> Solver<'a> {
    fn new(alphabet: &'a [char]) -> Self {
        Self {
            alphabet,
            iteration: 0,
        }
    }

    /// Characters that can go in the cell.
    fn candidates(&self, grid: &PartialGrid, row: usize, column: usize) -> Vec<char> {
        self.alphabet
            .iter()
            .copied()
            .filter(|c| {
                !grid[row].contains(&Some(*c)) && !grid.iter().any(|r| r[column] == Some(*c))
            })
            .collect()
    }

    /// Count the completions of the grid, up to `limit`.
    ///
    /// Return [`None`] when the count takes too many steps.
    fn count(&mut self, grid: &mut PartialGrid, limit: usize) -> Option<usize> {
        self.iteration = 0;
        let mut found: usize = 0;
        self.search(grid, limit, &mut found).map(|()| found)
    }

    fn search(&mut self, grid: &mut PartialGrid, limit: usize, found: &mut usize) -> Option<()> {
        self.iteration += 1;
        if self.iteration > MAX_SOLVER_ITERATIONS {
            return None;
        }

        // Fill the masked cell with the fewest candidates first
        let mut best: Option<(usize, usize, Vec<char>)> = None;
        for (r, row) in grid.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_none() {
                    let candidates: Vec<char> = self.candidates(grid, r, c);
                    if best.as_ref().is_none_or(|b| candidates.len() < b.2.len()) {
                        best = Some((r, c, candidates));
                    }
                }
            }
        }

        let Some((r, c, candidates)) = best else {
            *found += 1;
            return Some(());
        };
        for candidate in candidates {
            grid[r][c] = Some(candidate);
            self.search(grid, limit, found)?;
            grid[r][c] = None;
            if *found >= limit {
                break;
            }
        }
        Some(())
    }
}

/// Build a random Latin rectangle row by row.
///
/// Each row is a permutation of the alphabet. Characters are picked at random among the ones not
/// yet used in the row or the column, backtracking when a position has no candidate left.
fn create_grid(rows: usize, alphabet: &[char], rng: &mut RandomSource) -> Vec<Vec<char>> {
    let columns: usize = alphabet.len();
    let mut grid: Vec<Vec<char>> = Vec::with_capacity(rows);

    while grid.len() < rows {
        let mut row: Vec<char> = Vec::with_capacity(columns);

        // Characters already tried at each position of the row
        let mut rejected: Vec<Vec<char>> = vec![Vec::new(); columns];

        while row.len() < columns {
            let column: usize = row.len();
            let candidates: Vec<char> = alphabet
                .iter()
                .copied()
                .filter(|c| {
                    !row.contains(c)
                        && !rejected[column].contains(c)
                        && !grid.iter().any(|r| r[column] == *c)
                })
                .collect();

            match rng.choice(&candidates) {
                Some(c) => row.push(*c),
                None => {
                    // Backtrack to the previous position. The characters tried after it are
                    // valid again.
                    rejected[column].clear();
                    match row.pop() {
                        Some(c) => rejected[column - 1].push(c),
                        None => break,
                    }
                }
            }
        }
        grid.push(row);
    }
    grid
}

/// A hash cracker puzzle.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HashCracker {
    /// Characters of every hash, in display order.
    alphabet: Vec<char>,

    /// User name of each hash.
    users: Vec<String>,

    /// Grid shown to the player; masked cells are [`None`].
    shown: PartialGrid,

    solution: Vec<Vec<char>>,
}

impl HashCracker {
    /// Charset of the hashes.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Grid shown to the player.
    pub fn shown(&self) -> &[Vec<Option<char>>] {
        &self.shown
    }

    /// Number of masked cells.
    pub fn num_hidden(&self) -> usize {
        self.shown.iter().flatten().filter(|c| c.is_none()).count()
    }

    /// Count the completions of the shown grid, up to `limit`.
    pub fn count_completions(&self, limit: usize) -> Option<usize> {
        Solver::new(&self.alphabet).count(&mut self.shown.clone(), limit)
    }

    fn attempt(
        rows: usize,
        columns: usize,
        hidden_ratio: f64,
        rng: &mut RandomSource,
    ) -> Result<Self, String> {
        let mut alphabet: Vec<char> = rng.sample(&VALID_CHARS, columns);
        let solution: Vec<Vec<char>> = create_grid(rows, &alphabet, rng);
        if solution.iter().any(|r| r.len() != columns) {
            return Err(String::from("incomplete grid"));
        }
        alphabet.sort();

        // Mask cells in random order, keeping a mask only if the completion stays unique
        let target: usize = (rows as f64 * columns as f64 * hidden_ratio).round() as usize;
        let mut shown: PartialGrid = solution
            .iter()
            .map(|r| r.iter().map(|c| Some(*c)).collect())
            .collect();
        let mut cells: Vec<(usize, usize)> = (0..rows)
            .flat_map(|r| (0..columns).map(move |c| (r, c)))
            .collect();
        rng.shuffle(&mut cells);

        let start: Instant = Instant::now();
        let mut solver: Solver = Solver::new(&alphabet);
        let mut hidden: usize = 0;
        let mut iterations: usize = 0;
        for (r, c) in cells {
            if hidden >= target {
                break;
            }
            let value: Option<char> = shown[r][c].take();
            let mut work: PartialGrid = shown.clone();
            let count: Option<usize> = solver.count(&mut work, 2);
            iterations += solver.iteration;
            if count == Some(1) {
                hidden += 1;
            } else {
                shown[r][c] = value;
            }
        }
        debug!(
            "Hash cracker: hidden = {hidden}/{target}  Iterations = {iterations}  Duration = {}",
            start.elapsed().as_secs_f32()
        );
        if hidden == 0 {
            return Err(String::from("no cell can be masked"));
        }

        let users: Vec<String> = rng
            .sample(&USERNAMES, rows)
            .into_iter()
            .map(String::from)
            .collect();
        Ok(Self {
            alphabet,
            users,
            shown,
            solution,
        })
    }
}

impl Puzzle for HashCracker {
    const KIND: GameKind = GameKind::HashCracker;
    type Answer = CrackedGrid;

    fn generate(params: &Parameters, rng: &mut RandomSource) -> Result<Self, Error> {
        let columns: usize = params.usize("columns")?;
        let rows: usize = params.usize("rows")?;
        let hidden_ratio: f64 = params.ratio("hidden_ratio")?;

        if rows > columns {
            return Err(ConfigurationError::invalid(
                Self::KIND,
                "rows",
                format!("{rows} is greater than columns ({columns})"),
            )
            .into());
        }

        let puzzle: Self = regenerate(Self::KIND, MAX_ATTEMPTS, rng, |rng| {
            Self::attempt(rows, columns, hidden_ratio, rng)
        })?;

        if log_enabled!(Level::Debug) {
            for line in puzzle.to_string().lines() {
                debug!("    {line}");
            }
        }
        Ok(puzzle)
    }

    fn verify(&self, answer: &CrackedGrid) -> bool {
        if answer.len() != self.shown.len() {
            return false;
        }
        let grid: Vec<Vec<char>> = answer
            .iter()
            .map(|r| r.trim().trim_start_matches(PREFIX_STRING).to_lowercase().chars().collect())
            .collect();

        for (row, shown) in grid.iter().zip(&self.shown) {
            if row.len() != shown.len() {
                return false;
            }
            // Shown characters must be kept and every character belongs to the charset
            if row.iter().zip(shown).any(|(c, s)| s.is_some_and(|s| s != *c)) {
                return false;
            }
            if row.iter().any(|c| !self.alphabet.contains(c)) {
                return false;
            }
            if (1..row.len()).any(|i| row[..i].contains(&row[i])) {
                return false;
            }
        }

        let columns: usize = self.alphabet.len();
        (0..columns).all(|c| {
            (1..grid.len()).all(|r| !grid[..r].iter().any(|other| other[c] == grid[r][c]))
        })
    }

    fn solution(&self) -> CrackedGrid {
        self.solution
            .iter()
            .map(|r| r.iter().collect())
            .collect()
    }
}

impl fmt::Display for HashCracker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width: usize = self.users.iter().map(|u| u.len()).max().unwrap_or_default();
        let charset: Vec<String> = self.alphabet.iter().map(|c| c.to_string()).collect();

        write!(f, "{:>width$}  {}", "charset:", charset.join(" "))?;
        for (user, row) in self.users.iter().zip(&self.shown) {
            let hash: String = row.iter().map(|c| c.unwrap_or('?')).collect();
            write!(f, "\n{user:>width$}:  {PREFIX_STRING}{hash}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyPresets;

    fn generate(preset: &str, seed: u64) -> HashCracker {
        let params = DifficultyPresets::new()
            .resolve(GameKind::HashCracker, preset)
            .unwrap();
        HashCracker::generate(&params, &mut RandomSource::seeded(seed)).unwrap()
    }

    #[test]
    fn grid_is_a_latin_rectangle() {
        let mut rng = RandomSource::seeded(8);
        let alphabet: Vec<char> = "0123456".chars().collect();
        let grid = create_grid(7, &alphabet, &mut rng);

        for row in &grid {
            let mut sorted = row.clone();
            sorted.sort();
            assert_eq!(sorted, alphabet);
        }
        for c in 0..alphabet.len() {
            let mut column: Vec<char> = grid.iter().map(|r| r[c]).collect();
            column.sort();
            column.dedup();
            assert_eq!(column.len(), grid.len());
        }
    }

    #[test]
    fn solver_counts_completions() {
        let alphabet = ['a', 'b', 'c'];
        let mut solver = Solver::new(&alphabet);

        // Two rows over three characters: the masked cells have one answer
        let mut grid: PartialGrid = vec![
            vec![Some('a'), None, Some('c')],
            vec![Some('b'), Some('c'), None],
        ];
        assert_eq!(solver.count(&mut grid, 2), Some(1));

        // A fully masked second row has two completions
        let mut grid: PartialGrid = vec![vec![Some('a'), Some('b'), Some('c')], vec![None; 3]];
        assert_eq!(solver.count(&mut grid, 5), Some(2));
    }

    #[test]
    fn masked_grids_have_one_completion() {
        for preset in ["easy", "medium", "hard"] {
            for seed in 0..5 {
                let p = generate(preset, seed);
                assert!(p.num_hidden() > 0);
                assert_eq!(p.count_completions(2), Some(1));
                assert!(p.verify(&p.solution()), "{preset} seed {seed}");
            }
        }
    }

    #[test]
    fn wrong_grids_are_rejected() {
        let p = generate("medium", 3);
        let solution = p.solution();

        // Swapping two characters of a row breaks a column or a shown cell
        let mut swapped = solution.clone();
        let mut chars: Vec<char> = swapped[0].chars().collect();
        chars.swap(0, 1);
        swapped[0] = chars.into_iter().collect();
        assert!(!p.verify(&swapped));

        assert!(!p.verify(&solution[1..].to_vec()));
        assert!(p.verify(&solution.iter().map(|r| format!("0x{}", r.to_uppercase())).collect()));
    }

    #[test]
    fn more_rows_than_columns_is_a_configuration_error() {
        let params = DifficultyPresets::new()
            .resolve(GameKind::HashCracker, "easy")
            .unwrap()
            .with("rows", ParamValue::Int(6))
            .unwrap();

        assert!(matches!(
            HashCracker::generate(&params, &mut RandomSource::seeded(0)),
            Err(Error::Configuration(ConfigurationError::InvalidValue { .. }))
        ));
    }
}
