/*
hex_editor.rs

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

//! Hex editor: link the left edge to the right edge of a grid of hexadecimal bytes.
//!
//! Each tile is a two-character label such as `9b`. Starting from the designated tile of the left
//! edge, the player moves to a side-by-side tile that shares at least one character with the
//! current tile, without visiting a tile twice, until a tile of the right edge is reached.
//!
//! The generator walks a random path across the grid ([`walk`]), adds dead-end branches, and fills
//! the remaining tiles with random labels. Random labels can open other routes to the right edge.
//! Any of these routes is a valid solution, unless the `unique_path` parameter is set, in which
//! case the grid is rejected when [`alternate`] finds a second route.

mod alternate;
mod grid;
mod links;
mod walk;

use log::{debug, info};
use serde::Serialize;
use std::fmt;

use super::{MAX_ATTEMPTS, regenerate};
use crate::difficulty::{BuiltinPreset, Difficulty, Domain, GameSchema, ParamSpec, ParamValue, Parameters};
use crate::error::{ConfigurationError, Error};
use crate::game::{GameKind, Puzzle};
use crate::random::RandomSource;
use alternate::{Alternate, AlternateError};
pub use grid::{Grid, Tile};
use links::Links;
use walk::RandomWalk;

/// Ordered `(x, y)` coordinates of the tiles the player visits.
pub type TilePath = Vec<(usize, usize)>;

pub const SCHEMA: GameSchema = GameSchema {
    parameters: &[
        ParamSpec {
            name: "width",
            domain: Domain::Int { min: 2, max: 16 },
            description: "Number of tiles per row",
        },
        ParamSpec {
            name: "height",
            domain: Domain::Int { min: 1, max: 12 },
            description: "Number of rows",
        },
        ParamSpec {
            name: "min_distance",
            domain: Domain::Int { min: 1, max: 8 },
            description: "Shortest straight run of the path",
        },
        ParamSpec {
            name: "max_distance",
            domain: Domain::Int { min: 1, max: 8 },
            description: "Longest straight run of the path",
        },
        ParamSpec {
            name: "branch_probability",
            domain: Domain::Ratio { min: 0.0, max: 1.0 },
            description: "Ratio of path tiles that start a dead-end branch",
        },
        ParamSpec {
            name: "unique_path",
            domain: Domain::Int { min: 0, max: 1 },
            description: "Whether grids with more than one solution path are rejected",
        },
    ],
    presets: &[
        BuiltinPreset {
            difficulty: Difficulty::Easy,
            values: &[
                ("width", ParamValue::Int(5)),
                ("height", ParamValue::Int(4)),
                ("min_distance", ParamValue::Int(1)),
                ("max_distance", ParamValue::Int(3)),
                ("branch_probability", ParamValue::Ratio(0.0)),
                ("unique_path", ParamValue::Int(1)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Medium,
            values: &[
                ("width", ParamValue::Int(8)),
                ("height", ParamValue::Int(6)),
                ("min_distance", ParamValue::Int(1)),
                ("max_distance", ParamValue::Int(4)),
                ("branch_probability", ParamValue::Ratio(0.3)),
                ("unique_path", ParamValue::Int(0)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Hard,
            values: &[
                ("width", ParamValue::Int(12)),
                ("height", ParamValue::Int(8)),
                ("min_distance", ParamValue::Int(2)),
                ("max_distance", ParamValue::Int(6)),
                ("branch_probability", ParamValue::Ratio(0.6)),
                ("unique_path", ParamValue::Int(0)),
            ],
        },
    ],
};

/// A hex editor puzzle.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HexEditor {
    grid: Grid,

    /// Starting tile, on the left edge.
    start: (usize, usize),

    /// Path walked by the generator.
    solution: TilePath,

    /// Whether the solution is the only path to the right edge.
    unique: bool,
}

impl HexEditor {
    /// Grid of tiles.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Starting tile.
    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    /// Whether the solution is the only path to the right edge.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Whether the player can move from one tile to the other.
    pub fn can_move(&self, from: (usize, usize), to: (usize, usize)) -> bool {
        match (self.grid.get(from.0, from.1), self.grid.get(to.0, to.1)) {
            (Some(a), Some(b)) => self.grid.is_adjacent(from, to) && a.shares_with(&b),
            _ => false,
        }
    }

    /// Build a candidate grid.
    fn attempt(
        width: usize,
        height: usize,
        walk: &RandomWalk,
        branch_probability: f64,
        unique_path: bool,
        rng: &mut RandomSource,
    ) -> Result<Self, String> {
        let mut grid: Grid = Grid::new(width, height);
        let path: Vec<usize> = walk.generate(&mut grid, rng);
        walk.branch(&mut grid, &path, branch_probability, rng);
        grid.fill(rng);

        let starting_tile: usize = path.first().copied().unwrap_or_default();
        let solution: TilePath = path.iter().map(|t| grid.coordinates(*t)).collect();

        if unique_path {
            let links: Links = Links::new(&grid);
            links.debug();
            match Alternate::new(&grid, &links, starting_tile).count_paths(2) {
                Ok(1) => (),
                Ok(n) => return Err(format!("{n} paths reach the right edge")),
                Err(AlternateError::IterationsExceeded) => {
                    return Err(String::from("alternate path search exceeded its budget"));
                }
            }
        }

        Ok(Self {
            start: grid.coordinates(starting_tile),
            grid,
            solution,
            unique: unique_path,
        })
    }
}

impl Puzzle for HexEditor {
    const KIND: GameKind = GameKind::HexEditor;
    type Answer = TilePath;

    fn generate(params: &Parameters, rng: &mut RandomSource) -> Result<Self, Error> {
        let width: usize = params.usize("width")?;
        let height: usize = params.usize("height")?;
        let min_distance: i64 = params.int("min_distance")?;
        let max_distance: i64 = params.int("max_distance")?;
        let branch_probability: f64 = params.ratio("branch_probability")?;
        let unique_path: bool = params.flag("unique_path")?;

        if min_distance > max_distance {
            return Err(ConfigurationError::invalid(
                Self::KIND,
                "min_distance",
                format!("{min_distance} is greater than max_distance ({max_distance})"),
            )
            .into());
        }
        debug!(
            "Hex editor: {width}x{height}  distance = {min_distance}..={max_distance}  branches = {branch_probability}  unique = {unique_path}"
        );

        let walk: RandomWalk = RandomWalk::new(min_distance, max_distance);
        let puzzle: Self = regenerate(Self::KIND, MAX_ATTEMPTS, rng, |rng| {
            Self::attempt(width, height, &walk, branch_probability, unique_path, rng)
        })?;

        puzzle.grid.debug(puzzle.start);
        info!(
            "Hex editor: path of {} tiles from {:?}",
            puzzle.solution.len(),
            puzzle.start
        );
        Ok(puzzle)
    }

    fn verify(&self, answer: &TilePath) -> bool {
        if answer.first() != Some(&self.start) {
            return false;
        }
        if answer.iter().any(|(x, y)| !self.grid.contains(*x, *y)) {
            debug!("Hex editor: tile outside of the grid");
            return false;
        }
        let tiles: Vec<usize> = answer.iter().map(|(x, y)| self.grid.index(*x, *y)).collect();

        let mut visited: Vec<bool> = vec![false; self.grid.len()];
        if tiles.iter().any(|t| std::mem::replace(&mut visited[*t], true)) {
            debug!("Hex editor: a tile is visited twice");
            return false;
        }

        let links: Links = Links::new(&self.grid);
        if !tiles.windows(2).all(|pair| links.is_linked(pair[0], pair[1])) {
            debug!("Hex editor: invalid move");
            return false;
        }

        // The path ends on the first tile of the right edge it reaches
        let exits: Vec<usize> = answer
            .iter()
            .enumerate()
            .filter(|(_, (x, _))| self.grid.is_exit(*x))
            .map(|(i, _)| i)
            .collect();
        exits == [answer.len() - 1]
    }

    fn solution(&self) -> TilePath {
        self.solution.clone()
    }
}

impl fmt::Display for HexEditor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rows: Vec<String> = (0..self.grid.height)
            .map(|y| {
                (0..self.grid.width)
                    .map(|x| match self.grid.get(x, y) {
                        Some(t) if (x, y) == self.start => format!("[{t}]"),
                        Some(t) => format!(" {t} "),
                        None => String::from(" .. "),
                    })
                    .collect::<String>()
            })
            .collect();
        write!(f, "{}", rows.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyPresets;

    fn generate(preset: &str, seed: u64) -> HexEditor {
        let params = DifficultyPresets::new()
            .resolve(GameKind::HexEditor, preset)
            .unwrap();
        HexEditor::generate(&params, &mut RandomSource::seeded(seed)).unwrap()
    }

    fn scenario() -> HexEditor {
        // [61] 1c  c4
        //  ff  9b  b0
        let grid = Grid::from_rows(&[&["61", "1c", "c4"], &["ff", "9b", "b0"]]).unwrap();
        HexEditor {
            grid,
            start: (0, 0),
            solution: vec![(0, 0), (1, 0), (2, 0)],
            unique: true,
        }
    }

    #[test]
    fn moves_need_a_shared_character() {
        let p = scenario();

        assert!(p.verify(&vec![(0, 0), (1, 0), (2, 0)]));
        // 1c and 9b share nothing
        assert!(!p.verify(&vec![(0, 0), (1, 0), (1, 1), (2, 1)]));
        // Jump over a tile
        assert!(!p.verify(&vec![(0, 0), (2, 0)]));
        // Wrong start
        assert!(!p.verify(&vec![(0, 1), (1, 1), (2, 1)]));
        // Stops before the right edge
        assert!(!p.verify(&vec![(0, 0), (1, 0)]));
        assert!(!p.verify(&vec![]));
        // Leaves the grid
        assert!(!p.verify(&vec![(0, 0), (1, 0), (2, 0), (3, 0)]));
        assert!(!p.verify(&vec![(0, 0), (0, 2), (1, 2), (2, 2)]));
    }

    #[test]
    fn moves_follow_the_links() {
        let p = scenario();
        let links = Links::new(p.grid());

        let moves = [((0, 0), (1, 0)), ((1, 0), (1, 1)), ((2, 0), (2, 1)), ((1, 1), (2, 1))];
        for (from, to) in moves {
            let (a, b) = (p.grid().index(from.0, from.1), p.grid().index(to.0, to.1));
            let linked = links.is_linked(a, b);
            assert_eq!(p.can_move(from, to), linked, "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn path_ends_at_the_first_exit() {
        // [12] 23  34
        //  ab  b3  4a
        let grid = Grid::from_rows(&[&["12", "23", "34"], &["ab", "b3", "4a"]]).unwrap();
        let p = HexEditor {
            grid,
            start: (0, 0),
            solution: vec![(0, 0), (1, 0), (2, 0)],
            unique: false,
        };

        assert!(p.can_move((2, 0), (2, 1)));
        assert!(!p.verify(&vec![(0, 0), (1, 0), (2, 0), (2, 1)]));
        assert!(!p.verify(&vec![(0, 0), (1, 0), (0, 0), (1, 0), (2, 0)]));
    }

    #[test]
    fn embedded_solution_verifies() {
        for preset in ["easy", "medium", "hard"] {
            for seed in 0..10 {
                let p = generate(preset, seed);
                assert_eq!(p.start().0, 0);
                assert!(p.verify(&p.solution()), "{preset} seed {seed}");
            }
        }
    }

    #[test]
    fn easy_grids_have_a_single_path() {
        for seed in 0..10 {
            let p = generate("easy", seed);
            let links = Links::new(p.grid());
            let start = p.grid().index(p.start().0, p.start().1);

            assert!(p.is_unique());
            assert_eq!(Alternate::new(p.grid(), &links, start).count_paths(3), Ok(1));
        }
    }

    #[test]
    fn inverted_distances_are_rejected() {
        let params = DifficultyPresets::new()
            .resolve(GameKind::HexEditor, "medium")
            .unwrap()
            .with("min_distance", ParamValue::Int(5))
            .unwrap()
            .with("max_distance", ParamValue::Int(2))
            .unwrap();

        assert!(matches!(
            HexEditor::generate(&params, &mut RandomSource::seeded(0)),
            Err(Error::Configuration(ConfigurationError::InvalidValue { .. }))
        ));
    }
}
