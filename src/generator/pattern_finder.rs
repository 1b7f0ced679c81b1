/*
pattern_finder.rs

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

//! Pattern finder: pick the exact negative of a pattern among look-alikes.
//!
//! The candidates are all negatives of the pattern, but every one except the answer has a few
//! cells flipped back.

use log::{Level, debug, log_enabled};
use serde::Serialize;
use std::fmt;

use super::{MAX_ATTEMPTS, regenerate};
use crate::difficulty::{BuiltinPreset, Difficulty, Domain, GameSchema, ParamSpec, ParamValue, Parameters};
use crate::error::{ConfigurationError, Error};
use crate::game::{GameKind, Puzzle};
use crate::random::RandomSource;

const ON_STRING: &str = "##";
const OFF_STRING: &str = "..";

/// Index of a candidate.
pub type Choice = usize;

pub const SCHEMA: GameSchema = GameSchema {
    parameters: &[
        ParamSpec {
            name: "width",
            domain: Domain::Int { min: 2, max: 12 },
            description: "Number of cells per row",
        },
        ParamSpec {
            name: "height",
            domain: Domain::Int { min: 2, max: 12 },
            description: "Number of rows",
        },
        ParamSpec {
            name: "choices",
            domain: Domain::Int { min: 2, max: 8 },
            description: "Number of candidates",
        },
        ParamSpec {
            name: "cells_to_flip",
            domain: Domain::Int { min: 1, max: 64 },
            description: "Number of cells that differ between a wrong candidate and the answer",
        },
        ParamSpec {
            name: "coverage",
            domain: Domain::Ratio { min: 0.1, max: 0.9 },
            description: "Ratio of cells that are on in the pattern",
        },
    ],
    presets: &[
        BuiltinPreset {
            difficulty: Difficulty::Easy,
            values: &[
                ("width", ParamValue::Int(4)),
                ("height", ParamValue::Int(4)),
                ("choices", ParamValue::Int(3)),
                ("cells_to_flip", ParamValue::Int(3)),
                ("coverage", ParamValue::Ratio(0.5)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Medium,
            values: &[
                ("width", ParamValue::Int(6)),
                ("height", ParamValue::Int(6)),
                ("choices", ParamValue::Int(4)),
                ("cells_to_flip", ParamValue::Int(2)),
                ("coverage", ParamValue::Ratio(0.5)),
            ],
        },
        BuiltinPreset {
            difficulty: Difficulty::Hard,
            values: &[
                ("width", ParamValue::Int(8)),
                ("height", ParamValue::Int(8)),
                ("choices", ParamValue::Int(6)),
                ("cells_to_flip", ParamValue::Int(1)),
                ("coverage", ParamValue::Ratio(0.5)),
            ],
        },
    ],
};

/// A grid of cells that are either on or off.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PatternGrid {
    grid: Vec<Vec<bool>>,
}

impl PatternGrid {
    /// Create a random grid where each cell is on with the `coverage` probability.
    pub fn random(width: usize, height: usize, coverage: f64, rng: &mut RandomSource) -> Self {
        Self {
            grid: (0..height)
                .map(|_| (0..width).map(|_| rng.chance(coverage)).collect())
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.grid.first().map_or(0, |r| r.len())
    }

    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Grid with every cell flipped.
    pub fn negative(&self) -> Self {
        Self {
            grid: self
                .grid
                .iter()
                .map(|row| row.iter().map(|c| !c).collect())
                .collect(),
        }
    }

    /// Whether the given grid is the negative of this one.
    pub fn is_negative(&self, other: &PatternGrid) -> bool {
        self.negative() == *other
    }

    /// Flip `cells_to_flip` distinct random cells.
    pub fn scramble(&mut self, cells_to_flip: usize, rng: &mut RandomSource) {
        let cells: Vec<(usize, usize)> = (0..self.height())
            .flat_map(|y| (0..self.width()).map(move |x| (x, y)))
            .collect();

        for (x, y) in rng.sample(&cells, cells_to_flip) {
            self.grid[y][x] = !self.grid[y][x];
        }
    }

    /// Number of cells that differ between the two grids.
    pub fn distance(&self, other: &PatternGrid) -> usize {
        self.grid
            .iter()
            .flatten()
            .zip(other.grid.iter().flatten())
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl fmt::Display for PatternGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rows: Vec<String> = self
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| if *c { ON_STRING } else { OFF_STRING })
                    .collect()
            })
            .collect();
        write!(f, "{}", rows.join("\n"))
    }
}

/// A pattern finder puzzle.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PatternFinder {
    pattern: PatternGrid,
    choices: Vec<PatternGrid>,
    answer: Choice,
}

impl PatternFinder {
    /// Pattern to find the negative of.
    pub fn pattern(&self) -> &PatternGrid {
        &self.pattern
    }

    /// Candidates.
    pub fn choices(&self) -> &[PatternGrid] {
        &self.choices
    }
}

impl Puzzle for PatternFinder {
    const KIND: GameKind = GameKind::PatternFinder;
    type Answer = Choice;

    fn generate(params: &Parameters, rng: &mut RandomSource) -> Result<Self, Error> {
        let width: usize = params.usize("width")?;
        let height: usize = params.usize("height")?;
        let choices: usize = params.usize("choices")?;
        let cells_to_flip: usize = params.usize("cells_to_flip")?;
        let coverage: f64 = params.ratio("coverage")?;

        if cells_to_flip > width * height {
            return Err(ConfigurationError::invalid(
                Self::KIND,
                "cells_to_flip",
                format!("{cells_to_flip} is greater than the {} cells of the grid", width * height),
            )
            .into());
        }

        let puzzle: Self = regenerate(Self::KIND, MAX_ATTEMPTS, rng, |rng| {
            let pattern: PatternGrid = PatternGrid::random(width, height, coverage, rng);
            let negative: PatternGrid = pattern.negative();

            // The first candidate is the answer until the candidates are shuffled
            let mut candidates: Vec<(bool, PatternGrid)> = vec![(true, negative.clone())];
            for _ in 1..choices {
                let mut decoy: PatternGrid = negative.clone();
                decoy.scramble(cells_to_flip, rng);
                candidates.push((false, decoy));
            }
            rng.shuffle(&mut candidates);

            let answer: Choice = candidates
                .iter()
                .position(|(is_answer, _)| *is_answer)
                .ok_or("answer lost")?;
            let choices: Vec<PatternGrid> = candidates.into_iter().map(|(_, g)| g).collect();
            if choices.iter().filter(|c| pattern.is_negative(c)).count() != 1 {
                return Err(String::from("a decoy matches the pattern"));
            }
            Ok(Self {
                pattern,
                choices,
                answer,
            })
        })?;

        if log_enabled!(Level::Debug) {
            debug!("Pattern finder: answer = {}", puzzle.answer);
            for line in puzzle.pattern.to_string().lines() {
                debug!("    {line}");
            }
        }
        Ok(puzzle)
    }

    fn verify(&self, answer: &Choice) -> bool {
        self.choices
            .get(*answer)
            .is_some_and(|c| self.pattern.is_negative(c))
    }

    fn solution(&self) -> Choice {
        self.answer
    }
}

impl fmt::Display for PatternFinder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pattern)?;
        for (i, choice) in self.choices.iter().enumerate() {
            write!(f, "\n\n[{i}]\n{choice}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyPresets;

    fn generate(preset: &str, seed: u64) -> PatternFinder {
        let params = DifficultyPresets::new()
            .resolve(GameKind::PatternFinder, preset)
            .unwrap();
        PatternFinder::generate(&params, &mut RandomSource::seeded(seed)).unwrap()
    }

    #[test]
    fn negative_flips_every_cell() {
        let mut rng = RandomSource::seeded(1);
        let grid = PatternGrid::random(5, 3, 0.5, &mut rng);

        assert!(grid.is_negative(&grid.negative()));
        assert_eq!(grid.distance(&grid.negative()), 15);
        assert_eq!(grid.negative().negative(), grid);
    }

    #[test]
    fn scramble_flips_distinct_cells() {
        let mut rng = RandomSource::seeded(2);
        let grid = PatternGrid::random(4, 4, 0.5, &mut rng);

        for flips in [1, 7, 16] {
            let mut scrambled = grid.clone();
            scrambled.scramble(flips, &mut rng);
            assert_eq!(grid.distance(&scrambled), flips);
        }
    }

    #[test]
    fn only_the_answer_is_the_negative() {
        for preset in ["easy", "medium", "hard"] {
            for seed in 0..10 {
                let p = generate(preset, seed);
                let matching: Vec<Choice> = (0..p.choices().len()).filter(|i| p.verify(i)).collect();

                assert_eq!(matching, vec![p.solution()]);
                assert!(!p.verify(&p.choices().len()));
            }
        }
    }

    #[test]
    fn decoys_differ_by_the_flipped_cells() {
        let p = generate("easy", 4);
        let negative = p.pattern().negative();

        for (i, choice) in p.choices().iter().enumerate() {
            let expected = if i == p.solution() { 0 } else { 3 };
            assert_eq!(negative.distance(choice), expected);
        }
    }

    #[test]
    fn too_many_flips_for_the_grid() {
        let params = DifficultyPresets::new()
            .resolve(GameKind::PatternFinder, "easy")
            .unwrap()
            .with("cells_to_flip", ParamValue::Int(17))
            .unwrap();

        assert!(matches!(
            PatternFinder::generate(&params, &mut RandomSource::seeded(0)),
            Err(Error::Configuration(ConfigurationError::InvalidValue { .. }))
        ));
    }
}
