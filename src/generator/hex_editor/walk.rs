/*
walk.rs

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

//! Generate the random path of the hex editor, and its dead-end branches.

use log::debug;
use std::time::Instant;

use super::grid::{Grid, Tile};
use crate::random::RandomSource;

/// Longest dead-end branch, in tiles.
const MAX_BRANCH_LENGTH: i64 = 4;

/// Directions the path can take. The path never goes back west, so it always reaches the right
/// edge.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Direction {
    North,
    East,
    South,
}

impl Direction {
    /// Relative weight of the direction. Sideways moves are twice as likely as forward moves.
    fn weight(&self) -> i64 {
        match self {
            Direction::East => 1,
            Direction::North | Direction::South => 2,
        }
    }

    /// Coordinates of the next tile in that direction, if inside the grid.
    fn step(&self, grid: &Grid, (x, y): (usize, usize)) -> Option<(usize, usize)> {
        let adjacent = grid.get_adjacent(x, y);
        match self {
            Direction::North => adjacent.n,
            Direction::East => adjacent.e,
            Direction::South => adjacent.s,
        }
    }
}

/// [`RandomWalk`] object.
pub struct RandomWalk {
    /// Shortest straight run before changing direction.
    min_distance: i64,

    /// Longest straight run before changing direction.
    max_distance: i64,
}

impl RandomWalk {
    /// Create the object.
    pub fn new(min_distance: i64, max_distance: i64) -> Self {
        Self {
            min_distance,
            max_distance,
        }
    }

    /// Walk from a random tile of the left edge to the right edge, labelling the tiles of the
    /// path in the grid, and return the indexes of the path tiles.
    ///
    /// Each tile of the path shares a character with the previous one. Labelled tiles are the
    /// visited ones, so the walk never crosses itself.
    pub fn generate(&self, grid: &mut Grid, rng: &mut RandomSource) -> Vec<usize> {
        let start: Instant = Instant::now();
        let mut turns: usize = 0;

        let mut path: Vec<usize> = Vec::with_capacity(grid.len());
        let mut current: (usize, usize) = (0, rng.index(grid.height));
        let mut previous: Tile = Tile::random(rng);

        grid.set(current.0, current.1, previous);
        path.push(grid.index(current.0, current.1));

        while !grid.is_exit(current.0) {
            turns += 1;

            // Directions toward a free tile
            let choices: Vec<Direction> = [Direction::East, Direction::North, Direction::South]
                .into_iter()
                .filter(|d| d.step(grid, current).is_some_and(|(x, y)| !grid.is_used(x, y)))
                .collect();
            let total: i64 = choices.iter().map(|d| d.weight()).sum();
            let mut pick: i64 = rng.next_int(1, total);
            let direction: Direction = choices
                .iter()
                .copied()
                .find(|d| {
                    pick -= d.weight();
                    pick <= 0
                })
                .unwrap_or(Direction::East);

            let distance: i64 = rng.next_int(self.min_distance, self.max_distance);
            debug!("    Walking {direction:?} for {distance} tiles from {current:?}");
            for _ in 0..distance {
                match direction.step(grid, current) {
                    Some((x, y)) if !grid.is_used(x, y) => {
                        previous = Tile::from_existing(previous, rng);
                        grid.set(x, y, previous);
                        path.push(grid.index(x, y));
                        current = (x, y);
                        if grid.is_exit(x) {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        }

        debug!(
            "Turns = {turns}  Duration = {}  Length = {}",
            start.elapsed().as_secs_f32(),
            path.len()
        );
        path
    }

    /// Add dead-end branches to the path.
    ///
    /// `round(len * branch_probability)` tiles of the path each start a short walk in random
    /// directions. Branches never touch the right edge, so they cannot lead to an exit on their
    /// own.
    pub fn branch(
        &self,
        grid: &mut Grid,
        path: &[usize],
        branch_probability: f64,
        rng: &mut RandomSource,
    ) {
        let count: usize = (path.len() as f64 * branch_probability).round() as usize;
        let origins: Vec<usize> = rng.sample(path, count);

        for origin in origins {
            let mut current: (usize, usize) = grid.coordinates(origin);
            let Some(mut previous) = grid.get(current.0, current.1) else {
                continue;
            };
            let length: i64 = rng.next_int(1, MAX_BRANCH_LENGTH);

            for _ in 0..length {
                let free: Vec<(usize, usize)> = grid
                    .get_adjacent(current.0, current.1)
                    .to_vec()
                    .into_iter()
                    .filter(|(x, y)| !grid.is_used(*x, *y) && !grid.is_exit(*x))
                    .collect();
                let Some(&(x, y)) = rng.choice(&free) else {
                    break;
                };
                previous = Tile::from_existing(previous, rng);
                grid.set(x, y, previous);
                current = (x, y);
            }
            debug!("    Branch from tile {origin} ends at {current:?}");
        }
    }
}
