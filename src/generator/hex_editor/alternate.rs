/*
alternate.rs

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

//! Search for alternate solution paths in the hex editor.
//!
//! The search follows every link from the start tile, never visiting a tile twice, and counts the
//! paths that reach the right edge. It stops as soon as the requested number of paths is found.

use log::debug;
use std::time::Instant;

use super::grid::Grid;
use super::links::Links;

/// Max number of visited tiles during a search, otherwise an error is raised. On large grids with
/// many links, the number of simple paths explodes.
const MAX_ITERATIONS: usize = 200_000;

/// Type of errors.
#[derive(Debug, PartialEq)]
pub enum AlternateError {
    /// Search budget exhausted before a conclusion.
    IterationsExceeded,
}

/// Alternate path search object.
pub struct Alternate<'a> {
    grid: &'a Grid,
    links: &'a Links,

    /// Starting tile.
    starting_tile: usize,

    /// Tiles of the route being explored, in order.
    route: Vec<usize>,

    /// Whether each tile, by index, is on the route being explored.
    on_route: Vec<bool>,

    /// Number of paths found so far.
    found: usize,

    /// Number of tiles entered during the current search.
    iteration: usize,
}

impl<'a> Alternate<'a> {
    /// Create the object.
    pub fn new(grid: &'a Grid, links: &'a Links, starting_tile: usize) -> Self {
        Self {
            grid,
            links,
            starting_tile,
            route: Vec::with_capacity(grid.len()),
            on_route: vec![false; grid.len()],
            found: 0,
            iteration: 0,
        }
    }

    /// Count the solution paths, up to `limit`.
    ///
    /// # Errors
    ///
    /// The method returns an error when the search takes too many iterations.
    pub fn count_paths(&mut self, limit: usize) -> Result<usize, AlternateError> {
        let start: Instant = Instant::now();
        self.route.clear();
        self.on_route.fill(false);
        self.found = 0;
        self.iteration = 0;

        let res: Result<(), AlternateError> = self.search(self.starting_tile, limit);
        debug!(
            "Paths = {}  Iterations = {}  Duration = {}",
            self.found,
            self.iteration,
            start.elapsed().as_secs_f32()
        );
        res.map(|()| self.found)
    }

    /// Recursively follow the links from the given tile.
    fn search(&mut self, current_tile: usize, limit: usize) -> Result<(), AlternateError> {
        if self.on_route.get(current_tile).is_none_or(|v| *v) {
            return Ok(());
        }

        // The right edge has been reached
        if self.grid.is_exit(self.grid.coordinates(current_tile).0) {
            debug!("   Exit reached: {:?} -> {current_tile}", self.route);
            self.found += 1;
            return Ok(());
        }
        self.route.push(current_tile);
        self.on_route[current_tile] = true;

        self.iteration += 1;
        if self.iteration > MAX_ITERATIONS {
            return Err(AlternateError::IterationsExceeded);
        }

        let links: &'a Links = self.links;
        let mut res: Result<(), AlternateError> = Ok(());
        for next_tile in links.get(current_tile) {
            res = self.search(*next_tile, limit);
            if res.is_err() || self.found >= limit {
                break;
            }
        }
        self.route.pop();
        self.on_route[current_tile] = false;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_path_is_counted_once() {
        // 12 23 34
        // ff 9b 0c
        let grid = Grid::from_rows(&[&["12", "23", "34"], &["ff", "9b", "0c"]]).unwrap();
        let links = Links::new(&grid);

        let mut search = Alternate::new(&grid, &links, 0);
        assert_eq!(search.count_paths(2), Ok(1));
        assert_eq!(search.count_paths(2), Ok(1));
    }

    #[test]
    fn second_path_is_found() {
        // 12 23 34
        // 1b 3b 0c
        let grid = Grid::from_rows(&[&["12", "23", "34"], &["1b", "3b", "0c"]]).unwrap();
        let links = Links::new(&grid);

        assert_eq!(Alternate::new(&grid, &links, 0).count_paths(2), Ok(2));
    }

    #[test]
    fn no_path_from_an_isolated_tile() {
        let grid = Grid::from_rows(&[&["ff", "12"]]).unwrap();
        let links = Links::new(&grid);

        assert_eq!(Alternate::new(&grid, &links, 0).count_paths(2), Ok(0));
    }
}
