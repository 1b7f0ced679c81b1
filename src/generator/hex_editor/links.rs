/*
links.rs

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

//! Links between tiles of the hex editor.
//!
//! Two tiles are linked when they are side by side and their labels share a character. The
//! player can only move along links.

use log::debug;

use super::grid::Grid;

/// For each tile index, the indexes of the linked tiles.
#[derive(Debug, Clone, Default)]
pub struct Links {
    links: Vec<Vec<usize>>,
}

impl Links {
    /// Compute the links of a fully labelled grid.
    pub fn new(grid: &Grid) -> Self {
        let links: Vec<Vec<usize>> = grid
            .iter()
            .map(|(x, y, tile)| match tile {
                Some(t) => grid
                    .get_adjacent(x, y)
                    .to_vec()
                    .into_iter()
                    .filter(|(ax, ay)| grid.get(*ax, *ay).is_some_and(|a| a.shares_with(&t)))
                    .map(|(ax, ay)| grid.index(ax, ay))
                    .collect(),
                None => Vec::new(),
            })
            .collect();
        Self { links }
    }

    /// Tiles linked to the given tile.
    pub fn get(&self, tile: usize) -> &[usize] {
        self.links.get(tile).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether the two tiles are linked.
    pub fn is_linked(&self, tile1: usize, tile2: usize) -> bool {
        self.get(tile1).contains(&tile2)
    }

    /// Log the links.
    pub fn debug(&self) {
        for (t1, l) in self.links.iter().enumerate().filter(|(_, l)| !l.is_empty()) {
            debug!("{t1:>3} --> {l:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_side_by_side_tiles_sharing_a_character_are_linked() {
        // ff 9b
        // 61 1c
        let grid = Grid::from_rows(&[&["ff", "9b"], &["61", "1c"]]).unwrap();
        let links = Links::new(&grid);

        assert!(links.is_linked(2, 3));
        assert!(links.is_linked(3, 2));
        assert!(!links.is_linked(0, 1));
        assert!(!links.is_linked(0, 2));
        // 9b and 61 share no character and are not side by side anyway
        assert!(!links.is_linked(1, 2));
        assert!(links.get(0).is_empty());
        assert_eq!(links.get(42), &[] as &[usize]);
    }
}
