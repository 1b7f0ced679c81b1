/*
grid.rs

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

//! Tile grid of the hex editor.

use log::{Level, debug, log_enabled};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::random::RandomSource;

/// Characters used in tile labels.
pub const HEX_DIGITS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

/// Two-character label of a tile, such as `9b`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Tile([char; 2]);

impl Tile {
    /// Parse a tile label. Return [`None`] if the label is not two hexadecimal digits.
    pub fn parse(label: &str) -> Option<Self> {
        let mut chars = label.chars().map(|c| c.to_ascii_lowercase());
        let tile: Self = Self([chars.next()?, chars.next()?]);

        if chars.next().is_some() || !tile.0.iter().all(|c| HEX_DIGITS.contains(c)) {
            None
        } else {
            Some(tile)
        }
    }

    /// Create a random tile.
    pub fn random(rng: &mut RandomSource) -> Self {
        Self([
            HEX_DIGITS[rng.index(HEX_DIGITS.len())],
            HEX_DIGITS[rng.index(HEX_DIGITS.len())],
        ])
    }

    /// Create a random tile that shares one character with the given tile.
    ///
    /// The shared character is at a random position in the new tile.
    pub fn from_existing(tile: Tile, rng: &mut RandomSource) -> Self {
        let shared: char = tile.0[rng.index(2)];
        let other: char = HEX_DIGITS[rng.index(HEX_DIGITS.len())];

        if rng.chance(0.5) {
            Self([shared, other])
        } else {
            Self([other, shared])
        }
    }

    /// Whether the two tiles have at least one character in common.
    pub fn shares_with(&self, other: &Tile) -> bool {
        self.0.iter().any(|c| other.0.contains(c))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.0[0], self.0[1])
    }
}

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Tiles adjacent to a given tile, by direction.
#[derive(Debug, Copy, Clone, Default)]
pub struct Adjacent {
    pub w: Option<(usize, usize)>,
    pub n: Option<(usize, usize)>,
    pub e: Option<(usize, usize)>,
    pub s: Option<(usize, usize)>,
}

impl Adjacent {
    /// Adjacent coordinates that are inside the grid.
    pub fn to_vec(self) -> Vec<(usize, usize)> {
        [self.w, self.n, self.e, self.s].into_iter().flatten().collect()
    }
}

/// Grid of tiles, stored row by row. A tile is [`None`] until it gets a label.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    tiles: Vec<Option<Tile>>,
}

impl Grid {
    /// Create an empty [`Grid`] object.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![None; width * height],
        }
    }

    /// Create a grid from rows of labels such as `[["ff", "9b"], ["61", "1c"]]`.
    ///
    /// Return [`None`] if the rows have different lengths or a label is invalid.
    pub fn from_rows(rows: &[&[&str]]) -> Option<Self> {
        let width: usize = rows.first()?.len();
        let mut grid: Self = Self::new(width, rows.len());

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return None;
            }
            for (x, label) in row.iter().enumerate() {
                grid.set(x, y, Tile::parse(label)?);
            }
        }
        Some(grid)
    }

    /// Number of tiles in the grid.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Index of the tile at the given coordinates.
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Coordinates of the tile at the given index.
    pub fn coordinates(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Whether the coordinates are inside the grid.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Get the tile at the given coordinates.
    pub fn get(&self, x: usize, y: usize) -> Option<Tile> {
        if self.contains(x, y) {
            self.tiles[self.index(x, y)]
        } else {
            None
        }
    }

    /// Set the label of the tile at the given coordinates.
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if self.contains(x, y) {
            let i: usize = self.index(x, y);
            self.tiles[i] = Some(tile);
        }
    }

    /// Whether the tile at the given coordinates has a label.
    pub fn is_used(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some()
    }

    /// Whether the tile is on the right edge, where a path ends.
    pub fn is_exit(&self, x: usize) -> bool {
        x + 1 == self.width
    }

    /// Return the tiles adjacent to the given tile.
    pub fn get_adjacent(&self, x: usize, y: usize) -> Adjacent {
        Adjacent {
            w: (x >= 1).then(|| (x - 1, y)),
            n: (y >= 1).then(|| (x, y - 1)),
            e: (x + 1 < self.width).then_some((x + 1, y)),
            s: (y + 1 < self.height).then_some((x, y + 1)),
        }
    }

    /// Whether two tiles are side by side.
    pub fn is_adjacent(&self, a: (usize, usize), b: (usize, usize)) -> bool {
        self.contains(a.0, a.1) && self.contains(b.0, b.1) && a.0.abs_diff(b.0) + a.1.abs_diff(b.1) == 1
    }

    /// Give a random label to every tile without one.
    pub fn fill(&mut self, rng: &mut RandomSource) {
        for tile in self.tiles.iter_mut().filter(|t| t.is_none()) {
            *tile = Some(Tile::random(rng));
        }
    }

    /// Log the grid.
    pub fn debug(&self, start: (usize, usize)) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        for y in 0..self.height {
            let row: String = (0..self.width)
                .map(|x| match self.get(x, y) {
                    Some(t) if (x, y) == start => format!("[{t}]"),
                    Some(t) => format!(" {t} "),
                    None => String::from(" .. "),
                })
                .collect();
            debug!("{row}");
        }
    }

    /// Iterate over the grid, row by row.
    pub fn iter(&self) -> GridIterator<'_> {
        GridIterator {
            grid: self,
            index: 0,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rows: Vec<String> = (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.get(x, y).map_or(String::from(".."), |t| t.to_string()))
                    .collect::<Vec<String>>()
                    .join(" ")
            })
            .collect();
        write!(f, "{}", rows.join("\n"))
    }
}

/// Iterator over the tiles of the grid.
pub struct GridIterator<'a> {
    grid: &'a Grid,
    index: usize,
}

impl Iterator for GridIterator<'_> {
    type Item = (usize, usize, Option<Tile>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.grid.len() {
            return None;
        }
        let (x, y) = self.grid.coordinates(self.index);
        self.index += 1;
        Some((x, y, self.grid.get(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_share_characters() {
        let a = Tile::parse("9b").unwrap();

        assert!(a.shares_with(&Tile::parse("b1").unwrap()));
        assert!(a.shares_with(&Tile::parse("99").unwrap()));
        assert!(!a.shares_with(&Tile::parse("ff").unwrap()));
        assert_eq!(Tile::parse("9B"), Some(a));
        assert_eq!(Tile::parse("9"), None);
        assert_eq!(Tile::parse("9bc"), None);
        assert_eq!(Tile::parse("zz"), None);
    }

    #[test]
    fn new_tile_shares_a_character() {
        let mut rng = RandomSource::seeded(5);
        let mut tile = Tile::random(&mut rng);

        for _ in 0..100 {
            let next = Tile::from_existing(tile, &mut rng);
            assert!(next.shares_with(&tile));
            tile = next;
        }
    }

    #[test]
    fn adjacency_stays_inside_the_grid() {
        let grid = Grid::new(3, 2);

        assert_eq!(grid.get_adjacent(0, 0).to_vec(), vec![(1, 0), (0, 1)]);
        assert_eq!(grid.get_adjacent(2, 1).to_vec(), vec![(1, 1), (2, 0)]);
        assert!(grid.is_adjacent((1, 0), (1, 1)));
        assert!(!grid.is_adjacent((0, 0), (1, 1)));
        assert!(!grid.is_adjacent((2, 0), (3, 0)));
    }

    #[test]
    fn rows_are_parsed() {
        let grid = Grid::from_rows(&[&["ff", "9b"], &["61", "1c"]]).unwrap();

        assert_eq!(grid.get(0, 1), Tile::parse("61"));
        assert_eq!(grid.to_string(), "ff 9b\n61 1c");
        assert_eq!(grid.iter().filter(|t| t.2.is_some()).count(), 4);
        assert!(Grid::from_rows(&[&["ff", "9b"], &["61"]]).is_none());
    }
}
