/*
lib.rs

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

//! Puzzle engine for a suite of hacker-themed terminal mini-games.
//!
//! Each game has a generator that builds a random puzzle with exactly one solution, and a
//! verifier that checks the player's answer. Generation is driven by difficulty presets
//! ([`difficulty`]) and by an injectable, seedable [`random::RandomSource`], so that the same seed
//! and parameters always give the same puzzle.
//!
//! ```
//! use skiddie::difficulty::DifficultyPresets;
//! use skiddie::game::{self, GameKind};
//! use skiddie::random::RandomSource;
//!
//! let params = DifficultyPresets::new()
//!     .resolve(GameKind::PortScanner, "easy")
//!     .unwrap();
//! let puzzle = game::generate(GameKind::PortScanner, &params, &mut RandomSource::seeded(42))
//!     .unwrap();
//! assert!(game::verify(&puzzle, &puzzle.solution()));
//! ```

pub mod difficulty;
pub mod error;
pub mod game;
pub mod generator;
pub mod random;

pub use difficulty::{DifficultyPresets, Parameters};
pub use error::{ConfigurationError, Error, GenerationError};
pub use game::{Answer, GameKind, Puzzle, PuzzleInstance, generate, verify};
pub use random::RandomSource;
