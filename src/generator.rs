/*
generator.rs

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

//! Puzzle generators.
//!
//! There is one module per game. Each module declares its parameter schema and built-in presets
//! (a [`crate::difficulty::GameSchema`] named `SCHEMA`), the puzzle type, and its implementation
//! of the [`crate::game::Puzzle`] trait.
//!
//! Generators build a candidate puzzle from random data, then prove that the candidate has
//! exactly one solution. When the proof fails, the candidate is discarded and a new one is built.
//! [`regenerate`] runs that loop with an explicit attempt counter, so that a difficulty preset
//! that cannot produce unique puzzles ends with a [`GenerationError`] instead of looping forever.

pub mod database_querier;
pub mod hash_cracker;
pub mod hex_editor;
pub mod pattern_finder;
pub mod port_scanner;
pub mod shell_scripter;
pub mod tree_builder;

use log::debug;
use std::time::Instant;

use crate::error::GenerationError;
use crate::game::GameKind;
use crate::random::RandomSource;

/// Default number of candidates a generator builds before giving up.
pub const MAX_ATTEMPTS: usize = 1000;

/// Build candidates with `attempt` until one is accepted.
///
/// `attempt` returns `Ok` with the accepted puzzle, or `Err` with the reason the candidate was
/// rejected.
///
/// # Errors
///
/// The function returns a [`GenerationError`] with the last rejection reason when `max_attempts`
/// candidates have been rejected.
pub fn regenerate<T, F>(
    game: GameKind,
    max_attempts: usize,
    rng: &mut RandomSource,
    mut attempt: F,
) -> Result<T, GenerationError>
where
    F: FnMut(&mut RandomSource) -> Result<T, String>,
{
    let start: Instant = Instant::now();
    let mut reason: String = String::from("no attempt was made");

    for i in 1..=max_attempts {
        match attempt(rng) {
            Ok(puzzle) => {
                debug!(
                    "{game}: attempts = {i}  duration = {}",
                    start.elapsed().as_secs_f32()
                );
                return Ok(puzzle);
            }
            Err(r) => {
                debug!("{game}: attempt {i} rejected: {r}");
                reason = r;
            }
        }
    }
    Err(GenerationError {
        game,
        attempts: max_attempts,
        reason,
    })
}
