/*
error.rs

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

//! Error types returned by the puzzle engine.
//!
//! Configuration problems ([`ConfigurationError`]) are reported before any puzzle is generated and
//! are never retried. [`GenerationError`] means that the reject-and-regenerate loop of a generator
//! ran out of attempts without producing a puzzle with a unique solution.

use thiserror::Error;

use crate::game::GameKind;

/// Invalid or missing difficulty parameters.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The game name does not match any known game.
    #[error("unknown game `{0}`")]
    UnknownGame(String),

    /// The game has no preset with that name.
    #[error("the difficulty `{preset}` was not found for {game}")]
    UnknownPreset { game: GameKind, preset: String },

    /// A preset sets a parameter that the game does not declare.
    #[error("{game} does not have a parameter named `{name}`")]
    UnknownParameter { game: GameKind, name: String },

    /// A preset does not set a parameter that the game requires.
    #[error("{game} requires the parameter `{name}`")]
    MissingParameter { game: GameKind, name: String },

    /// A parameter value is outside of its domain.
    #[error("invalid value for {game} parameter `{name}`: {reason}")]
    InvalidValue {
        game: GameKind,
        name: String,
        reason: String,
    },

    /// The parameters were resolved for a different game.
    #[error("parameters for {found} cannot be used to generate {expected}")]
    GameMismatch { expected: GameKind, found: GameKind },

    /// The preset file cannot be read or written.
    #[error("cannot access the preset file: {0}")]
    Io(#[from] std::io::Error),

    /// The preset file is not valid JSON.
    #[error("cannot parse the preset file: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigurationError {
    /// Shortcut for building an [`ConfigurationError::InvalidValue`] error.
    pub fn invalid(game: GameKind, name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            game,
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// The generator could not build a puzzle with a unique solution.
#[derive(Debug, Error, PartialEq)]
#[error("cannot generate a {game} puzzle after {attempts} attempts: {reason}")]
pub struct GenerationError {
    /// Game that was being generated.
    pub game: GameKind,

    /// Number of attempts made before giving up.
    pub attempts: usize,

    /// Reason the last attempt was rejected.
    pub reason: String,
}

/// Any error that the engine can return.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
