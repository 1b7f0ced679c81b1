/*
game.rs

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

//! Games, generated puzzle instances, and player answers.
//!
//! Every game implements the [`Puzzle`] trait, which pairs a generator with a verifier.
//! [`PuzzleInstance`] and [`Answer`] wrap the per-game types so that the presentation layer can
//! hold any game behind a single type, and [`generate`] and [`verify`] dispatch on [`GameKind`]
//! with a `match`.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::difficulty::Parameters;
use crate::error::{ConfigurationError, Error};
use crate::generator::database_querier::{DatabaseQuerier, RowIndex};
use crate::generator::hash_cracker::{CrackedGrid, HashCracker};
use crate::generator::hex_editor::{HexEditor, TilePath};
use crate::generator::pattern_finder::{Choice, PatternFinder};
use crate::generator::port_scanner::PortScanner;
use crate::generator::shell_scripter::ShellScripter;
use crate::generator::tree_builder::{TreeBuilder, TreeLabels};
use crate::random::RandomSource;

/// The games of the suite.
#[derive(
    Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum GameKind {
    HashCracker,
    PortScanner,
    ShellScripter,
    DatabaseQuerier,
    HexEditor,
    PatternFinder,
    TreeBuilder,
}

impl GameKind {
    /// All the games, in menu order.
    pub const ALL: [GameKind; 7] = [
        GameKind::HashCracker,
        GameKind::PortScanner,
        GameKind::ShellScripter,
        GameKind::DatabaseQuerier,
        GameKind::HexEditor,
        GameKind::PatternFinder,
        GameKind::TreeBuilder,
    ];

    /// Identifier of the game, as used in preset files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            GameKind::HashCracker => "hash_cracker",
            GameKind::PortScanner => "port_scanner",
            GameKind::ShellScripter => "shell_scripter",
            GameKind::DatabaseQuerier => "database_querier",
            GameKind::HexEditor => "hex_editor",
            GameKind::PatternFinder => "pattern_finder",
            GameKind::TreeBuilder => "tree_builder",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GameKind {
    type Err = ConfigurationError;

    /// Parse a game name. The comparison is case-insensitive, and `-` is accepted in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().to_lowercase().replace('-', "_");
        GameKind::ALL
            .iter()
            .find(|g| g.name() == wanted)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownGame(s.to_string()))
    }
}

/// A generator and its verifier.
pub trait Puzzle: Sized {
    /// Game this puzzle belongs to.
    const KIND: GameKind;

    /// Shape of the player's answer.
    type Answer;

    /// Generate a random puzzle with a unique solution.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when the parameters cannot produce a puzzle, and
    /// [`Error::Generation`] when no puzzle with a unique solution was found within the attempt
    /// cap.
    fn generate(params: &Parameters, rng: &mut RandomSource) -> Result<Self, Error>;

    /// Whether the answer solves the puzzle.
    fn verify(&self, answer: &Self::Answer) -> bool;

    /// Return the solution embedded in the puzzle.
    fn solution(&self) -> Self::Answer;
}

/// A generated puzzle for any of the games.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum PuzzleInstance {
    HashCracker(HashCracker),
    PortScanner(PortScanner),
    ShellScripter(ShellScripter),
    DatabaseQuerier(DatabaseQuerier),
    HexEditor(HexEditor),
    PatternFinder(PatternFinder),
    TreeBuilder(TreeBuilder),
}

/// A player answer for any of the games.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "game", content = "answer", rename_all = "snake_case")]
pub enum Answer {
    HashCracker(CrackedGrid),
    PortScanner(i64),
    ShellScripter(String),
    DatabaseQuerier(RowIndex),
    HexEditor(TilePath),
    PatternFinder(Choice),
    TreeBuilder(TreeLabels),
}

impl PuzzleInstance {
    /// Game of the puzzle.
    pub fn kind(&self) -> GameKind {
        match self {
            PuzzleInstance::HashCracker(_) => GameKind::HashCracker,
            PuzzleInstance::PortScanner(_) => GameKind::PortScanner,
            PuzzleInstance::ShellScripter(_) => GameKind::ShellScripter,
            PuzzleInstance::DatabaseQuerier(_) => GameKind::DatabaseQuerier,
            PuzzleInstance::HexEditor(_) => GameKind::HexEditor,
            PuzzleInstance::PatternFinder(_) => GameKind::PatternFinder,
            PuzzleInstance::TreeBuilder(_) => GameKind::TreeBuilder,
        }
    }

    /// Return the solution embedded in the puzzle.
    pub fn solution(&self) -> Answer {
        match self {
            PuzzleInstance::HashCracker(p) => Answer::HashCracker(p.solution()),
            PuzzleInstance::PortScanner(p) => Answer::PortScanner(p.solution()),
            PuzzleInstance::ShellScripter(p) => Answer::ShellScripter(p.solution()),
            PuzzleInstance::DatabaseQuerier(p) => Answer::DatabaseQuerier(p.solution()),
            PuzzleInstance::HexEditor(p) => Answer::HexEditor(p.solution()),
            PuzzleInstance::PatternFinder(p) => Answer::PatternFinder(p.solution()),
            PuzzleInstance::TreeBuilder(p) => Answer::TreeBuilder(p.solution()),
        }
    }
}

impl fmt::Display for PuzzleInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PuzzleInstance::HashCracker(p) => p.fmt(f),
            PuzzleInstance::PortScanner(p) => p.fmt(f),
            PuzzleInstance::ShellScripter(p) => p.fmt(f),
            PuzzleInstance::DatabaseQuerier(p) => p.fmt(f),
            PuzzleInstance::HexEditor(p) => p.fmt(f),
            PuzzleInstance::PatternFinder(p) => p.fmt(f),
            PuzzleInstance::TreeBuilder(p) => p.fmt(f),
        }
    }
}

/// Generate a puzzle for the given game.
///
/// # Errors
///
/// The function returns a [`ConfigurationError::GameMismatch`] error if the parameters were
/// resolved for another game, and forwards the errors of the game generator.
pub fn generate(
    kind: GameKind,
    params: &Parameters,
    rng: &mut RandomSource,
) -> Result<PuzzleInstance, Error> {
    if params.game() != kind {
        return Err(ConfigurationError::GameMismatch {
            expected: kind,
            found: params.game(),
        }
        .into());
    }

    let start: Instant = Instant::now();
    let instance: PuzzleInstance = match kind {
        GameKind::HashCracker => PuzzleInstance::HashCracker(HashCracker::generate(params, rng)?),
        GameKind::PortScanner => PuzzleInstance::PortScanner(PortScanner::generate(params, rng)?),
        GameKind::ShellScripter => {
            PuzzleInstance::ShellScripter(ShellScripter::generate(params, rng)?)
        }
        GameKind::DatabaseQuerier => {
            PuzzleInstance::DatabaseQuerier(DatabaseQuerier::generate(params, rng)?)
        }
        GameKind::HexEditor => PuzzleInstance::HexEditor(HexEditor::generate(params, rng)?),
        GameKind::PatternFinder => {
            PuzzleInstance::PatternFinder(PatternFinder::generate(params, rng)?)
        }
        GameKind::TreeBuilder => PuzzleInstance::TreeBuilder(TreeBuilder::generate(params, rng)?),
    };
    info!(
        "Generated a {kind} puzzle in {}s",
        start.elapsed().as_secs_f32()
    );
    Ok(instance)
}

/// Whether the answer solves the puzzle.
///
/// An answer for another game is a caller error; it is never correct.
pub fn verify(instance: &PuzzleInstance, answer: &Answer) -> bool {
    match (instance, answer) {
        (PuzzleInstance::HashCracker(p), Answer::HashCracker(a)) => p.verify(a),
        (PuzzleInstance::PortScanner(p), Answer::PortScanner(a)) => p.verify(a),
        (PuzzleInstance::ShellScripter(p), Answer::ShellScripter(a)) => p.verify(a),
        (PuzzleInstance::DatabaseQuerier(p), Answer::DatabaseQuerier(a)) => p.verify(a),
        (PuzzleInstance::HexEditor(p), Answer::HexEditor(a)) => p.verify(a),
        (PuzzleInstance::PatternFinder(p), Answer::PatternFinder(a)) => p.verify(a),
        (PuzzleInstance::TreeBuilder(p), Answer::TreeBuilder(a)) => p.verify(a),
        _ => {
            debug!("Answer does not belong to a {} puzzle", instance.kind());
            false
        }
    }
}
