/*
properties.rs

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

//! Properties that every game must hold for every built-in preset, checked over random seeds.

use proptest::prelude::*;

use skiddie::difficulty::{Difficulty, DifficultyPresets, Parameters};
use skiddie::game::{self, Answer, GameKind, Puzzle, PuzzleInstance};
use skiddie::generator::hash_cracker::HashCracker;
use skiddie::generator::hex_editor::{HexEditor, TilePath};
use skiddie::generator::port_scanner::{MAX_PORT, PortScanner};
use skiddie::random::RandomSource;

fn params(kind: GameKind, difficulty: Difficulty) -> Parameters {
    DifficultyPresets::new()
        .resolve(kind, difficulty.name())
        .unwrap()
}

fn generate(kind: GameKind, difficulty: Difficulty, seed: u64) -> PuzzleInstance {
    game::generate(
        kind,
        &params(kind, difficulty),
        &mut RandomSource::seeded(seed),
    )
    .unwrap()
}

fn game_strategy() -> impl Strategy<Value = GameKind> {
    prop::sample::select(GameKind::ALL.to_vec())
}

fn difficulty_strategy() -> impl Strategy<Value = Difficulty> {
    prop::sample::select(Difficulty::ALL.to_vec())
}

/// Count the values of the blank cell that verify. The blank is a port or an address section, so
/// every legal value lies well inside the swept range.
fn port_scanner_answers(p: &PortScanner) -> usize {
    (-4 * MAX_PORT..=4 * MAX_PORT).filter(|v| p.verify(v)).count()
}

/// Every way to fill the masked cells of a row with the characters the row does not show.
fn row_fillings(alphabet: &[char], shown: &[Option<char>]) -> Vec<String> {
    fn place(
        missing: &mut Vec<char>,
        row: &mut Vec<char>,
        shown: &[Option<char>],
        out: &mut Vec<String>,
    ) {
        let Some(i) = shown.get(row.len()) else {
            out.push(row.iter().collect());
            return;
        };
        match i {
            Some(c) => {
                row.push(*c);
                place(missing, row, shown, out);
                row.pop();
            }
            None => {
                for k in 0..missing.len() {
                    let c = missing.remove(k);
                    row.push(c);
                    place(missing, row, shown, out);
                    row.pop();
                    missing.insert(k, c);
                }
            }
        }
    }

    let mut missing: Vec<char> = alphabet
        .iter()
        .copied()
        .filter(|c| !shown.contains(&Some(*c)))
        .collect();
    let mut out = Vec::new();
    place(&mut missing, &mut Vec::new(), shown, &mut out);
    out
}

/// Count, up to `limit`, the completed grids that verify. Rows are combined in order, dropping a
/// partial grid as soon as two rows clash in a column.
fn hash_cracker_answers(p: &HashCracker, limit: usize) -> usize {
    fn combine(
        p: &HashCracker,
        rows: &[Vec<String>],
        picked: &mut Vec<String>,
        limit: usize,
    ) -> usize {
        let Some(candidates) = rows.get(picked.len()) else {
            return usize::from(p.verify(picked));
        };
        let mut count = 0;
        for candidate in candidates {
            let clash = picked
                .iter()
                .any(|r| r.chars().zip(candidate.chars()).any(|(a, b)| a == b));
            if clash {
                continue;
            }
            picked.push(candidate.clone());
            count += combine(p, rows, picked, limit - count);
            picked.pop();
            if count >= limit {
                break;
            }
        }
        count
    }

    let rows: Vec<Vec<String>> = p
        .shown()
        .iter()
        .map(|row| row_fillings(p.alphabet(), row))
        .collect();
    combine(p, &rows, &mut Vec::new(), limit)
}

/// Count, up to `limit`, the routes from the start tile to the right edge that verify. Routes are
/// enumerated over the raw tile labels.
fn hex_editor_routes(p: &HexEditor, limit: usize) -> usize {
    fn extend(p: &HexEditor, route: &mut TilePath, limit: usize) -> usize {
        let grid = p.grid();
        let Some(&(x, y)) = route.last() else {
            return 0;
        };
        if grid.is_exit(x) {
            return usize::from(p.verify(route));
        }
        let Some(here) = grid.get(x, y) else {
            return 0;
        };

        let neighbours = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        let mut count = 0;
        for (nx, ny) in neighbours {
            let shares = grid.get(nx, ny).is_some_and(|t| t.shares_with(&here));
            if !shares || route.contains(&(nx, ny)) {
                continue;
            }
            route.push((nx, ny));
            count += extend(p, route, limit - count);
            route.pop();
            if count >= limit {
                break;
            }
        }
        count
    }

    extend(p, &mut vec![p.start()], limit)
}

/// Check that the puzzle leaves a single answer.
fn assert_unique(puzzle: &PuzzleInstance) {
    match (puzzle, puzzle.solution()) {
        (PuzzleInstance::HashCracker(p), _) => assert_eq!(hash_cracker_answers(p, 2), 1),
        (PuzzleInstance::PortScanner(p), _) => assert_eq!(port_scanner_answers(p), 1),
        (PuzzleInstance::DatabaseQuerier(p), Answer::DatabaseQuerier(row)) => {
            assert_eq!(p.matching_rows(), vec![row])
        }
        (PuzzleInstance::PatternFinder(p), _) => {
            let matching: usize = (0..p.choices().len())
                .filter(|i| game::verify(puzzle, &Answer::PatternFinder(*i)))
                .count();
            assert_eq!(matching, 1);
        }
        (PuzzleInstance::HexEditor(p), Answer::HexEditor(path)) => {
            assert_eq!(path.first(), Some(&p.start()));
            for step in path.windows(2) {
                assert!(p.can_move(step[0], step[1]));
            }
            if p.is_unique() {
                assert_eq!(hex_editor_routes(p, 2), 1);
            }
        }
        (PuzzleInstance::ShellScripter(p), Answer::ShellScripter(command)) => {
            assert_eq!(p.command(), command);
            assert!(!game::verify(puzzle, &Answer::ShellScripter(format!("{command} "))));
        }
        (PuzzleInstance::TreeBuilder(p), Answer::TreeBuilder(mut labels)) => {
            // One parent row per node but the root
            let edges: usize = p.table().iter().filter(|r| r.distance == 1).count();
            assert_eq!(edges, p.shape().len() - 1);

            // Swapping the root with another node breaks the closure table
            if labels.len() > 1 {
                let last: usize = labels.len() - 1;
                labels.swap(0, last);
                assert!(!game::verify(puzzle, &Answer::TreeBuilder(labels)));
            }
        }
        (puzzle, answer) => panic!("{answer:?} does not match {}", puzzle.kind()),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn same_seed_same_puzzle(
        kind in game_strategy(),
        difficulty in difficulty_strategy(),
        seed in any::<u64>(),
    ) {
        prop_assert_eq!(generate(kind, difficulty, seed), generate(kind, difficulty, seed));
    }

    #[test]
    fn embedded_solution_verifies(
        kind in game_strategy(),
        difficulty in difficulty_strategy(),
        seed in any::<u64>(),
    ) {
        let puzzle = generate(kind, difficulty, seed);
        prop_assert_eq!(puzzle.kind(), kind);
        prop_assert!(game::verify(&puzzle, &puzzle.solution()));
    }

    #[test]
    fn solution_is_unique(
        kind in game_strategy(),
        difficulty in difficulty_strategy(),
        seed in any::<u64>(),
    ) {
        assert_unique(&generate(kind, difficulty, seed));
    }

    #[test]
    fn answers_for_another_game_are_rejected(
        kind in game_strategy(),
        other in game_strategy(),
        seed in any::<u64>(),
    ) {
        prop_assume!(kind != other);
        let puzzle = generate(kind, Difficulty::Easy, seed);
        let foreign = generate(other, Difficulty::Easy, seed);
        prop_assert!(!game::verify(&puzzle, &foreign.solution()));
    }

    #[test]
    fn generation_terminates_on_hard_presets(seed in any::<u64>()) {
        for kind in GameKind::ALL {
            let ret = game::generate(
                kind,
                &params(kind, Difficulty::Hard),
                &mut RandomSource::seeded(seed),
            );
            prop_assert!(ret.is_ok());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn easy_hex_editor_has_a_single_route(seed in any::<u64>()) {
        let puzzle = generate(GameKind::HexEditor, Difficulty::Easy, seed);
        let PuzzleInstance::HexEditor(p) = puzzle else {
            panic!("not a hex editor puzzle");
        };
        prop_assert!(p.is_unique());
        prop_assert_eq!(hex_editor_routes(&p, 2), 1);
    }
}

#[test]
fn parameters_of_another_game_are_rejected() {
    let ret = game::generate(
        GameKind::PortScanner,
        &params(GameKind::TreeBuilder, Difficulty::Easy),
        &mut RandomSource::seeded(0),
    );
    assert!(ret.is_err());
}
